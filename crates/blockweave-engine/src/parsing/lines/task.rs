use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Workflow keyword at the start of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    Todo,
    Doing,
    Done,
    /// `WAITING` or its short form `WAIT`.
    Waiting,
    /// `CANCELED` or `CANCELLED`.
    Canceled,
    Later,
    Now,
}

impl TaskState {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "TODO" => Some(Self::Todo),
            "DOING" => Some(Self::Doing),
            "DONE" => Some(Self::Done),
            "WAITING" | "WAIT" => Some(Self::Waiting),
            "CANCELED" | "CANCELLED" => Some(Self::Canceled),
            "LATER" => Some(Self::Later),
            "NOW" => Some(Self::Now),
            _ => None,
        }
    }

    /// Canonical keyword, used when writing a task back out.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::Doing => "DOING",
            Self::Done => "DONE",
            Self::Waiting => "WAITING",
            Self::Canceled => "CANCELED",
            Self::Later => "LATER",
            Self::Now => "NOW",
        }
    }

    pub fn is_open(self) -> bool {
        !matches!(self, Self::Done | Self::Canceled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckboxState {
    /// `[ ]`
    Unchecked,
    /// `[x]` or `[X]`
    Checked,
    /// `[-]`
    Partial,
}

/// Task metadata found at the start of a line.
///
/// At most one of `state` and `checkbox` is set; `priority` only accompanies a `state`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub state: Option<TaskState>,
    pub checkbox: Option<CheckboxState>,
    pub priority: Option<char>,
}

impl TaskInfo {
    pub fn is_task(&self) -> bool {
        self.state.is_some() || self.checkbox.is_some()
    }
}

const KEYWORDS: &str = "TODO|DOING|DONE|WAITING|WAIT|CANCELED|CANCELLED|LATER|NOW";

static TASK_WITH_PRIORITY: OnceLock<Regex> = OnceLock::new();
static TASK: OnceLock<Regex> = OnceLock::new();
static CHECKBOX: OnceLock<Regex> = OnceLock::new();

fn task_with_priority_regex() -> &'static Regex {
    TASK_WITH_PRIORITY.get_or_init(|| {
        Regex::new(&format!(r"^({KEYWORDS})\s+\[#([A-Z])\]\s+"))
            .expect("Invalid task priority regex")
    })
}

fn task_regex() -> &'static Regex {
    TASK.get_or_init(|| Regex::new(&format!(r"^({KEYWORDS})\s+")).expect("Invalid task regex"))
}

fn checkbox_regex() -> &'static Regex {
    CHECKBOX.get_or_init(|| Regex::new(r"^\[([ xX\-])\]\s+").expect("Invalid checkbox regex"))
}

/// Reads a task keyword (with optional `[#X]` priority) or a checkbox from the start
/// of `content`.
///
/// The keyword must be followed by whitespace, so `TODO` alone or `TODOS` is not a task.
pub fn parse_task_info(content: &str) -> TaskInfo {
    let content = content.trim();

    if let Some(caps) = task_with_priority_regex().captures(content) {
        return TaskInfo {
            state: TaskState::from_keyword(&caps[1]),
            checkbox: None,
            priority: caps[2].chars().next(),
        };
    }

    if let Some(caps) = task_regex().captures(content) {
        return TaskInfo {
            state: TaskState::from_keyword(&caps[1]),
            ..TaskInfo::default()
        };
    }

    if let Some(caps) = checkbox_regex().captures(content) {
        let checkbox = match &caps[1] {
            " " => CheckboxState::Unchecked,
            "-" => CheckboxState::Partial,
            _ => CheckboxState::Checked,
        };
        return TaskInfo {
            checkbox: Some(checkbox),
            ..TaskInfo::default()
        };
    }

    TaskInfo::default()
}

/// Removes a leading task keyword (and priority), then a leading checkbox.
pub fn strip_task_prefix(content: &str) -> &str {
    let content = content.trim();

    let rest = match task_with_priority_regex().find(content) {
        Some(m) => &content[m.end()..],
        None => match task_regex().find(content) {
            Some(m) => &content[m.end()..],
            None => content,
        },
    };

    match checkbox_regex().find(rest) {
        Some(m) => &rest[m.end()..],
        None => rest,
    }
}

//! Per-line metadata extractors. Each one is a pure function over trimmed line content.

use regex::Regex;
use std::sync::OnceLock;

static PAGE_REF: OnceLock<Regex> = OnceLock::new();
static BLOCK_ID: OnceLock<Regex> = OnceLock::new();
static PROPERTY: OnceLock<Regex> = OnceLock::new();
static TAG: OnceLock<Regex> = OnceLock::new();
static BLOCK_REF: OnceLock<Regex> = OnceLock::new();

/// Property key reserved for block identifiers.
pub const ID_KEY: &str = "id";

fn page_ref_regex() -> &'static Regex {
    PAGE_REF.get_or_init(|| Regex::new(r"\[\[(.*?)\]\]").expect("Invalid page reference regex"))
}

fn block_id_regex() -> &'static Regex {
    BLOCK_ID
        .get_or_init(|| Regex::new(r"\bid::\s*([a-zA-Z0-9\-]+)").expect("Invalid block id regex"))
}

fn property_regex() -> &'static Regex {
    PROPERTY.get_or_init(|| {
        Regex::new(r"^([a-zA-Z][a-zA-Z0-9\-_]*)::\s*(.*)$").expect("Invalid property regex")
    })
}

fn tag_regex() -> &'static Regex {
    TAG.get_or_init(|| Regex::new(r"(?:^|\s)#([a-zA-Z0-9\-_/]+)").expect("Invalid tag regex"))
}

fn block_ref_regex() -> &'static Regex {
    BLOCK_REF
        .get_or_init(|| Regex::new(r"\(\(([a-fA-F0-9\-]+)\)\)").expect("Invalid block ref regex"))
}

/// Inner text of every `[[...]]`, left to right. Duplicates are kept.
pub fn page_references(content: &str) -> Vec<String> {
    page_ref_regex()
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Token following the first `id::` marker.
pub fn block_id(content: &str) -> Option<String> {
    block_id_regex()
        .captures(content)
        .map(|caps| caps[1].to_string())
}

/// `key:: value` spanning the whole line. The value is trimmed and may be empty.
///
/// The `id` key is left to [`block_id`].
pub fn property(content: &str) -> Option<(String, String)> {
    let caps = property_regex().captures(content)?;
    let key = &caps[1];
    if key == ID_KEY {
        return None;
    }
    Some((key.to_string(), caps[2].trim().to_string()))
}

/// `#name` tags that start the line or follow whitespace.
pub fn tags(content: &str) -> Vec<String> {
    tag_regex()
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Identifiers inside `((...))` block references.
pub fn block_references(content: &str) -> Vec<String> {
    block_ref_regex()
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

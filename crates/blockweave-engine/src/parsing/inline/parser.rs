use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::types::{Segment, SegmentKind};
use crate::parsing::lines::extract::ID_KEY;

/// One alternation, tried left to right at each offset. Order is precedence:
/// an earlier alternative wins when two match at the same start.
const SEGMENT_PATTERN: &str = concat!(
    r"(?P<query>\{\{query.*?\}\})",
    r"|(?P<embed>\{\{embed.*?\}\})",
    r"|\(\((?P<block_ref>[a-fA-F0-9\-]+)\)\)",
    r"|~~(?P<strike>.*?)~~",
    r"|==(?P<highlight>.*?)==",
    r"|\^\^(?P<highlight_alt>.*?)\^\^",
    r"|#(?P<tag>[a-zA-Z0-9\-_/]+)",
    r"|\bid::\s*(?P<id>[a-fA-F0-9\-]+)",
    r"|(?P<key>[a-zA-Z][a-zA-Z0-9\-_]*)::\s*(?P<value>[^\n]+)",
    r"|\*\*(?P<bold>.*?)\*\*",
    r"|\*(?P<italic>[^*]+?)\*",
    r"|\[(?P<named_text>[^\]]+)\]\(\[\[(?P<named_page>[^\]]+)\]\]\)",
    r"|\[(?P<link_text>[^\]]+)\]\((?P<link_url>[^)]+)\)",
    r"|\[\[(?P<page>.*?)\]\]",
    r"|!\[(?P<alt>.*?)\]\((?P<src>.*?)\)",
);

static SEGMENT_REGEX: OnceLock<Regex> = OnceLock::new();

fn segment_regex() -> &'static Regex {
    SEGMENT_REGEX.get_or_init(|| Regex::new(SEGMENT_PATTERN).expect("Invalid segment regex"))
}

/// Splits inline content into typed segments.
///
/// Text between constructs becomes [`SegmentKind::PlainText`]. Unclosed delimiters
/// never match, so they stay in the surrounding text. Empty input yields no segments.
pub fn parse_segments(content: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in segment_regex().captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            segments.push(Segment::text(&content[last..whole.start()]));
        }
        segments.push(classify_match(&caps, whole.as_str()));
        last = whole.end();
    }

    if last < content.len() {
        segments.push(Segment::text(&content[last..]));
    }

    segments
}

fn classify_match(caps: &Captures<'_>, whole: &str) -> Segment {
    let group = |name: &str| caps.name(name).map(|m| m.as_str());

    if group("query").is_some() {
        return Segment::new(SegmentKind::Query, whole);
    }
    if group("embed").is_some() {
        return Segment::new(SegmentKind::Embed, whole);
    }
    if let Some(id) = group("block_ref") {
        return Segment::new(SegmentKind::BlockReference, id).with_target(id);
    }
    if let Some(inner) = group("strike") {
        return Segment::new(SegmentKind::Strikethrough, inner);
    }
    if let Some(inner) = group("highlight").or_else(|| group("highlight_alt")) {
        return Segment::new(SegmentKind::Highlight, inner);
    }
    if let Some(tag) = group("tag") {
        return Segment::new(SegmentKind::Tag, tag).with_target(tag);
    }
    if let Some(id) = group("id") {
        return Segment::new(SegmentKind::BlockIdMarker, whole).with_target(id.trim());
    }
    if let (Some(key), Some(value)) = (group("key"), group("value")) {
        if key == ID_KEY {
            return Segment::new(SegmentKind::BlockIdMarker, whole).with_target(value.trim());
        }
        return Segment::new(SegmentKind::Property, whole);
    }
    if let Some(inner) = group("bold") {
        return Segment::new(SegmentKind::Bold, inner);
    }
    if let Some(inner) = group("italic") {
        return Segment::new(SegmentKind::Italic, inner);
    }
    if let (Some(text), Some(page)) = (group("named_text"), group("named_page")) {
        return Segment::new(SegmentKind::PageLink, text).with_target(page);
    }
    if let (Some(text), Some(url)) = (group("link_text"), group("link_url")) {
        return Segment::new(SegmentKind::PageLink, text).with_target(url);
    }
    if let Some(page) = group("page") {
        return Segment::new(SegmentKind::PageLink, page).with_target(page);
    }
    if let (Some(alt), Some(src)) = (group("alt"), group("src")) {
        return Segment::new(SegmentKind::Image, alt)
            .with_target(src)
            .with_alt(alt);
    }

    Segment::text(whole)
}

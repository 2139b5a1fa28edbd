use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    PlainText,
    Bold,
    Italic,
    Strikethrough,
    /// `==text==` or `^^text^^`.
    Highlight,
    /// `[[page]]`, `[text]([[page]])` or `[text](url)`.
    PageLink,
    Image,
    Tag,
    /// `((block-id))`.
    BlockReference,
    /// `key:: value` inline.
    Property,
    /// `id:: value` inline.
    BlockIdMarker,
    /// `{{query ...}}`, kept verbatim.
    Query,
    /// `{{embed ...}}`, kept verbatim.
    Embed,
}

/// A typed run of inline text.
///
/// `content` is what a renderer displays; `target` is where a link, tag or reference
/// points; `alt` is only set for images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl Segment {
    pub fn new(kind: SegmentKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            target: None,
            alt: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(SegmentKind::PlainText, content)
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    pub fn is_page_link(&self) -> bool {
        self.kind == SegmentKind::PageLink
    }
}

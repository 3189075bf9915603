//! Per-paint snapshots of book metadata and pagination.

extern crate alloc;

use alloc::borrow::Cow;
use alloc::string::String;

/// Document properties as reported by the host metadata provider.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentProps {
    pub display_title: String,
    /// Raw author field; several authors are newline-delimited.
    pub authors: String,
}

/// Layout family of the open document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Page breaks depend on render-time layout (EPUB, FB2, plain text...).
    #[default]
    Reflowable,
    /// Fixed pages (PDF, DjVu, comics). The header is never drawn over these.
    FixedLayout,
}

impl DocumentKind {
    pub const fn is_reflowable(self) -> bool {
        matches!(self, Self::Reflowable)
    }
}

/// Horizontal page insets of the current document, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageMargins {
    pub left: u32,
    pub right: u32,
}

impl PageMargins {
    pub const fn new(left: u32, right: u32) -> Self {
        Self { left, right }
    }

    pub const fn uniform(px: u32) -> Self {
        Self {
            left: px,
            right: px,
        }
    }

    pub const fn total(self) -> u32 {
        self.left.saturating_add(self.right)
    }
}

/// Title and display author of the open book.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
}

impl BookMetadata {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
        }
    }

    /// Build from provider output; missing properties yield empty fields.
    pub fn from_props(props: Option<&DocumentProps>) -> Self {
        match props {
            Some(props) => Self {
                title: props.display_title.trim().into(),
                author: collapse_authors(&props.authors).into_owned(),
            },
            None => Self::default(),
        }
    }
}

/// Collapse a newline-delimited author list to `"{first}, et al."`.
///
/// Blank lines are ignored; a single author is returned trimmed.
pub fn collapse_authors(raw: &str) -> Cow<'_, str> {
    let mut names = raw.lines().map(str::trim).filter(|name| !name.is_empty());
    let Some(first) = names.next() else {
        return Cow::Borrowed("");
    };
    if names.next().is_none() {
        return Cow::Borrowed(first);
    }
    let mut out = String::with_capacity(first.len() + 8);
    out.push_str(first);
    out.push_str(", et al.");
    Cow::Owned(out)
}

/// Where the reader is in the book.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationFact {
    /// 1-based page number.
    pub page_number: u32,
    /// Title of the chapter containing the page, empty when unknown.
    pub chapter_title: String,
    /// Pages read in the chapter counting the current one: the first page
    /// of a chapter is `1`.
    pub pages_done_in_chapter: u32,
}

impl PaginationFact {
    /// Build from host TOC values, where `raw_pages_done` is `0` on the
    /// first page of a chapter.
    pub fn from_toc(page_number: u32, chapter_title: Option<String>, raw_pages_done: u32) -> Self {
        Self {
            page_number: page_number.max(1),
            chapter_title: chapter_title
                .map(|title| String::from(title.trim()))
                .unwrap_or_default(),
            pages_done_in_chapter: raw_pages_done.saturating_add(1),
        }
    }

    /// Fact for a book without a table of contents.
    pub fn without_toc(page_number: u32) -> Self {
        Self::from_toc(page_number, None, 0)
    }

    pub const fn is_chapter_opening(&self) -> bool {
        self.pages_done_in_chapter <= 1
    }
}

//! Mode-driven header text composition.

use running_head::{BookMetadata, LayoutConfig, Mode, PageMargins, PaginationFact, SeparatorGlyph};
use serde::Serialize;

use crate::fit::{fit_with_face, HeaderTextStyle, TextMeasurer};

/// Text for the three header regions, already fitted to their budgets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HeaderContent {
    pub left_text: String,
    pub right_text: String,
    pub center_text: String,
    /// Distance between the bottom screen edge and the bottom of the center
    /// box. `None` keeps the center box in the top row.
    pub center_vertical_override: Option<u32>,
}

impl HeaderContent {
    pub fn is_empty(&self) -> bool {
        self.left_text.is_empty() && self.right_text.is_empty() && self.center_text.is_empty()
    }

    pub fn has_corners(&self) -> bool {
        !self.left_text.is_empty() || !self.right_text.is_empty()
    }
}

/// Per-paint inputs gathered from the host.
#[derive(Clone, Copy, Debug)]
pub struct HeaderInputs<'a> {
    pub book: &'a BookMetadata,
    pub pagination: &'a PaginationFact,
    pub clock_text: &'a str,
    /// Margins of the current document page.
    pub page_margins: PageMargins,
}

/// Pixel width budgets for each region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionBudgets {
    /// Screen width minus the effective margins.
    pub available: u32,
    pub left: u32,
    pub right: u32,
    pub center: u32,
}

/// Margins the header actually uses: the book's when enabled, otherwise the
/// configured fixed margin on both sides.
pub fn effective_margins(config: &LayoutConfig, page_margins: PageMargins) -> PageMargins {
    if config.use_book_margins() {
        page_margins
    } else {
        PageMargins::uniform(config.margin())
    }
}

/// Width budgets derived from the screen width and layout percentages.
pub fn region_budgets(
    screen_width: u32,
    config: &LayoutConfig,
    page_margins: PageMargins,
) -> RegionBudgets {
    let margins = effective_margins(config, page_margins);
    let available = screen_width.saturating_sub(margins.total());
    RegionBudgets {
        available,
        left: percent_of(available, config.left_max_width_pct()),
        right: percent_of(available, config.right_max_width_pct()),
        center: percent_of(available, config.center_max_width_pct()),
    }
}

fn percent_of(width: u32, pct: u32) -> u32 {
    ((u64::from(width) * u64::from(pct)) / 100) as u32
}

/// Unfitted region text for a mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawSegments {
    pub left: String,
    pub right: String,
    pub center: String,
    pub center_at_bottom: bool,
}

/// Pick the region text for `mode`. `None` means nothing is drawn.
pub fn raw_segments(
    mode: Mode,
    inputs: &HeaderInputs<'_>,
    separator: SeparatorGlyph,
) -> Option<RawSegments> {
    let book = inputs.book;
    let pagination = inputs.pagination;
    let segments = match mode {
        Mode::Clean => return None,
        Mode::PrintEdition if pagination.is_chapter_opening() => RawSegments {
            center: pagination.page_number.to_string(),
            center_at_bottom: true,
            ..RawSegments::default()
        },
        Mode::PrintEdition if pagination.page_number % 2 == 0 => RawSegments {
            left: pagination.page_number.to_string(),
            center: join_segments(&[book.author.as_str(), book.title.as_str()], separator),
            ..RawSegments::default()
        },
        Mode::PrintEdition => RawSegments {
            right: pagination.page_number.to_string(),
            center: pagination.chapter_title.clone(),
            ..RawSegments::default()
        },
        Mode::TitleTime => RawSegments {
            left: book.title.clone(),
            right: inputs.clock_text.into(),
            ..RawSegments::default()
        },
        Mode::ChapterTime => RawSegments {
            left: pagination.chapter_title.clone(),
            right: inputs.clock_text.into(),
            ..RawSegments::default()
        },
        Mode::TimeCenter => RawSegments {
            center: inputs.clock_text.into(),
            ..RawSegments::default()
        },
        Mode::FullInfo => RawSegments {
            center: join_segments(
                &[
                    book.author.as_str(),
                    book.title.as_str(),
                    pagination.chapter_title.as_str(),
                ],
                separator,
            ),
            ..RawSegments::default()
        },
    };
    Some(segments)
}

/// Join the non-blank parts with the padded separator glyph.
pub fn join_segments(parts: &[&str], separator: SeparatorGlyph) -> String {
    let padded = separator.padded();
    let mut out = String::new();
    for part in parts.iter().map(|part| part.trim()).filter(|part| !part.is_empty()) {
        if !out.is_empty() {
            out.push_str(&padded);
        }
        out.push_str(part);
    }
    out
}

/// Computes fitted [`HeaderContent`] for a screen width.
#[derive(Debug)]
pub struct HeaderComposer<'m, M: ?Sized> {
    measurer: &'m M,
    screen_width: u32,
}

impl<'m, M> HeaderComposer<'m, M>
where
    M: TextMeasurer + ?Sized,
{
    pub fn new(measurer: &'m M, screen_width: u32) -> Self {
        Self {
            measurer,
            screen_width,
        }
    }

    pub fn budgets(&self, config: &LayoutConfig, page_margins: PageMargins) -> RegionBudgets {
        region_budgets(self.screen_width, config, page_margins)
    }

    /// Compose the header for `mode`.
    ///
    /// Returns `None` for [`Mode::Clean`]; callers skip rendering entirely.
    pub fn compute(
        &self,
        mode: Mode,
        inputs: &HeaderInputs<'_>,
        config: &LayoutConfig,
    ) -> Option<HeaderContent> {
        let raw = raw_segments(mode, inputs, config.separator())?;
        let budgets = self.budgets(config, inputs.page_margins);
        log::trace!("compose {:?} with budgets {:?}", mode, budgets);

        let face = self.measurer.acquire_face(&HeaderTextStyle::from_config(config));
        let content = HeaderContent {
            left_text: fit_with_face(&face, &raw.left, budgets.left),
            right_text: fit_with_face(&face, &raw.right, budgets.right),
            center_text: fit_with_face(&face, &raw.center, budgets.center),
            center_vertical_override: raw.center_at_bottom.then_some(config.bottom_padding()),
        };
        Some(content)
    }
}

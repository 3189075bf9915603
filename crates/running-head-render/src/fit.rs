//! Text measurement seam and width fitting.

use std::cell::Cell;

use running_head::LayoutConfig;
use serde::Serialize;

/// Horizontal ellipsis appended to truncated segments.
pub const ELLIPSIS: &str = "\u{2026}";

const FIRST_STRONG_ISOLATE: char = '\u{2068}';
const POP_DIRECTIONAL_ISOLATE: char = '\u{2069}';
const NBSP: char = '\u{00A0}';

/// Font request for header text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct HeaderTextStyle {
    pub family: String,
    pub size_px: u32,
    pub bold: bool,
}

impl HeaderTextStyle {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            family: config.font_face().into(),
            size_px: config.font_size(),
            bold: config.bold(),
        }
    }
}

impl Default for HeaderTextStyle {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

/// Metrics of one acquired face.
pub trait FaceMetrics {
    /// Advance width of `text` as a single unbroken run.
    fn text_width_px(&self, text: &str) -> u32;

    /// Height of one line box.
    fn line_height_px(&self) -> u32;
}

/// Text-measurement collaborator.
///
/// Faces are leased: [`TextMeasurer::acquire_face`] hands out a value that
/// releases the underlying font resources when dropped. Callers keep a face
/// only for the span of one fitting or layout operation.
pub trait TextMeasurer {
    type Face<'a>: FaceMetrics
    where
        Self: 'a;

    fn acquire_face(&self, style: &HeaderTextStyle) -> Self::Face<'_>;
}

/// Fit `text` into `max_width_px` using a face leased for this call only.
pub fn fit_text<M>(measurer: &M, style: &HeaderTextStyle, text: &str, max_width_px: u32) -> String
where
    M: TextMeasurer + ?Sized,
{
    let face = measurer.acquire_face(style);
    fit_with_face(&face, text, max_width_px)
}

/// Fit `text` into `max_width_px` with an already leased face.
///
/// Text that fits is returned unchanged. Overflowing text is cut at a char
/// boundary, right-trimmed and suffixed with [`ELLIPSIS`]; when not even the
/// ellipsis fits the result is empty. Text with right-to-left characters is
/// wrapped in a first-strong isolate. Fitting a fitted string is a no-op.
pub fn fit_with_face<F>(face: &F, text: &str, max_width_px: u32) -> String
where
    F: FaceMetrics + ?Sized,
{
    let inner = strip_isolate(text);
    if inner.is_empty() {
        return String::new();
    }
    if measure(face, inner) <= max_width_px {
        return isolate_if_rtl(inner);
    }
    if measure(face, ELLIPSIS) > max_width_px {
        log::trace!("no room for ellipsis in {}px", max_width_px);
        return String::new();
    }

    let boundaries: Vec<usize> = inner
        .char_indices()
        .map(|(idx, _)| idx)
        .skip(1)
        .collect();
    // Largest kept-prefix index whose truncation fits; index 0 keeps nothing.
    let mut lo = 0usize;
    let mut hi = boundaries.len();
    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        let candidate = truncated(inner, boundaries[mid - 1]);
        if measure(face, &candidate) <= max_width_px {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    let cut = if lo == 0 { 0 } else { boundaries[lo - 1] };
    isolate_if_rtl(&truncated(inner, cut))
}

/// Width of `text` as laid out by the fitter: spaces measured as
/// non-breaking spaces, bidi isolate controls ignored.
pub fn measure<F>(face: &F, text: &str) -> u32
where
    F: FaceMetrics + ?Sized,
{
    let needs_rewrite = text
        .chars()
        .any(|ch| ch == ' ' || is_isolate_control(ch));
    if !needs_rewrite {
        return face.text_width_px(text);
    }
    let normalized: String = text
        .chars()
        .filter(|ch| !is_isolate_control(*ch))
        .map(|ch| if ch == ' ' { NBSP } else { ch })
        .collect();
    face.text_width_px(&normalized)
}

/// Whether `text` contains a strong right-to-left character.
pub fn has_rtl(text: &str) -> bool {
    text.chars().any(is_strong_rtl)
}

fn truncated(text: &str, byte_end: usize) -> String {
    let kept = text[..byte_end].trim_end();
    let mut out = String::with_capacity(kept.len() + ELLIPSIS.len());
    out.push_str(kept);
    out.push_str(ELLIPSIS);
    out
}

fn isolate_if_rtl(text: &str) -> String {
    if !has_rtl(text) {
        return text.into();
    }
    let mut out = String::with_capacity(text.len() + 6);
    out.push(FIRST_STRONG_ISOLATE);
    out.push_str(text);
    out.push(POP_DIRECTIONAL_ISOLATE);
    out
}

fn strip_isolate(text: &str) -> &str {
    text.strip_prefix(FIRST_STRONG_ISOLATE)
        .and_then(|rest| rest.strip_suffix(POP_DIRECTIONAL_ISOLATE))
        .unwrap_or(text)
}

fn is_isolate_control(ch: char) -> bool {
    matches!(ch, '\u{2066}'..='\u{2069}')
}

/// Letters with bidi class R or AL. Digits (AN), combining marks (NSM) and
/// format characters such as U+FEFF (BN) do not count.
fn is_strong_rtl(ch: char) -> bool {
    matches!(
        ch,
        // Hebrew
        '\u{05D0}'..='\u{05EA}'
            | '\u{05EF}'..='\u{05F2}'
            // Arabic
            | '\u{0620}'..='\u{064A}'
            | '\u{066E}'..='\u{066F}'
            | '\u{0671}'..='\u{06D3}'
            | '\u{06D5}'
            | '\u{06EE}'..='\u{06EF}'
            | '\u{06FA}'..='\u{06FC}'
            | '\u{06FF}'
            // Syriac, Arabic Supplement, Thaana
            | '\u{0710}'
            | '\u{0712}'..='\u{072F}'
            | '\u{074D}'..='\u{07A5}'
            | '\u{07B1}'
            // NKo, Samaritan, Mandaic, Arabic Extended
            | '\u{07CA}'..='\u{07EA}'
            | '\u{0800}'..='\u{0815}'
            | '\u{0840}'..='\u{0858}'
            | '\u{0860}'..='\u{086A}'
            | '\u{0870}'..='\u{0887}'
            | '\u{08A0}'..='\u{08C8}'
            // Presentation forms
            | '\u{FB1D}'
            | '\u{FB1F}'..='\u{FB28}'
            | '\u{FB2A}'..='\u{FB4F}'
            | '\u{FB50}'..='\u{FBB1}'
            | '\u{FBD3}'..='\u{FD3D}'
            | '\u{FD50}'..='\u{FDC7}'
            | '\u{FDF0}'..='\u{FDFB}'
            | '\u{FE70}'..='\u{FE74}'
            | '\u{FE76}'..='\u{FEFC}'
            // Phoenician, Imperial Aramaic, Arabic mathematical letters
            | '\u{10800}'..='\u{1091B}'
            | '\u{1E800}'..='\u{1E8C4}'
            | '\u{1EE00}'..='\u{1EEBB}'
    )
}

/// Measurer with a fixed per-char advance.
///
/// A test helper for hosts and this crate's own tests; real hosts measure
/// with their font backend.
///
/// Counts leased faces so callers can check nothing outlives an operation.
/// Not `Sync`: header painting runs on the UI thread only.
#[derive(Debug)]
pub struct FixedAdvanceMeasurer {
    advance_px: u32,
    line_height_px: u32,
    live_faces: Cell<usize>,
    acquired_faces: Cell<usize>,
}

impl FixedAdvanceMeasurer {
    pub fn new(advance_px: u32, line_height_px: u32) -> Self {
        Self {
            advance_px,
            line_height_px,
            live_faces: Cell::new(0),
            acquired_faces: Cell::new(0),
        }
    }

    /// Faces currently leased and not yet dropped.
    pub fn live_faces(&self) -> usize {
        self.live_faces.get()
    }

    /// Total faces leased since construction.
    pub fn acquired_faces(&self) -> usize {
        self.acquired_faces.get()
    }
}

/// Face leased from a [`FixedAdvanceMeasurer`].
#[derive(Debug)]
pub struct FixedAdvanceFace<'a> {
    owner: &'a FixedAdvanceMeasurer,
}

impl FaceMetrics for FixedAdvanceFace<'_> {
    fn text_width_px(&self, text: &str) -> u32 {
        (text.chars().count() as u32).saturating_mul(self.owner.advance_px)
    }

    fn line_height_px(&self) -> u32 {
        self.owner.line_height_px
    }
}

impl Drop for FixedAdvanceFace<'_> {
    fn drop(&mut self) {
        self.owner
            .live_faces
            .set(self.owner.live_faces.get().saturating_sub(1));
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    type Face<'a> = FixedAdvanceFace<'a>;

    fn acquire_face(&self, _style: &HeaderTextStyle) -> Self::Face<'_> {
        self.live_faces.set(self.live_faces.get() + 1);
        self.acquired_faces.set(self.acquired_faces.get() + 1);
        FixedAdvanceFace { owner: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> HeaderTextStyle {
        HeaderTextStyle::default()
    }

    #[test]
    fn text_within_budget_is_returned_unmodified() {
        let m = FixedAdvanceMeasurer::new(10, 16);
        assert_eq!(fit_text(&m, &style(), "Dune", 40), "Dune");
        assert_eq!(fit_text(&m, &style(), "Dune", 400), "Dune");
    }

    #[test]
    fn overflow_is_truncated_with_trailing_ellipsis() {
        let m = FixedAdvanceMeasurer::new(10, 16);
        let fitted = fit_text(&m, &style(), "The Left Hand of Darkness", 100);
        assert!(fitted.ends_with(ELLIPSIS));
        assert!(measure(&m.acquire_face(&style()), &fitted) <= 100);
        assert_eq!(fitted, "The Left\u{2026}");
    }

    #[test]
    fn truncation_trims_whitespace_before_ellipsis() {
        let m = FixedAdvanceMeasurer::new(10, 16);
        // "abc " + ellipsis would be 5 chars; trimmed gives "abc…".
        assert_eq!(fit_text(&m, &style(), "abc defgh", 50), "abc\u{2026}");
    }

    #[test]
    fn fitting_is_idempotent() {
        let m = FixedAdvanceMeasurer::new(7, 16);
        for text in ["Dune", "A Canticle for Leibowitz", "שלום עולם ומלואו", ""] {
            for budget in [0, 7, 20, 60, 200] {
                let once = fit_text(&m, &style(), text, budget);
                let twice = fit_text(&m, &style(), &once, budget);
                assert_eq!(once, twice, "text {:?} budget {}", text, budget);
            }
        }
    }

    #[test]
    fn degenerate_budget_yields_empty_or_ellipsis() {
        let m = FixedAdvanceMeasurer::new(10, 16);
        assert_eq!(fit_text(&m, &style(), "Dune", 0), "");
        assert_eq!(fit_text(&m, &style(), "Dune", 9), "");
        assert_eq!(fit_text(&m, &style(), "Dune", 10), ELLIPSIS);
    }

    #[test]
    fn rtl_text_is_isolated_and_isolates_are_not_measured() {
        let m = FixedAdvanceMeasurer::new(10, 16);
        let fitted = fit_text(&m, &style(), "שלום", 40);
        assert_eq!(fitted, "\u{2068}שלום\u{2069}");
        assert_eq!(measure(&m.acquire_face(&style()), &fitted), 40);
        assert!(!has_rtl("Dune"));
    }

    #[test]
    fn neutral_and_weak_marks_do_not_trigger_isolation() {
        let m = FixedAdvanceMeasurer::new(10, 16);
        assert_eq!(fit_text(&m, &style(), "\u{FEFF}Dune", 100), "\u{FEFF}Dune");
        assert_eq!(fit_text(&m, &style(), "Page \u{0661}\u{0662}", 100), "Page \u{0661}\u{0662}");
        assert!(!has_rtl("\u{05B0}\u{064B}"));
        assert!(has_rtl("\u{0627}\u{0644}\u{0643}\u{062A}\u{0627}\u{0628}"));
        assert!(has_rtl("\u{FB50}"));
    }

    #[test]
    fn faces_are_released_after_each_fit() {
        let m = FixedAdvanceMeasurer::new(10, 16);
        let _ = fit_text(&m, &style(), "The Left Hand of Darkness", 30);
        let _ = fit_text(&m, &style(), "", 30);
        assert_eq!(m.live_faces(), 0);
        assert_eq!(m.acquired_faces(), 2);
    }
}

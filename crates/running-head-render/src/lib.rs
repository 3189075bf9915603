//! Text fitting, header composition and box layout for `running-head`.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

mod compose;
mod fit;
mod overlay;
mod paint;

pub use compose::{
    effective_margins, join_segments, raw_segments, region_budgets, HeaderComposer, HeaderContent,
    HeaderInputs, RawSegments, RegionBudgets,
};
pub use fit::{
    fit_text, fit_with_face, has_rtl, measure, FaceMetrics, FixedAdvanceFace,
    FixedAdvanceMeasurer, HeaderTextStyle, TextMeasurer, ELLIPSIS,
};
pub use overlay::{HeaderOverlay, MenuBuildHook, PageFrame, RepaintHook};
pub use paint::{BoxRegion, HeaderBox, HeaderPaint, HeaderRenderer, ScreenGeometry};
pub use running_head::{
    DocumentKind, LayoutConfig, Mode, PageMargins, SeparatorGlyph, TopPadding,
};

//! Box layout for composed header content.

use running_head::{LayoutConfig, PageMargins};
use serde::Serialize;
use smallvec::SmallVec;

use crate::compose::{effective_margins, HeaderContent};
use crate::fit::{measure, FaceMetrics, HeaderTextStyle, TextMeasurer};

/// Logical screen size, captured once at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScreenGeometry {
    pub width: u32,
    pub height: u32,
}

impl ScreenGeometry {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Header region a box belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxRegion {
    Left,
    Right,
    Center,
}

/// Positioned text box, top-left anchored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HeaderBox {
    pub region: BoxRegion,
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Paint instructions for one frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HeaderPaint {
    pub style: HeaderTextStyle,
    pub boxes: SmallVec<[HeaderBox; 3]>,
    /// Height of the top band covered by the header, padding included.
    /// Zero when nothing is drawn at the top.
    pub top_extent: u32,
}

impl HeaderPaint {
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn region(&self, region: BoxRegion) -> Option<&HeaderBox> {
        self.boxes.iter().find(|b| b.region == region)
    }
}

/// Turns [`HeaderContent`] into positioned boxes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderRenderer {
    geometry: ScreenGeometry,
}

impl HeaderRenderer {
    pub const fn new(geometry: ScreenGeometry) -> Self {
        Self { geometry }
    }

    pub const fn geometry(&self) -> ScreenGeometry {
        self.geometry
    }

    /// Lay out `content`.
    ///
    /// Corner text forms a row at `top_padding`: left box at the left margin,
    /// right box flush with the right margin. Center text is centered between
    /// the margins, at `top_padding` or, with a vertical override, that many
    /// pixels above the bottom edge. Empty segments produce no box.
    pub fn paint<M>(
        &self,
        content: &HeaderContent,
        config: &LayoutConfig,
        page_margins: PageMargins,
        measurer: &M,
    ) -> HeaderPaint
    where
        M: TextMeasurer + ?Sized,
    {
        let style = HeaderTextStyle::from_config(config);
        let mut paint = HeaderPaint {
            style,
            ..HeaderPaint::default()
        };
        if content.is_empty() {
            return paint;
        }

        let margins = effective_margins(config, page_margins);
        let top = config.top_padding().px();
        let face = measurer.acquire_face(&paint.style);
        let line_height = face.line_height_px();

        if !content.left_text.is_empty() {
            let width = measure(&face, &content.left_text);
            paint.boxes.push(HeaderBox {
                region: BoxRegion::Left,
                text: content.left_text.clone(),
                x: margins.left as i32,
                y: top as i32,
                width,
                height: line_height,
            });
        }
        if !content.right_text.is_empty() {
            let width = measure(&face, &content.right_text);
            let right_edge = self.geometry.width.saturating_sub(margins.right) as i32;
            paint.boxes.push(HeaderBox {
                region: BoxRegion::Right,
                text: content.right_text.clone(),
                x: right_edge - width as i32,
                y: top as i32,
                width,
                height: line_height,
            });
        }
        if content.has_corners() {
            paint.top_extent = line_height + top;
        }

        if !content.center_text.is_empty() {
            let width = measure(&face, &content.center_text);
            let inner = self.geometry.width.saturating_sub(margins.total()) as i32;
            let x = margins.left as i32 + (inner - width as i32) / 2;
            let y = match content.center_vertical_override {
                Some(from_bottom) => self
                    .geometry
                    .height
                    .saturating_sub(line_height)
                    .saturating_sub(from_bottom),
                None => {
                    paint.top_extent = paint.top_extent.max(line_height + top);
                    top
                }
            };
            paint.boxes.push(HeaderBox {
                region: BoxRegion::Center,
                text: content.center_text.clone(),
                x,
                y: y as i32,
                width,
                height: line_height,
            });
        }

        log::trace!(
            "header paint: {} boxes, top extent {}",
            paint.boxes.len(),
            paint.top_extent
        );
        paint
    }
}

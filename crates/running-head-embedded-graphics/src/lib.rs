//! embedded-graphics backend for `running-head-render` header paints.

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

use std::borrow::Cow;
use std::cell::Cell;

use embedded_graphics::{
    mono_font::{
        ascii::{
            FONT_10X20, FONT_6X13_BOLD, FONT_6X9, FONT_7X14, FONT_7X14_BOLD, FONT_8X13,
            FONT_8X13_BOLD, FONT_9X18_BOLD,
        },
        MonoFont, MonoTextStyle,
    },
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use running_head_render::{
    FaceMetrics, HeaderBox, HeaderPaint, HeaderTextStyle, TextMeasurer,
};

/// Why style-to-font mapping had to fall back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontFallbackReason {
    /// Requested family is not one the mono tables stand in for.
    UnknownFamily,
}

/// Mono font picked for a header style.
#[derive(Clone, Copy, Debug)]
pub struct FontSelection {
    pub font: &'static MonoFont<'static>,
    pub fallback_reason: Option<FontFallbackReason>,
}

/// Maps header text styles onto the built-in ASCII mono fonts.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonoFontBackend;

impl MonoFontBackend {
    const SIZE_SMALL: u8 = 0;
    const SIZE_MEDIUM: u8 = 1;
    const SIZE_LARGE: u8 = 2;
    const SIZE_XL: u8 = 3;

    fn size_bucket_for(size_px: u32) -> u8 {
        if size_px >= 24 {
            Self::SIZE_XL
        } else if size_px >= 20 {
            Self::SIZE_LARGE
        } else if size_px >= 16 {
            Self::SIZE_MEDIUM
        } else {
            Self::SIZE_SMALL
        }
    }

    fn font_for(size_bucket: u8, bold: bool) -> &'static MonoFont<'static> {
        match (size_bucket, bold) {
            (Self::SIZE_SMALL, false) => &FONT_6X9,
            (Self::SIZE_SMALL, true) => &FONT_6X13_BOLD,
            (Self::SIZE_MEDIUM, false) => &FONT_7X14,
            (Self::SIZE_MEDIUM, true) => &FONT_7X14_BOLD,
            (Self::SIZE_LARGE, false) => &FONT_8X13,
            (Self::SIZE_LARGE, true) => &FONT_8X13_BOLD,
            (_, false) => &FONT_10X20,
            (_, true) => &FONT_9X18_BOLD,
        }
    }

    fn family_supported(family: &str) -> bool {
        matches!(
            family.trim().to_ascii_lowercase().as_str(),
            "monospace" | "mono" | "fixed" | "serif" | "sans-serif"
        )
    }

    /// Resolve `style` to a font. Unknown families still get a font, with
    /// the fallback noted.
    pub fn resolve(&self, style: &HeaderTextStyle) -> FontSelection {
        let fallback_reason =
            (!Self::family_supported(&style.family)).then_some(FontFallbackReason::UnknownFamily);
        FontSelection {
            font: Self::font_for(Self::size_bucket_for(style.size_px), style.bold),
            fallback_reason,
        }
    }

    pub fn text_style(&self, style: &HeaderTextStyle) -> MonoTextStyle<'static, BinaryColor> {
        MonoTextStyle::new(self.resolve(style).font, BinaryColor::On)
    }
}

/// `TextMeasurer` over [`MonoFontBackend`] metrics.
///
/// Counts face leases; `live_faces()` is zero whenever no fitting or layout
/// operation is in progress.
#[derive(Debug, Default)]
pub struct EgTextMeasurer {
    backend: MonoFontBackend,
    live_faces: Cell<usize>,
    acquired_faces: Cell<usize>,
}

impl EgTextMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(&self) -> MonoFontBackend {
        self.backend
    }

    pub fn live_faces(&self) -> usize {
        self.live_faces.get()
    }

    pub fn acquired_faces(&self) -> usize {
        self.acquired_faces.get()
    }
}

impl TextMeasurer for EgTextMeasurer {
    type Face<'a> = MonoFace<'a>;

    fn acquire_face(&self, style: &HeaderTextStyle) -> Self::Face<'_> {
        let selection = self.backend.resolve(style);
        if let Some(reason) = selection.fallback_reason {
            log::trace!("header font {:?}: {:?}", style.family, reason);
        }
        self.live_faces.set(self.live_faces.get() + 1);
        self.acquired_faces.set(self.acquired_faces.get() + 1);
        MonoFace {
            font: selection.font,
            owner: self,
        }
    }
}

/// Face leased from an [`EgTextMeasurer`]; released on drop.
#[derive(Debug)]
pub struct MonoFace<'a> {
    font: &'static MonoFont<'static>,
    owner: &'a EgTextMeasurer,
}

impl MonoFace<'_> {
    pub fn font(&self) -> &'static MonoFont<'static> {
        self.font
    }
}

impl FaceMetrics for MonoFace<'_> {
    fn text_width_px(&self, text: &str) -> u32 {
        let glyphs = normalize_text_for_mono(text).chars().count() as u32;
        let advance = self.font.character_size.width + self.font.character_spacing;
        glyphs.saturating_mul(advance)
    }

    fn line_height_px(&self) -> u32 {
        self.font.character_size.height
    }
}

impl Drop for MonoFace<'_> {
    fn drop(&mut self) {
        self.owner
            .live_faces
            .set(self.owner.live_faces.get().saturating_sub(1));
    }
}

/// Executes a [`HeaderPaint`] on a monochrome draw target.
#[derive(Clone, Copy, Debug)]
pub struct EgHeaderPainter {
    backend: MonoFontBackend,
    /// Blank the header band and each box before drawing text.
    pub clear_background: bool,
}

impl Default for EgHeaderPainter {
    fn default() -> Self {
        Self {
            backend: MonoFontBackend,
            clear_background: true,
        }
    }
}

impl EgHeaderPainter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw<D>(&self, paint: &HeaderPaint, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        if paint.is_empty() {
            return Ok(());
        }
        let text_style = self.backend.text_style(&paint.style);
        if self.clear_background && paint.top_extent > 0 {
            let width = display.bounding_box().size.width;
            clear_rect(
                display,
                Rectangle::new(Point::zero(), Size::new(width, paint.top_extent)),
            )?;
        }
        for header_box in &paint.boxes {
            self.draw_box(header_box, text_style, display)?;
        }
        Ok(())
    }

    fn draw_box<D>(
        &self,
        header_box: &HeaderBox,
        text_style: MonoTextStyle<'static, BinaryColor>,
        display: &mut D,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let origin = Point::new(header_box.x, header_box.y);
        if self.clear_background {
            clear_rect(
                display,
                Rectangle::new(origin, Size::new(header_box.width, header_box.height)),
            )?;
        }
        let text = normalize_text_for_mono(&header_box.text);
        Text::with_baseline(text.as_ref(), origin, text_style, Baseline::Top).draw(display)?;
        Ok(())
    }
}

fn clear_rect<D>(display: &mut D, rect: Rectangle) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    rect.into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
        .draw(display)
}

/// Map typographic characters onto the ASCII the mono fonts carry and drop
/// bidi isolate controls.
pub fn normalize_text_for_mono(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|ch| {
        matches!(
            ch,
            '\u{00A0}' // nbsp
                | '\u{00B7}' // middle dot
                | '\u{2013}' // en dash
                | '\u{2014}' // em dash
                | '\u{2018}' // left single quote
                | '\u{2019}' // right single quote
                | '\u{201C}' // left double quote
                | '\u{201D}' // right double quote
                | '\u{2022}' // bullet
                | '\u{2026}' // ellipsis
                | '\u{2066}'..='\u{2069}' // isolates
        )
    }) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{00A0}' => out.push(' '),
            '\u{00B7}' => out.push('.'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2022}' => out.push('*'),
            '\u{2026}' => out.push_str("..."),
            '\u{2066}'..='\u{2069}' => {}
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

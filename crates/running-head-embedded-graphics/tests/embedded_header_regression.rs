use core::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::BinaryColor,
    Pixel,
};
use running_head::{
    keys, ClockProvider, DocumentKind, DocumentProps, MemorySettingsStore, MetadataProvider,
    Mode, PageMargins, RepaintScheduler, TocProvider,
};
use running_head_embedded_graphics::{EgHeaderPainter, EgTextMeasurer};
use running_head_render::{BoxRegion, HeaderOverlay, PageFrame, ScreenGeometry};

const DISPLAY_WIDTH: u32 = 480;
const DISPLAY_HEIGHT: u32 = 800;

struct CaptureDisplay {
    size: Size,
    on_pixels: Vec<Point>,
}

impl CaptureDisplay {
    fn new() -> Self {
        Self {
            size: Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT),
            on_pixels: Vec::new(),
        }
    }
}

impl OriginDimensions for CaptureDisplay {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for CaptureDisplay {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if color == BinaryColor::On {
                self.on_pixels.push(point);
            }
        }
        Ok(())
    }
}

struct Book;

impl MetadataProvider for Book {
    fn document_props(&self) -> Option<DocumentProps> {
        Some(DocumentProps {
            display_title: "A Wizard of Earthsea".to_string(),
            authors: "Ursula K. Le Guin".to_string(),
        })
    }
}

struct Toc;

impl TocProvider for Toc {
    fn title_for_page(&self, _page: u32) -> Option<String> {
        Some("The Shadow".to_string())
    }

    fn chapter_pages_done_for_page(&self, page: u32) -> Option<u32> {
        Some(page % 7)
    }
}

struct Clock;

impl ClockProvider for Clock {
    fn formatted_time(&self, _twelve_hour: bool) -> String {
        "09:41".to_string()
    }
}

struct NoRepaint;

impl RepaintScheduler for NoRepaint {
    fn schedule_repaint(&self) {}
}

fn overlay_with(store: MemorySettingsStore) -> HeaderOverlay<MemorySettingsStore, NoRepaint> {
    HeaderOverlay::new(
        store,
        NoRepaint,
        ScreenGeometry::new(DISPLAY_WIDTH, DISPLAY_HEIGHT),
        None,
    )
}

fn frame(kind: DocumentKind, page: u32) -> PageFrame<'static> {
    PageFrame {
        kind,
        page_number: page,
        metadata: Some(&Book),
        toc: Some(&Toc),
        clock: &Clock,
        page_margins: PageMargins::uniform(12),
    }
}

#[test]
fn every_visible_mode_draws_ink_and_clean_draws_none() {
    let measurer = EgTextMeasurer::new();
    let painter = EgHeaderPainter::new();
    for mode in Mode::ALL {
        let store =
            MemorySettingsStore::new().with_value(keys::MODE, i64::from(mode.persisted()));
        let overlay = overlay_with(store);
        let paint = overlay.paint_frame(&frame(DocumentKind::Reflowable, 10), &measurer);
        let mut display = CaptureDisplay::new();
        painter.draw(&paint, &mut display).expect("infallible display");

        if mode == Mode::Clean {
            assert!(display.on_pixels.is_empty());
        } else {
            assert!(!display.on_pixels.is_empty(), "mode {:?} drew nothing", mode);
        }
        assert_eq!(measurer.live_faces(), 0);
    }
}

#[test]
fn fixed_layout_page_stays_untouched() {
    let store = MemorySettingsStore::new().with_value(keys::MODE, 6i64);
    let overlay = overlay_with(store);
    let measurer = EgTextMeasurer::new();
    let paint = overlay.paint_frame(&frame(DocumentKind::FixedLayout, 10), &measurer);
    let mut display = CaptureDisplay::new();
    EgHeaderPainter::new()
        .draw(&paint, &mut display)
        .expect("infallible display");
    assert!(display.on_pixels.is_empty());
    assert_eq!(measurer.acquired_faces(), 0);
}

#[test]
fn corner_ink_stays_in_the_top_band() {
    let store = MemorySettingsStore::new().with_value(keys::MODE, 3i64);
    let overlay = overlay_with(store);
    let measurer = EgTextMeasurer::new();
    let paint = overlay.paint_frame(&frame(DocumentKind::Reflowable, 10), &measurer);
    assert!(paint.top_extent > 0);

    let mut display = CaptureDisplay::new();
    EgHeaderPainter::new()
        .draw(&paint, &mut display)
        .expect("infallible display");
    let band = paint.top_extent as i32;
    assert!(display.on_pixels.iter().all(|p| p.y < band));

    let right = paint.region(BoxRegion::Right).expect("clock box");
    assert_eq!(right.x + right.width as i32, (DISPLAY_WIDTH - 12) as i32);
    let rightmost = display.on_pixels.iter().map(|p| p.x).max().expect("ink");
    assert!(rightmost < (DISPLAY_WIDTH - 12) as i32);
}

#[test]
fn chapter_opening_folio_lands_near_bottom_edge() {
    let store = MemorySettingsStore::new().with_value(keys::MODE, 2i64);
    let overlay = overlay_with(store);
    let measurer = EgTextMeasurer::new();
    // 14 % 7 == 0: first page of a chapter.
    let paint = overlay.paint_frame(&frame(DocumentKind::Reflowable, 14), &measurer);
    let folio = paint.region(BoxRegion::Center).expect("folio");
    assert_eq!(folio.text, "14");

    let mut display = CaptureDisplay::new();
    EgHeaderPainter::new()
        .draw(&paint, &mut display)
        .expect("infallible display");
    let top = (DISPLAY_HEIGHT - folio.height - overlay.config().bottom_padding()) as i32;
    assert!(display.on_pixels.iter().all(|p| p.y >= top));
}

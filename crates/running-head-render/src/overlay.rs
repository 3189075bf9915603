//! Header overlay: owned state plus the host hooks.
//!
//! [`HeaderOverlay`] is what a host installs. It restores mode and layout
//! settings at construction, answers the repaint and menu-build hooks, and
//! turns actions and menu commands into persisted state changes followed
//! by a scheduled repaint.

use running_head::{
    keys, ActionRegistry, BookMetadata, ClockProvider, DocumentKind, HeaderAction, HeaderError,
    LayoutConfig, MenuCommand, MenuItem, MetadataProvider, Mode, ModeState, PageMargins,
    PaginationFact, RepaintScheduler, SettingsStore, TocProvider,
};

use crate::compose::{HeaderComposer, HeaderContent, HeaderInputs};
use crate::fit::{HeaderTextStyle, TextMeasurer};
use crate::paint::{HeaderPaint, HeaderRenderer, ScreenGeometry};

/// Host state for one repaint.
#[derive(Clone, Copy)]
pub struct PageFrame<'a> {
    pub kind: DocumentKind,
    /// 1-based page number.
    pub page_number: u32,
    pub metadata: Option<&'a dyn MetadataProvider>,
    pub toc: Option<&'a dyn TocProvider>,
    pub clock: &'a dyn ClockProvider,
    pub page_margins: PageMargins,
}

impl PageFrame<'_> {
    fn book(&self) -> BookMetadata {
        let props = self.metadata.and_then(|provider| provider.document_props());
        BookMetadata::from_props(props.as_ref())
    }

    fn pagination(&self) -> PaginationFact {
        match self.toc {
            Some(toc) => PaginationFact::from_toc(
                self.page_number,
                toc.title_for_page(self.page_number),
                toc.chapter_pages_done_for_page(self.page_number)
                    .unwrap_or(0),
            ),
            None => PaginationFact::without_toc(self.page_number),
        }
    }
}

/// Hook called by the host when the page is redrawn.
pub trait RepaintHook<M: TextMeasurer + ?Sized> {
    fn paint_frame(&self, frame: &PageFrame<'_>, measurer: &M) -> HeaderPaint;
}

/// Hook called by the host when it assembles its main menu.
pub trait MenuBuildHook {
    fn build_menu(&self, font_faces: &[&str]) -> MenuItem;
}

/// Header mode, layout settings and host plumbing for one reader window.
#[derive(Debug)]
pub struct HeaderOverlay<S, R> {
    store: S,
    scheduler: R,
    mode: ModeState,
    config: LayoutConfig,
    geometry: ScreenGeometry,
}

impl<S, R> HeaderOverlay<S, R>
where
    S: SettingsStore,
    R: RepaintScheduler,
{
    /// Restore state from `store`. `geometry` is fixed for the overlay's
    /// lifetime; `host_footer_font_size` seeds the default font size.
    pub fn new(
        store: S,
        scheduler: R,
        geometry: ScreenGeometry,
        host_footer_font_size: Option<u32>,
    ) -> Self {
        let mode = ModeState::load(&store);
        let config = LayoutConfig::load(&store, host_footer_font_size);
        log::debug!(
            "header overlay {}x{} starting in {:?}",
            geometry.width,
            geometry.height,
            mode.mode()
        );
        Self {
            store,
            scheduler,
            mode,
            config,
            geometry,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn geometry(&self) -> ScreenGeometry {
        self.geometry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scheduler(&self) -> &R {
        &self.scheduler
    }

    /// Consume the overlay, handing back the settings store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Register advance/retreat with the host dispatch table.
    pub fn register_actions<A>(&self, registry: &mut A)
    where
        A: ActionRegistry + ?Sized,
    {
        for action in HeaderAction::ALL {
            registry.register_action(action.spec());
        }
    }

    /// Run a registered action.
    pub fn handle_action(&mut self, action: HeaderAction) -> Mode {
        let mode = match action {
            HeaderAction::Advance => self.mode.next(&mut self.store),
            HeaderAction::Retreat => self.mode.previous(&mut self.store),
        };
        self.scheduler.schedule_repaint();
        mode
    }

    /// Jump to the mode with persisted index `index` (1..=6).
    pub fn select_mode(&mut self, index: i64) -> Result<Mode, HeaderError> {
        let mode = self.mode.select(index, &mut self.store)?;
        self.scheduler.schedule_repaint();
        Ok(mode)
    }

    /// Apply a command produced by the header menu.
    pub fn apply(&mut self, command: MenuCommand) -> Result<Mode, HeaderError> {
        let mode = command.apply(&mut self.mode, &mut self.config, &mut self.store)?;
        self.scheduler.schedule_repaint();
        Ok(mode)
    }

    pub fn text_style(&self) -> HeaderTextStyle {
        HeaderTextStyle::from_config(&self.config)
    }

    /// Fitted region text for `frame`, or `None` when nothing is drawn.
    pub fn compose<M>(&self, frame: &PageFrame<'_>, measurer: &M) -> Option<HeaderContent>
    where
        M: TextMeasurer + ?Sized,
    {
        if !frame.kind.is_reflowable() {
            log::trace!("fixed-layout page {}: header skipped", frame.page_number);
            return None;
        }
        if self.mode.mode() == Mode::Clean {
            return None;
        }
        let book = frame.book();
        let pagination = frame.pagination();
        let twelve_hour = self.store.read_bool(keys::TWELVE_HOUR_CLOCK).unwrap_or(false);
        let clock_text = frame.clock.formatted_time(twelve_hour);
        let inputs = HeaderInputs {
            book: &book,
            pagination: &pagination,
            clock_text: &clock_text,
            page_margins: frame.page_margins,
        };
        HeaderComposer::new(measurer, self.geometry.width).compute(
            self.mode.mode(),
            &inputs,
            &self.config,
        )
    }

    /// Boxes to draw over `frame`. Empty for Clean and fixed-layout pages.
    pub fn paint_frame<M>(&self, frame: &PageFrame<'_>, measurer: &M) -> HeaderPaint
    where
        M: TextMeasurer + ?Sized,
    {
        match self.compose(frame, measurer) {
            Some(content) => HeaderRenderer::new(self.geometry).paint(
                &content,
                &self.config,
                frame.page_margins,
                measurer,
            ),
            None => HeaderPaint {
                style: self.text_style(),
                ..HeaderPaint::default()
            },
        }
    }

    pub fn build_menu(&self, font_faces: &[&str]) -> MenuItem {
        running_head::build_menu(self.mode.mode(), &self.config, font_faces)
    }
}

impl<S, R, M> RepaintHook<M> for HeaderOverlay<S, R>
where
    S: SettingsStore,
    R: RepaintScheduler,
    M: TextMeasurer + ?Sized,
{
    fn paint_frame(&self, frame: &PageFrame<'_>, measurer: &M) -> HeaderPaint {
        HeaderOverlay::paint_frame(self, frame, measurer)
    }
}

impl<S, R> MenuBuildHook for HeaderOverlay<S, R>
where
    S: SettingsStore,
    R: RepaintScheduler,
{
    fn build_menu(&self, font_faces: &[&str]) -> MenuItem {
        HeaderOverlay::build_menu(self, font_faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::FixedAdvanceMeasurer;
    use crate::paint::BoxRegion;
    use running_head::{ActionSpec, DocumentProps, MemorySettingsStore, SeparatorGlyph};
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingScheduler {
        requests: Cell<usize>,
    }

    impl RepaintScheduler for CountingScheduler {
        fn schedule_repaint(&self) {
            self.requests.set(self.requests.get() + 1);
        }
    }

    #[derive(Default)]
    struct RegistrySpy {
        specs: Vec<ActionSpec>,
    }

    impl ActionRegistry for RegistrySpy {
        fn register_action(&mut self, spec: ActionSpec) {
            self.specs.push(spec);
        }
    }

    struct Book;

    impl MetadataProvider for Book {
        fn document_props(&self) -> Option<DocumentProps> {
            Some(DocumentProps {
                display_title: "Dune".into(),
                authors: "Frank Herbert".into(),
            })
        }
    }

    struct Toc;

    impl TocProvider for Toc {
        fn title_for_page(&self, _page: u32) -> Option<String> {
            Some("Arrakis".into())
        }

        fn chapter_pages_done_for_page(&self, page: u32) -> Option<u32> {
            Some(page.saturating_sub(40))
        }
    }

    struct FixedClock;

    impl ClockProvider for FixedClock {
        fn formatted_time(&self, twelve_hour: bool) -> String {
            let text = if twelve_hour { "2:05 PM" } else { "14:05" };
            text.into()
        }
    }

    type TestOverlay = HeaderOverlay<MemorySettingsStore, CountingScheduler>;

    fn overlay(store: MemorySettingsStore) -> TestOverlay {
        HeaderOverlay::new(
            store,
            CountingScheduler::default(),
            ScreenGeometry::new(600, 800),
            None,
        )
    }

    fn frame(kind: DocumentKind, page_number: u32) -> PageFrame<'static> {
        PageFrame {
            kind,
            page_number,
            metadata: Some(&Book),
            toc: Some(&Toc),
            clock: &FixedClock,
            page_margins: PageMargins::uniform(20),
        }
    }

    #[test]
    fn new_restores_persisted_state() {
        let store = MemorySettingsStore::new()
            .with_value(keys::MODE, 3i64)
            .with_value(keys::SEPARATOR, "bar");
        let overlay = overlay(store);
        assert_eq!(overlay.mode(), Mode::TitleTime);
        assert_eq!(overlay.config().separator(), SeparatorGlyph::Bar);
        assert_eq!(overlay.store().write_count(), 0);
    }

    #[test]
    fn actions_register_under_stable_ids() {
        let overlay = overlay(MemorySettingsStore::new());
        let mut registry = RegistrySpy::default();
        overlay.register_actions(&mut registry);
        let ids: Vec<_> = registry.specs.iter().map(|spec| spec.id).collect();
        assert_eq!(ids, ["header_mode_next", "header_mode_previous"]);
    }

    #[test]
    fn actions_persist_and_schedule_repaint() {
        let mut overlay = overlay(MemorySettingsStore::new());
        assert_eq!(overlay.handle_action(HeaderAction::Retreat), Mode::FullInfo);
        assert_eq!(overlay.handle_action(HeaderAction::Advance), Mode::Clean);
        assert_eq!(overlay.scheduler().requests.get(), 2);
        assert_eq!(overlay.store().read_int(keys::MODE), Some(1));
    }

    #[test]
    fn invalid_selection_neither_persists_nor_repaints() {
        let mut overlay = overlay(MemorySettingsStore::new());
        assert_eq!(overlay.select_mode(9), Err(HeaderError::InvalidMode(9)));
        assert_eq!(overlay.mode(), Mode::Clean);
        assert_eq!(overlay.scheduler().requests.get(), 0);
        assert_eq!(overlay.store().write_count(), 0);
    }

    #[test]
    fn rejected_menu_command_does_not_repaint() {
        let mut overlay = overlay(MemorySettingsStore::new());
        assert!(overlay.apply(MenuCommand::SetMargin(500)).is_err());
        assert_eq!(overlay.scheduler().requests.get(), 0);

        overlay.apply(MenuCommand::SetMargin(50)).unwrap();
        assert_eq!(overlay.config().margin(), 50);
        assert_eq!(overlay.scheduler().requests.get(), 1);
    }

    #[test]
    fn clean_mode_paints_nothing() {
        let overlay = overlay(MemorySettingsStore::new());
        let m = FixedAdvanceMeasurer::new(10, 20);
        let paint = overlay.paint_frame(&frame(DocumentKind::Reflowable, 42), &m);
        assert!(paint.is_empty());
        assert_eq!(m.acquired_faces(), 0);
    }

    #[test]
    fn fixed_layout_paints_nothing() {
        let mut overlay = overlay(MemorySettingsStore::new());
        overlay.select_mode(6).unwrap();
        let m = FixedAdvanceMeasurer::new(10, 20);
        let paint = overlay.paint_frame(&frame(DocumentKind::FixedLayout, 42), &m);
        assert!(paint.is_empty());
        assert_eq!(m.acquired_faces(), 0);
    }

    #[test]
    fn twelve_hour_flag_comes_from_store() {
        let store = MemorySettingsStore::new()
            .with_value(keys::MODE, 5i64)
            .with_value(keys::TWELVE_HOUR_CLOCK, true);
        let overlay = overlay(store);
        let m = FixedAdvanceMeasurer::new(10, 20);
        let paint = overlay.paint_frame(&frame(DocumentKind::Reflowable, 42), &m);
        assert_eq!(paint.region(BoxRegion::Center).unwrap().text, "2:05 PM");
    }

    #[test]
    fn print_edition_even_page_paints_corner_and_center() {
        let mut overlay = overlay(MemorySettingsStore::new());
        overlay.select_mode(2).unwrap();
        let m = FixedAdvanceMeasurer::new(10, 20);
        let paint = RepaintHook::paint_frame(&overlay, &frame(DocumentKind::Reflowable, 44), &m);
        assert_eq!(paint.region(BoxRegion::Left).unwrap().text, "44");
        assert_eq!(
            paint.region(BoxRegion::Center).unwrap().text,
            "Frank Herbert \u{2013} Dune"
        );
        assert_eq!(m.live_faces(), 0);
    }

    #[test]
    fn menu_hook_reflects_current_mode() {
        let mut overlay = overlay(MemorySettingsStore::new());
        overlay.select_mode(4).unwrap();
        let menu = MenuBuildHook::build_menu(&overlay, &["serif"]);
        let chapter = menu.find(Mode::ChapterTime.label()).unwrap();
        assert!(matches!(
            chapter.kind,
            running_head::MenuKind::Radio { checked: true, .. }
        ));
    }
}

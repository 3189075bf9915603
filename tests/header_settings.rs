use std::cell::Cell;
use std::path::PathBuf;

use running_head::{
    keys, HeaderAction, HeaderError, JsonFileSettingsStore, LayoutConfig, MenuCommand, Mode,
    RepaintScheduler, SeparatorGlyph, SettingsStore, TopPadding,
};
use running_head_render::{HeaderOverlay, ScreenGeometry};

#[derive(Default)]
struct Repaints(Cell<usize>);

impl RepaintScheduler for Repaints {
    fn schedule_repaint(&self) {
        self.0.set(self.0.get() + 1);
    }
}

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "running-head-{}-{}",
        tag,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn open_overlay(path: &PathBuf) -> HeaderOverlay<JsonFileSettingsStore, Repaints> {
    HeaderOverlay::new(
        JsonFileSettingsStore::open(path),
        Repaints::default(),
        ScreenGeometry::new(600, 800),
        Some(18),
    )
}

#[test]
fn mode_and_layout_survive_restart() {
    let dir = scratch_dir("restart");
    let path = dir.join("settings.json");

    {
        let mut overlay = open_overlay(&path);
        assert_eq!(overlay.mode(), Mode::Clean);
        assert_eq!(overlay.config().font_size(), 18);

        overlay.handle_action(HeaderAction::Retreat);
        overlay
            .apply(MenuCommand::SetSeparator(SeparatorGlyph::Bullet))
            .expect("separator");
        overlay
            .apply(MenuCommand::SetTopPadding(TopPadding::Large))
            .expect("padding");
        overlay
            .apply(MenuCommand::SetCenterMaxWidthPct(60))
            .expect("center pct");
        assert_eq!(overlay.scheduler().0.get(), 4);
    }

    let overlay = open_overlay(&path);
    assert_eq!(overlay.mode(), Mode::FullInfo);
    assert_eq!(overlay.config().separator(), SeparatorGlyph::Bullet);
    assert_eq!(overlay.config().top_padding(), TopPadding::Large);
    assert_eq!(overlay.config().center_max_width_pct(), 60);
    assert_eq!(overlay.scheduler().0.get(), 0);

    let raw = std::fs::read_to_string(&path).expect("settings file");
    assert!(raw.contains("\"header_separator\": \"bullet\""), "{}", raw);
    assert!(raw.contains("\"header_mode\": 6"), "{}", raw);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn rejected_values_are_not_written() {
    let dir = scratch_dir("rejected");
    let path = dir.join("settings.json");

    let mut overlay = open_overlay(&path);
    assert_eq!(
        overlay.apply(MenuCommand::SetFontSize(64)),
        Err(HeaderError::OutOfRange {
            field: "font_size",
            value: 64,
            min: 8,
            max: 36,
        })
    );
    assert_eq!(overlay.select_mode(0), Err(HeaderError::InvalidMode(0)));
    assert!(!path.exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn hand_edited_garbage_falls_back_to_defaults() {
    let dir = scratch_dir("garbage");
    std::fs::create_dir_all(&dir).expect("scratch dir");
    let path = dir.join("settings.json");
    std::fs::write(
        &path,
        br#"{"header_mode": 11, "header_separator": "tilde", "header_margin": 500, "header_font_bold": true}"#,
    )
    .expect("seed file");

    let store = JsonFileSettingsStore::open(&path);
    let config = LayoutConfig::load(&store, None);
    let defaults = LayoutConfig::default();
    assert!(config.bold());
    assert_eq!(config.separator(), defaults.separator());
    assert_eq!(config.margin(), defaults.margin());
    assert_eq!(store.read_int(keys::MODE), Some(11));

    let overlay = open_overlay(&path);
    assert_eq!(overlay.mode(), Mode::Clean);

    let _ = std::fs::remove_dir_all(&dir);
}

//! Menu model for the header settings.
//!
//! [`build_menu`] returns a plain tree the host turns into its own widgets.
//! Activating an entry yields a [`MenuCommand`]; the host hands it back and
//! [`MenuCommand::apply`] performs the state change and persistence.

extern crate alloc;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::config::{
    LayoutConfig, SeparatorGlyph, SettingRange, TopPadding, BOTTOM_PADDING_RANGE,
    CENTER_WIDTH_PCT_RANGE, CORNER_WIDTH_PCT_RANGE, FONT_SIZE_RANGE, MARGIN_RANGE,
};
use crate::error::HeaderError;
use crate::host::HeaderAction;
use crate::mode::{Mode, ModeState};
use crate::settings::SettingsStore;

/// Numeric setting edited through a spinner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpinField {
    FontSize,
    BottomPadding,
    Margin,
    LeftMaxWidthPct,
    RightMaxWidthPct,
    CenterMaxWidthPct,
}

impl SpinField {
    pub const fn range(self) -> SettingRange {
        match self {
            Self::FontSize => FONT_SIZE_RANGE,
            Self::BottomPadding => BOTTOM_PADDING_RANGE,
            Self::Margin => MARGIN_RANGE,
            Self::LeftMaxWidthPct | Self::RightMaxWidthPct => CORNER_WIDTH_PCT_RANGE,
            Self::CenterMaxWidthPct => CENTER_WIDTH_PCT_RANGE,
        }
    }

    pub const fn step(self) -> u32 {
        match self {
            Self::FontSize | Self::BottomPadding | Self::Margin => 1,
            _ => 2,
        }
    }

    pub fn current(self, config: &LayoutConfig) -> u32 {
        match self {
            Self::FontSize => config.font_size(),
            Self::BottomPadding => config.bottom_padding(),
            Self::Margin => config.margin(),
            Self::LeftMaxWidthPct => config.left_max_width_pct(),
            Self::RightMaxWidthPct => config.right_max_width_pct(),
            Self::CenterMaxWidthPct => config.center_max_width_pct(),
        }
    }

    /// Command that sets this field to `value`.
    pub const fn command(self, value: u32) -> MenuCommand {
        match self {
            Self::FontSize => MenuCommand::SetFontSize(value),
            Self::BottomPadding => MenuCommand::SetBottomPadding(value),
            Self::Margin => MenuCommand::SetMargin(value),
            Self::LeftMaxWidthPct => MenuCommand::SetLeftMaxWidthPct(value),
            Self::RightMaxWidthPct => MenuCommand::SetRightMaxWidthPct(value),
            Self::CenterMaxWidthPct => MenuCommand::SetCenterMaxWidthPct(value),
        }
    }
}

/// State change requested through the menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuCommand {
    SelectMode(Mode),
    Action(HeaderAction),
    SetFontFace(String),
    SetFontSize(u32),
    SetBold(bool),
    SetTopPadding(TopPadding),
    SetBottomPadding(u32),
    SetUseBookMargins(bool),
    SetMargin(u32),
    SetLeftMaxWidthPct(u32),
    SetRightMaxWidthPct(u32),
    SetCenterMaxWidthPct(u32),
    SetSeparator(SeparatorGlyph),
}

impl MenuCommand {
    /// Apply the command, persisting through `store`.
    ///
    /// Returns the mode after the command so callers can tell whether the
    /// header became visible or hidden.
    pub fn apply<S>(
        self,
        mode: &mut ModeState,
        config: &mut LayoutConfig,
        store: &mut S,
    ) -> Result<Mode, HeaderError>
    where
        S: SettingsStore + ?Sized,
    {
        match self {
            Self::SelectMode(target) => {
                mode.select(i64::from(target.persisted()), store)?;
            }
            Self::Action(HeaderAction::Advance) => {
                mode.next(store);
            }
            Self::Action(HeaderAction::Retreat) => {
                mode.previous(store);
            }
            Self::SetFontFace(face) => config.set_font_face(&face, store)?,
            Self::SetFontSize(size) => config.set_font_size(size, store)?,
            Self::SetBold(bold) => config.set_bold(bold, store),
            Self::SetTopPadding(padding) => config.set_top_padding(padding, store),
            Self::SetBottomPadding(px) => config.set_bottom_padding(px, store)?,
            Self::SetUseBookMargins(enabled) => config.set_use_book_margins(enabled, store),
            Self::SetMargin(px) => config.set_margin(px, store)?,
            Self::SetLeftMaxWidthPct(pct) => config.set_left_max_width_pct(pct, store)?,
            Self::SetRightMaxWidthPct(pct) => config.set_right_max_width_pct(pct, store)?,
            Self::SetCenterMaxWidthPct(pct) => config.set_center_max_width_pct(pct, store)?,
            Self::SetSeparator(separator) => config.set_separator(separator, store),
        }
        Ok(mode.mode())
    }
}

/// How an entry behaves when activated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuKind {
    /// Plain action.
    Action(MenuCommand),
    /// One of a group; `checked` marks the active choice.
    Radio { checked: bool, command: MenuCommand },
    /// On/off switch; `command` sets the opposite of `checked`.
    Toggle { checked: bool, command: MenuCommand },
    /// Numeric spinner; the host builds the command with
    /// [`SpinField::command`] once the user confirms a value.
    Spin {
        field: SpinField,
        value: u32,
        min: u32,
        max: u32,
        step: u32,
    },
    Submenu(Vec<MenuItem>),
}

/// One menu entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuItem {
    pub text: String,
    pub kind: MenuKind,
}

impl MenuItem {
    fn new(text: impl Into<String>, kind: MenuKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    fn radio(text: impl Into<String>, checked: bool, command: MenuCommand) -> Self {
        Self::new(text, MenuKind::Radio { checked, command })
    }

    fn spin(text: &str, field: SpinField, config: &LayoutConfig) -> Self {
        let range = field.range();
        Self::new(
            text,
            MenuKind::Spin {
                field,
                value: field.current(config),
                min: range.min,
                max: range.max,
                step: field.step(),
            },
        )
    }

    pub fn children(&self) -> &[MenuItem] {
        match &self.kind {
            MenuKind::Submenu(children) => children,
            _ => &[],
        }
    }

    /// Depth-first search by entry text.
    pub fn find(&self, text: &str) -> Option<&MenuItem> {
        if self.text == text {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(text))
    }

    /// Command carried by an activatable entry.
    pub fn command(&self) -> Option<&MenuCommand> {
        match &self.kind {
            MenuKind::Action(command)
            | MenuKind::Radio { command, .. }
            | MenuKind::Toggle { command, .. } => Some(command),
            MenuKind::Spin { .. } | MenuKind::Submenu(_) => None,
        }
    }
}

/// Build the header menu for the current state.
///
/// `font_faces` lists the faces the host can render; the configured face is
/// always offered even when missing from the list.
pub fn build_menu(mode: Mode, config: &LayoutConfig, font_faces: &[&str]) -> MenuItem {
    let mut modes: Vec<MenuItem> = Mode::ALL
        .iter()
        .map(|&entry| {
            MenuItem::radio(entry.label(), entry == mode, MenuCommand::SelectMode(entry))
        })
        .collect();
    for action in HeaderAction::ALL {
        let spec = action.spec();
        modes.push(MenuItem::new(spec.title, MenuKind::Action(MenuCommand::Action(action))));
    }

    let mut faces: Vec<MenuItem> = font_faces
        .iter()
        .map(|&face| {
            MenuItem::radio(
                face,
                face == config.font_face(),
                MenuCommand::SetFontFace(face.into()),
            )
        })
        .collect();
    if !font_faces.contains(&config.font_face()) {
        faces.insert(
            0,
            MenuItem::radio(
                config.font_face(),
                true,
                MenuCommand::SetFontFace(config.font_face().into()),
            ),
        );
    }

    let top_padding = TopPadding::ALL
        .iter()
        .map(|&padding| {
            MenuItem::radio(
                padding.label(),
                padding == config.top_padding(),
                MenuCommand::SetTopPadding(padding),
            )
        })
        .collect();

    let separators = SeparatorGlyph::ALL
        .iter()
        .map(|&glyph| {
            let mut text = String::from(glyph.label());
            text.push_str(" (");
            text.push_str(glyph.glyph());
            text.push(')');
            MenuItem::radio(text, glyph == config.separator(), MenuCommand::SetSeparator(glyph))
        })
        .collect();

    let settings = vec![
        MenuItem::new("Font face", MenuKind::Submenu(faces)),
        MenuItem::spin("Font size", SpinField::FontSize, config),
        MenuItem::new(
            "Bold",
            MenuKind::Toggle {
                checked: config.bold(),
                command: MenuCommand::SetBold(!config.bold()),
            },
        ),
        MenuItem::new("Top padding", MenuKind::Submenu(top_padding)),
        MenuItem::spin("Bottom padding", SpinField::BottomPadding, config),
        MenuItem::new(
            "Use book margins",
            MenuKind::Toggle {
                checked: config.use_book_margins(),
                command: MenuCommand::SetUseBookMargins(!config.use_book_margins()),
            },
        ),
        MenuItem::spin("Margin", SpinField::Margin, config),
        MenuItem::spin("Left max width (%)", SpinField::LeftMaxWidthPct, config),
        MenuItem::spin("Right max width (%)", SpinField::RightMaxWidthPct, config),
        MenuItem::spin("Center max width (%)", SpinField::CenterMaxWidthPct, config),
        MenuItem::new("Separator", MenuKind::Submenu(separators)),
    ];
    modes.push(MenuItem::new("Settings", MenuKind::Submenu(settings)));

    MenuItem::new("Header", MenuKind::Submenu(modes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{keys, MemorySettingsStore};

    fn radio_checked(item: &MenuItem) -> bool {
        matches!(item.kind, MenuKind::Radio { checked: true, .. })
    }

    #[test]
    fn menu_lists_six_modes_advance_retreat_and_settings() {
        let menu = build_menu(Mode::ChapterTime, &LayoutConfig::default(), &["serif"]);
        let entries = menu.children();
        assert_eq!(entries.len(), 9);
        for (entry, mode) in entries.iter().zip(Mode::ALL) {
            assert_eq!(entry.text, mode.label());
            assert_eq!(radio_checked(entry), mode == Mode::ChapterTime);
        }
        assert_eq!(
            entries[6].command(),
            Some(&MenuCommand::Action(HeaderAction::Advance))
        );
        assert_eq!(
            entries[7].command(),
            Some(&MenuCommand::Action(HeaderAction::Retreat))
        );
        assert_eq!(entries[8].text, "Settings");
    }

    #[test]
    fn settings_submenu_covers_every_layout_field() {
        let menu = build_menu(Mode::Clean, &LayoutConfig::default(), &["serif"]);
        for label in [
            "Font face",
            "Font size",
            "Bold",
            "Top padding",
            "Bottom padding",
            "Use book margins",
            "Margin",
            "Left max width (%)",
            "Right max width (%)",
            "Center max width (%)",
            "Separator",
        ] {
            assert!(menu.find(label).is_some(), "missing menu entry {}", label);
        }
    }

    #[test]
    fn configured_face_is_offered_even_when_host_lacks_it() {
        let menu = build_menu(Mode::Clean, &LayoutConfig::default(), &["serif", "mono"]);
        let faces = menu.find("Font face").unwrap().children();
        assert_eq!(faces.len(), 3);
        assert_eq!(faces[0].text, "sans-serif");
        assert!(radio_checked(&faces[0]));
    }

    #[test]
    fn spin_entries_carry_current_value_and_bounds() {
        let menu = build_menu(Mode::Clean, &LayoutConfig::default(), &[]);
        let center = menu.find("Center max width (%)").unwrap();
        assert_eq!(
            center.kind,
            MenuKind::Spin {
                field: SpinField::CenterMaxWidthPct,
                value: 84,
                min: 10,
                max: 100,
                step: 2,
            }
        );
    }

    #[test]
    fn applying_commands_mutates_and_persists() {
        let mut store = MemorySettingsStore::new();
        let mut mode = ModeState::default();
        let mut config = LayoutConfig::default();

        let after = MenuCommand::SelectMode(Mode::FullInfo)
            .apply(&mut mode, &mut config, &mut store)
            .unwrap();
        assert_eq!(after, Mode::FullInfo);

        MenuCommand::Action(HeaderAction::Advance)
            .apply(&mut mode, &mut config, &mut store)
            .unwrap();
        assert_eq!(mode.mode(), Mode::Clean);

        SpinField::LeftMaxWidthPct
            .command(30)
            .apply(&mut mode, &mut config, &mut store)
            .unwrap();
        assert_eq!(config.left_max_width_pct(), 30);
        assert_eq!(store.read_int(keys::LEFT_MAX_WIDTH_PCT), Some(30));

        let err = MenuCommand::SetFontSize(99).apply(&mut mode, &mut config, &mut store);
        assert!(err.is_err());
        assert_eq!(config.font_size(), 14);
    }

    #[test]
    fn toggles_flip_current_value() {
        let mut config = LayoutConfig::default();
        let mut store = MemorySettingsStore::new();
        config.set_bold(true, &mut store);
        let menu = build_menu(Mode::Clean, &config, &[]);
        assert_eq!(
            menu.find("Bold").unwrap().command(),
            Some(&MenuCommand::SetBold(false))
        );
    }
}

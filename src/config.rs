//! Header layout configuration.
//!
//! [`LayoutConfig`] fields are private; every mutation goes through a
//! validating setter that writes the new value to the settings store before
//! returning. A rejected value leaves both the config and the store as they
//! were.

extern crate alloc;

use alloc::string::String;
use core::fmt;
use core::str::FromStr;

use crate::error::HeaderError;
use crate::settings::{keys, SettingValue, SettingsStore};

/// Vertical gap between the top edge and the header row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TopPadding {
    #[default]
    Small,
    Default,
    Large,
}

impl TopPadding {
    pub const ALL: [TopPadding; 3] = [TopPadding::Small, TopPadding::Default, TopPadding::Large];

    pub const fn px(self) -> u32 {
        match self {
            Self::Small => 2,
            Self::Default => 5,
            Self::Large => 10,
        }
    }

    /// Persisted key.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Default => "default",
            Self::Large => "large",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Default => "Default",
            Self::Large => "Large",
        }
    }
}

impl FromStr for TopPadding {
    type Err = HeaderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|padding| padding.key() == value)
            .ok_or_else(|| HeaderError::UnknownOption {
                field: "top_padding",
                value: value.into(),
            })
    }
}

/// Glyph placed between joined header segments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SeparatorGlyph {
    Bar,
    Bullet,
    Dot,
    EmDash,
    #[default]
    EnDash,
}

impl SeparatorGlyph {
    pub const ALL: [SeparatorGlyph; 5] = [
        SeparatorGlyph::Bar,
        SeparatorGlyph::Bullet,
        SeparatorGlyph::Dot,
        SeparatorGlyph::EmDash,
        SeparatorGlyph::EnDash,
    ];

    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Bar => "|",
            Self::Bullet => "\u{2022}",
            Self::Dot => "\u{00B7}",
            Self::EmDash => "\u{2014}",
            Self::EnDash => "\u{2013}",
        }
    }

    /// Glyph with one space on each side, as used between segments.
    pub fn padded(self) -> String {
        let mut out = String::with_capacity(self.glyph().len() + 2);
        out.push(' ');
        out.push_str(self.glyph());
        out.push(' ');
        out
    }

    /// Persisted key.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Bullet => "bullet",
            Self::Dot => "dot",
            Self::EmDash => "em_dash",
            Self::EnDash => "en_dash",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bar => "Vertical bar",
            Self::Bullet => "Bullet",
            Self::Dot => "Middle dot",
            Self::EmDash => "Em dash",
            Self::EnDash => "En dash",
        }
    }
}

impl FromStr for SeparatorGlyph {
    type Err = HeaderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|glyph| glyph.key() == value)
            .ok_or_else(|| HeaderError::UnknownOption {
                field: "separator",
                value: value.into(),
            })
    }
}

impl fmt::Display for SeparatorGlyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// Inclusive bounds for a numeric setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettingRange {
    pub min: u32,
    pub max: u32,
}

impl SettingRange {
    const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub const fn contains(self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    fn check(self, field: &'static str, value: u32) -> Result<u32, HeaderError> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(HeaderError::OutOfRange {
                field,
                value: i64::from(value),
                min: i64::from(self.min),
                max: i64::from(self.max),
            })
        }
    }
}

pub const FONT_SIZE_RANGE: SettingRange = SettingRange::new(8, 36);
pub const CORNER_WIDTH_PCT_RANGE: SettingRange = SettingRange::new(10, 90);
pub const CENTER_WIDTH_PCT_RANGE: SettingRange = SettingRange::new(10, 100);
pub const BOTTOM_PADDING_RANGE: SettingRange = SettingRange::new(0, 100);
pub const MARGIN_RANGE: SettingRange = SettingRange::new(0, 200);

const DEFAULT_FONT_FACE: &str = "sans-serif";
const DEFAULT_FONT_SIZE: u32 = 14;
const DEFAULT_BOTTOM_PADDING: u32 = 5;
const DEFAULT_MARGIN: u32 = 10;
const DEFAULT_CORNER_WIDTH_PCT: u32 = 48;
const DEFAULT_CENTER_WIDTH_PCT: u32 = 84;

/// All tunable header layout parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutConfig {
    font_face: String,
    font_size: u32,
    bold: bool,
    top_padding: TopPadding,
    bottom_padding: u32,
    use_book_margins: bool,
    margin: u32,
    left_max_width_pct: u32,
    right_max_width_pct: u32,
    center_max_width_pct: u32,
    separator: SeparatorGlyph,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::with_host_font_size(None)
    }
}

impl LayoutConfig {
    /// Defaults, taking the font size from the host footer when it has one.
    ///
    /// Host sizes outside the accepted range are clamped into it.
    pub fn with_host_font_size(host_footer_font_size: Option<u32>) -> Self {
        let font_size = host_footer_font_size
            .map(|size| size.clamp(FONT_SIZE_RANGE.min, FONT_SIZE_RANGE.max))
            .unwrap_or(DEFAULT_FONT_SIZE);
        Self {
            font_face: DEFAULT_FONT_FACE.into(),
            font_size,
            bold: false,
            top_padding: TopPadding::default(),
            bottom_padding: DEFAULT_BOTTOM_PADDING,
            use_book_margins: true,
            margin: DEFAULT_MARGIN,
            left_max_width_pct: DEFAULT_CORNER_WIDTH_PCT,
            right_max_width_pct: DEFAULT_CORNER_WIDTH_PCT,
            center_max_width_pct: DEFAULT_CENTER_WIDTH_PCT,
            separator: SeparatorGlyph::default(),
        }
    }

    /// Restore persisted values over the defaults.
    ///
    /// Missing keys keep their default; persisted values of the wrong type
    /// or out of range are logged and ignored.
    pub fn load<S>(store: &S, host_footer_font_size: Option<u32>) -> Self
    where
        S: SettingsStore + ?Sized,
    {
        let mut cfg = Self::with_host_font_size(host_footer_font_size);

        if let Some(face) = read_or_warn(store, keys::FONT_FACE, |value| {
            value
                .as_text()
                .filter(|face| !face.trim().is_empty())
                .map(String::from)
        }) {
            cfg.font_face = face;
        }
        if let Some(size) = read_ranged(store, keys::FONT_SIZE, FONT_SIZE_RANGE) {
            cfg.font_size = size;
        }
        if let Some(bold) = read_or_warn(store, keys::FONT_BOLD, SettingValue::as_bool) {
            cfg.bold = bold;
        }
        if let Some(padding) = read_or_warn(store, keys::TOP_PADDING, |value| {
            value.as_text().and_then(|key| key.parse().ok())
        }) {
            cfg.top_padding = padding;
        }
        if let Some(padding) = read_ranged(store, keys::BOTTOM_PADDING, BOTTOM_PADDING_RANGE) {
            cfg.bottom_padding = padding;
        }
        if let Some(enabled) = read_or_warn(store, keys::USE_BOOK_MARGINS, SettingValue::as_bool) {
            cfg.use_book_margins = enabled;
        }
        if let Some(margin) = read_ranged(store, keys::MARGIN, MARGIN_RANGE) {
            cfg.margin = margin;
        }
        if let Some(pct) = read_ranged(store, keys::LEFT_MAX_WIDTH_PCT, CORNER_WIDTH_PCT_RANGE) {
            cfg.left_max_width_pct = pct;
        }
        if let Some(pct) = read_ranged(store, keys::RIGHT_MAX_WIDTH_PCT, CORNER_WIDTH_PCT_RANGE) {
            cfg.right_max_width_pct = pct;
        }
        if let Some(pct) = read_ranged(store, keys::CENTER_MAX_WIDTH_PCT, CENTER_WIDTH_PCT_RANGE) {
            cfg.center_max_width_pct = pct;
        }
        if let Some(separator) = read_or_warn(store, keys::SEPARATOR, |value| {
            value.as_text().and_then(|key| key.parse().ok())
        }) {
            cfg.separator = separator;
        }
        cfg
    }

    pub fn font_face(&self) -> &str {
        &self.font_face
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    pub fn bold(&self) -> bool {
        self.bold
    }

    pub fn top_padding(&self) -> TopPadding {
        self.top_padding
    }

    pub fn bottom_padding(&self) -> u32 {
        self.bottom_padding
    }

    pub fn use_book_margins(&self) -> bool {
        self.use_book_margins
    }

    /// Fixed side margin used when book margins are off.
    pub fn margin(&self) -> u32 {
        self.margin
    }

    pub fn left_max_width_pct(&self) -> u32 {
        self.left_max_width_pct
    }

    pub fn right_max_width_pct(&self) -> u32 {
        self.right_max_width_pct
    }

    pub fn center_max_width_pct(&self) -> u32 {
        self.center_max_width_pct
    }

    pub fn separator(&self) -> SeparatorGlyph {
        self.separator
    }

    pub fn set_font_face<S>(&mut self, face: &str, store: &mut S) -> Result<(), HeaderError>
    where
        S: SettingsStore + ?Sized,
    {
        let face = face.trim();
        if face.is_empty() {
            return Err(HeaderError::UnknownOption {
                field: "font_face",
                value: face.into(),
            });
        }
        self.font_face = face.into();
        log::debug!("header font face -> {}", face);
        store.write(keys::FONT_FACE, SettingValue::from(face));
        Ok(())
    }

    pub fn set_font_size<S>(&mut self, size: u32, store: &mut S) -> Result<(), HeaderError>
    where
        S: SettingsStore + ?Sized,
    {
        self.font_size = FONT_SIZE_RANGE.check("font_size", size)?;
        persist_int(store, keys::FONT_SIZE, size);
        Ok(())
    }

    pub fn set_bold<S>(&mut self, bold: bool, store: &mut S)
    where
        S: SettingsStore + ?Sized,
    {
        self.bold = bold;
        log::debug!("{} -> {}", keys::FONT_BOLD, bold);
        store.write(keys::FONT_BOLD, SettingValue::Bool(bold));
    }

    pub fn set_top_padding<S>(&mut self, padding: TopPadding, store: &mut S)
    where
        S: SettingsStore + ?Sized,
    {
        self.top_padding = padding;
        log::debug!("{} -> {}", keys::TOP_PADDING, padding.key());
        store.write(keys::TOP_PADDING, SettingValue::from(padding.key()));
    }

    pub fn set_bottom_padding<S>(&mut self, px: u32, store: &mut S) -> Result<(), HeaderError>
    where
        S: SettingsStore + ?Sized,
    {
        self.bottom_padding = BOTTOM_PADDING_RANGE.check("bottom_padding", px)?;
        persist_int(store, keys::BOTTOM_PADDING, px);
        Ok(())
    }

    pub fn set_use_book_margins<S>(&mut self, enabled: bool, store: &mut S)
    where
        S: SettingsStore + ?Sized,
    {
        self.use_book_margins = enabled;
        log::debug!("{} -> {}", keys::USE_BOOK_MARGINS, enabled);
        store.write(keys::USE_BOOK_MARGINS, SettingValue::Bool(enabled));
    }

    pub fn set_margin<S>(&mut self, px: u32, store: &mut S) -> Result<(), HeaderError>
    where
        S: SettingsStore + ?Sized,
    {
        self.margin = MARGIN_RANGE.check("margin", px)?;
        persist_int(store, keys::MARGIN, px);
        Ok(())
    }

    pub fn set_left_max_width_pct<S>(
        &mut self,
        pct: u32,
        store: &mut S,
    ) -> Result<(), HeaderError>
    where
        S: SettingsStore + ?Sized,
    {
        self.left_max_width_pct = CORNER_WIDTH_PCT_RANGE.check("left_max_width_pct", pct)?;
        persist_int(store, keys::LEFT_MAX_WIDTH_PCT, pct);
        Ok(())
    }

    pub fn set_right_max_width_pct<S>(
        &mut self,
        pct: u32,
        store: &mut S,
    ) -> Result<(), HeaderError>
    where
        S: SettingsStore + ?Sized,
    {
        self.right_max_width_pct = CORNER_WIDTH_PCT_RANGE.check("right_max_width_pct", pct)?;
        persist_int(store, keys::RIGHT_MAX_WIDTH_PCT, pct);
        Ok(())
    }

    pub fn set_center_max_width_pct<S>(
        &mut self,
        pct: u32,
        store: &mut S,
    ) -> Result<(), HeaderError>
    where
        S: SettingsStore + ?Sized,
    {
        self.center_max_width_pct = CENTER_WIDTH_PCT_RANGE.check("center_max_width_pct", pct)?;
        persist_int(store, keys::CENTER_MAX_WIDTH_PCT, pct);
        Ok(())
    }

    pub fn set_separator<S>(&mut self, separator: SeparatorGlyph, store: &mut S)
    where
        S: SettingsStore + ?Sized,
    {
        self.separator = separator;
        log::debug!("{} -> {}", keys::SEPARATOR, separator.key());
        store.write(keys::SEPARATOR, SettingValue::from(separator.key()));
    }
}

fn persist_int<S>(store: &mut S, key: &str, value: u32)
where
    S: SettingsStore + ?Sized,
{
    log::debug!("{} -> {}", key, value);
    store.write(key, SettingValue::Int(i64::from(value)));
}

fn read_or_warn<S, T>(
    store: &S,
    key: &str,
    convert: impl Fn(&SettingValue) -> Option<T>,
) -> Option<T>
where
    S: SettingsStore + ?Sized,
{
    let value = store.read(key)?;
    let converted = convert(&value);
    if converted.is_none() {
        log::warn!("ignoring persisted {}: {:?}", key, value);
    }
    converted
}

fn read_ranged<S>(store: &S, key: &str, range: SettingRange) -> Option<u32>
where
    S: SettingsStore + ?Sized,
{
    read_or_warn(store, key, |value| {
        value
            .as_int()
            .and_then(|raw| u32::try_from(raw).ok())
            .filter(|raw| range.contains(*raw))
    })
}

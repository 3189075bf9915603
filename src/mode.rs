//! Header display modes and the cyclic mode state machine.

use core::fmt;

use crate::error::HeaderError;
use crate::settings::{keys, SettingValue, SettingsStore};

/// What the header shows.
///
/// Modes form a ring in declaration order; [`Mode::persisted`] is the
/// 1-based position in that ring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    /// Nothing is drawn.
    #[default]
    Clean,
    /// Book-like running heads: folio in the outer corner, author/title on
    /// even pages and chapter on odd pages, folio at the bottom on chapter
    /// openings.
    PrintEdition,
    /// Book title left, clock right.
    TitleTime,
    /// Chapter title left, clock right.
    ChapterTime,
    /// Clock centered.
    TimeCenter,
    /// Author, title and chapter centered on one line.
    FullInfo,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Clean,
        Mode::PrintEdition,
        Mode::TitleTime,
        Mode::ChapterTime,
        Mode::TimeCenter,
        Mode::FullInfo,
    ];

    pub const COUNT: u8 = 6;

    /// Persisted integer form, `1..=6`.
    pub const fn persisted(self) -> u8 {
        match self {
            Self::Clean => 1,
            Self::PrintEdition => 2,
            Self::TitleTime => 3,
            Self::ChapterTime => 4,
            Self::TimeCenter => 5,
            Self::FullInfo => 6,
        }
    }

    /// Parse the persisted integer form.
    pub fn from_persisted(value: i64) -> Result<Self, HeaderError> {
        match value {
            1 => Ok(Self::Clean),
            2 => Ok(Self::PrintEdition),
            3 => Ok(Self::TitleTime),
            4 => Ok(Self::ChapterTime),
            5 => Ok(Self::TimeCenter),
            6 => Ok(Self::FullInfo),
            other => Err(HeaderError::InvalidMode(other)),
        }
    }

    pub fn next(self) -> Self {
        let persisted = self.persisted() % Self::COUNT + 1;
        Self::ALL[(persisted - 1) as usize]
    }

    pub fn previous(self) -> Self {
        let persisted = if self.persisted() == 1 {
            Self::COUNT
        } else {
            self.persisted() - 1
        };
        Self::ALL[(persisted - 1) as usize]
    }

    /// Menu label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clean => "Clean",
            Self::PrintEdition => "Print edition",
            Self::TitleTime => "Title and time",
            Self::ChapterTime => "Chapter and time",
            Self::TimeCenter => "Time centered",
            Self::FullInfo => "Full info",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Current header mode plus its transitions.
///
/// Every transition writes the new mode to the store before returning.
/// Scheduling the repaint is left to the owner (see `HeaderOverlay` in
/// `running-head-render`), which knows the host scheduler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModeState {
    mode: Mode,
}

impl ModeState {
    pub const fn new(mode: Mode) -> Self {
        Self { mode }
    }

    /// Restore the persisted mode, falling back to [`Mode::default`] when
    /// the key is missing or holds a value outside `1..=6`.
    pub fn load<S>(store: &S) -> Self
    where
        S: SettingsStore + ?Sized,
    {
        let mode = match store.read(keys::MODE) {
            None => Mode::default(),
            Some(SettingValue::Int(raw)) => Mode::from_persisted(raw).unwrap_or_else(|err| {
                log::warn!("ignoring persisted {}: {}", keys::MODE, err);
                Mode::default()
            }),
            Some(other) => {
                log::warn!("ignoring persisted {}: {:?}", keys::MODE, other);
                Mode::default()
            }
        };
        Self { mode }
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Advance to the next mode, wrapping from the last to the first.
    pub fn next<S>(&mut self, store: &mut S) -> Mode
    where
        S: SettingsStore + ?Sized,
    {
        self.set(self.mode.next(), store)
    }

    /// Step back to the previous mode, wrapping from the first to the last.
    pub fn previous<S>(&mut self, store: &mut S) -> Mode
    where
        S: SettingsStore + ?Sized,
    {
        self.set(self.mode.previous(), store)
    }

    /// Jump to the mode with persisted index `index`.
    pub fn select<S>(&mut self, index: i64, store: &mut S) -> Result<Mode, HeaderError>
    where
        S: SettingsStore + ?Sized,
    {
        let mode = Mode::from_persisted(index)?;
        Ok(self.set(mode, store))
    }

    fn set<S>(&mut self, mode: Mode, store: &mut S) -> Mode
    where
        S: SettingsStore + ?Sized,
    {
        log::debug!("header mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        store.write(keys::MODE, SettingValue::Int(i64::from(mode.persisted())));
        mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettingsStore;

    #[test]
    fn next_six_times_is_identity_for_every_mode() {
        for start in Mode::ALL {
            let mut store = MemorySettingsStore::new();
            let mut state = ModeState::new(start);
            for _ in 0..6 {
                state.next(&mut store);
            }
            assert_eq!(state.mode(), start);
            assert_eq!(store.write_count(), 6);
        }
    }

    #[test]
    fn previous_six_times_is_identity_for_every_mode() {
        for start in Mode::ALL {
            let mut store = MemorySettingsStore::new();
            let mut state = ModeState::new(start);
            for _ in 0..6 {
                state.previous(&mut store);
            }
            assert_eq!(state.mode(), start);
        }
    }

    #[test]
    fn ring_wraps_at_both_ends() {
        assert_eq!(Mode::FullInfo.next(), Mode::Clean);
        assert_eq!(Mode::Clean.previous(), Mode::FullInfo);
        assert_eq!(Mode::Clean.next(), Mode::PrintEdition);
        assert_eq!(Mode::TimeCenter.previous(), Mode::ChapterTime);
    }

    #[test]
    fn select_out_of_range_leaves_state_and_store_untouched() {
        let mut store = MemorySettingsStore::new();
        let mut state = ModeState::new(Mode::TitleTime);
        for bad in [0, 7, -1, 100] {
            assert_eq!(
                state.select(bad, &mut store),
                Err(HeaderError::InvalidMode(bad))
            );
        }
        assert_eq!(state.mode(), Mode::TitleTime);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn select_persists_the_new_mode() {
        let mut store = MemorySettingsStore::new();
        let mut state = ModeState::default();
        assert_eq!(state.select(6, &mut store), Ok(Mode::FullInfo));
        assert_eq!(store.read_int(keys::MODE), Some(6));
    }

    #[test]
    fn load_ignores_invalid_persisted_values() {
        let store = MemorySettingsStore::new().with_value(keys::MODE, 9i64);
        assert_eq!(ModeState::load(&store).mode(), Mode::Clean);

        let store = MemorySettingsStore::new().with_value(keys::MODE, "4");
        assert_eq!(ModeState::load(&store).mode(), Mode::Clean);

        let store = MemorySettingsStore::new().with_value(keys::MODE, 4i64);
        assert_eq!(ModeState::load(&store).mode(), Mode::ChapterTime);
    }
}

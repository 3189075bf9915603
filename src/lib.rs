//! Header mode state machine, layout settings and host model for e-reader
//! running heads.
//!
//! The crate owns the state that survives between paints: the active
//! [`Mode`], the [`LayoutConfig`] knobs, and the persistence glue that
//! writes both back to a host [`SettingsStore`] on every change. Text
//! fitting, composition and geometry live in `running-head-render`.
//!
//! ```rust
//! use running_head::{LayoutConfig, MemorySettingsStore, Mode, ModeState};
//!
//! let mut store = MemorySettingsStore::new();
//! let mut mode = ModeState::load(&store);
//! assert_eq!(mode.mode(), Mode::Clean);
//!
//! mode.next(&mut store);
//! assert_eq!(mode.mode(), Mode::PrintEdition);
//!
//! let config = LayoutConfig::load(&store, Some(16));
//! assert_eq!(config.font_size(), 16);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
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

extern crate alloc;

pub mod book;
pub mod config;
pub mod error;
pub mod host;
pub mod menu;
pub mod mode;
pub mod settings;

pub use book::{
    collapse_authors, BookMetadata, DocumentKind, DocumentProps, PageMargins, PaginationFact,
};
pub use config::{LayoutConfig, SeparatorGlyph, TopPadding};
pub use error::HeaderError;
#[cfg(feature = "std")]
pub use host::SystemClock;
pub use host::{
    ActionRegistry, ActionSpec, ClockProvider, HeaderAction, MetadataProvider, RepaintScheduler,
    TocProvider,
};
pub use menu::{build_menu, MenuCommand, MenuItem, MenuKind, SpinField};
pub use mode::{Mode, ModeState};
#[cfg(feature = "std")]
pub use settings::JsonFileSettingsStore;
pub use settings::{keys, MemorySettingsStore, SettingValue, SettingsStore};

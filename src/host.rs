//! Host collaborator seams.
//!
//! The host application implements the provider traits (metadata, TOC,
//! clock) and the extension points (action registry, repaint scheduler);
//! the header registers itself through them instead of patching host code.

extern crate alloc;

use alloc::string::String;

use crate::book::DocumentProps;

/// Source of document title/authors.
pub trait MetadataProvider {
    fn document_props(&self) -> Option<DocumentProps>;
}

/// Table-of-contents lookups for a page.
pub trait TocProvider {
    /// Title of the chapter containing `page`.
    fn title_for_page(&self, page: u32) -> Option<String>;

    /// Pages already read in the chapter containing `page`; `0` on the
    /// chapter's first page.
    fn chapter_pages_done_for_page(&self, page: u32) -> Option<u32>;
}

/// Formatted wall-clock time.
pub trait ClockProvider {
    fn formatted_time(&self, twelve_hour: bool) -> String;
}

/// Repaint request sink. Implementations schedule a redraw; they must not
/// paint synchronously.
pub trait RepaintScheduler {
    fn schedule_repaint(&self);
}

/// Discrete header actions exposed to gesture/command dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeaderAction {
    /// Switch to the next mode.
    Advance,
    /// Switch to the previous mode.
    Retreat,
}

impl HeaderAction {
    pub const ALL: [HeaderAction; 2] = [HeaderAction::Advance, HeaderAction::Retreat];

    pub const fn spec(self) -> ActionSpec {
        match self {
            Self::Advance => ActionSpec {
                id: "header_mode_next",
                title: "Next header mode",
                action: self,
            },
            Self::Retreat => ActionSpec {
                id: "header_mode_previous",
                title: "Previous header mode",
                action: self,
            },
        }
    }
}

/// Dispatch-table entry for a [`HeaderAction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionSpec {
    /// Stable identifier used by gesture bindings.
    pub id: &'static str,
    pub title: &'static str,
    pub action: HeaderAction,
}

/// Host command/gesture dispatch table.
pub trait ActionRegistry {
    fn register_action(&mut self, spec: ActionSpec);
}

/// Local wall clock backed by `chrono`.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl ClockProvider for SystemClock {
    fn formatted_time(&self, twelve_hour: bool) -> String {
        let now = chrono::Local::now();
        if twelve_hour {
            now.format("%-I:%M %p").to_string()
        } else {
            now.format("%H:%M").to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_ids_are_distinct() {
        let advance = HeaderAction::Advance.spec();
        let retreat = HeaderAction::Retreat.spec();
        assert_ne!(advance.id, retreat.id);
        assert_eq!(advance.action, HeaderAction::Advance);
        assert_eq!(retreat.action, HeaderAction::Retreat);
    }

    #[cfg(feature = "std")]
    #[test]
    fn system_clock_formats_both_styles() {
        let clock = SystemClock;
        let h24 = clock.formatted_time(false);
        assert_eq!(h24.len(), 5);
        assert_eq!(h24.as_bytes()[2], b':');

        let h12 = clock.formatted_time(true);
        assert!(h12.ends_with("AM") || h12.ends_with("PM"));
    }
}

//! Presentation Utilities
//!
//! Pure formatting helpers shared by the pages, plus the theme preference
//! service.

pub mod badge;
pub mod status;
pub mod theme;

pub use badge::{badge_class, badge_color, badge_label, BadgeColor};
pub use status::{status_counts, summarize, VisitStatus};
pub use theme::{
    FileStore, MemoryStore, PreferenceError, PreferenceStore, Theme, ThemeSettings,
    THEME_STORAGE_KEY,
};

//! UI layer for desktop GUI: app shell, board widgets and stage palette.

pub mod app;
pub mod theme;
pub mod widgets;

pub use app::TallerApp;

//! Maud HTML template components for the web UI.
//!
//! - `layout`: Base page layout and navigation

pub mod layout;

pub use layout::BaseLayout;

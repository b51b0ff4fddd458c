//! Maud-based page templates for the web UI.

pub mod likes;

pub use likes::render_count_likes_page;

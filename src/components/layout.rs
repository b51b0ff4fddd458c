//! Base layout components for the web UI.
//!
//! This module provides the main page layout structure including
//! the HTML skeleton, navigation, and footer.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::web::{AUTH_PATH, COUNT_LIKES_PATH};

/// Minimal inline styles; the app serves no static assets.
const BASE_STYLE: &str = r"body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 0 auto; padding: 0 1rem; }
nav ul { list-style: none; display: flex; gap: 1rem; padding: 0; }
.avatar { width: 48px; height: 48px; border-radius: 50%; vertical-align: middle; }
.ranking td { padding: 0.25rem 0.5rem; }
.ranking .count { text-align: right; font-weight: bold; }";

/// Base page layout builder.
///
/// # Example
///
/// ```ignore
/// use maud::html;
/// use crate::components::layout::BaseLayout;
///
/// let content = html! { h1 { "Hello World" } };
/// let page = BaseLayout::new("My Page").render(content);
/// ```
#[derive(Debug, Clone)]
pub struct BaseLayout<'a> {
    title: &'a str,
}

impl<'a> BaseLayout<'a> {
    /// Create a new base layout with the given page title.
    #[must_use]
    pub fn new(title: &'a str) -> Self {
        Self { title }
    }

    /// Render the complete HTML page with the given content.
    ///
    /// The content will be placed inside the `<main class="container">` element.
    #[must_use]
    pub fn render(self, content: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    meta name="color-scheme" content="light dark";
                    meta name="robots" content="noindex";
                    title { (self.title) " - Likes Counter" }
                    style { (PreEscaped(BASE_STYLE)) }
                }
                body {
                    (Self::render_header())
                    main class="container" {
                        (content)
                    }
                    (Self::render_footer())
                }
            }
        }
    }

    /// Render the page header with navigation.
    fn render_header() -> Markup {
        html! {
            header class="container" {
                nav {
                    ul {
                        li { a href="/" { strong { "Likes Counter" } } }
                        li { a href=(COUNT_LIKES_PATH) { "Top liked" } }
                        li { a href=(AUTH_PATH) { "Sign in again" } }
                    }
                }
            }
        }
    }

    fn render_footer() -> Markup {
        html! {
            footer class="container" {
                small { "Counts cover your most recent likes only." }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_layout_basic_structure() {
        let content = html! { h1 { "Test Content" } };
        let html = BaseLayout::new("Test Page").render(content).into_string();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<meta charset="UTF-8">"#));
        assert!(html.contains("<title>Test Page - Likes Counter</title>"));
        assert!(html.contains("<h1>Test Content</h1>"));
        assert!(html.contains(r#"<main class="container">"#));
        assert!(html.contains("<footer class=\"container\">"));
    }

    #[test]
    fn test_base_layout_navigation() {
        let html = BaseLayout::new("Nav Test")
            .render(html! { p { "Content" } })
            .into_string();

        assert!(html.contains(r#"<a href="/count-likes/">Top liked</a>"#));
        assert!(html.contains(r#"<a href="/auth/">Sign in again</a>"#));
    }

    #[test]
    fn test_title_is_escaped() {
        let html = BaseLayout::new("<script>")
            .render(html! {})
            .into_string();
        assert!(html.contains("&lt;script&gt; - Likes Counter"));
    }
}

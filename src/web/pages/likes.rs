//! Ranking page for `/count-likes/`.

use maud::{html, Markup};

use crate::components::BaseLayout;
use crate::likes::RankedUser;

/// Render the ranked list of most-liked users.
#[must_use]
pub fn render_count_likes_page(top_users: &[RankedUser]) -> Markup {
    let content = html! {
        h1 { "Who you like the most" }

        @if top_users.is_empty() {
            p { "No likes found." }
        } @else {
            table class="ranking" {
                thead {
                    tr {
                        th { "#" }
                        th { "User" }
                        th { "Likes" }
                    }
                }
                tbody {
                    @for (rank, entry) in top_users.iter().enumerate() {
                        (render_row(rank + 1, entry))
                    }
                }
            }
        }
    };

    BaseLayout::new("Top liked users").render(content)
}

fn render_row(rank: usize, entry: &RankedUser) -> Markup {
    let user = &entry.user;
    html! {
        tr {
            td { (rank) }
            td {
                @if let Some(avatar) = &user.profile_image_url_https {
                    img class="avatar" src=(avatar) alt="" loading="lazy";
                    " "
                }
                a href=(user.profile_url()) target="_blank" rel="noopener noreferrer" {
                    strong { (user.name) }
                    " @" (user.screen_name)
                }
            }
            td class="count" { (entry.count) }
        }
    }
}

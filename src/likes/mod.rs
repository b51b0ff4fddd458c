//! Ranking of the users whose posts were liked most.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::constants::{LIKES_PAGE_SIZE, MAX_LIKES_PAGES, MIN_PAGE_ITEMS, TOP_USERS_LIMIT};
use crate::twitter::{Like, TwitterClient, TwitterError, TwitterUser};

/// A source of pages of likes, newest first.
#[async_trait]
pub trait LikesSource: Send + Sync {
    /// Fetch up to `count` likes with ids at most `max_id`.
    async fn fetch_likes(&self, count: u32, max_id: Option<u64>)
        -> Result<Vec<Like>, TwitterError>;
}

#[async_trait]
impl LikesSource for TwitterClient {
    async fn fetch_likes(
        &self,
        count: u32,
        max_id: Option<u64>,
    ) -> Result<Vec<Like>, TwitterError> {
        self.get_favorites(count, max_id).await
    }
}

/// One row of the ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedUser {
    pub count: usize,
    pub user: TwitterUser,
}

/// Like counts per user, remembering the order users were first seen in.
#[derive(Debug, Default)]
pub struct LikeTally {
    users: HashMap<String, TwitterUser>,
    counts: HashMap<String, usize>,
    order: Vec<String>,
}

impl LikeTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every like in `likes`. A user's record is replaced by the most
    /// recently seen copy.
    pub fn add_page(&mut self, likes: &[Like]) {
        for like in likes {
            let id = &like.user.id_str;
            self.users.insert(id.clone(), like.user.clone());
            let count = self.counts.entry(id.clone()).or_insert_with(|| {
                self.order.push(id.clone());
                0
            });
            *count += 1;
        }
    }

    /// Number of distinct users seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The `limit` users with the most likes, highest first. Users with equal
    /// counts stay in first-seen order.
    #[must_use]
    pub fn most_common(&self, limit: usize) -> Vec<RankedUser> {
        let mut ranked: Vec<(&String, usize)> = self
            .order
            .iter()
            .map(|id| (id, self.counts.get(id).copied().unwrap_or(0)))
            .collect();
        // sort_by is stable, so ties keep insertion order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        ranked
            .into_iter()
            .take(limit)
            .filter_map(|(id, count)| {
                self.users.get(id).map(|user| RankedUser {
                    count,
                    user: user.clone(),
                })
            })
            .collect()
    }
}

/// Walk the user's likes and tally them by author.
///
/// Fetches at most [`MAX_LIKES_PAGES`] pages of [`LIKES_PAGE_SIZE`] items,
/// each page starting at the last id of the previous one. A page with fewer
/// than [`MIN_PAGE_ITEMS`] items ends the walk without being counted.
///
/// # Errors
///
/// Returns the first error from the source; nothing is retried.
pub async fn tally_likes<S: LikesSource + ?Sized>(source: &S) -> Result<LikeTally, TwitterError> {
    let mut tally = LikeTally::new();
    let mut max_id = None;
    let mut total = 0usize;

    for page in 0..MAX_LIKES_PAGES {
        let likes = source.fetch_likes(LIKES_PAGE_SIZE, max_id).await?;
        debug!(page, items = likes.len(), max_id = ?max_id, "Fetched likes page");

        let Some(last) = likes.last() else {
            break;
        };
        if likes.len() < MIN_PAGE_ITEMS {
            break;
        }

        max_id = Some(last.id);
        total += likes.len();
        tally.add_page(&likes);
    }

    info!(likes = total, users = tally.len(), "Tallied likes");
    Ok(tally)
}

/// Tally the user's likes and return the top [`TOP_USERS_LIMIT`] users.
///
/// # Errors
///
/// Returns the first error from the source.
pub async fn count_likes<S: LikesSource + ?Sized>(
    source: &S,
) -> Result<Vec<RankedUser>, TwitterError> {
    Ok(tally_likes(source).await?.most_common(TOP_USERS_LIMIT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serves scripted pages and records the cursors it was asked for.
    struct ScriptedSource {
        pages: Mutex<Vec<Result<Vec<Like>, TwitterError>>>,
        calls: Mutex<Vec<Option<u64>>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Result<Vec<Like>, TwitterError>>) -> Self {
            let mut pages = pages;
            pages.reverse();
            Self {
                pages: Mutex::new(pages),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Option<u64>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LikesSource for ScriptedSource {
        async fn fetch_likes(
            &self,
            count: u32,
            max_id: Option<u64>,
        ) -> Result<Vec<Like>, TwitterError> {
            assert_eq!(count, LIKES_PAGE_SIZE);
            self.calls.lock().unwrap().push(max_id);
            self.pages.lock().unwrap().pop().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn user(id: &str) -> TwitterUser {
        TwitterUser {
            id_str: id.to_string(),
            name: format!("User {id}"),
            screen_name: format!("user{id}"),
            profile_image_url_https: None,
            description: None,
            extra: serde_json::Map::new(),
        }
    }

    fn like(id: u64, user_id: &str) -> Like {
        Like {
            id,
            user: user(user_id),
            extra: serde_json::Map::new(),
        }
    }

    /// Likes with descending ids starting at `first_id`, one per author.
    fn page(first_id: u64, authors: &[String]) -> Vec<Like> {
        authors
            .iter()
            .enumerate()
            .map(|(i, a)| like(first_id - i as u64, a))
            .collect()
    }

    fn ids(ranked: &[RankedUser]) -> Vec<&str> {
        ranked.iter().map(|r| r.user.id_str.as_str()).collect()
    }

    #[tokio::test]
    async fn test_stops_when_page_has_single_item() {
        let authors: Vec<String> = (0..200).map(|i| format!("u{i}")).collect();
        let source = ScriptedSource::new(vec![
            Ok(page(1000, &authors)),
            Ok(vec![like(801, "late")]),
            Ok(page(700, &authors)),
        ]);

        let tally = tally_likes(&source).await.unwrap();

        assert_eq!(source.calls(), vec![None, Some(801)]);
        assert_eq!(tally.len(), 200);
        assert!(tally.most_common(300).iter().all(|r| r.user.id_str != "late"));
    }

    #[tokio::test]
    async fn test_stops_on_empty_page() {
        let source = ScriptedSource::new(vec![Ok(Vec::new())]);
        let ranked = count_likes(&source).await.unwrap();
        assert!(ranked.is_empty());
        assert_eq!(source.calls(), vec![None]);
    }

    #[tokio::test]
    async fn test_fetches_at_most_five_pages() {
        let authors: Vec<String> = vec!["a".into(), "b".into()];
        let pages = (0..8u64).map(|p| Ok(page(1000 - p * 10, &authors))).collect();
        let source = ScriptedSource::new(pages);

        let tally = tally_likes(&source).await.unwrap();

        assert_eq!(
            source.calls(),
            vec![None, Some(999), Some(989), Some(979), Some(969)]
        );
        let ranked = tally.most_common(TOP_USERS_LIMIT);
        assert_eq!(ranked[0].count, 5);
        assert_eq!(ranked[1].count, 5);
    }

    #[tokio::test]
    async fn test_ranking_top_fifteen() {
        let mut authors: Vec<String> = Vec::new();
        // Interleave so A and B are not simply first in the page.
        for i in 0..20 {
            authors.push(format!("single{i:02}"));
            if i < 10 {
                authors.push("A".into());
            }
            if i < 8 {
                authors.push("B".into());
            }
        }
        let source = ScriptedSource::new(vec![Ok(page(10_000, &authors)), Ok(Vec::new())]);

        let ranked = count_likes(&source).await.unwrap();

        assert_eq!(ranked.len(), 15);
        assert_eq!(ranked[0].user.id_str, "A");
        assert_eq!(ranked[0].count, 10);
        assert_eq!(ranked[1].user.id_str, "B");
        assert_eq!(ranked[1].count, 8);
        let expected: Vec<String> = (0..13).map(|i| format!("single{i:02}")).collect();
        assert_eq!(ids(&ranked[2..]), expected.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(ranked[2..].iter().all(|r| r.count == 1));
    }

    #[tokio::test]
    async fn test_last_user_record_wins() {
        let mut first = like(10, "x");
        first.user.name = "Old Name".into();
        let mut second = like(5, "x");
        second.user.name = "New Name".into();
        let source = ScriptedSource::new(vec![
            Ok(vec![first, like(9, "y")]),
            Ok(vec![second, like(4, "y")]),
            Ok(Vec::new()),
        ]);

        let ranked = count_likes(&source).await.unwrap();

        assert_eq!(ids(&ranked), vec!["x", "y"]);
        assert_eq!(ranked[0].user.name, "New Name");
        assert_eq!(ranked[0].count, 2);
    }

    #[tokio::test]
    async fn test_error_propagates() {
        let source = ScriptedSource::new(vec![Err(TwitterError::Unauthorized("expired".into()))]);
        let err = count_likes(&source).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_most_common_ties_keep_first_seen_order() {
        let mut tally = LikeTally::new();
        tally.add_page(&[like(6, "c"), like(5, "a"), like(4, "b"), like(3, "a")]);
        tally.add_page(&[like(2, "b"), like(1, "c")]);

        let ranked = tally.most_common(10);
        assert_eq!(ids(&ranked), vec!["c", "a", "b"]);
        assert!(ranked.iter().all(|r| r.count == 2));
        assert_eq!(ids(&tally.most_common(1)), vec!["c"]);
    }
}

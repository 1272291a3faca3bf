//! # News Sources
//!
//! Fetches the text that gets narrated. Two steps, both optional depending on
//! the request:
//!
//! 1. **Headline**: the current top story from a news-search API
//! 2. **Article**: the full page behind the headline, reduced to its prose
//!
//! The pipeline depends on the [`NewsSource`] trait; [`NewsApiClient`] is the
//! production implementation.

pub mod article;
pub mod newsapi;

pub use article::extract_article_text;
pub use newsapi::NewsApiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One headline as returned by the news API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub source_name: Option<String>,
}

impl Headline {
    /// Best text the API itself carries: content, then description, then title
    pub fn teaser(&self) -> &str {
        [self.content.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or(self.title.trim())
    }
}

/// Where narration text comes from when the caller does not supply it
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// The current top headline
    async fn top_headline(&self) -> Result<Headline>;

    /// Plain-text body of the article at `url`
    async fn article_text(&self, url: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teaser_prefers_content() {
        let headline = Headline {
            title: "Title".to_string(),
            description: Some("Description".to_string()),
            content: Some("  ".to_string()),
            ..Headline::default()
        };
        assert_eq!(headline.teaser(), "Description");

        let bare = Headline { title: " Title only ".to_string(), ..Headline::default() };
        assert_eq!(bare.teaser(), "Title only");
    }
}

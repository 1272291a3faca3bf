use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::NewsConfig;
use crate::error::{ConfigError, Result, SourceError};
use crate::source::{article::extract_article_text, Headline, NewsSource};

/// Headlines requested per call; the first usable one wins
const PAGE_SIZE: &str = "5";

/// Title NewsAPI substitutes for articles pulled after indexing
const REMOVED_MARKER: &str = "[Removed]";

#[derive(Debug, Deserialize)]
struct TopHeadlinesResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    source: Option<ApiSource>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    name: Option<String>,
}

impl ApiArticle {
    fn into_headline(self) -> Option<Headline> {
        let title = self.title?.trim().to_string();
        if title.is_empty() || title == REMOVED_MARKER {
            return None;
        }

        let non_empty = |s: Option<String>| s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Some(Headline {
            title,
            description: non_empty(self.description),
            content: non_empty(self.content).map(|c| strip_truncation_marker(&c).to_string()),
            url: non_empty(self.url),
            url_to_image: non_empty(self.url_to_image),
            source_name: self.source.and_then(|s| s.name),
        })
    }
}

/// NewsAPI cuts `content` and appends "… [+1234 chars]"
fn strip_truncation_marker(content: &str) -> &str {
    match content.rfind(" [+") {
        Some(idx) if content.ends_with(" chars]") => content[..idx].trim_end_matches('…').trim_end(),
        _ => content,
    }
}

/// NewsAPI top-headlines client with HTML article scraping
pub struct NewsApiClient {
    client: Client,
    api_key: String,
    base_url: Url,
    country: String,
}

impl NewsApiClient {
    /// Build a client; fails when no API key is configured
    pub fn new(client: Client, config: &NewsConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingKey { key: "news.api_key".to_string() })?;

        let base_url = Url::parse(&config.base_url).map_err(|_| ConfigError::InvalidValue {
            key: "news.base_url".to_string(),
            value: config.base_url.clone(),
        })?;

        Ok(Self {
            client,
            api_key,
            base_url,
            country: config.country.clone(),
        })
    }

    fn top_headlines_url(&self) -> Result<Url> {
        let mut url = self.base_url.join("v2/top-headlines").map_err(|_| SourceError::InvalidUrl {
            url: self.base_url.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("country", &self.country)
            .append_pair("pageSize", PAGE_SIZE);
        Ok(url)
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    #[instrument(level = "info", skip(self), fields(country = %self.country))]
    async fn top_headline(&self) -> Result<Headline> {
        let url = self.top_headlines_url()?;
        let response = self.client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        let body: TopHeadlinesResponse = match response.json().await {
            Ok(body) => body,
            Err(e) if !status.is_success() => {
                return Err(SourceError::Upstream {
                    status: status.as_u16(),
                    message: e.to_string(),
                }.into());
            }
            Err(e) => return Err(e.into()),
        };

        if !status.is_success() || body.status != "ok" {
            let message = body.message.unwrap_or_else(|| body.status.clone());
            warn!(status = status.as_u16(), %message, "News API rejected request");
            return Err(SourceError::Upstream { status: status.as_u16(), message }.into());
        }

        debug!(count = body.articles.len(), "Received headlines");
        let headline = body
            .articles
            .into_iter()
            .find_map(ApiArticle::into_headline)
            .ok_or_else(|| SourceError::Empty { origin: "top-headlines".to_string() })?;

        info!(title = %headline.title, source = ?headline.source_name, "Selected top headline");
        Ok(headline)
    }

    #[instrument(level = "info", skip(self))]
    async fn article_text(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).map_err(|_| SourceError::InvalidUrl { url: url.to_string() })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SourceError::InvalidUrl { url: url.to_string() }.into());
        }

        let response = self.client.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Upstream {
                status: status.as_u16(),
                message: format!("article fetch failed for {}", url),
            }.into());
        }

        let html = response.text().await?;
        let text = extract_article_text(&html);
        if text.is_empty() {
            return Err(SourceError::Empty { origin: url.to_string() }.into());
        }

        info!(bytes = text.len(), "Parsed article");
        Ok(text)
    }
}

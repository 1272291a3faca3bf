//! Full-page article extraction.
//!
//! News pages wrap the story in a lot of chrome. Paragraphs inside an
//! `<article>` element are taken when present; otherwise every `<p>` on the
//! page is used.

use scraper::{Html, Selector};
use tracing::debug;

use crate::speech::text::element_text;

/// Paragraphs shorter than this many words are treated as chrome (bylines, buttons)
const MIN_PARAGRAPH_WORDS: usize = 4;

/// Extract the readable prose of an article page, one paragraph per line
pub fn extract_article_text(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector in ["article p", "main p", "p"] {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };

        let paragraphs: Vec<String> = document
            .select(&selector)
            .map(|element| {
                element_text(element)
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|p| p.split(' ').count() >= MIN_PARAGRAPH_WORDS)
            .collect();

        if !paragraphs.is_empty() {
            debug!(paragraphs = paragraphs.len(), "Extracted article paragraphs");
            return paragraphs.join("\n");
        }
    }

    String::new()
}

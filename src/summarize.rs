//! Extractive summarization.
//!
//! Sentences are scored by the average normalized frequency of their content
//! words across the whole text; the best-scoring sentences are kept in their
//! original order. Nothing is rewritten, so every output sentence appears
//! verbatim in the input.

use std::collections::{HashMap, HashSet};

use tracing::debug;

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "before", "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has",
    "have", "he", "her", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just",
    "more", "most", "not", "of", "on", "one", "or", "our", "out", "over", "said", "says",
    "she", "so", "some", "than", "that", "the", "their", "them", "then", "there", "these",
    "they", "this", "those", "to", "up", "was", "we", "were", "what", "when", "which", "while",
    "who", "will", "with", "would", "you", "your",
];

/// Reduces article text to a fixed number of sentences
#[derive(Debug, Clone)]
pub struct Summarizer {
    sentences: usize,
}

impl Summarizer {
    pub fn new(sentences: usize) -> Self {
        Self { sentences }
    }

    /// Keep the `sentences` most representative sentences of `text`
    pub fn summarize(&self, text: &str) -> String {
        if self.sentences == 0 {
            return String::new();
        }

        let sentences = split_sentences(text);
        if sentences.len() <= self.sentences {
            return sentences.join(" ");
        }

        let stopwords: HashSet<&str> = STOPWORDS.iter().copied().collect();
        let tokenized: Vec<Vec<String>> = sentences
            .iter()
            .map(|s| content_words(s, &stopwords))
            .collect();

        let mut frequencies: HashMap<&str, f64> = HashMap::new();
        for word in tokenized.iter().flatten() {
            *frequencies.entry(word.as_str()).or_default() += 1.0;
        }
        let max_frequency = frequencies.values().copied().fold(0.0, f64::max).max(1.0);

        let mut scored: Vec<(usize, f64)> = tokenized
            .iter()
            .enumerate()
            .map(|(i, words)| {
                let score = if words.is_empty() {
                    0.0
                } else {
                    words.iter().map(|w| frequencies[w.as_str()] / max_frequency).sum::<f64>()
                        / words.len() as f64
                };
                (i, score)
            })
            .collect();

        // Highest score first; earlier sentence wins ties
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut keep: Vec<usize> = scored.iter().take(self.sentences).map(|&(i, _)| i).collect();
        keep.sort_unstable();

        debug!(total = sentences.len(), kept = keep.len(), "Summarized text");
        keep.iter().map(|&i| sentences[i].as_str()).collect::<Vec<_>>().join(" ")
    }
}

/// Split text into trimmed sentences at `.`, `!` or `?` followed by whitespace
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().map_or(true, |next| next.is_whitespace());
        if at_boundary {
            push_sentence(&mut sentences, &current);
            current.clear();
        }
    }
    push_sentence(&mut sentences, &current);

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !normalized.is_empty() {
        sentences.push(normalized);
    }
}

fn content_words(sentence: &str, stopwords: &HashSet<&str>) -> Vec<String> {
    sentence
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| w.len() > 1 && !stopwords.contains(w.as_str()))
        .collect()
}

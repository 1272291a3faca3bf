use std::path::{Path, PathBuf};

use crate::config::CompositionConfig;
use crate::error::Result;

/// Text burned into the bottom of the frame
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub text: String,
    pub font_size: u32,
    pub font_color: String,
    pub box_color: String,
}

impl Caption {
    /// Build a caption from a title, or `None` when captions are disabled or the title is blank
    pub fn from_title(title: &str, config: &CompositionConfig) -> Option<Self> {
        if !config.caption {
            return None;
        }

        let text = title.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            return None;
        }

        Some(Self {
            text: shorten(&text, config.caption_max_chars),
            font_size: config.caption_font_size,
            font_color: config.caption_font_color.clone(),
            box_color: config.caption_box_color.clone(),
        })
    }

    /// Write the caption text into `dir`; drawtext reads it from there so the
    /// text itself never needs filtergraph escaping
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join("caption.txt");
        std::fs::write(&path, &self.text)?;
        Ok(path)
    }

    /// The `drawtext` filter reading from `text_file`
    ///
    /// `expansion=none` makes drawtext print the file verbatim, so `%` and
    /// `\` in headlines are not read as template sequences.
    pub fn drawtext_filter(&self, text_file: &Path) -> String {
        format!(
            "drawtext=textfile={}:expansion=none:fontsize={}:fontcolor={}:box=1:boxcolor={}:boxborderw=12:x=(w-text_w)/2:y=h-text_h-40",
            escape_filter_value(&text_file.display().to_string()),
            self.font_size,
            escape_filter_value(&self.font_color),
            escape_filter_value(&self.box_color),
        )
    }
}

/// Cut at a word boundary and mark the cut with an ellipsis
fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut out = String::new();
    for word in text.split(' ') {
        let extra = if out.is_empty() { 0 } else { 1 };
        if out.chars().count() + extra + word.chars().count() + 1 > max_chars {
            break;
        }
        if extra == 1 {
            out.push(' ');
        }
        out.push_str(word);
    }

    if out.is_empty() {
        out = text.chars().take(max_chars.saturating_sub(1)).collect();
    }
    out.push('…');
    out
}

/// Escape a value for use inside a `-vf` filter option
///
/// The value is unescaped twice by ffmpeg: once by the option parser
/// (`\`, `'`, `:`) and once by the filtergraph parser (`\`, `'`, `[`, `]`,
/// `,`, `;`). Escaping runs in the reverse order.
pub(crate) fn escape_filter_value(value: &str) -> String {
    let option = escape_chars(value, &['\\', '\'', ':']);
    escape_chars(&option, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

use scraper::{ElementRef, Html};

/// Elements that break the flow of text; inline tags do not
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "footer",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "ol", "p", "section", "td", "th",
    "tr", "ul",
];

/// Strip markup and collapse whitespace so the TTS engine reads only prose
pub fn prepare_text_for_tts(text: &str) -> String {
    let plain = if text.contains(['<', '&']) {
        // Parsing as a fragment decodes entities and drops tags in one pass
        element_text(Html::parse_fragment(text).root_element())
    } else {
        text.to_string()
    };

    plain.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Text content of `element`; inline tags join without a gap, block
/// elements are separated by a space
pub(crate) fn element_text(element: ElementRef) -> String {
    let mut out = String::new();
    push_text(element, &mut out);
    out
}

fn push_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            let block = BLOCK_ELEMENTS.contains(&child.value().name());
            if block {
                out.push(' ');
            }
            push_text(child, out);
            if block {
                out.push(' ');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_normalized() {
        assert_eq!(prepare_text_for_tts("  Markets   rally\n\ttoday. "), "Markets rally today.");
    }

    #[test]
    fn test_markup_and_entities_removed() {
        let text = "<p>Rates &amp; jobs: <b>what&#39;s next</b></p>";
        assert_eq!(prepare_text_for_tts(text), "Rates & jobs: what's next");
    }

    #[test]
    fn test_inline_tags_do_not_split_words() {
        let text = "The <em>U.S.</em>-led plan was un<b>believ</b>able";
        assert_eq!(prepare_text_for_tts(text), "The U.S.-led plan was unbelievable");
    }

    #[test]
    fn test_block_elements_stay_separated() {
        let text = "<p>Markets fell.</p><p>Bonds rose.</p>Oil<br>held";
        assert_eq!(prepare_text_for_tts(text), "Markets fell. Bonds rose. Oil held");
    }

    #[test]
    fn test_empty_stays_empty() {
        assert_eq!(prepare_text_for_tts(" \n "), "");
    }
}

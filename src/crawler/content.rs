//! Main-content detection
//!
//! Pages carry a lot of chrome (menus, footers, cookie banners). The
//! extractors here try to find the block of the page that holds the actual
//! article text and return it as a list of paragraphs.

use scraper::{ElementRef, Html, Selector};

/// Elements whose text is never visible content
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Strategy for pulling the main text out of a document
pub trait ContentExtractor: Send + Sync {
    /// Returns the document's main-content paragraphs, in document order
    fn extract(&self, document: &Html) -> Vec<String>;
}

/// Picks the `<div>` with the most words and returns its text blocks
///
/// Divs with `min_words` words or fewer are ignored as navigation or
/// boilerplate. With no qualifying div the whole `<body>` is used. If the
/// chosen block has no paragraph-like elements, the body text is split into
/// sentences and those longer than ten characters are returned instead.
#[derive(Debug, Clone)]
pub struct LargestTextBlock {
    pub min_words: usize,
    pub max_paragraphs: usize,
}

impl Default for LargestTextBlock {
    fn default() -> Self {
        Self {
            min_words: 50,
            max_paragraphs: 50,
        }
    }
}

impl LargestTextBlock {
    pub fn new(max_paragraphs: usize) -> Self {
        Self {
            max_paragraphs,
            ..Self::default()
        }
    }

    fn main_block<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        let div_sel = Selector::parse("div").ok()?;

        let mut best: Option<(ElementRef<'a>, usize)> = None;
        for div in document.select(&div_sel) {
            let words = visible_text(&div).split_whitespace().count();
            if words <= self.min_words {
                continue;
            }
            // Ties keep the earliest (outermost) div
            if best.map_or(true, |(_, most)| words > most) {
                best = Some((div, words));
            }
        }

        if let Some((div, _)) = best {
            return Some(div);
        }

        let body_sel = Selector::parse("body").ok()?;
        document.select(&body_sel).next()
    }
}

impl ContentExtractor for LargestTextBlock {
    fn extract(&self, document: &Html) -> Vec<String> {
        let Ok(block_sel) = Selector::parse("p, h1, h2, h3, h4, h5, li") else {
            return Vec::new();
        };

        let mut paragraphs: Vec<String> = match self.main_block(document) {
            Some(block) => block
                .select(&block_sel)
                .map(|el| collapse_whitespace(&visible_text(&el)))
                .filter(|text| !text.is_empty())
                .collect(),
            None => Vec::new(),
        };

        if paragraphs.is_empty() {
            let text = visible_text(&document.root_element());
            paragraphs = split_sentences(&text)
                .into_iter()
                .filter(|s| s.chars().count() > 10)
                .collect();
        }

        paragraphs.truncate(self.max_paragraphs);
        paragraphs
    }
}

/// Collects the text of an element, skipping scripts and styles
pub fn visible_text(element: &ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| INVISIBLE_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            out.push_str(text);
        }
    }
    out
}

/// Joins runs of whitespace into single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits text after `.`, `!` or `?` when followed by whitespace
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().is_some_and(|next| next.is_whitespace());
        if at_boundary {
            let sentence = collapse_whitespace(&current);
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            current.clear();
        }
    }

    let tail = collapse_whitespace(&current);
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

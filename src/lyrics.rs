// lyrics.rs - Lyrics Extraction
// Turns a raw lyrics page into plain text. Extraction runs as an ordered list
// of strategies; the first one that produces text wins.
//
// Used by: pipeline.rs

use log::{debug, warn};
use scraper::{ElementRef, Html, Node, Selector};
use std::fmt;
use std::str::FromStr;

const LD_JSON_SELECTOR: &str = r#"script[type="application/ld+json"]"#;
const CONTAINER_SELECTOR: &str = r#"div[data-lyrics-container="true"]"#;
const SKIP_TAGS: [&str; 2] = ["script", "style"];

/// Extracted lyrics text. Never empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsBlock(String);

impl LyricsBlock {
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LyricsBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// `lyrics` field of the page's JSON-LD block
    StructuredData,
    /// Text of every `data-lyrics-container` div
    Containers,
}

impl ExtractionStrategy {
    pub fn default_order() -> Vec<Self> {
        vec![Self::StructuredData, Self::Containers]
    }

    fn extract(self, document: &Html) -> Option<LyricsBlock> {
        match self {
            Self::StructuredData => extract_structured_data(document),
            Self::Containers => extract_containers(document),
        }
    }
}

impl FromStr for ExtractionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" | "structured_data" | "ld+json" => Ok(Self::StructuredData),
            "containers" | "html" => Ok(Self::Containers),
            other => Err(format!("unknown extraction strategy '{}'", other)),
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::StructuredData => f.write_str("structured"),
            Self::Containers => f.write_str("containers"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LyricsExtractor {
    strategies: Vec<ExtractionStrategy>,
}

impl Default for LyricsExtractor {
    fn default() -> Self {
        Self::new(ExtractionStrategy::default_order())
    }
}

impl LyricsExtractor {
    pub fn new(strategies: Vec<ExtractionStrategy>) -> Self {
        Self { strategies }
    }

    /// Run each strategy in order against the page and return the first hit
    pub fn extract(&self, page: &str) -> Option<LyricsBlock> {
        let document = Html::parse_document(page);

        for strategy in &self.strategies {
            if let Some(lyrics) = strategy.extract(&document) {
                debug!("🎼 Lyrics extracted via {} ({} chars)", strategy, lyrics.as_str().len());
                return Some(lyrics);
            }
            debug!("🎼 No lyrics via {}", strategy);
        }

        None
    }
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("❌ Failed to parse selector '{}': {:?}", css, e);
            None
        }
    }
}

fn extract_structured_data(document: &Html) -> Option<LyricsBlock> {
    let selector = selector(LD_JSON_SELECTOR)?;
    let script = document.select(&selector).next()?;
    let raw = script.text().collect::<String>();

    let data: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(data) => data,
        Err(e) => {
            warn!("❌ Error parsing JSON-LD block: {}", e);
            return None;
        }
    };

    data.get("lyrics")
        .and_then(|lyrics| lyrics.as_str())
        .and_then(LyricsBlock::new)
}

fn extract_containers(document: &Html) -> Option<LyricsBlock> {
    let selector = selector(CONTAINER_SELECTOR)?;

    let sections: Vec<String> = document
        .select(&selector)
        .map(container_text)
        .filter(|text| !text.is_empty())
        .collect();

    LyricsBlock::new(sections.join("\n"))
}

/// One line per visible text node, skipping script/style noise
fn container_text(container: ElementRef<'_>) -> String {
    let mut lines = Vec::new();
    collect_lines(container, &mut lines);
    lines.join("\n").trim().to_string()
}

fn collect_lines(node: ElementRef<'_>, lines: &mut Vec<String>) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                let line = text.trim();
                if !line.is_empty() {
                    lines.push(line.to_string());
                }
            }
            Node::Element(element) => {
                if SKIP_TAGS.contains(&element.name()) {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_lines(child_ref, lines);
                }
            }
            _ => {}
        }
    }
}

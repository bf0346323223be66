//! Markup kind detection.
//!
//! A cheap textual sniff run before parsing, so the parser knows whether it
//! is looking at an editor fragment, a full document, or a document this
//! crate already produced.

use lazy_static::lazy_static;
use regex::Regex;

use crate::render::GENERATOR;

lazy_static! {
    static ref GENERATOR_META: Regex = Regex::new(&format!(
        r#"(?i)<meta\s+name\s*=\s*["']generator["']\s+content\s*=\s*["']{}["']"#,
        GENERATOR
    ))
    .unwrap();
    static ref DOCUMENT_START: Regex =
        Regex::new(r"(?i)^\s*(?:<!--.*?-->\s*)*<(?:!doctype|html[\s>]|head[\s>])").unwrap();
    static ref BODY_TAG: Regex = Regex::new(r"(?i)<body[\s>]").unwrap();
}

/// What kind of markup an input string holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupKind {
    /// An editor fragment without document structure
    Fragment,
    /// A complete document (doctype, `html` or `body`)
    Document,
    /// A document previously produced by this crate
    Transcoded,
}

impl std::fmt::Display for MarkupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkupKind::Fragment => f.write_str("fragment"),
            MarkupKind::Document => f.write_str("document"),
            MarkupKind::Transcoded => f.write_str("transcoded document"),
        }
    }
}

/// Detect the kind of markup.
///
/// # Example
///
/// ```
/// use mailprep::detect::{detect_markup, MarkupKind};
///
/// assert_eq!(detect_markup("<p>Hello</p>"), MarkupKind::Fragment);
/// assert_eq!(detect_markup("<!DOCTYPE html><html></html>"), MarkupKind::Document);
/// ```
pub fn detect_markup(html: &str) -> MarkupKind {
    if GENERATOR_META.is_match(html) {
        MarkupKind::Transcoded
    } else if DOCUMENT_START.is_match(html) || BODY_TAG.is_match(html) {
        MarkupKind::Document
    } else {
        MarkupKind::Fragment
    }
}

/// Check if markup was produced by this crate.
pub fn is_transcoded(html: &str) -> bool {
    detect_markup(html) == MarkupKind::Transcoded
}

//! Markup parsing module.

mod html;
mod options;

pub use html::{parse_html, parse_html_with_options};
pub use options::ParseOptions;

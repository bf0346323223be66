//! Inline style declarations.
//!
//! A `style` attribute is parsed once into an ordered [`StyleMap`] when the
//! document tree is built. Pipeline stages read and mutate the map, and the
//! serializer writes it back out exactly once at the end.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

lazy_static! {
    static ref PROPERTY_NAME: Regex = Regex::new(r"^-?[a-z_][a-z0-9_-]*$").unwrap();
    static ref IMPORTANT: Regex = Regex::new(r"(?i)\s*!\s*important\s*$").unwrap();
    static ref LENGTH: Regex =
        Regex::new(r"(?i)^([+-]?(?:\d+\.?\d*|\.\d+))\s*(px|pt|em|rem|%)?$").unwrap();
}

/// A single `name:value` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name
    pub name: String,
    /// Trimmed value, without any `!important` suffix
    pub value: String,
    /// Whether the declaration carried `!important`
    pub important: bool,
}

impl Declaration {
    /// Create a declaration without `!important`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            important: false,
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.value)?;
        if self.important {
            f.write_str(" !important")?;
        }
        Ok(())
    }
}

/// Ordered property map parsed from an inline style string.
///
/// Property names are unique: when the source repeats a property, the last
/// value wins and stays at the position of the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    declarations: Vec<Declaration>,
}

impl StyleMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a semicolon-delimited declaration list.
    ///
    /// Semicolons inside parentheses or quotes do not split declarations, so
    /// values such as `url(data:image/png;base64,...)` survive intact.
    ///
    /// # Example
    ///
    /// ```
    /// use mailprep::model::StyleMap;
    ///
    /// let style = StyleMap::parse("float: left; WIDTH:100px").unwrap();
    /// assert_eq!(style.get("width"), Some("100px"));
    /// assert_eq!(style.to_string(), "float:left;width:100px");
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let mut map = Self::new();

        for segment in split_declarations(input)? {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            let (name, value) = segment.split_once(':').ok_or_else(|| Error::StyleParse {
                declaration: segment.to_string(),
            })?;

            let name = name.trim().to_ascii_lowercase();
            if !PROPERTY_NAME.is_match(&name) {
                return Err(Error::StyleParse {
                    declaration: segment.to_string(),
                });
            }

            let value = value.trim();
            let important = IMPORTANT.is_match(value);
            let value = IMPORTANT.replace(value, "").trim().to_string();
            if value.is_empty() {
                return Err(Error::StyleParse {
                    declaration: segment.to_string(),
                });
            }

            match map.index_of(&name) {
                Some(idx) => {
                    map.declarations[idx].value = value;
                    map.declarations[idx].important = important;
                }
                None => map.declarations.push(Declaration {
                    name,
                    value,
                    important,
                }),
            }
        }

        Ok(map)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.declarations.iter().position(|d| d.name == name)
    }

    /// Position of a property within the map.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index_of(name)
    }

    /// Get a property value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.declaration(name).map(|d| d.value.as_str())
    }

    /// Get the full declaration for a property.
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    /// Get a property value parsed as a length.
    pub fn length(&self, name: &str) -> Option<Length> {
        self.get(name).and_then(Length::parse)
    }

    /// Check whether a property is present.
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Check whether a property or any of its longhands is present
    /// (`margin` matches `margin`, `margin-top`, ...).
    pub fn contains_family(&self, shorthand: &str) -> bool {
        self.declarations.iter().any(|d| {
            d.name == shorthand
                || d
                    .name
                    .strip_prefix(shorthand)
                    .is_some_and(|rest| rest.starts_with('-'))
        })
    }

    /// Set a property value.
    ///
    /// An existing declaration keeps its position and `!important` flag;
    /// a new one is appended.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.index_of(name) {
            Some(idx) => self.declarations[idx].value = value,
            None => self.declarations.push(Declaration::new(name, value)),
        }
    }

    /// Set a property immediately after another one.
    ///
    /// Any existing declaration of `name` is moved. Appends when `anchor`
    /// is absent.
    pub fn set_after(&mut self, anchor: &str, name: &str, value: impl Into<String>) {
        self.remove(name);
        let decl = Declaration::new(name, value);
        match self.index_of(anchor) {
            Some(idx) => self.declarations.insert(idx + 1, decl),
            None => self.declarations.push(decl),
        }
    }

    /// Remove a property, returning its declaration.
    pub fn remove(&mut self, name: &str) -> Option<Declaration> {
        self.index_of(name).map(|idx| self.declarations.remove(idx))
    }

    /// Iterate over declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl fmt::Display for StyleMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, decl) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}", decl)?;
        }
        Ok(())
    }
}

/// Split on `;` outside parentheses and quotes.
fn split_declarations(input: &str) -> Result<Vec<&str>> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth = depth.checked_sub(1).ok_or_else(|| Error::StyleParse {
                    declaration: input.to_string(),
                })?
            }
            (None, ';') if depth == 0 => {
                segments.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if quote.is_some() || depth != 0 {
        return Err(Error::StyleParse {
            declaration: input.to_string(),
        });
    }

    segments.push(&input[start..]);
    Ok(segments)
}

/// The inline style of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Style {
    /// Successfully parsed declarations (possibly empty)
    Parsed(StyleMap),
    /// A style string that failed to parse, kept verbatim
    Unparsable(String),
}

impl Style {
    /// Build from an optional raw `style` attribute value.
    pub fn from_attribute(raw: Option<&str>) -> Self {
        match raw {
            None => Style::Parsed(StyleMap::new()),
            Some(raw) => match StyleMap::parse(raw) {
                Ok(map) => Style::Parsed(map),
                Err(e) => {
                    log::warn!("Leaving unparsable style untouched: {}", e);
                    Style::Unparsable(raw.to_string())
                }
            },
        }
    }

    /// The parsed map, if the style parsed.
    pub fn map(&self) -> Option<&StyleMap> {
        match self {
            Style::Parsed(map) => Some(map),
            Style::Unparsable(_) => None,
        }
    }

    /// The parsed map for mutation, if the style parsed.
    pub fn map_mut(&mut self) -> Option<&mut StyleMap> {
        match self {
            Style::Parsed(map) => Some(map),
            Style::Unparsable(_) => None,
        }
    }

    /// Whether the original string failed to parse.
    pub fn is_unparsable(&self) -> bool {
        matches!(self, Style::Unparsable(_))
    }

    /// Attribute value to emit, or `None` when there is nothing to write.
    pub fn to_attribute(&self) -> Option<String> {
        match self {
            Style::Parsed(map) if map.is_empty() => None,
            Style::Parsed(map) => Some(map.to_string()),
            Style::Unparsable(raw) => Some(raw.clone()),
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Style::Parsed(StyleMap::new())
    }
}

/// Unit of a CSS length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    /// Pixels
    Px,
    /// Points
    Pt,
    /// Relative to the element font size
    Em,
    /// Relative to the root font size
    Rem,
    /// Percentage
    Percent,
    /// Bare number (line-height multiplier)
    Unitless,
}

/// A numeric CSS length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    /// Numeric value
    pub value: f64,
    /// Unit
    pub unit: LengthUnit,
}

impl Length {
    /// Create a pixel length.
    pub fn px(value: f64) -> Self {
        Self {
            value,
            unit: LengthUnit::Px,
        }
    }

    /// Parse a length such as `12px`, `9pt`, `1.5`, `120%`.
    pub fn parse(input: &str) -> Option<Self> {
        let caps = LENGTH.captures(input.trim())?;
        let value: f64 = caps.get(1)?.as_str().parse().ok()?;
        let unit = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
            None => LengthUnit::Unitless,
            Some(u) => match u.as_str() {
                "px" => LengthUnit::Px,
                "pt" => LengthUnit::Pt,
                "em" => LengthUnit::Em,
                "rem" => LengthUnit::Rem,
                _ => LengthUnit::Percent,
            },
        };
        Some(Self { value, unit })
    }

    /// The value in pixels when the unit is absolute.
    pub fn to_px(&self, pt_to_px: f64) -> Option<f64> {
        match self.unit {
            LengthUnit::Px => Some(self.value),
            LengthUnit::Pt => Some(self.value * pt_to_px),
            _ => None,
        }
    }
}

/// Format a number without a trailing `.0`, keeping at most two decimals.
pub fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        return format!("{}", value.round() as i64);
    }
    let s = format!("{:.2}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Format a pixel value (`12px`, `13.5px`).
pub fn format_px(value: f64) -> String {
    format!("{}px", format_number(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let style = StyleMap::parse("color: red; font-size:12px;").unwrap();
        assert_eq!(style.len(), 2);
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.get("font-size"), Some("12px"));
        assert_eq!(style.to_string(), "color:red;font-size:12px");
    }

    #[test]
    fn test_parse_data_uri_value() {
        let style =
            StyleMap::parse("background-image:url(data:image/png;base64,AAAA);color:#fff")
                .unwrap();
        assert_eq!(
            style.get("background-image"),
            Some("url(data:image/png;base64,AAAA)")
        );
        assert_eq!(style.get("color"), Some("#fff"));
    }

    #[test]
    fn test_parse_quoted_semicolon() {
        let style = StyleMap::parse("font-family:\"A;B\", serif").unwrap();
        assert_eq!(style.get("font-family"), Some("\"A;B\", serif"));
    }

    #[test]
    fn test_parse_duplicates_last_wins_first_position() {
        let style = StyleMap::parse("width:10px;color:red;width:20px").unwrap();
        assert_eq!(style.get("width"), Some("20px"));
        assert_eq!(style.position("width"), Some(0));
        assert_eq!(style.len(), 2);
    }

    #[test]
    fn test_parse_important() {
        let style = StyleMap::parse("color: white ! IMPORTANT").unwrap();
        let decl = style.declaration("color").unwrap();
        assert_eq!(decl.value, "white");
        assert!(decl.important);
        assert_eq!(style.to_string(), "color:white !important");
    }

    #[test]
    fn test_parse_failures() {
        assert!(StyleMap::parse("color red").is_err());
        assert!(StyleMap::parse("color:").is_err());
        assert!(StyleMap::parse("font-family:'open").is_err());
        assert!(StyleMap::parse("width:calc(100% - 2px").is_err());
        assert!(StyleMap::parse("1width:2px").is_err());
    }

    #[test]
    fn test_empty_style() {
        let style = StyleMap::parse("  ;; ").unwrap();
        assert!(style.is_empty());
        assert_eq!(Style::Parsed(style).to_attribute(), None);
    }

    #[test]
    fn test_float_word_in_value_is_not_a_float() {
        let style = StyleMap::parse("text-align:left;background:url(left.png)").unwrap();
        assert!(!style.contains("float"));
    }

    #[test]
    fn test_set_and_set_after() {
        let mut style = StyleMap::parse("line-height:20px;color:red").unwrap();
        style.set("color", "blue");
        style.set_after("line-height", "mso-line-height-rule", "exactly");
        assert_eq!(
            style.to_string(),
            "line-height:20px;mso-line-height-rule:exactly;color:blue"
        );

        style.set_after("line-height", "mso-line-height-rule", "exactly");
        assert_eq!(style.len(), 3);
    }

    #[test]
    fn test_contains_family() {
        let style = StyleMap::parse("margin-top:4px;padding-left:2px").unwrap();
        assert!(style.contains_family("margin"));
        assert!(style.contains_family("padding"));
        assert!(!style.contains_family("border"));

        let style = StyleMap::parse("margins:1px").unwrap();
        assert!(!style.contains_family("margin"));
    }

    #[test]
    fn test_unparsable_style_is_preserved() {
        let style = Style::from_attribute(Some("color red"));
        assert!(style.is_unparsable());
        assert!(style.map().is_none());
        assert_eq!(style.to_attribute(), Some("color red".to_string()));
    }

    #[test]
    fn test_length_parse() {
        assert_eq!(Length::parse("12px"), Some(Length::px(12.0)));
        assert_eq!(Length::parse(" 9PT ").unwrap().unit, LengthUnit::Pt);
        assert_eq!(Length::parse("1.5").unwrap().unit, LengthUnit::Unitless);
        assert_eq!(Length::parse(".5em").unwrap().value, 0.5);
        assert_eq!(Length::parse("120%").unwrap().unit, LengthUnit::Percent);
        assert!(Length::parse("normal").is_none());
        assert!(Length::parse("12vw").is_none());
    }

    #[test]
    fn test_format_px() {
        assert_eq!(format_px(12.0), "12px");
        assert_eq!(format_px(13.5), "13.5px");
        assert_eq!(format_px(13.333), "13.33px");
        assert_eq!(format_px(10.999_999_999_9), "11px");
    }
}

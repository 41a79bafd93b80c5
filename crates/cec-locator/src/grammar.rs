//! Locator grammar
//!
//! A locator string is either `window`, `document`, or a list of selector
//! scopes separated by the boundary marker. The marker is attached to the
//! host segment and followed by one space. Splitting is aware of quotes,
//! brackets and parentheses, so a marker inside `[id="..."]` is plain text.

use std::fmt;
use std::str::FromStr;

use crate::LocatorError;

/// Boundary marker between a host and the scope inside its shadow root
pub const SHADOW_BOUNDARY: &str = ":shadow-root";

/// Locator of the global scope
pub const WINDOW: &str = "window";

/// Locator of the document root
pub const DOCUMENT: &str = "document";

/// Parsed locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Window,
    Document,
    Element(ShadowPath),
}

/// Selector scopes, outermost first. Every scope but the last addresses a
/// shadow host; the last addresses the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowPath {
    scopes: Vec<String>,
}

impl ShadowPath {
    /// Build a path from selector scopes, outermost first
    pub fn new<I, S>(scopes: I) -> Result<Self, LocatorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scopes: Vec<String> = scopes
            .into_iter()
            .map(|s| {
                let s: String = s.into();
                s.trim().to_string()
            })
            .collect();
        if scopes.is_empty() {
            return Err(LocatorError::Empty);
        }
        if let Some(index) = scopes.iter().position(String::is_empty) {
            return Err(LocatorError::EmptyScope { index });
        }
        Ok(Self { scopes })
    }

    /// Selector scopes, outermost first
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Number of shadow boundaries crossed
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Selector of the target inside the innermost scope
    pub fn target_selector(&self) -> &str {
        self.scopes.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for ShadowPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, scope) in self.scopes.iter().enumerate() {
            if i > 0 {
                write!(f, "{} ", SHADOW_BOUNDARY)?;
            }
            f.write_str(scope)?;
        }
        Ok(())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Window => f.write_str(WINDOW),
            Locator::Document => f.write_str(DOCUMENT),
            Locator::Element(path) => fmt::Display::fmt(path, f),
        }
    }
}

impl FromStr for Locator {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(LocatorError::Empty),
            WINDOW => Ok(Locator::Window),
            DOCUMENT => Ok(Locator::Document),
            text => Ok(Locator::Element(ShadowPath::new(split_scopes(text)?)?)),
        }
    }
}

/// Escape a value for a double-quoted attribute selector
pub fn escape_attribute_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn is_boundary(text: &str, pos: usize) -> bool {
    let rest = &text[pos..];
    rest.starts_with(SHADOW_BOUNDARY)
        && rest[SHADOW_BOUNDARY.len()..]
            .chars()
            .next()
            .is_none_or(char::is_whitespace)
}

fn split_scopes(text: &str) -> Result<Vec<&str>, LocatorError> {
    let mut scopes = Vec::new();
    let mut start = 0;
    let mut quote: Option<(char, usize)> = None;
    let mut open: Vec<char> = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        if let Some((q, _)) = quote {
            if c == '\\' {
                chars.next();
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\\' => {
                chars.next();
            }
            '"' | '\'' => quote = Some((c, pos)),
            '[' | '(' => open.push(c),
            ']' | ')' => {
                let expected = if c == ']' { '[' } else { '(' };
                if open.pop() != Some(expected) {
                    return Err(LocatorError::Unbalanced { position: pos, found: c });
                }
            }
            ':' if open.is_empty() && is_boundary(text, pos) => {
                scopes.push(&text[start..pos]);
                start = pos + SHADOW_BOUNDARY.len();
                while chars.next_if(|&(i, _)| i < start).is_some() {}
            }
            _ => {}
        }
    }

    if let Some((_, position)) = quote {
        return Err(LocatorError::UnterminatedString { position });
    }
    if let Some(&delimiter) = open.last() {
        return Err(LocatorError::Unclosed { delimiter });
    }
    scopes.push(&text[start..]);
    Ok(scopes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(text: &str) -> Vec<String> {
        match text.parse::<Locator>().unwrap() {
            Locator::Element(path) => path.scopes().to_vec(),
            other => panic!("expected element locator, got {other:?}"),
        }
    }

    #[test]
    fn test_special_targets() {
        assert_eq!("window".parse::<Locator>(), Ok(Locator::Window));
        assert_eq!(" document ".parse::<Locator>(), Ok(Locator::Document));
        assert_eq!(Locator::Window.to_string(), "window");
        assert_eq!("".parse::<Locator>(), Err(LocatorError::Empty));
    }

    #[test]
    fn test_split_on_boundaries() {
        assert_eq!(
            scopes("a:nth-child(1):shadow-root b:nth-child(2):shadow-root c"),
            vec!["a:nth-child(1)", "b:nth-child(2)", "c"]
        );
        assert_eq!(scopes("div > p"), vec!["div > p"]);
    }

    #[test]
    fn test_boundary_inside_quotes_is_text() {
        let text = r#"[id="x:shadow-root y"]:shadow-root span"#;
        assert_eq!(scopes(text), vec![r#"[id="x:shadow-root y"]"#, "span"]);

        let escaped = r#"[id="a\":shadow-root b"]"#;
        assert_eq!(scopes(escaped), vec![escaped]);
    }

    #[test]
    fn test_marker_needs_following_space() {
        assert_eq!(scopes("x:shadow-rooted"), vec!["x:shadow-rooted"]);
        assert_eq!(
            "x:shadow-root".parse::<Locator>(),
            Err(LocatorError::EmptyScope { index: 1 })
        );
    }

    #[test]
    fn test_display_round_trip() {
        let path = ShadowPath::new(["x-app:nth-child(1)", r#"[id="buy"]"#]).unwrap();
        let text = Locator::Element(path.clone()).to_string();
        assert_eq!(text, r#"x-app:nth-child(1):shadow-root [id="buy"]"#);
        assert_eq!(text.parse(), Ok(Locator::Element(path)));
    }

    #[test]
    fn test_malformed_text() {
        assert_eq!(
            r#"[id="open"#.parse::<Locator>(),
            Err(LocatorError::UnterminatedString { position: 4 })
        );
        assert_eq!(
            "div)".parse::<Locator>(),
            Err(LocatorError::Unbalanced { position: 3, found: ')' })
        );
        assert_eq!(
            "li:nth-child(2".parse::<Locator>(),
            Err(LocatorError::Unclosed { delimiter: '(' })
        );
        assert_eq!(
            ":shadow-root span".parse::<Locator>(),
            Err(LocatorError::EmptyScope { index: 0 })
        );
    }

    #[test]
    fn test_escape_attribute_value() {
        assert_eq!(escape_attribute_value(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(escape_attribute_value("plain"), "plain");
    }
}

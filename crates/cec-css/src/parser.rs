//! Selector Parser
//!
//! Hand-written recursive-descent parser for the selector subset in
//! `selectors`. Identifiers and attribute values honour CSS backslash
//! escapes, so `#a\.b` and `[id="a\"b"]` both work.

use crate::CssError;
use crate::selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, SelectorComponent, SelectorList, SelectorPart,
};

/// Parse a comma-separated selector list
pub fn parse_selector_list(input: &str) -> Result<SelectorList, CssError> {
    let mut parser = Parser::new(input);
    let list = parser.parse_list()?;
    tracing::trace!(selector = input, groups = list.0.len(), "parsed selector");
    Ok(list)
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> CssError {
        CssError::InvalidSelector {
            selector: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn unsupported(&self, feature: impl Into<String>) -> CssError {
        CssError::Unsupported {
            selector: self.source.to_string(),
            feature: feature.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), CssError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{}` at offset {}", expected, self.pos)))
        }
    }

    /// Skip whitespace, reporting whether any was present
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse_list(&mut self) -> Result<SelectorList, CssError> {
        let mut groups = Vec::new();
        loop {
            self.skip_whitespace();
            groups.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(',') => {
                    self.pos += 1;
                }
                Some(c) => return Err(self.error(format!("unexpected `{}`", c))),
            }
        }
        Ok(SelectorList(groups))
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, CssError> {
        let mut parts = vec![SelectorPart {
            compound: self.parse_compound()?,
            combinator: None,
        }];

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_space => Combinator::Descendant,
                Some(c) => return Err(self.error(format!("unexpected `{}`", c))),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_whitespace();
            }
            parts.push(SelectorPart {
                compound: self.parse_compound()?,
                combinator: Some(combinator),
            });
        }

        Ok(ComplexSelector { parts })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, CssError> {
        let mut components = Vec::new();

        loop {
            match self.peek() {
                Some('*') if components.is_empty() => {
                    self.pos += 1;
                    components.push(SelectorComponent::Universal);
                }
                Some('#') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Id(self.parse_ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Class(self.parse_ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Attribute(self.parse_attribute()?));
                }
                Some(':') => {
                    self.pos += 1;
                    components.push(SelectorComponent::PseudoClass(self.parse_pseudo()?));
                }
                Some(c) if components.is_empty() && self.starts_ident(c) => {
                    let tag = self.parse_ident()?;
                    components.push(SelectorComponent::Type(tag.to_ascii_lowercase()));
                }
                _ => break,
            }
        }

        if components.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.error(format!("expected a selector, found `{}`", c)),
                None => self.error("expected a selector"),
            });
        }
        Ok(CompoundSelector { components })
    }

    fn starts_ident(&self, c: char) -> bool {
        match c {
            '-' => self
                .peek_at(1)
                .is_some_and(|n| is_name_start(n) || n == '-' || n == '\\'),
            '\\' => true,
            _ => is_name_start(c),
        }
    }

    fn parse_ident(&mut self) -> Result<String, CssError> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                out.push(self.parse_escape()?);
            } else if is_name_char(c) {
                self.pos += 1;
                out.push(c);
            } else {
                break;
            }
        }
        if out.is_empty() {
            return Err(self.error(format!("expected an identifier at offset {}", self.pos)));
        }
        Ok(out)
    }

    /// Escape body after a backslash: hex code point or a literal char
    fn parse_escape(&mut self) -> Result<char, CssError> {
        let Some(first) = self.peek() else {
            return Err(self.error("dangling escape"));
        };
        if !first.is_ascii_hexdigit() {
            self.pos += 1;
            return Ok(first);
        }

        let mut code = 0u32;
        let mut digits = 0;
        while digits < 6 {
            match self.peek().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    code = code * 16 + d;
                    self.pos += 1;
                    digits += 1;
                }
                None => break,
            }
        }
        // A single whitespace terminates a hex escape
        if self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        Ok(char::from_u32(code)
            .filter(|&c| c != '\0')
            .unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn parse_string(&mut self) -> Result<String, CssError> {
        let quote = self.bump().ok_or_else(|| self.error("expected a string"))?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some('\\') => match self.peek() {
                    // Escaped newline is a line continuation
                    Some('\n') => {
                        self.pos += 1;
                    }
                    Some(_) => out.push(self.parse_escape()?),
                    None => return Err(self.error("unterminated string")),
                },
                Some(c) if c == quote => break,
                Some(c) => out.push(c),
            }
        }
        Ok(out)
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, CssError> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        if self.eat(']') {
            return Ok(AttributeSelector {
                name,
                matcher: None,
                case_insensitive: false,
            });
        }

        let op = match self.bump() {
            Some('=') => '=',
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                self.expect('=')?;
                c
            }
            _ => return Err(self.error("expected an attribute operator")),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some('"' | '\'') => self.parse_string()?,
            _ => self.parse_ident()?,
        };
        self.skip_whitespace();

        let mut case_insensitive = false;
        if let Some(flag @ ('i' | 'I' | 's' | 'S')) = self.peek() {
            self.pos += 1;
            case_insensitive = flag.eq_ignore_ascii_case(&'i');
            self.skip_whitespace();
        }
        self.expect(']')?;

        let matcher = match op {
            '=' => AttributeMatcher::Exact(value),
            '~' => AttributeMatcher::Contains(value),
            '|' => AttributeMatcher::DashMatch(value),
            '^' => AttributeMatcher::Prefix(value),
            '$' => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };

        Ok(AttributeSelector {
            name,
            matcher: Some(matcher),
            case_insensitive,
        })
    }

    fn parse_pseudo(&mut self) -> Result<PseudoClass, CssError> {
        if self.peek() == Some(':') {
            return Err(self.unsupported("pseudo-elements"));
        }
        let name = self.parse_ident()?.to_ascii_lowercase();

        let pseudo = match name.as_str() {
            "root" => PseudoClass::Root,
            "empty" => PseudoClass::Empty,
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "nth-child" => PseudoClass::NthChild(self.parse_nth_argument()?),
            "nth-last-child" => PseudoClass::NthLastChild(self.parse_nth_argument()?),
            "nth-of-type" => PseudoClass::NthOfType(self.parse_nth_argument()?),
            "not" => {
                self.expect('(')?;
                self.skip_whitespace();
                let inner = self.parse_compound()?;
                self.skip_whitespace();
                self.expect(')')?;
                PseudoClass::Not(Box::new(inner))
            }
            other => return Err(self.unsupported(format!(":{}", other))),
        };
        Ok(pseudo)
    }

    fn parse_nth_argument(&mut self) -> Result<NthExpression, CssError> {
        self.expect('(')?;
        let start = self.pos;
        while self.peek().is_some_and(|c| c != ')') {
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        self.expect(')')?;
        NthExpression::parse(&raw).ok_or_else(|| self.error(format!("invalid An+B `{}`", raw)))
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

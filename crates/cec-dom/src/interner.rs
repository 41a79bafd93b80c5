//! String Interner - Deduplicate strings to save memory
//!
//! Tag names ("div", "span", "p") and attribute names ("class", "id")
//! are stored once and referenced by ID.

use std::collections::HashMap;

use crate::{DomError, DomResult};

/// Interned string ID - just 4 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct InternedString(pub u32);

impl InternedString {
    /// Empty string
    pub const EMPTY: InternedString = InternedString(0);
}

/// String interner for deduplicating names
#[derive(Debug)]
pub struct StringInterner {
    strings: Vec<Box<str>>,
    map: HashMap<Box<str>, u32>,
}

impl StringInterner {
    /// Create a new interner with common HTML names pre-interned
    pub fn new() -> Self {
        let mut interner = Self {
            strings: Vec::with_capacity(128),
            map: HashMap::with_capacity(128),
        };

        // Index 0 is always the empty string
        const COMMON: &[&str] = &[
            "", "html", "head", "body", "div", "span", "p", "a", "ul", "li",
            "button", "input", "form", "section", "slot", "template",
            "id", "class", "style", "href", "type", "name", "value",
        ];
        for (idx, name) in (0u32..).zip(COMMON) {
            interner.strings.push((*name).into());
            interner.map.insert((*name).into(), idx);
        }

        interner
    }

    /// Intern a string, returning its ID.
    /// Fails once every `u32` id is in use.
    pub fn intern(&mut self, s: &str) -> DomResult<InternedString> {
        if let Some(&idx) = self.map.get(s) {
            return Ok(InternedString(idx));
        }
        let idx = Self::next_id(self.strings.len())?;
        self.strings.push(s.into());
        self.map.insert(s.into(), idx);
        Ok(InternedString(idx))
    }

    fn next_id(len: usize) -> DomResult<u32> {
        u32::try_from(len).map_err(|_| DomError::InternerFull)
    }

    /// Look up a string without interning it
    pub fn lookup(&self, s: &str) -> Option<InternedString> {
        self.map.get(s).map(|&idx| InternedString(idx))
    }

    /// Get the string for an interned ID
    #[inline]
    pub fn get(&self, id: InternedString) -> &str {
        self.strings.get(id.0 as usize).map(|s| &**s).unwrap_or("")
    }

    /// Number of interned strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedup() {
        let mut interner = StringInterner::new();
        let id1 = interner.intern("my-widget").unwrap();
        let id2 = interner.intern("my-widget").unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_get_string() {
        let mut interner = StringInterner::new();
        let id = interner.intern("x-panel").unwrap();
        assert_eq!(interner.get(id), "x-panel");
        assert_eq!(interner.get(InternedString::EMPTY), "");
    }

    #[test]
    fn test_lookup_does_not_intern() {
        let interner = StringInterner::new();
        assert!(interner.lookup("div").is_some());
        assert!(interner.lookup("never-seen").is_none());
    }

    #[test]
    fn test_ids_past_u32_are_refused() {
        assert_eq!(StringInterner::next_id(7).unwrap(), 7);
        assert_eq!(StringInterner::next_id(u32::MAX as usize).unwrap(), u32::MAX);
        if let Some(past) = (u32::MAX as usize).checked_add(1) {
            assert_eq!(StringInterner::next_id(past), Err(DomError::InternerFull));
        }
    }

    #[test]
    fn test_common_names_are_pre_interned() {
        let mut interner = StringInterner::new();
        let before = interner.len();
        assert_eq!(interner.intern("").unwrap(), InternedString::EMPTY);
        interner.intern("body").unwrap();
        assert_eq!(interner.len(), before);
    }
}

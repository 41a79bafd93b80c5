//! cec CSS Selectors
//!
//! Selector parsing and matching over a `cec-dom` tree. Queries are scoped
//! to one tree (the document or a shadow root) and never pierce shadow
//! boundaries.

mod matching;
mod parser;
mod query;
pub mod selectors;

pub use parser::parse_selector_list;
pub use query::{matches, query_selector, query_selector_all, query_selector_anchored};
pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, SelectorComponent, SelectorList, SelectorPart,
};

/// Selector error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CssError {
    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Unsupported selector feature `{feature}` in `{selector}`")]
    Unsupported { selector: String, feature: String },
}

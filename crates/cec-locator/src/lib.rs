//! cec Locators
//!
//! Serializable addresses for event targets. A locator names the window,
//! the document, or an element reached through any number of open shadow
//! roots:
//!
//! ```text
//! html:nth-child(1) > body:nth-child(2) > x-app:nth-child(1):shadow-root [id="buy"]
//! ```
//!
//! [`generate`] produces the string on the capture side, [`resolve`] turns
//! it back into a live target on the replay side. Resolution never fails;
//! anything it cannot find becomes [`EventTarget::Window`](cec_dom::EventTarget).

mod generate;
mod grammar;
mod resolve;

pub use generate::{element_segment, generate, generate_locator};
pub use grammar::{DOCUMENT, Locator, SHADOW_BOUNDARY, ShadowPath, WINDOW, escape_attribute_value};
pub use resolve::{resolve, resolve_locator, try_resolve};

use cec_css::CssError;

/// Locator text that cannot be split into shadow scopes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocatorError {
    #[error("Empty locator")]
    Empty,

    #[error("Empty selector in shadow scope {index}")]
    EmptyScope { index: usize },

    #[error("Unterminated string starting at byte {position}")]
    UnterminatedString { position: usize },

    #[error("Unbalanced `{found}` at byte {position}")]
    Unbalanced { position: usize, found: char },

    #[error("Unclosed `{delimiter}`")]
    Unclosed { delimiter: char },
}

/// Why a locator did not resolve to an element
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Malformed locator: {0}")]
    Malformed(#[from] LocatorError),

    #[error(transparent)]
    InvalidSelector(#[from] CssError),

    #[error("Could not find element with selector `{selector}` in scope {scope}")]
    NoMatch { scope: usize, selector: String },

    #[error("Element matching `{selector}` has no open shadow root")]
    MissingShadowRoot { selector: String },
}

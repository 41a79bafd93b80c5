//! cec HTML Parser
//!
//! HTML5 parsing built on html5ever. Declarative shadow roots
//! (`<template shadowrootmode>`) become real shadow roots on their host.

mod parser;

pub use parser::HtmlParser;

use cec_dom::Document;

/// Parse an HTML string into a document at `about:blank`
pub fn parse(html: &str) -> Result<Document, HtmlError> {
    HtmlParser::new().parse(html)
}

/// HTML parse error
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("Failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to build DOM: {0}")]
    Dom(#[from] cec_dom::DomError),
}

//! cec command line
//!
//! Offline helpers around the devtools panel: read exported event files
//! with the panel's filters, and check locators against saved HTML.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cec_css::{SelectorList, parse_selector_list};
use cec_devtools::{CustomEventPayload, EventRow, Panel, Settings};
use cec_dom::{Document, DomTree, EventTarget, NodeId};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cec")]
#[command(about = "Inspect captured custom events and shadow-DOM locators", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the events of an exported JSON file
    Events {
        file: PathBuf,

        /// Keep events whose type contains this text
        #[arg(long = "type")]
        event_type: Option<String>,

        /// Keep events whose detail JSON contains this text
        #[arg(long)]
        detail: Option<String>,

        /// Print the filtered events as JSON instead of rows
        #[arg(long)]
        json: bool,
    },

    /// Print the locator of the first element matching a CSS selector
    Locate { html: PathBuf, selector: String },

    /// Resolve a locator against an HTML file
    Resolve { html: PathBuf, locator: String },
}

/// Run one command and return what it prints
pub fn run(cli: Cli) -> Result<String> {
    match cli.cmd {
        Commands::Events {
            file,
            event_type,
            detail,
            json,
        } => {
            let events = load_events(&file)?;
            events_report(events, event_type, detail, json)
        }
        Commands::Locate { html, selector } => {
            let document = load_html(&html)?;
            locate(&document, &selector)
        }
        Commands::Resolve { html, locator } => {
            let document = load_html(&html)?;
            describe_resolution(&document, &locator)
        }
    }
}

/// Read a panel export
pub fn load_events(path: &Path) -> Result<Vec<CustomEventPayload>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let events = serde_json::from_str(&text)
        .with_context(|| format!("{} is not an event export", path.display()))?;
    Ok(events)
}

/// Read and parse an HTML file, declarative shadow roots included
pub fn load_html(path: &Path) -> Result<Document> {
    let html = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let document = cec_html::HtmlParser::new()
        .parse_with_url(&html, &format!("file://{}", path.display()))
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(document)
}

/// Filter events the way the panel does and render them
pub fn events_report(
    events: Vec<CustomEventPayload>,
    event_type: Option<String>,
    detail: Option<String>,
    json: bool,
) -> Result<String> {
    let mut panel = Panel::new(None, &Settings::default());
    for event in events {
        panel.add_event(event);
    }
    panel.set_type_filter(event_type.unwrap_or_default());
    panel.set_detail_filter(detail.unwrap_or_default());
    tracing::debug!(
        total = panel.events().len(),
        visible = panel.visible_events().len(),
        "events filtered"
    );

    if json {
        return Ok(panel.export_json(panel.can_export_filtered())?);
    }
    Ok(panel.rows().iter().map(format_row).collect::<Vec<_>>().join("\n"))
}

fn format_row(row: &EventRow) -> String {
    format!(
        "{}  {}  {}  {}  {}",
        row.time, row.event_type, row.target, row.initiator, row.detail
    )
}

/// Locator of the first element matching `selector`, open shadow trees included
pub fn locate(document: &Document, selector: &str) -> Result<String> {
    let list = parse_selector_list(selector)
        .with_context(|| format!("invalid selector {selector:?}"))?;
    let tree = document.tree();
    let element = find_deep(tree, tree.root(), &list)
        .with_context(|| format!("no element matches {selector:?}"))?;
    cec_locator::generate(tree, element.into())
        .with_context(|| format!("element matching {selector:?} has no locator"))
}

/// Pre-order search entering open shadow roots right after their host
fn find_deep(tree: &DomTree, scope: NodeId, list: &SelectorList) -> Option<NodeId> {
    for element in tree.descendants(scope) {
        if list.matches(tree, element) {
            return Some(element);
        }
        if let Some(found) = tree
            .shadow_root(element)
            .and_then(|shadow| find_deep(tree, shadow, list))
        {
            return Some(found);
        }
    }
    None
}

/// `window`, `document`, or the element's tag and canonical locator
pub fn describe_resolution(document: &Document, locator: &str) -> Result<String> {
    let tree = document.tree();
    let target = cec_locator::try_resolve(tree, Some(locator))
        .with_context(|| format!("locator {locator:?} does not resolve"))?;
    Ok(match target {
        EventTarget::Window => cec_locator::WINDOW.to_string(),
        EventTarget::Node(node) if node == NodeId::ROOT => cec_locator::DOCUMENT.to_string(),
        EventTarget::Node(node) => {
            let tag = tree.tag_name(node).unwrap_or("#node");
            let canonical = cec_locator::generate(tree, target).unwrap_or_default();
            format!("<{tag}> {canonical}")
        }
    })
}

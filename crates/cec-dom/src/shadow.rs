//! Shadow DOM
//!
//! Shadow root bookkeeping. The shadow root itself is an arena node; its
//! children form a separate tree that ordinary parent/child traversal from
//! the host never reaches.

use crate::NodeId;

/// Shadow root mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowRootMode {
    #[default]
    Open,
    Closed,
}

impl ShadowRootMode {
    /// Parse the `shadowrootmode` attribute value
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Data carried by a shadow root node
#[derive(Debug, Clone)]
pub struct ShadowRootData {
    /// Host element
    pub host: NodeId,
    pub mode: ShadowRootMode,
    pub delegates_focus: bool,
}

impl ShadowRootData {
    /// Create shadow root data for `host`
    pub fn new(host: NodeId, mode: ShadowRootMode) -> Self {
        Self {
            host,
            mode,
            delegates_focus: false,
        }
    }

    /// Whether script can reach this root through its host
    pub fn is_open(&self) -> bool {
        self.mode == ShadowRootMode::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_root_mode_parse() {
        assert_eq!(ShadowRootMode::parse("open"), Some(ShadowRootMode::Open));
        assert_eq!(ShadowRootMode::parse(" Closed "), Some(ShadowRootMode::Closed));
        assert_eq!(ShadowRootMode::parse("sideways"), None);
    }

    #[test]
    fn test_shadow_root_data() {
        let shadow = ShadowRootData::new(NodeId(3), ShadowRootMode::Closed);
        assert_eq!(shadow.host, NodeId(3));
        assert!(!shadow.is_open());
    }
}

//! Badge and icon state
//!
//! The toolbar badge shows how many events a tab produced; its colour and
//! the toolbar icon reflect whether capture is on.

/// Badge background while capturing
pub const CAPTURING_COLOR: &str = "#dc2626";
/// Badge background while paused
pub const PAUSED_COLOR: &str = "#9ca3af";
/// Badge text colour
pub const TEXT_COLOR: &str = "#ffffff";
/// Icon sizes shipped in `icons/`
pub const ICON_SIZES: [u32; 5] = [16, 32, 48, 64, 128];

/// Badge rendering for one tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeState {
    pub text: String,
    pub background: &'static str,
    pub text_color: &'static str,
}

impl BadgeState {
    pub fn new(count: usize, capturing: bool) -> Self {
        Self {
            text: badge_text(count),
            background: if capturing { CAPTURING_COLOR } else { PAUSED_COLOR },
            text_color: TEXT_COLOR,
        }
    }

    /// Whether the badge shows anything
    pub fn is_visible(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Empty for zero, the count up to 99, then `99+`
pub fn badge_text(count: usize) -> String {
    match count {
        0 => String::new(),
        1..=99 => count.to_string(),
        _ => "99+".to_string(),
    }
}

/// Toolbar icon paths by size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSet {
    paths: Vec<(u32, String)>,
}

impl IconSet {
    pub fn new(capturing: bool) -> Self {
        let suffix = if capturing { "" } else { "-gray" };
        Self {
            paths: ICON_SIZES
                .iter()
                .map(|size| (*size, format!("icons/icon-{size}{suffix}.png")))
                .collect(),
        }
    }

    /// Path of the icon for `size`
    pub fn path(&self, size: u32) -> Option<&str> {
        self.paths
            .iter()
            .find(|(s, _)| *s == size)
            .map(|(_, path)| path.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.paths.iter().map(|(size, path)| (*size, path.as_str()))
    }
}

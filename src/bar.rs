//! Status bar seam. The manager does not draw anything itself; it publishes
//! a snapshot of what a bar would show whenever the relevant state changes,
//! and a bar implementation renders it however it likes.

/// Everything a bar needs to render one monitor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarSnapshot {
    pub monitor: usize,
    /// Whether this monitor currently holds the selection.
    pub selected: bool,
    pub tags: Vec<TagIndicator>,
    pub layout_symbol: String,
    /// Title of the monitor's selected client, empty when none.
    pub title: String,
    /// Root name text, shown on the selected monitor only.
    pub status: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagIndicator {
    pub active: bool,
    pub occupied: bool,
    pub urgent: bool,
}

pub trait StatusBar {
    fn publish(&mut self, snapshot: &BarSnapshot);
}

/// Bar that renders nothing. The work-area reservation still applies, so
/// an external bar process can occupy the strip.
#[derive(Debug, Default)]
pub struct NullBar;

impl StatusBar for NullBar {
    fn publish(&mut self, _snapshot: &BarSnapshot) {}
}

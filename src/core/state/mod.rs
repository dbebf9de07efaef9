mod arrange;
mod focus;
mod outputs;
mod registry;
mod tags;

use std::collections::HashMap;

use crate::bar::{BarSnapshot, StatusBar, TagIndicator};
use crate::config::Config;
use crate::core::{Client, Monitor, Rect, WindowId};

/// The whole manager state: the client arena plus per-monitor lists.
///
/// Clients live in `clients` and are referenced by id from exactly one
/// monitor's `clients` list and `stack` at any time. The mutation
/// methods across this module's submodules preserve that invariant;
/// everything that moves a client between monitors detaches from both
/// lists first and reattaches to both.
pub struct Wm {
    pub config: Config,
    pub clients: HashMap<WindowId, Client>,
    pub monitors: Vec<Monitor>,
    pub selmon: usize,
    pub screen: (i32, i32),
    pub status: String,
    pub bar: Box<dyn StatusBar>,
}

impl Wm {
    pub fn new(config: Config, bar: Box<dyn StatusBar>) -> Self {
        Self {
            config,
            clients: HashMap::new(),
            monitors: Vec::new(),
            selmon: 0,
            screen: (0, 0),
            status: String::new(),
            bar,
        }
    }

    pub fn client(&self, win: WindowId) -> Option<&Client> {
        self.clients.get(&win)
    }

    pub fn client_mut(&mut self, win: WindowId) -> Option<&mut Client> {
        self.clients.get_mut(&win)
    }

    pub fn selected(&self) -> Option<WindowId> {
        self.monitors.get(self.selmon)?.sel
    }

    /// A client is visible when its tag is the active tag of its monitor.
    pub fn is_visible(&self, win: WindowId) -> bool {
        self.client(win)
            .is_some_and(|c| c.tag == self.monitors[c.monitor].active_tag())
    }

    /// Visible clients of a monitor in list (tiling) order.
    pub fn visible_on(&self, mon: usize) -> Vec<WindowId> {
        self.monitors[mon]
            .clients
            .iter()
            .copied()
            .filter(|w| self.is_visible(*w))
            .collect()
    }

    /// Visible non-floating clients of a monitor in list order; these are
    /// the windows the layouts place.
    pub fn tiled_on(&self, mon: usize) -> Vec<WindowId> {
        self.monitors[mon]
            .clients
            .iter()
            .copied()
            .filter(|w| {
                self.is_visible(*w) && self.client(*w).is_some_and(|c| !c.floating)
            })
            .collect()
    }

    /// Monitor containing the point, falling back to the selected one.
    pub fn monitor_at(&self, x: i32, y: i32) -> usize {
        self.monitors
            .iter()
            .position(|m| m.rect.contains(x, y))
            .unwrap_or(self.selmon)
    }

    /// Monitor with the largest overlap with `rect`. With no overlap at
    /// all the selected monitor stands.
    pub fn rect_to_monitor(&self, rect: Rect) -> usize {
        let mut best = self.selmon;
        let mut area = 0;
        for m in &self.monitors {
            let a = m.rect.intersection_area(&rect);
            if a > area {
                area = a;
                best = m.num;
            }
        }
        best
    }

    pub fn set_status(&mut self, text: String) {
        self.status = text;
        self.refresh_bars();
    }

    /// Publish a fresh snapshot for every monitor's bar.
    pub fn refresh_bars(&mut self) {
        for m in 0..self.monitors.len() {
            let snapshot = self.bar_snapshot(m);
            self.bar.publish(&snapshot);
        }
    }

    pub fn bar_snapshot(&self, mon: usize) -> BarSnapshot {
        let m = &self.monitors[mon];
        let tags = (0..m.tags.len())
            .map(|t| TagIndicator {
                active: t == m.active_tag(),
                occupied: m
                    .clients
                    .iter()
                    .any(|w| self.client(*w).is_some_and(|c| c.tag == t)),
                urgent: m
                    .clients
                    .iter()
                    .any(|w| self.client(*w).is_some_and(|c| c.tag == t && c.urgent)),
            })
            .collect();
        BarSnapshot {
            monitor: mon,
            selected: mon == self.selmon,
            tags,
            layout_symbol: m.active_tag_state().symbol.clone(),
            title: m
                .sel
                .and_then(|w| self.client(w))
                .map(|c| c.title.clone())
                .unwrap_or_default(),
            status: if mon == self.selmon {
                self.status.clone()
            } else {
                String::new()
            },
        }
    }
}

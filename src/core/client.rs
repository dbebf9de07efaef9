use super::geom::{Rect, SizeHints};

/// Stable handle for a top-level window, assigned by the display server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// One managed top-level window. Owned by the session's client arena and
/// referenced by id from exactly one monitor's client list and focus stack.
#[derive(Debug, Clone)]
pub struct Client {
    pub win: WindowId,
    pub title: String,
    pub rect: Rect,
    pub prev_rect: Rect,
    pub border: i32,
    pub old_border: i32,
    pub hints: SizeHints,
    pub tag: usize,
    pub monitor: usize,
    pub floating: bool,
    pub prev_floating: bool,
    pub fixed: bool,
    pub urgent: bool,
    pub never_focus: bool,
    pub fullscreen: bool,
}

impl Client {
    pub fn new(win: WindowId, rect: Rect, old_border: i32) -> Self {
        Self {
            win,
            title: String::new(),
            rect,
            prev_rect: rect,
            border: 0,
            old_border,
            hints: SizeHints::default(),
            tag: 0,
            monitor: 0,
            floating: false,
            prev_floating: false,
            fixed: false,
            urgent: false,
            never_focus: false,
            fullscreen: false,
        }
    }

    /// Outer width including both border edges.
    pub fn total_width(&self) -> i32 {
        self.rect.w + 2 * self.border
    }

    pub fn total_height(&self) -> i32 {
        self.rect.h + 2 * self.border
    }

    pub fn set_hints(&mut self, hints: SizeHints) {
        self.fixed = hints.is_fixed();
        self.hints = hints;
    }
}

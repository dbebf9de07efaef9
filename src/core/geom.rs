#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Area of the intersection with `other`, zero when disjoint.
    pub fn intersection_area(&self, other: &Rect) -> i64 {
        let w = (self.right().min(other.right()) - self.x.max(other.x)).max(0) as i64;
        let h = (self.bottom().min(other.bottom()) - self.y.max(other.y)).max(0) as i64;
        w * h
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Size constraints read from a window's normal hints. Missing hints are
/// all-zero, which every clamp below treats as "unconstrained".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizeHints {
    pub base_w: i32,
    pub base_h: i32,
    pub inc_w: i32,
    pub inc_h: i32,
    pub max_w: i32,
    pub max_h: i32,
    pub min_w: i32,
    pub min_h: i32,
    pub min_aspect: f32,
    pub max_aspect: f32,
}

impl SizeHints {
    /// A window whose min and max sizes coincide cannot be resized; such
    /// windows are managed as floating.
    pub fn is_fixed(&self) -> bool {
        self.max_w > 0
            && self.min_w > 0
            && self.max_h > 0
            && self.min_h > 0
            && self.max_w == self.min_w
            && self.max_h == self.min_h
    }
}

/// Canonicalize a proposed geometry against screen bounds and, for floating
/// clients, the ICCCM size constraints.
///
/// `bounds` is the whole-display rect in interactive mode and the owning
/// monitor's work area otherwise; either way the result keeps at least one
/// pixel of the window inside it. `min_dim` (the bar height) is the floor
/// for both dimensions so tiling can never produce zero-height slivers.
///
/// Returns the resolved rect and whether it differs from `current`. The
/// function is idempotent: resolving its own output yields no change.
pub fn resolve(
    hints: &SizeHints,
    floating: bool,
    border: i32,
    current: Rect,
    proposed: Rect,
    bounds: Rect,
    interactive: bool,
    min_dim: i32,
) -> (Rect, bool) {
    let mut x = proposed.x;
    let mut y = proposed.y;
    let mut w = proposed.w.max(1);
    let mut h = proposed.h.max(1);
    let total_w = w + 2 * border;
    let total_h = h + 2 * border;

    if interactive {
        if x > bounds.right() {
            x = bounds.right() - total_w;
        }
        if y > bounds.bottom() {
            y = bounds.bottom() - total_h;
        }
        if x + total_w < 0 {
            x = 0;
        }
        if y + total_h < 0 {
            y = 0;
        }
    } else {
        if x >= bounds.right() {
            x = bounds.right() - total_w;
        }
        if y >= bounds.bottom() {
            y = bounds.bottom() - total_h;
        }
        if x + total_w <= bounds.x {
            x = bounds.x;
        }
        if y + total_h <= bounds.y {
            y = bounds.y;
        }
    }
    if h < min_dim {
        h = min_dim;
    }
    if w < min_dim {
        w = min_dim;
    }

    if floating {
        // ICCCM 4.1.2.3: aspect and increment math run against
        // base-relative sizes, except when the base size doubles as the
        // minimum, in which case the subtraction happens after the aspect
        // correction.
        let base_is_min = hints.base_w == hints.min_w && hints.base_h == hints.min_h;
        if !base_is_min {
            w -= hints.base_w;
            h -= hints.base_h;
        }
        if hints.min_aspect > 0.0 && hints.max_aspect > 0.0 {
            if hints.max_aspect < w as f32 / h as f32 {
                w = (h as f32 * hints.max_aspect + 0.5) as i32;
            } else if hints.min_aspect < h as f32 / w as f32 {
                h = (w as f32 * hints.min_aspect + 0.5) as i32;
            }
        }
        if base_is_min {
            w -= hints.base_w;
            h -= hints.base_h;
        }
        if hints.inc_w > 0 {
            w -= w % hints.inc_w;
        }
        if hints.inc_h > 0 {
            h -= h % hints.inc_h;
        }
        w = (w + hints.base_w).max(hints.min_w);
        h = (h + hints.base_h).max(hints.min_h);
        if hints.max_w > 0 {
            w = w.min(hints.max_w);
        }
        if hints.max_h > 0 {
            h = h.min(hints.max_h);
        }
    }

    let resolved = Rect::new(x, y, w, h);
    (resolved, resolved != current)
}

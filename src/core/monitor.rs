use super::client::WindowId;
use super::geom::Rect;
use super::tag::TagState;

/// One physical output with its own workspace set, client list, and focus
/// stack. `clients` is tiling/insertion order (head is the master slot);
/// `stack` is focus recency order (head is most recently focused).
#[derive(Debug, Clone)]
pub struct Monitor {
    pub num: usize,
    pub rect: Rect,
    pub work: Rect,
    pub bar_y: i32,
    pub show_bar: bool,
    /// Current and previous active tag, indexed by `slot`. Keeping both
    /// makes "view last" a slot flip instead of extra bookkeeping.
    pub active: [usize; 2],
    pub slot: usize,
    pub tags: Vec<TagState>,
    pub clients: Vec<WindowId>,
    pub stack: Vec<WindowId>,
    pub sel: Option<WindowId>,
}

impl Monitor {
    pub fn new(num: usize, tag_count: usize, mfact: f32, nmaster: u32, show_bar: bool) -> Self {
        Self {
            num,
            rect: Rect::default(),
            work: Rect::default(),
            bar_y: 0,
            show_bar,
            active: [0, 0],
            slot: 0,
            tags: (0..tag_count).map(|_| TagState::new(mfact, nmaster)).collect(),
            clients: Vec::new(),
            stack: Vec::new(),
            sel: None,
        }
    }

    pub fn active_tag(&self) -> usize {
        self.active[self.slot]
    }

    pub fn previous_tag(&self) -> usize {
        self.active[self.slot ^ 1]
    }

    pub fn active_tag_state(&self) -> &TagState {
        &self.tags[self.active_tag()]
    }

    pub fn active_tag_state_mut(&mut self) -> &mut TagState {
        let tag = self.active_tag();
        &mut self.tags[tag]
    }

    /// Recompute the work area from the full rect and bar visibility.
    /// The bar reserves `bar_height` pixels at the top edge when shown.
    pub fn update_work_area(&mut self, bar_height: i32) {
        self.work = self.rect;
        if self.show_bar {
            self.work.h -= bar_height;
            self.bar_y = self.work.y;
            self.work.y += bar_height;
        } else {
            self.bar_y = -bar_height;
        }
    }
}

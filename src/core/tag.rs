/// Layout policies the arrange pass can apply to a monitor's tiled clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Tile,
    Monocle,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 2] = [LayoutKind::Tile, LayoutKind::Monocle];

    pub fn symbol(self) -> &'static str {
        match self {
            LayoutKind::Tile => "[0-0]",
            LayoutKind::Monocle => "[0]",
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The other of the two layouts, used when a select request carries an
    /// out-of-range index.
    pub fn toggled(self) -> Self {
        match self {
            LayoutKind::Tile => LayoutKind::Monocle,
            LayoutKind::Monocle => LayoutKind::Tile,
        }
    }
}

/// Per-workspace arrangement state. Every monitor owns one `TagState` per
/// configured tag, so layout tweaks on one output never leak to another.
#[derive(Debug, Clone)]
pub struct TagState {
    /// `None` leaves clients where they are (no arrange pass).
    pub layout: Option<LayoutKind>,
    pub symbol: String,
    pub mfact: f32,
    pub nmaster: u32,
}

impl TagState {
    pub fn new(mfact: f32, nmaster: u32) -> Self {
        let layout = LayoutKind::Tile;
        Self {
            layout: Some(layout),
            symbol: layout.symbol().to_string(),
            mfact,
            nmaster,
        }
    }
}

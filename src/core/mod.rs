pub mod client;
pub mod geom;
pub mod monitor;
pub mod rules;
pub mod state;
pub mod tag;

pub use client::{Client, WindowId};
pub use geom::{Rect, SizeHints};
pub use monitor::Monitor;
pub use rules::{apply_rules, Placement, Rule};
pub use state::Wm;
pub use tag::{LayoutKind, TagState};

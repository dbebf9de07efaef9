use crate::core::{Rect, WindowId};

/// Keysym/modifier pair as delivered by the display server. Interpretation
/// of the values is the backend's business; the dispatcher only compares
/// them against the configured binding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub keysym: u32,
    pub modifiers: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonPress {
    pub button: u8,
    pub modifiers: u32,
}

/// Window properties the core reacts to when they change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Title,
    SizeHints,
    WindowHints,
    TransientFor,
    WindowType,
    /// Root window name, used as the status text.
    Status,
}

/// Protocol messages clients send to the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessageKind {
    SetFullscreen,
    UnsetFullscreen,
    ToggleFullscreen,
    ActivateWindow,
}

/// Typed notifications delivered by the display server, one at a time, in
/// arrival order. The dispatcher routes each to exactly one handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    MapRequest {
        window: WindowId,
    },
    UnmapNotify {
        window: WindowId,
        /// Synthetic unmaps announce an orderly withdrawal rather than a
        /// destroyed window.
        synthetic: bool,
    },
    DestroyNotify {
        window: WindowId,
    },
    ConfigureRequest {
        window: WindowId,
        rect: Rect,
        border: Option<i32>,
        mask: ConfigureMask,
    },
    /// Root geometry changed (display resolution or output topology).
    DisplayChanged {
        width: i32,
        height: i32,
    },
    PropertyChanged {
        window: WindowId,
        property: Property,
        deleted: bool,
    },
    PointerEntered {
        window: WindowId,
        x_root: i32,
        y_root: i32,
    },
    PointerMotion {
        x_root: i32,
        y_root: i32,
        /// Server timestamp in milliseconds, used for drag rate limiting.
        time: u32,
    },
    ButtonPressed {
        window: WindowId,
        press: ButtonPress,
        x_root: i32,
        y_root: i32,
    },
    ButtonReleased,
    KeyPressed {
        press: KeyPress,
    },
    FocusChanged {
        window: WindowId,
    },
    ClientMessage {
        window: WindowId,
        kind: ClientMessageKind,
    },
    MappingChanged {
        keyboard: bool,
    },
    Expose {
        window: WindowId,
        remaining: u32,
    },
}

/// Which fields of a configure request the client actually set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigureMask {
    pub x: bool,
    pub y: bool,
    pub w: bool,
    pub h: bool,
}

impl Notification {
    /// Notification classes still serviced while a drag loop owns the
    /// pointer. Everything else waits until the drag finishes.
    pub fn allowed_while_dragging(&self) -> bool {
        matches!(
            self,
            Notification::ConfigureRequest { .. }
                | Notification::Expose { .. }
                | Notification::MapRequest { .. }
                | Notification::PointerMotion { .. }
                | Notification::ButtonReleased
        )
    }
}

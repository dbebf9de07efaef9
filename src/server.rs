use thiserror::Error;

use crate::core::{Rect, SizeHints, WindowId};
use crate::event::Notification;

/// Errors surfaced by the display server.
///
/// `WindowGone` is the enumerated benign race: the window disappeared
/// between our decision and the request reaching the server. Handlers
/// swallow it and carry on. Everything else is a protocol-level failure
/// and tears the event loop down.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("window {0} vanished")]
    WindowGone(WindowId),
    #[error("display connection closed")]
    ConnectionClosed,
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ServerError {
    pub fn is_benign(&self) -> bool {
        matches!(self, ServerError::WindowGone(_))
    }
}

/// Ignore the vanished-window race on a fire-and-forget server call.
pub fn allow_gone(result: Result<(), ServerError>) -> Result<(), ServerError> {
    match result {
        Err(e) if e.is_benign() => {
            tracing::debug!("Ignoring benign server race: {}", e);
            Ok(())
        }
        other => other,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WindowAttributes {
    pub rect: Rect,
    pub border: i32,
    pub override_redirect: bool,
    pub viewable: bool,
}

/// Urgency/input fields of a window's hints.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowHints {
    pub urgent: bool,
    /// `Some(false)` marks a window that never accepts input focus.
    pub input: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderKind {
    Normal,
    Selected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragCursor {
    Move,
    Resize,
}

/// Capability contract with the display server. The concrete transport is
/// a collaborator; the core only depends on this trait, which also allows
/// mocking the whole server in tests.
pub trait Connection {
    // Queries
    fn screen_size(&self) -> (i32, i32);
    fn outputs(&self) -> Result<Vec<Rect>, ServerError>;
    /// Windows that already exist at startup, non-transients first.
    fn existing_windows(&self) -> Result<Vec<WindowId>, ServerError>;
    fn window_attributes(&self, win: WindowId) -> Result<WindowAttributes, ServerError>;
    fn window_title(&self, win: WindowId) -> Option<String>;
    /// (class, instance) identity used for rule matching.
    fn window_class(&self, win: WindowId) -> Option<(String, String)>;
    fn size_hints(&self, win: WindowId) -> SizeHints;
    fn window_hints(&self, win: WindowId) -> WindowHints;
    fn transient_for(&self, win: WindowId) -> Option<WindowId>;
    fn is_dialog(&self, win: WindowId) -> bool;
    fn wants_fullscreen(&self, win: WindowId) -> bool;
    fn pointer_position(&self) -> Result<(i32, i32), ServerError>;
    fn status_text(&self) -> Option<String>;
    /// Handle of the status-bar collaborator's window on a monitor, the
    /// stacking anchor tiled clients are kept beneath.
    fn bar_anchor(&self, monitor: usize) -> Option<WindowId>;

    // Commands
    fn apply_geometry(&self, win: WindowId, rect: Rect, border: i32) -> Result<(), ServerError>;
    fn move_window(&self, win: WindowId, x: i32, y: i32) -> Result<(), ServerError>;
    fn set_border_width(&self, win: WindowId, width: i32) -> Result<(), ServerError>;
    fn set_border(&self, win: WindowId, kind: BorderKind) -> Result<(), ServerError>;
    fn raise(&self, win: WindowId) -> Result<(), ServerError>;
    fn lower(&self, win: WindowId) -> Result<(), ServerError>;
    fn stack_below(&self, win: WindowId, sibling: WindowId) -> Result<(), ServerError>;
    fn focus_window(&self, win: WindowId) -> Result<(), ServerError>;
    fn focus_root(&self) -> Result<(), ServerError>;
    fn map(&self, win: WindowId) -> Result<(), ServerError>;
    /// Synthetic configure notification confirming the managed geometry.
    fn send_configure(&self, win: WindowId, rect: Rect, border: i32) -> Result<(), ServerError>;
    fn set_withdrawn(&self, win: WindowId, withdrawn: bool) -> Result<(), ServerError>;
    /// Advertise the fullscreen state on the window so the client can
    /// adapt its rendering.
    fn set_fullscreen_state(&self, win: WindowId, fullscreen: bool) -> Result<(), ServerError>;
    fn clear_urgency(&self, win: WindowId) -> Result<(), ServerError>;
    fn grab_buttons(&self, win: WindowId, focused: bool) -> Result<(), ServerError>;
    fn ungrab_buttons(&self, win: WindowId) -> Result<(), ServerError>;
    fn grab_keys(&self) -> Result<(), ServerError>;
    /// Polite close via the delete protocol; `Ok(false)` means the window
    /// does not speak it and the caller should force-kill.
    fn send_delete(&self, win: WindowId) -> Result<bool, ServerError>;
    fn force_kill(&self, win: WindowId) -> Result<(), ServerError>;
    /// Exclusive pointer capture for a drag. `Ok(false)` means another
    /// grab is already held; the drag must abort with no state change.
    fn grab_pointer(&self, cursor: DragCursor) -> Result<bool, ServerError>;
    fn ungrab_pointer(&self) -> Result<(), ServerError>;
    fn warp_pointer(&self, win: WindowId, x: i32, y: i32) -> Result<(), ServerError>;
    /// Discard pointer-enter notifications queued as a side effect of
    /// restacking, so focus-follows-pointer does not feed back.
    fn drain_pointer_entries(&self) -> Result<(), ServerError>;

    // Event stream
    fn next_event(&mut self) -> Result<Notification, ServerError>;
    /// Blocking read restricted to the drag allow-list; other
    /// notifications stay queued for the outer loop.
    fn next_drag_event(&mut self) -> Result<Notification, ServerError>;
}

//! The event loop: routes server notifications to state mutations and
//! owns the interactive move/resize drags.

use crate::bar::StatusBar;
use crate::config::{Action, Config};
use crate::core::{Rect, WindowId, Wm};
use crate::event::Notification;
use crate::server::{allow_gone, Connection, DragCursor, ServerError};
use crate::spawn;

/// Minimum milliseconds between processed drag motions, ~60Hz.
const DRAG_INTERVAL_MS: u32 = 1000 / 60;

pub struct Dispatcher<C: Connection> {
    conn: C,
    wm: Wm,
    running: bool,
}

impl<C: Connection> Dispatcher<C> {
    pub fn new(conn: C, config: Config, bar: Box<dyn StatusBar>) -> Self {
        Self {
            conn,
            wm: Wm::new(config, bar),
            running: false,
        }
    }

    /// One-time startup: build the monitor list, grab the bound keys,
    /// and adopt windows that already exist.
    pub fn setup(&mut self) -> Result<(), ServerError> {
        self.wm.reconcile_outputs(&self.conn)?;
        self.conn.grab_keys()?;
        let status = self.conn.status_text().unwrap_or_default();
        self.wm.set_status(status);
        self.wm.focus(&self.conn, None)?;
        self.scan()?;
        Ok(())
    }

    /// Adopt pre-existing viewable windows, as after a manager restart.
    fn scan(&mut self) -> Result<(), ServerError> {
        for win in self.conn.existing_windows()? {
            match self.conn.window_attributes(win) {
                Ok(attrs) if !attrs.override_redirect && attrs.viewable => {
                    self.wm.manage(&self.conn, win)?;
                }
                Ok(_) | Err(ServerError::WindowGone(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    pub fn run(&mut self) -> Result<(), ServerError> {
        self.running = true;
        tracing::info!("Entering event loop");
        while self.running {
            let event = match self.conn.next_event() {
                Ok(e) => e,
                Err(ServerError::ConnectionClosed) => break,
                Err(e) => return Err(e),
            };
            self.handle(event)?;
        }
        tracing::info!("Leaving event loop");
        Ok(())
    }

    fn handle(&mut self, event: Notification) -> Result<(), ServerError> {
        match event {
            Notification::MapRequest { window } => match self.conn.window_attributes(window) {
                Ok(attrs) if !attrs.override_redirect => self.wm.manage(&self.conn, window),
                Ok(_) | Err(ServerError::WindowGone(_)) => Ok(()),
                Err(e) => Err(e),
            },
            Notification::UnmapNotify { window, synthetic } => {
                if self.wm.client(window).is_none() {
                    return Ok(());
                }
                if synthetic {
                    allow_gone(self.conn.set_withdrawn(window, true))
                } else {
                    self.wm.unmanage(&self.conn, window, false)
                }
            }
            Notification::DestroyNotify { window } => self.wm.unmanage(&self.conn, window, true),
            Notification::ConfigureRequest {
                window,
                rect,
                border,
                mask,
            } => self.configure_request(window, rect, border, mask),
            Notification::DisplayChanged { width, height } => {
                let size_changed = self.wm.screen != (width, height);
                let dirty = self.wm.reconcile_outputs(&self.conn)?;
                if dirty || size_changed {
                    let fullscreen: Vec<(WindowId, Rect)> = self
                        .wm
                        .clients
                        .iter()
                        .filter(|(_, c)| c.fullscreen)
                        .map(|(w, c)| (*w, self.wm.monitors[c.monitor].rect))
                        .collect();
                    for (w, r) in fullscreen {
                        self.wm.resize_client(&self.conn, w, r)?;
                    }
                    self.wm.focus(&self.conn, None)?;
                    self.wm.arrange(&self.conn, None)?;
                    self.wm.refresh_bars();
                }
                Ok(())
            }
            Notification::PropertyChanged {
                window,
                property,
                deleted,
            } => {
                use crate::event::Property;
                if property == Property::Status {
                    let status = self.conn.status_text().unwrap_or_default();
                    self.wm.set_status(status);
                    return Ok(());
                }
                if deleted || self.wm.client(window).is_none() {
                    return Ok(());
                }
                match property {
                    Property::Title => {
                        self.wm.update_title(&self.conn, window);
                        Ok(())
                    }
                    Property::SizeHints => {
                        self.wm.update_size_hints(&self.conn, window);
                        Ok(())
                    }
                    Property::WindowHints => self.wm.update_window_hints(&self.conn, window),
                    Property::TransientFor => self.wm.update_transient(&self.conn, window),
                    Property::WindowType => self.wm.update_window_type(&self.conn, window),
                    Property::Status => Ok(()),
                }
            }
            Notification::PointerEntered {
                window,
                x_root,
                y_root,
            } => self.pointer_crossed(Some(window), x_root, y_root),
            Notification::PointerMotion { x_root, y_root, .. } => {
                self.pointer_crossed(None, x_root, y_root)
            }
            Notification::ButtonPressed { window, press, .. } => {
                if self.wm.client(window).is_some() {
                    if let Some(mon) = self.wm.client(window).map(|c| c.monitor) {
                        if mon != self.wm.selmon {
                            if let Some(sel) = self.wm.selected() {
                                self.wm.unfocus(&self.conn, sel, true)?;
                            }
                            self.wm.selmon = mon;
                        }
                    }
                    self.wm.focus(&self.conn, Some(window))?;
                    self.wm.restack(&self.conn, self.wm.selmon)?;
                }
                let action = self
                    .wm
                    .config
                    .buttons
                    .iter()
                    .find(|b| b.button == press.button && b.modifiers == press.modifiers)
                    .map(|b| b.action.clone());
                match action {
                    Some(a) => self.perform(&a),
                    None => Ok(()),
                }
            }
            Notification::ButtonReleased => Ok(()),
            Notification::KeyPressed { press } => {
                let action = self
                    .wm
                    .config
                    .keys
                    .iter()
                    .find(|k| k.keysym == press.keysym && k.modifiers == press.modifiers)
                    .map(|k| k.action.clone());
                match action {
                    Some(a) => self.perform(&a),
                    None => Ok(()),
                }
            }
            Notification::FocusChanged { window } => {
                // Some clients steal focus; give it back to the selection.
                if let Some(sel) = self.wm.selected() {
                    if window != sel && !self.wm.client(sel).is_some_and(|c| c.never_focus) {
                        allow_gone(self.conn.focus_window(sel))?;
                    }
                }
                Ok(())
            }
            Notification::ClientMessage { window, kind } => self.client_message(window, kind),
            Notification::MappingChanged { keyboard } => {
                if keyboard {
                    self.conn.grab_keys()?;
                }
                Ok(())
            }
            Notification::Expose { remaining, .. } => {
                if remaining == 0 {
                    self.wm.refresh_bars();
                }
                Ok(())
            }
        }
    }

    pub fn perform(&mut self, action: &Action) -> Result<(), ServerError> {
        tracing::debug!("Performing {:?}", action);
        match action {
            Action::FocusStack(dir) => self.wm.focus_stack(&self.conn, *dir),
            Action::FocusMonitor(dir) => self.wm.focus_monitor(&self.conn, *dir),
            Action::MoveToMonitor(dir) => {
                if self.wm.monitors.len() < 2 {
                    return Ok(());
                }
                let target = self.wm.dir_to_monitor(*dir);
                match self.wm.selected() {
                    Some(sel) => self.wm.send_to_monitor(&self.conn, sel, target),
                    None => Ok(()),
                }
            }
            Action::ViewTag(tag) => self.wm.view(&self.conn, *tag),
            Action::ViewLast => self.wm.view_last(&self.conn),
            Action::CycleView(dir) => self.wm.cycle_view(&self.conn, *dir),
            Action::AssignTag(tag) => self.wm.assign_tag(&self.conn, *tag),
            Action::IncMasterCount(delta) => self.wm.inc_master_count(&self.conn, *delta),
            Action::SetMasterFraction(f) => self.wm.set_master_fraction(&self.conn, *f),
            Action::SetLayout(index) => self.wm.set_layout(&self.conn, *index),
            Action::ToggleFloating => self.wm.toggle_floating(&self.conn),
            Action::ToggleBar => self.wm.toggle_bar(&self.conn),
            Action::Zoom => self.wm.zoom(&self.conn),
            Action::Kill => self.kill(),
            Action::Spawn(cmd) => {
                spawn::spawn(cmd);
                Ok(())
            }
            Action::MoveMouse => self.drag_move(),
            Action::ResizeMouse => self.drag_resize(),
            Action::Quit => {
                self.running = false;
                Ok(())
            }
        }
    }

    fn pointer_crossed(
        &mut self,
        window: Option<WindowId>,
        x_root: i32,
        y_root: i32,
    ) -> Result<(), ServerError> {
        let managed = window.filter(|w| self.wm.client(*w).is_some());
        match managed {
            Some(w) => {
                let mon = self.wm.client(w).map(|c| c.monitor).unwrap_or(self.wm.selmon);
                if mon != self.wm.selmon {
                    if let Some(sel) = self.wm.selected() {
                        self.wm.unfocus(&self.conn, sel, true)?;
                    }
                    self.wm.selmon = mon;
                } else if Some(w) == self.wm.selected() {
                    return Ok(());
                }
                self.wm.focus(&self.conn, Some(w))
            }
            None => {
                let mon = self.wm.monitor_at(x_root, y_root);
                if mon != self.wm.selmon {
                    if let Some(sel) = self.wm.selected() {
                        self.wm.unfocus(&self.conn, sel, true)?;
                    }
                    self.wm.selmon = mon;
                    self.wm.focus(&self.conn, None)?;
                }
                Ok(())
            }
        }
    }

    /// Configure requests from managed tiled clients are answered with
    /// their actual geometry; floating clients get what they asked for,
    /// interpreted relative to their monitor. Unmanaged windows are
    /// passed through untouched.
    fn configure_request(
        &mut self,
        window: WindowId,
        rect: Rect,
        border: Option<i32>,
        mask: crate::event::ConfigureMask,
    ) -> Result<(), ServerError> {
        let Some(c) = self.wm.client(window) else {
            match self.conn.window_attributes(window) {
                Ok(attrs) => {
                    let mut r = attrs.rect;
                    if mask.x {
                        r.x = rect.x;
                    }
                    if mask.y {
                        r.y = rect.y;
                    }
                    if mask.w {
                        r.w = rect.w;
                    }
                    if mask.h {
                        r.h = rect.h;
                    }
                    allow_gone(
                        self.conn
                            .apply_geometry(window, r, border.unwrap_or(attrs.border)),
                    )?;
                }
                Err(ServerError::WindowGone(_)) => {}
                Err(e) => return Err(e),
            }
            return Ok(());
        };

        let mon = c.monitor;
        let floating =
            c.floating || self.wm.monitors[mon].active_tag_state().layout.is_none();
        if let Some(b) = border {
            if let Some(c) = self.wm.client_mut(window) {
                c.border = b;
            }
        } else if floating {
            let mrect = self.wm.monitors[mon].rect;
            let mut r = self.wm.client(window).map(|c| c.rect).unwrap_or_default();
            let prev = r;
            if mask.x {
                r.x = mrect.x + rect.x;
            }
            if mask.y {
                r.y = mrect.y + rect.y;
            }
            if mask.w {
                r.w = rect.w;
            }
            if mask.h {
                r.h = rect.h;
            }
            let (tw, th) = self
                .wm
                .client(window)
                .map(|c| (r.w + 2 * c.border, r.h + 2 * c.border))
                .unwrap_or((r.w, r.h));
            if r.x + r.w > mrect.right() {
                r.x = mrect.x + (mrect.w / 2 - tw / 2);
            }
            if r.y + r.h > mrect.bottom() {
                r.y = mrect.y + (mrect.h / 2 - th / 2);
            }
            let c_border = self.wm.client(window).map(|c| c.border).unwrap_or(0);
            if let Some(c) = self.wm.client_mut(window) {
                c.prev_rect = prev;
                c.rect = r;
            }
            if (mask.x || mask.y) && !(mask.w || mask.h) {
                allow_gone(self.conn.send_configure(window, r, c_border))?;
            }
            if self.wm.is_visible(window) {
                allow_gone(self.conn.apply_geometry(window, r, c_border))?;
            }
        } else {
            let (r, b) = self
                .wm
                .client(window)
                .map(|c| (c.rect, c.border))
                .unwrap_or_default();
            allow_gone(self.conn.send_configure(window, r, b))?;
        }
        Ok(())
    }

    fn client_message(
        &mut self,
        window: WindowId,
        kind: crate::event::ClientMessageKind,
    ) -> Result<(), ServerError> {
        use crate::event::ClientMessageKind::*;
        if self.wm.client(window).is_none() {
            return Ok(());
        }
        match kind {
            SetFullscreen => self.wm.set_fullscreen(&self.conn, window, true),
            UnsetFullscreen => self.wm.set_fullscreen(&self.conn, window, false),
            ToggleFullscreen => {
                let on = !self.wm.client(window).is_some_and(|c| c.fullscreen);
                self.wm.set_fullscreen(&self.conn, window, on)
            }
            ActivateWindow => {
                if Some(window) != self.wm.selected() {
                    if let Some(c) = self.wm.client_mut(window) {
                        c.urgent = true;
                    }
                    self.wm.refresh_bars();
                }
                Ok(())
            }
        }
    }

    fn kill(&mut self) -> Result<(), ServerError> {
        let Some(sel) = self.wm.selected() else {
            return Ok(());
        };
        match self.conn.send_delete(sel) {
            Ok(true) => Ok(()),
            Ok(false) => allow_gone(self.conn.force_kill(sel)),
            Err(e) if e.is_benign() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Interactive move. The pointer is grabbed for the duration; only
    /// the drag allow-list of notifications is serviced, and motions are
    /// rate limited by their server timestamps. The window snaps to the
    /// work-area edges, a tiled window breaks out into floating once
    /// dragged further than the snap distance, and the window migrates
    /// to whichever monitor holds most of it when the button goes up.
    fn drag_move(&mut self) -> Result<(), ServerError> {
        let Some(win) = self.wm.selected() else {
            return Ok(());
        };
        if self.wm.client(win).is_some_and(|c| c.fullscreen) {
            return Ok(());
        }
        self.wm.restack(&self.conn, self.wm.selmon)?;
        let Some(origin) = self.wm.client(win).map(|c| c.rect) else {
            return Ok(());
        };
        if !self.conn.grab_pointer(DragCursor::Move)? {
            return Ok(());
        }
        let (px, py) = self.conn.pointer_position()?;
        let mut last_time = 0u32;
        loop {
            match self.conn.next_drag_event()? {
                Notification::ButtonReleased => break,
                Notification::PointerMotion {
                    x_root,
                    y_root,
                    time,
                } => {
                    if time.wrapping_sub(last_time) <= DRAG_INTERVAL_MS {
                        continue;
                    }
                    last_time = time;
                    let Some((cur, tw, th, floating)) = self
                        .wm
                        .client(win)
                        .map(|c| (c.rect, c.total_width(), c.total_height(), c.floating))
                    else {
                        continue;
                    };
                    let work = self.wm.monitors[self.wm.selmon].work;
                    let snap = self.wm.config.snap;
                    let mut nx = origin.x + (x_root - px);
                    let mut ny = origin.y + (y_root - py);
                    if work.contains(nx, ny) {
                        if (work.x - nx).abs() < snap {
                            nx = work.x;
                        } else if (work.right() - (nx + tw)).abs() < snap {
                            nx = work.right() - tw;
                        }
                        if (work.y - ny).abs() < snap {
                            ny = work.y;
                        } else if (work.bottom() - (ny + th)).abs() < snap {
                            ny = work.bottom() - th;
                        }
                    }
                    let layout = self.wm.monitors[self.wm.selmon].active_tag_state().layout;
                    if !floating
                        && layout.is_some()
                        && ((nx - cur.x).abs() > snap || (ny - cur.y).abs() > snap)
                    {
                        self.wm.toggle_floating(&self.conn)?;
                    }
                    let floating = self.wm.client(win).is_some_and(|c| c.floating);
                    if layout.is_none() || floating {
                        self.wm
                            .resize(&self.conn, win, Rect::new(nx, ny, cur.w, cur.h), true)?;
                    }
                }
                other => self.handle(other)?,
            }
        }
        self.conn.ungrab_pointer()?;
        self.finish_drag(win)
    }

    /// Interactive resize, anchored at the window's top-left corner.
    /// The pointer is warped to the bottom-right corner so the new size
    /// tracks it directly; no snapping applies.
    fn drag_resize(&mut self) -> Result<(), ServerError> {
        let Some(win) = self.wm.selected() else {
            return Ok(());
        };
        if self.wm.client(win).is_some_and(|c| c.fullscreen) {
            return Ok(());
        }
        self.wm.restack(&self.conn, self.wm.selmon)?;
        let Some((origin, border)) = self.wm.client(win).map(|c| (c.rect, c.border)) else {
            return Ok(());
        };
        if !self.conn.grab_pointer(DragCursor::Resize)? {
            return Ok(());
        }
        allow_gone(self.conn.warp_pointer(
            win,
            origin.w + border - 1,
            origin.h + border - 1,
        ))?;
        let mut last_time = 0u32;
        loop {
            match self.conn.next_drag_event()? {
                Notification::ButtonReleased => break,
                Notification::PointerMotion {
                    x_root,
                    y_root,
                    time,
                } => {
                    if time.wrapping_sub(last_time) <= DRAG_INTERVAL_MS {
                        continue;
                    }
                    last_time = time;
                    let Some((cur, cborder, floating)) = self
                        .wm
                        .client(win)
                        .map(|c| (c.rect, c.border, c.floating))
                    else {
                        continue;
                    };
                    let nw = (x_root - origin.x - 2 * cborder + 1).max(1);
                    let nh = (y_root - origin.y - 2 * cborder + 1).max(1);
                    let work = self.wm.monitors[self.wm.selmon].work;
                    let layout = self.wm.monitors[self.wm.selmon].active_tag_state().layout;
                    let inside = cur.x + nw >= work.x
                        && cur.x + nw <= work.right()
                        && cur.y + nh >= work.y
                        && cur.y + nh <= work.bottom();
                    if inside
                        && !floating
                        && layout.is_some()
                        && ((nw - cur.w).abs() > self.wm.config.snap
                            || (nh - cur.h).abs() > self.wm.config.snap)
                    {
                        self.wm.toggle_floating(&self.conn)?;
                    }
                    let floating = self.wm.client(win).is_some_and(|c| c.floating);
                    if layout.is_none() || floating {
                        self.wm
                            .resize(&self.conn, win, Rect::new(cur.x, cur.y, nw, nh), true)?;
                    }
                }
                other => self.handle(other)?,
            }
        }
        if let Some((rect, border)) = self.wm.client(win).map(|c| (c.rect, c.border)) {
            allow_gone(self.conn.warp_pointer(
                win,
                rect.w + border - 1,
                rect.h + border - 1,
            ))?;
        }
        self.conn.ungrab_pointer()?;
        self.conn.drain_pointer_entries()?;
        self.finish_drag(win)
    }

    /// After a drag the window may sit mostly on another monitor; if so
    /// it moves there and the selection follows.
    fn finish_drag(&mut self, win: WindowId) -> Result<(), ServerError> {
        let Some(rect) = self.wm.client(win).map(|c| c.rect) else {
            return Ok(());
        };
        let target = self.wm.rect_to_monitor(rect);
        if target != self.wm.selmon {
            self.wm.send_to_monitor(&self.conn, win, target)?;
            self.wm.selmon = target;
            self.wm.focus(&self.conn, None)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bar::NullBar;
    use crate::config::{ButtonBinding, KeyBinding};
    use crate::core::state::testing::put_client;
    use crate::event::{ButtonPress, ClientMessageKind, ConfigureMask, KeyPress};
    use crate::server::mock::{MockConnection, MockWindow, Op};

    fn dispatcher(outputs: usize, conn: MockConnection) -> Dispatcher<MockConnection> {
        let mut d = Dispatcher::new(conn, Config::default(), Box::new(NullBar));
        d.wm.screen = (1280 * outputs as i32, 800);
        for i in 0..outputs {
            let mut m = crate::core::Monitor::new(i, 9, 0.5, 1, true);
            m.rect = Rect::new(1280 * i as i32, 0, 1280, 800);
            m.update_work_area(20);
            d.wm.monitors.push(m);
        }
        d
    }

    #[test]
    fn test_setup_builds_monitors_and_adopts_existing_windows() {
        let conn = MockConnection::new()
            .with_outputs(vec![Rect::new(0, 0, 1280, 800)])
            .with_window(1, MockWindow::default())
            .with_window(
                2,
                MockWindow {
                    override_redirect: true,
                    ..Default::default()
                },
            );
        let mut d = Dispatcher::new(conn, Config::default(), Box::new(NullBar));
        d.setup().expect("setup");
        assert_eq!(d.wm.monitors.len(), 1);
        assert!(d.wm.client(WindowId(1)).is_some());
        // Override-redirect windows are never managed.
        assert!(d.wm.client(WindowId(2)).is_none());
        assert!(d.conn.recorded().contains(&Op::GrabKeys));
    }

    #[test]
    fn test_run_manages_map_request_and_drains_queue() {
        let mut conn = MockConnection::new().with_window(1, MockWindow::default());
        conn.push_event(Notification::MapRequest { window: WindowId(1) });
        let mut d = dispatcher(1, conn);
        d.run().expect("run");
        assert!(d.wm.client(WindowId(1)).is_some());
        assert_eq!(d.wm.selected(), Some(WindowId(1)));
    }

    #[test]
    fn test_key_binding_dispatches_action() {
        let mut config = Config::default();
        config.keys.push(KeyBinding {
            keysym: 0x33,
            modifiers: 64,
            action: Action::ViewTag(2),
        });
        let mut conn = MockConnection::new();
        conn.push_event(Notification::KeyPressed {
            press: KeyPress {
                keysym: 0x33,
                modifiers: 64,
            },
        });
        let mut d = Dispatcher::new(conn, config, Box::new(NullBar));
        let mut m = crate::core::Monitor::new(0, 9, 0.5, 1, true);
        m.rect = Rect::new(0, 0, 1280, 800);
        m.update_work_area(20);
        d.wm.monitors.push(m);
        d.wm.screen = (1280, 800);
        d.run().expect("run");
        assert_eq!(d.wm.monitors[0].active_tag(), 2);
    }

    #[test]
    fn test_unbound_key_is_ignored() {
        let mut conn = MockConnection::new();
        conn.push_event(Notification::KeyPressed {
            press: KeyPress {
                keysym: 0x99,
                modifiers: 0,
            },
        });
        let mut d = dispatcher(1, conn);
        d.run().expect("run");
    }

    #[test]
    fn test_button_press_focuses_clicked_client_and_runs_binding() {
        let mut config = Config::default();
        config.buttons.push(ButtonBinding {
            button: 1,
            modifiers: 64,
            action: Action::Zoom,
        });
        let conn = MockConnection::new()
            .with_window(1, MockWindow::default())
            .with_window(2, MockWindow::default());
        let mut d = Dispatcher::new(conn, config, Box::new(NullBar));
        let mut m = crate::core::Monitor::new(0, 9, 0.5, 1, true);
        m.rect = Rect::new(0, 0, 1280, 800);
        m.update_work_area(20);
        d.wm.monitors.push(m);
        d.wm.screen = (1280, 800);
        let a = put_client(&mut d.wm, 1, 0, 0);
        let b = put_client(&mut d.wm, 2, 0, 0);
        assert_eq!(d.wm.monitors[0].clients, vec![b, a]);

        d.handle(Notification::ButtonPressed {
            window: a,
            press: ButtonPress {
                button: 1,
                modifiers: 64,
            },
            x_root: 50,
            y_root: 50,
        })
        .expect("handle");
        // Focused by the click, then zoomed to the master slot.
        assert_eq!(d.wm.selected(), Some(a));
        assert_eq!(d.wm.monitors[0].clients, vec![a, b]);
    }

    #[test]
    fn test_enter_notification_moves_focus() {
        let conn = MockConnection::new()
            .with_window(1, MockWindow::default())
            .with_window(2, MockWindow::default());
        let mut d = dispatcher(1, conn);
        let a = put_client(&mut d.wm, 1, 0, 0);
        put_client(&mut d.wm, 2, 0, 0);

        d.handle(Notification::PointerEntered {
            window: a,
            x_root: 100,
            y_root: 100,
        })
        .expect("handle");
        assert_eq!(d.wm.selected(), Some(a));
    }

    #[test]
    fn test_root_motion_switches_monitor() {
        let conn = MockConnection::new();
        let mut d = dispatcher(2, conn);
        d.handle(Notification::PointerMotion {
            x_root: 1500,
            y_root: 100,
            time: 1,
        })
        .expect("handle");
        assert_eq!(d.wm.selmon, 1);
    }

    #[test]
    fn test_synthetic_unmap_marks_withdrawn_without_unmanaging() {
        let conn = MockConnection::new().with_window(1, MockWindow::default());
        let mut d = dispatcher(1, conn);
        let a = put_client(&mut d.wm, 1, 0, 0);
        d.handle(Notification::UnmapNotify {
            window: a,
            synthetic: true,
        })
        .expect("handle");
        assert!(d.wm.client(a).is_some());
        assert!(d.conn.recorded().contains(&Op::Withdrawn(a, true)));

        d.handle(Notification::UnmapNotify {
            window: a,
            synthetic: false,
        })
        .expect("handle");
        assert!(d.wm.client(a).is_none());
    }

    #[test]
    fn test_kill_prefers_delete_protocol() {
        let conn = MockConnection::new().with_window(1, MockWindow::default());
        let mut d = dispatcher(1, conn);
        let a = put_client(&mut d.wm, 1, 0, 0);
        d.perform(&Action::Kill).expect("kill");
        assert!(d.conn.recorded().contains(&Op::Delete(a)));
        assert!(!d.conn.recorded().contains(&Op::Kill(a)));
    }

    #[test]
    fn test_kill_falls_back_to_force() {
        let mut conn = MockConnection::new().with_window(1, MockWindow::default());
        conn.delete_supported = false;
        let mut d = dispatcher(1, conn);
        let a = put_client(&mut d.wm, 1, 0, 0);
        d.perform(&Action::Kill).expect("kill");
        assert!(d.conn.recorded().contains(&Op::Kill(a)));
    }

    #[test]
    fn test_fullscreen_client_message_toggles() {
        let conn = MockConnection::new().with_window(1, MockWindow::default());
        let mut d = dispatcher(1, conn);
        let a = put_client(&mut d.wm, 1, 0, 0);
        d.handle(Notification::ClientMessage {
            window: a,
            kind: ClientMessageKind::ToggleFullscreen,
        })
        .expect("handle");
        assert!(d.wm.client(a).expect("managed").fullscreen);
        d.handle(Notification::ClientMessage {
            window: a,
            kind: ClientMessageKind::ToggleFullscreen,
        })
        .expect("handle");
        assert!(!d.wm.client(a).expect("managed").fullscreen);
    }

    #[test]
    fn test_activation_of_unfocused_client_sets_urgency() {
        let conn = MockConnection::new()
            .with_window(1, MockWindow::default())
            .with_window(2, MockWindow::default());
        let mut d = dispatcher(1, conn);
        let a = put_client(&mut d.wm, 1, 0, 0);
        let b = put_client(&mut d.wm, 2, 0, 0);
        assert_eq!(d.wm.selected(), Some(b));
        d.handle(Notification::ClientMessage {
            window: a,
            kind: ClientMessageKind::ActivateWindow,
        })
        .expect("handle");
        assert!(d.wm.client(a).expect("managed").urgent);
    }

    #[test]
    fn test_configure_request_answers_tiled_with_actual_geometry() {
        let conn = MockConnection::new().with_window(1, MockWindow::default());
        let mut d = dispatcher(1, conn);
        let a = put_client(&mut d.wm, 1, 0, 0);
        let rect = d.wm.client(a).expect("managed").rect;
        d.handle(Notification::ConfigureRequest {
            window: a,
            rect: Rect::new(5, 5, 900, 900),
            border: None,
            mask: ConfigureMask {
                x: true,
                y: true,
                w: true,
                h: true,
            },
        })
        .expect("handle");
        // The tiled client's geometry is untouched; it only gets told
        // where it already is.
        assert_eq!(d.wm.client(a).expect("managed").rect, rect);
        assert!(d.conn.recorded().contains(&Op::Configure(a, rect, 1)));
    }

    #[test]
    fn test_configure_request_moves_floating_client() {
        let conn = MockConnection::new().with_window(1, MockWindow::default());
        let mut d = dispatcher(1, conn);
        let a = put_client(&mut d.wm, 1, 0, 0);
        d.wm.client_mut(a).expect("managed").floating = true;
        d.handle(Notification::ConfigureRequest {
            window: a,
            rect: Rect::new(50, 60, 0, 0),
            border: None,
            mask: ConfigureMask {
                x: true,
                y: true,
                w: false,
                h: false,
            },
        })
        .expect("handle");
        let r = d.wm.client(a).expect("managed").rect;
        assert_eq!((r.x, r.y), (50, 60));
        assert_eq!((r.w, r.h), (400, 300));
    }

    #[test]
    fn test_configure_request_passthrough_for_unmanaged() {
        let conn = MockConnection::new().with_window(7, MockWindow::default());
        let mut d = dispatcher(1, conn);
        d.handle(Notification::ConfigureRequest {
            window: WindowId(7),
            rect: Rect::new(10, 20, 300, 200),
            border: Some(3),
            mask: ConfigureMask {
                x: true,
                y: true,
                w: true,
                h: true,
            },
        })
        .expect("handle");
        assert_eq!(
            d.conn.window_rect(WindowId(7)),
            Some(Rect::new(10, 20, 300, 200))
        );
    }

    #[test]
    fn test_drag_move_snaps_to_work_area_edge() {
        let mut conn = MockConnection::new()
            .with_window(1, MockWindow::default())
            .with_pointer(110, 110);
        conn.push_event(Notification::PointerMotion {
            x_root: 30,
            y_root: 115,
            time: 100,
        });
        conn.push_event(Notification::ButtonReleased);
        let mut d = dispatcher(1, conn);
        let a = put_client(&mut d.wm, 1, 0, 0);
        {
            let c = d.wm.client_mut(a).expect("managed");
            c.floating = true;
            c.rect = Rect::new(100, 100, 400, 300);
            c.border = 0;
        }
        d.perform(&Action::MoveMouse).expect("drag");
        let r = d.wm.client(a).expect("managed").rect;
        // Candidate x would be 20; within snap distance of the left
        // work-area edge, so it lands exactly on it.
        assert_eq!((r.x, r.y), (0, 105));
        assert!(d.conn.recorded().contains(&Op::GrabPointer(DragCursor::Move)));
        assert!(d.conn.recorded().contains(&Op::UngrabPointer));
    }

    #[test]
    fn test_drag_move_promotes_tiled_to_floating() {
        let mut conn = MockConnection::new()
            .with_window(1, MockWindow::default())
            .with_pointer(200, 200);
        conn.push_event(Notification::PointerMotion {
            x_root: 400,
            y_root: 400,
            time: 100,
        });
        conn.push_event(Notification::ButtonReleased);
        let mut d = dispatcher(1, conn);
        let a = put_client(&mut d.wm, 1, 0, 0);
        d.wm.client_mut(a).expect("managed").rect = Rect::new(100, 100, 400, 300);
        assert!(!d.wm.client(a).expect("managed").floating);
        d.perform(&Action::MoveMouse).expect("drag");
        assert!(d.wm.client(a).expect("managed").floating);
    }

    #[test]
    fn test_drag_move_small_displacement_keeps_tiled() {
        let mut conn = MockConnection::new()
            .with_window(1, MockWindow::default())
            .with_pointer(200, 200);
        conn.push_event(Notification::PointerMotion {
            x_root: 210,
            y_root: 205,
            time: 100,
        });
        conn.push_event(Notification::ButtonReleased);
        let mut d = dispatcher(1, conn);
        let a = put_client(&mut d.wm, 1, 0, 0);
        d.wm.client_mut(a).expect("managed").rect = Rect::new(100, 100, 400, 300);
        d.perform(&Action::MoveMouse).expect("drag");
        assert!(!d.wm.client(a).expect("managed").floating);
    }

    #[test]
    fn test_drag_motion_rate_limited_by_timestamp() {
        let mut conn = MockConnection::new()
            .with_window(1, MockWindow::default())
            .with_pointer(200, 200);
        conn.push_event(Notification::PointerMotion {
            x_root: 300,
            y_root: 200,
            time: 100,
        });
        // Arrives 5ms later; dropped by the 60Hz limiter.
        conn.push_event(Notification::PointerMotion {
            x_root: 500,
            y_root: 200,
            time: 105,
        });
        conn.push_event(Notification::ButtonReleased);
        let mut d = dispatcher(1, conn);
        let a = put_client(&mut d.wm, 1, 0, 0);
        {
            let c = d.wm.client_mut(a).expect("managed");
            c.floating = true;
            c.rect = Rect::new(100, 100, 400, 300);
            c.border = 0;
        }
        d.perform(&Action::MoveMouse).expect("drag");
        assert_eq!(d.wm.client(a).expect("managed").rect.x, 200);
    }

    #[test]
    fn test_drag_aborts_when_grab_fails() {
        let mut conn = MockConnection::new().with_window(1, MockWindow::default());
        conn.grab_succeeds = false;
        let mut d = dispatcher(1, conn);
        let a = put_client(&mut d.wm, 1, 0, 0);
        let before = d.wm.client(a).expect("managed").rect;
        d.perform(&Action::MoveMouse).expect("abort");
        assert_eq!(d.wm.client(a).expect("managed").rect, before);
        assert!(!d.conn.recorded().contains(&Op::UngrabPointer));
    }

    #[test]
    fn test_drag_move_migrates_to_covered_monitor() {
        let mut conn = MockConnection::new()
            .with_window(1, MockWindow::default())
            .with_pointer(200, 200);
        conn.push_event(Notification::PointerMotion {
            x_root: 1600,
            y_root: 300,
            time: 100,
        });
        conn.push_event(Notification::ButtonReleased);
        let mut d = dispatcher(2, conn);
        let a = put_client(&mut d.wm, 1, 0, 0);
        {
            let c = d.wm.client_mut(a).expect("managed");
            c.floating = true;
            c.rect = Rect::new(100, 100, 400, 300);
            c.border = 0;
        }
        d.perform(&Action::MoveMouse).expect("drag");
        let c = d.wm.client(a).expect("managed");
        assert_eq!(c.monitor, 1);
        assert_eq!(d.wm.selmon, 1);
        assert!(d.wm.monitors[1].clients.contains(&a));
    }

    #[test]
    fn test_drag_resize_tracks_pointer_and_warps() {
        let mut conn = MockConnection::new().with_window(1, MockWindow::default());
        conn.push_event(Notification::PointerMotion {
            x_root: 500,
            y_root: 450,
            time: 100,
        });
        conn.push_event(Notification::ButtonReleased);
        let mut d = dispatcher(1, conn);
        let a = put_client(&mut d.wm, 1, 0, 0);
        {
            let c = d.wm.client_mut(a).expect("managed");
            c.floating = true;
            c.rect = Rect::new(100, 100, 400, 300);
            c.border = 0;
        }
        d.perform(&Action::ResizeMouse).expect("drag");
        let r = d.wm.client(a).expect("managed").rect;
        assert_eq!((r.w, r.h), (401, 351));
        let warps: Vec<_> = d
            .conn
            .recorded()
            .into_iter()
            .filter(|o| matches!(o, Op::WarpPointer(..)))
            .collect();
        assert_eq!(warps.len(), 2);
        assert_eq!(warps[0], Op::WarpPointer(a, 399, 299));
        assert_eq!(warps[1], Op::WarpPointer(a, 400, 350));
    }

    #[test]
    fn test_quit_stops_the_loop() {
        let mut conn = MockConnection::new();
        conn.push_event(Notification::KeyPressed {
            press: KeyPress {
                keysym: 0x71,
                modifiers: 65,
            },
        });
        // Never reached: the loop stops before this event.
        conn.push_event(Notification::PointerMotion {
            x_root: 1500,
            y_root: 100,
            time: 1,
        });
        let mut config = Config::default();
        config.keys.push(KeyBinding {
            keysym: 0x71,
            modifiers: 65,
            action: Action::Quit,
        });
        let mut d = Dispatcher::new(conn, config, Box::new(NullBar));
        let mut m = crate::core::Monitor::new(0, 9, 0.5, 1, true);
        m.rect = Rect::new(0, 0, 1280, 800);
        m.update_work_area(20);
        d.wm.monitors.push(m);
        d.wm.screen = (1280, 800);
        d.run().expect("run");
        assert_eq!(d.wm.selmon, 0);
        assert!(!d.conn.events.is_empty());
    }
}

//! Focus and stacking order.

use crate::core::WindowId;
use crate::server::{allow_gone, BorderKind, Connection, ServerError};

use super::Wm;

impl Wm {
    /// Give focus to `win`, or to the best candidate on the selected
    /// monitor when `None` or not visible: the first visible client in
    /// focus-recency order. With nobody to focus, input reverts to the
    /// root window.
    pub fn focus<C: Connection>(
        &mut self,
        conn: &C,
        win: Option<WindowId>,
    ) -> Result<(), ServerError> {
        let target = win.filter(|w| self.is_visible(*w)).or_else(|| {
            self.monitors[self.selmon]
                .stack
                .iter()
                .copied()
                .find(|w| self.is_visible(*w))
        });
        let old = self.monitors[self.selmon].sel;
        if let Some(o) = old.filter(|o| Some(*o) != target) {
            self.unfocus(conn, o, false)?;
        }
        if let Some(w) = target {
            if let Some(mon) = self.client(w).map(|c| c.monitor) {
                self.selmon = mon;
            }
            if self.client(w).is_some_and(|c| c.urgent) {
                if let Some(c) = self.client_mut(w) {
                    c.urgent = false;
                }
                allow_gone(conn.clear_urgency(w))?;
            }
            self.detach_stack(w);
            self.attach_stack(w);
            allow_gone(conn.grab_buttons(w, true))?;
            let kind = if self.alone_in_tag(w) {
                BorderKind::Normal
            } else {
                BorderKind::Selected
            };
            allow_gone(conn.set_border(w, kind))?;
            if !self.client(w).is_some_and(|c| c.never_focus) {
                allow_gone(conn.focus_window(w))?;
            }
        } else {
            conn.focus_root()?;
        }
        self.monitors[self.selmon].sel = target;
        self.refresh_bars();
        Ok(())
    }

    pub(crate) fn unfocus<C: Connection>(
        &mut self,
        conn: &C,
        win: WindowId,
        refocus_root: bool,
    ) -> Result<(), ServerError> {
        if self.client(win).is_none() {
            return Ok(());
        }
        allow_gone(conn.grab_buttons(win, false))?;
        allow_gone(conn.set_border(win, BorderKind::Normal))?;
        if refocus_root {
            conn.focus_root()?;
        }
        Ok(())
    }

    /// A client is alone in its tag when no other client on its monitor
    /// shares the tag. Such a client keeps the normal border even while
    /// focused; the selected color only appears when there is something
    /// to tell apart.
    pub fn alone_in_tag(&self, win: WindowId) -> bool {
        let Some(c) = self.client(win) else {
            return true;
        };
        !self.monitors[c.monitor]
            .clients
            .iter()
            .any(|w| *w != win && self.client(*w).is_some_and(|o| o.tag == c.tag))
    }

    /// Re-establish the stacking order on a monitor: the floating
    /// selection on top, tiled clients in focus-recency order directly
    /// beneath the bar. Enter notifications produced by the shuffle are
    /// discarded so focus-follows-pointer does not fight the restack.
    pub fn restack<C: Connection>(&mut self, conn: &C, mon: usize) -> Result<(), ServerError> {
        self.refresh_bars();
        let Some(sel) = self.monitors[mon].sel else {
            return Ok(());
        };
        let layout = self.monitors[mon].active_tag_state().layout;
        if layout.is_none() || self.client(sel).is_some_and(|c| c.floating) {
            allow_gone(conn.raise(sel))?;
        }
        if layout.is_some() {
            let mut anchor = conn.bar_anchor(mon);
            for w in self.monitors[mon].stack.clone() {
                if self.is_visible(w) && self.client(w).is_some_and(|c| !c.floating) {
                    match anchor {
                        Some(a) => allow_gone(conn.stack_below(w, a))?,
                        None => allow_gone(conn.lower(w))?,
                    }
                    anchor = Some(w);
                }
            }
        }
        conn.drain_pointer_entries()?;
        Ok(())
    }

    /// Cycle focus through the visible clients of the selected monitor
    /// in list order, wrapping at both ends. Disabled while the
    /// selection is fullscreen.
    pub fn focus_stack<C: Connection>(&mut self, conn: &C, dir: i32) -> Result<(), ServerError> {
        let Some(sel) = self.monitors[self.selmon].sel else {
            return Ok(());
        };
        if self.client(sel).is_some_and(|c| c.fullscreen) {
            return Ok(());
        }
        let visible = self.visible_on(self.selmon);
        if visible.len() < 2 {
            return Ok(());
        }
        let pos = visible.iter().position(|w| *w == sel).unwrap_or(0) as i32;
        let next = visible[(pos + dir).rem_euclid(visible.len() as i32) as usize];
        if next != sel {
            self.focus(conn, Some(next))?;
            self.restack(conn, self.selmon)?;
        }
        Ok(())
    }

    pub fn focus_monitor<C: Connection>(&mut self, conn: &C, dir: i32) -> Result<(), ServerError> {
        if self.monitors.len() < 2 {
            return Ok(());
        }
        let target = self.dir_to_monitor(dir);
        if target == self.selmon {
            return Ok(());
        }
        if let Some(sel) = self.monitors[self.selmon].sel {
            self.unfocus(conn, sel, false)?;
        }
        self.selmon = target;
        self.focus(conn, None)?;
        Ok(())
    }

    /// Neighbor monitor in list order; positive is the next one,
    /// negative the previous, wrapping around.
    pub fn dir_to_monitor(&self, dir: i32) -> usize {
        let n = self.monitors.len();
        if dir > 0 {
            (self.selmon + 1) % n
        } else {
            (self.selmon + n - 1) % n
        }
    }

    /// Swap the selection into the master slot. When it already is the
    /// master, promote the next tiled client instead.
    pub fn zoom<C: Connection>(&mut self, conn: &C) -> Result<(), ServerError> {
        let Some(sel) = self.monitors[self.selmon].sel else {
            return Ok(());
        };
        if self.monitors[self.selmon]
            .active_tag_state()
            .layout
            .is_none()
            || self.client(sel).is_some_and(|c| c.floating)
        {
            return Ok(());
        }
        let tiled = self.tiled_on(self.selmon);
        let target = if tiled.first() == Some(&sel) {
            match tiled.get(1) {
                Some(next) => *next,
                None => return Ok(()),
            }
        } else {
            sel
        };
        self.pop(conn, target)
    }

    fn pop<C: Connection>(&mut self, conn: &C, win: WindowId) -> Result<(), ServerError> {
        self.detach(win);
        self.attach(win);
        self.focus(conn, Some(win))?;
        let mon = self.client(win).map(|c| c.monitor).unwrap_or(self.selmon);
        self.arrange(conn, Some(mon))
    }
}

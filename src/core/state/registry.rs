//! Client lifecycle: adoption, release, list maintenance, and property
//! refreshes.

use crate::core::{apply_rules, Client, WindowId};
use crate::server::{allow_gone, BorderKind, Connection, ServerError};

use super::Wm;

/// `Ok(true)` when the call lost the vanished-window race, propagating
/// every other error.
fn vanished(result: Result<(), ServerError>) -> Result<bool, ServerError> {
    match result {
        Ok(()) => Ok(false),
        Err(e) if e.is_benign() => Ok(true),
        Err(e) => Err(e),
    }
}

impl Wm {
    /// Adopt a window into management. Idempotent: a second request for
    /// an already-managed window does nothing.
    pub fn manage<C: Connection>(&mut self, conn: &C, win: WindowId) -> Result<(), ServerError> {
        if self.clients.contains_key(&win) {
            return Ok(());
        }
        let attrs = conn.window_attributes(win)?;
        let mut c = Client::new(win, attrs.rect, attrs.border);
        c.title = conn.window_title(win).unwrap_or_default();

        // Transients inherit monitor and tag from their parent; everything
        // else starts on the selected monitor's active tag and then runs
        // through the rule table.
        let parent = conn
            .transient_for(win)
            .filter(|p| self.clients.contains_key(p));
        if let Some(p) = parent {
            let pc = &self.clients[&p];
            c.monitor = pc.monitor;
            c.tag = pc.tag;
        } else {
            c.monitor = self.selmon;
            c.tag = self.monitors[self.selmon].active_tag();
            let (class, instance) = conn.window_class(win).unwrap_or_default();
            let placement = apply_rules(&self.config.rules, &class, &instance, &c.title);
            c.floating = placement.floating;
            if let Some(m) = placement.monitor.filter(|m| *m < self.monitors.len()) {
                c.monitor = m;
                c.tag = self.monitors[m].active_tag();
            }
            if let Some(t) = placement.tag.filter(|t| *t < self.config.tags.len()) {
                c.tag = t;
            }
        }

        let mon = self.monitors[c.monitor].rect;
        let work = self.monitors[c.monitor].work;
        let bar_at_top = self.monitors[c.monitor].bar_y == mon.y;
        if c.rect.x + c.total_width() > mon.right() {
            c.rect.x = mon.right() - c.total_width();
        }
        if c.rect.y + c.total_height() > mon.bottom() {
            c.rect.y = mon.bottom() - c.total_height();
        }
        c.rect.x = c.rect.x.max(mon.x);
        // Only push the window down past the bar if its center could
        // actually cover it.
        let center = c.rect.x + c.rect.w / 2;
        let floor = if bar_at_top && center >= work.x && center < work.right() {
            work.y
        } else {
            mon.y
        };
        c.rect.y = c.rect.y.max(floor);

        c.border = self.config.border_px;
        // Up to this point nothing has been recorded; a window destroyed
        // between the map request and these calls is simply not adopted.
        if vanished(conn.set_border_width(win, c.border))?
            || vanished(conn.set_border(win, BorderKind::Normal))?
            || vanished(conn.send_configure(win, c.rect, c.border))?
        {
            tracing::debug!("Window {} vanished during adoption", win);
            return Ok(());
        }

        let fullscreen = conn.wants_fullscreen(win);
        if conn.is_dialog(win) {
            c.floating = true;
        }
        c.set_hints(conn.size_hints(win));
        let wh = conn.window_hints(win);
        c.urgent = wh.urgent;
        c.never_focus = wh.input == Some(false);
        if vanished(conn.grab_buttons(win, false))? {
            tracing::debug!("Window {} vanished during adoption", win);
            return Ok(());
        }

        if !c.floating {
            c.floating = parent.is_some() || c.fixed;
            c.prev_floating = c.floating;
        }
        if c.floating && vanished(conn.raise(win))? {
            tracing::debug!("Window {} vanished during adoption", win);
            return Ok(());
        }

        let mon_idx = c.monitor;
        tracing::info!(
            "Managing {} ({:?}) on monitor {} tag {}",
            win,
            c.title,
            mon_idx,
            c.tag
        );
        self.clients.insert(win, c);
        self.attach(win);
        self.attach_stack(win);

        if fullscreen {
            self.set_fullscreen(conn, win, true)?;
        }
        if mon_idx == self.selmon {
            if let Some(old) = self.monitors[self.selmon].sel {
                self.unfocus(conn, old, false)?;
            }
        }
        self.monitors[mon_idx].sel = Some(win);
        self.arrange(conn, Some(mon_idx))?;
        // Once adopted, a vanish is cleaned up by the following unmap or
        // destroy notification.
        allow_gone(conn.set_withdrawn(win, false))?;
        allow_gone(conn.map(win))?;
        self.focus(conn, None)?;
        Ok(())
    }

    /// Release a window from management. `destroyed` skips the courtesy
    /// cleanup of server-side state that no longer exists.
    pub fn unmanage<C: Connection>(
        &mut self,
        conn: &C,
        win: WindowId,
        destroyed: bool,
    ) -> Result<(), ServerError> {
        let Some(old_border) = self.client(win).map(|c| c.old_border) else {
            return Ok(());
        };
        self.detach(win);
        self.detach_stack(win);
        self.clients.remove(&win);
        if !destroyed {
            allow_gone(conn.set_border_width(win, old_border))?;
            allow_gone(conn.ungrab_buttons(win))?;
            allow_gone(conn.set_withdrawn(win, true))?;
        }
        tracing::info!("Unmanaged {}", win);
        self.focus(conn, None)?;
        self.refresh_bars();
        self.arrange(conn, None)?;
        Ok(())
    }

    pub(super) fn attach(&mut self, win: WindowId) {
        if let Some(mon) = self.client(win).map(|c| c.monitor) {
            self.monitors[mon].clients.insert(0, win);
        }
    }

    pub(super) fn detach(&mut self, win: WindowId) {
        if let Some(mon) = self.client(win).map(|c| c.monitor) {
            self.monitors[mon].clients.retain(|w| *w != win);
        }
    }

    pub(super) fn attach_stack(&mut self, win: WindowId) {
        if let Some(mon) = self.client(win).map(|c| c.monitor) {
            self.monitors[mon].stack.insert(0, win);
        }
    }

    /// Remove from the focus stack; when the removed client was the
    /// monitor's selection, the next visible client in stack order takes
    /// its place.
    pub(super) fn detach_stack(&mut self, win: WindowId) {
        let Some(mon) = self.client(win).map(|c| c.monitor) else {
            return;
        };
        self.monitors[mon].stack.retain(|w| *w != win);
        if self.monitors[mon].sel == Some(win) {
            let next = self.monitors[mon]
                .stack
                .iter()
                .copied()
                .find(|w| self.is_visible(*w));
            self.monitors[mon].sel = next;
        }
    }

    /// Move a client to another monitor, landing on that monitor's
    /// active tag.
    pub fn send_to_monitor<C: Connection>(
        &mut self,
        conn: &C,
        win: WindowId,
        target: usize,
    ) -> Result<(), ServerError> {
        let Some(current) = self.client(win).map(|c| c.monitor) else {
            return Ok(());
        };
        if current == target || target >= self.monitors.len() {
            return Ok(());
        }
        self.unfocus(conn, win, true)?;
        self.detach(win);
        self.detach_stack(win);
        let tag = self.monitors[target].active_tag();
        if let Some(c) = self.client_mut(win) {
            c.monitor = target;
            c.tag = tag;
        }
        self.attach(win);
        self.attach_stack(win);
        // The mover lands on the target's active tag at the head of its
        // stack, so it becomes that monitor's selection.
        self.monitors[target].sel = Some(win);
        self.focus(conn, None)?;
        self.arrange(conn, None)?;
        Ok(())
    }

    pub fn set_fullscreen<C: Connection>(
        &mut self,
        conn: &C,
        win: WindowId,
        fullscreen: bool,
    ) -> Result<(), ServerError> {
        let Some(c) = self.client(win) else {
            return Ok(());
        };
        if fullscreen && !c.fullscreen {
            conn.set_fullscreen_state(win, true)?;
            let mon = c.monitor;
            let rect = self.monitors[mon].rect;
            if let Some(c) = self.client_mut(win) {
                c.fullscreen = true;
                c.prev_floating = c.floating;
                c.old_border = c.border;
                c.border = 0;
                c.floating = true;
            }
            self.resize_client(conn, win, rect)?;
            conn.raise(win)?;
        } else if !fullscreen && c.fullscreen {
            conn.set_fullscreen_state(win, false)?;
            let restored = c.prev_rect;
            if let Some(c) = self.client_mut(win) {
                c.fullscreen = false;
                c.floating = c.prev_floating;
                c.border = c.old_border;
                c.rect = restored;
            }
            self.resize_client(conn, win, restored)?;
            let mon = self.client(win).map(|c| c.monitor).unwrap_or(self.selmon);
            self.arrange(conn, Some(mon))?;
        }
        Ok(())
    }

    pub fn update_title<C: Connection>(&mut self, conn: &C, win: WindowId) {
        let title = conn.window_title(win).unwrap_or_default();
        let Some(mon) = self.client_mut(win).map(|c| {
            c.title = title;
            c.monitor
        }) else {
            return;
        };
        if self.monitors[mon].sel == Some(win) {
            self.refresh_bars();
        }
    }

    pub fn update_size_hints<C: Connection>(&mut self, conn: &C, win: WindowId) {
        let hints = conn.size_hints(win);
        if let Some(c) = self.client_mut(win) {
            c.set_hints(hints);
        }
    }

    /// Urgency on the focused client is contradictory; reset it on the
    /// server instead of recording it.
    pub fn update_window_hints<C: Connection>(
        &mut self,
        conn: &C,
        win: WindowId,
    ) -> Result<(), ServerError> {
        let wh = conn.window_hints(win);
        if self.selected() == Some(win) && wh.urgent {
            allow_gone(conn.clear_urgency(win))?;
        } else if self
            .client_mut(win)
            .map(|c| c.urgent = wh.urgent)
            .is_some()
        {
            self.refresh_bars();
        }
        if let Some(c) = self.client_mut(win) {
            c.never_focus = wh.input == Some(false);
        }
        Ok(())
    }

    pub fn update_window_type<C: Connection>(
        &mut self,
        conn: &C,
        win: WindowId,
    ) -> Result<(), ServerError> {
        if conn.wants_fullscreen(win) {
            self.set_fullscreen(conn, win, true)?;
        }
        if conn.is_dialog(win) {
            if let Some(c) = self.client_mut(win) {
                c.floating = true;
            }
        }
        Ok(())
    }

    /// A window that becomes transient after the fact turns floating if
    /// its new parent is managed.
    pub fn update_transient<C: Connection>(
        &mut self,
        conn: &C,
        win: WindowId,
    ) -> Result<(), ServerError> {
        let floating = self.client(win).map(|c| c.floating);
        if floating == Some(false) {
            if let Some(parent) = conn.transient_for(win) {
                if self.clients.contains_key(&parent) {
                    if let Some(c) = self.client_mut(win) {
                        c.floating = true;
                    }
                    let mon = self.client(win).map(|c| c.monitor).unwrap_or(self.selmon);
                    self.arrange(conn, Some(mon))?;
                }
            }
        }
        Ok(())
    }
}

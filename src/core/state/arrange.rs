//! The arrange pass: visibility, then layout, then stacking.

use crate::core::geom::{self, Rect};
use crate::core::{LayoutKind, WindowId};
use crate::server::{allow_gone, Connection, ServerError};

use super::Wm;

impl Wm {
    /// Re-lay-out one monitor, or all of them. The single-monitor form
    /// also restacks, which the all-monitors form leaves to the caller
    /// since the focused monitor usually gets restacked right after.
    pub fn arrange<C: Connection>(
        &mut self,
        conn: &C,
        mon: Option<usize>,
    ) -> Result<(), ServerError> {
        match mon {
            Some(m) => {
                self.show_hide(conn, m)?;
                self.arrange_monitor(conn, m)?;
                self.restack(conn, m)?;
            }
            None => {
                for m in 0..self.monitors.len() {
                    self.show_hide(conn, m)?;
                }
                for m in 0..self.monitors.len() {
                    self.arrange_monitor(conn, m)?;
                }
            }
        }
        Ok(())
    }

    /// Reveal visible clients at their recorded positions and park
    /// hidden ones far off the left screen edge. Visible clients are
    /// handled top of the focus stack first, hidden ones bottom first,
    /// so windows being revealed paint over windows being hidden.
    fn show_hide<C: Connection>(&mut self, conn: &C, mon: usize) -> Result<(), ServerError> {
        let stack = self.monitors[mon].stack.clone();
        for w in &stack {
            if !self.is_visible(*w) {
                continue;
            }
            let Some((rect, floating, fullscreen)) =
                self.client(*w).map(|c| (c.rect, c.floating, c.fullscreen))
            else {
                continue;
            };
            allow_gone(conn.move_window(*w, rect.x, rect.y))?;
            let layout_none = self.monitors[mon].active_tag_state().layout.is_none();
            if (layout_none || floating) && !fullscreen {
                self.resize(conn, *w, rect, false)?;
            }
        }
        for w in stack.iter().rev() {
            if self.is_visible(*w) {
                continue;
            }
            if let Some(c) = self.client(*w) {
                allow_gone(conn.move_window(*w, -2 * c.total_width(), c.rect.y))?;
            }
        }
        Ok(())
    }

    fn arrange_monitor<C: Connection>(&mut self, conn: &C, mon: usize) -> Result<(), ServerError> {
        match self.monitors[mon].active_tag_state().layout {
            Some(LayoutKind::Tile) => self.tile(conn, mon),
            Some(LayoutKind::Monocle) => self.monocle(conn, mon),
            None => Ok(()),
        }
    }

    /// Master/stack split. The first `nmaster` tiled clients share the
    /// left column at `mfact` of the width, the rest share the right
    /// column. Heights divide the remaining space evenly, recomputed per
    /// row so odd pixels land on the last client.
    fn tile<C: Connection>(&mut self, conn: &C, mon: usize) -> Result<(), ServerError> {
        let tiled = self.tiled_on(mon);
        let n = tiled.len() as u32;
        let (mfact, nmaster) = {
            let ts = self.monitors[mon].active_tag_state();
            (ts.mfact, ts.nmaster)
        };
        self.monitors[mon].active_tag_state_mut().symbol =
            format!("[{}-{}]", n.min(nmaster), n.saturating_sub(nmaster));
        if n == 0 {
            // An emptied tag forgets its layout tweaks.
            let (mfact, nmaster) = (self.config.mfact, self.config.nmaster);
            let ts = self.monitors[mon].active_tag_state_mut();
            ts.mfact = mfact;
            ts.nmaster = nmaster;
            return Ok(());
        }

        let work = self.monitors[mon].work;
        let mw = if n > nmaster {
            if nmaster > 0 {
                (work.w as f32 * mfact) as i32
            } else {
                0
            }
        } else {
            work.w
        };
        let mut my = 0;
        let mut ty = 0;
        for (i, w) in tiled.iter().enumerate() {
            let i = i as u32;
            let border = self.client(*w).map(|c| c.border).unwrap_or(0);
            if i < nmaster {
                let h = (work.h - my) / (n.min(nmaster) - i) as i32;
                self.resize(
                    conn,
                    *w,
                    Rect::new(work.x, work.y + my, mw - 2 * border, h - 2 * border),
                    false,
                )?;
                let th = self.client(*w).map(|c| c.total_height()).unwrap_or(0);
                if my + th < work.h {
                    my += th;
                }
            } else {
                let h = (work.h - ty) / (n - i) as i32;
                self.resize(
                    conn,
                    *w,
                    Rect::new(
                        work.x + mw,
                        work.y + ty,
                        work.w - mw - 2 * border,
                        h - 2 * border,
                    ),
                    false,
                )?;
                let th = self.client(*w).map(|c| c.total_height()).unwrap_or(0);
                if ty + th < work.h {
                    ty += th;
                }
            }
        }
        Ok(())
    }

    /// Every tiled client gets the whole work area. The symbol counts
    /// all visible clients, floating ones included, since they all sit
    /// in the same pile.
    fn monocle<C: Connection>(&mut self, conn: &C, mon: usize) -> Result<(), ServerError> {
        let n = self.visible_on(mon).len();
        self.monitors[mon].active_tag_state_mut().symbol = format!("[{}]", n);
        let work = self.monitors[mon].work;
        for w in self.tiled_on(mon) {
            let border = self.client(w).map(|c| c.border).unwrap_or(0);
            self.resize(
                conn,
                w,
                Rect::new(work.x, work.y, work.w - 2 * border, work.h - 2 * border),
                false,
            )?;
        }
        Ok(())
    }

    /// Resize through the size-constraint resolver. Interactive moves
    /// are clamped against the whole display, everything else against
    /// the owning monitor's work area.
    pub(crate) fn resize<C: Connection>(
        &mut self,
        conn: &C,
        win: WindowId,
        proposed: Rect,
        interactive: bool,
    ) -> Result<(), ServerError> {
        let Some(c) = self.client(win) else {
            return Ok(());
        };
        let bounds = if interactive {
            Rect::new(0, 0, self.screen.0, self.screen.1)
        } else {
            self.monitors[c.monitor].work
        };
        let (rect, changed) = geom::resolve(
            &c.hints,
            c.floating,
            c.border,
            c.rect,
            proposed,
            bounds,
            interactive,
            self.config.bar_height,
        );
        if changed {
            self.resize_client(conn, win, rect)?;
        }
        Ok(())
    }

    /// Apply a geometry unconditionally, bypassing the resolver.
    pub(crate) fn resize_client<C: Connection>(
        &mut self,
        conn: &C,
        win: WindowId,
        rect: Rect,
    ) -> Result<(), ServerError> {
        let border = match self.client_mut(win) {
            Some(c) => {
                c.prev_rect = c.rect;
                c.rect = rect;
                c.border
            }
            None => return Ok(()),
        };
        allow_gone(conn.apply_geometry(win, rect, border))?;
        allow_gone(conn.send_configure(win, rect, border))?;
        Ok(())
    }
}

//! Tag selection and per-tag layout parameters.

use crate::core::LayoutKind;
use crate::server::{Connection, ServerError};

use super::Wm;

impl Wm {
    /// Switch the selected monitor to `tag`. An out-of-range index
    /// switches back to the previously viewed tag, which is what makes
    /// the current/previous slot pair tick: viewing always flips the
    /// slot, and only an in-range index overwrites the freed entry.
    pub fn view<C: Connection>(&mut self, conn: &C, tag: usize) -> Result<(), ServerError> {
        let len = self.config.tags.len();
        if tag < len && tag == self.monitors[self.selmon].active_tag() {
            return Ok(());
        }
        let m = &mut self.monitors[self.selmon];
        m.slot ^= 1;
        if tag < len {
            m.active[m.slot] = tag;
        }
        tracing::info!(
            "Monitor {} now viewing tag {}",
            self.selmon,
            self.monitors[self.selmon].active_tag()
        );
        self.focus(conn, None)?;
        self.arrange(conn, Some(self.selmon))
    }

    pub fn view_last<C: Connection>(&mut self, conn: &C) -> Result<(), ServerError> {
        self.view(conn, usize::MAX)
    }

    /// Step through tags in index order, wrapping at both ends.
    pub fn cycle_view<C: Connection>(&mut self, conn: &C, dir: i32) -> Result<(), ServerError> {
        let len = self.config.tags.len() as i32;
        let cur = self.monitors[self.selmon].active_tag() as i32;
        let next = (cur + dir).rem_euclid(len) as usize;
        self.view(conn, next)
    }

    /// Move the selected client to another tag on its monitor.
    pub fn assign_tag<C: Connection>(&mut self, conn: &C, tag: usize) -> Result<(), ServerError> {
        if tag >= self.config.tags.len() {
            return Ok(());
        }
        let Some(sel) = self.monitors[self.selmon].sel else {
            return Ok(());
        };
        if let Some(c) = self.client_mut(sel) {
            c.tag = tag;
        }
        self.focus(conn, None)?;
        self.arrange(conn, Some(self.selmon))
    }

    pub fn toggle_floating<C: Connection>(&mut self, conn: &C) -> Result<(), ServerError> {
        let Some(sel) = self.monitors[self.selmon].sel else {
            return Ok(());
        };
        if self.client(sel).is_some_and(|c| c.fullscreen) {
            return Ok(());
        }
        let (floating, rect) = match self.client_mut(sel) {
            Some(c) => {
                // Fixed-size clients can never leave the floating state.
                c.floating = !c.floating || c.fixed;
                (c.floating, c.rect)
            }
            None => return Ok(()),
        };
        if floating {
            self.resize(conn, sel, rect, false)?;
        }
        self.arrange(conn, Some(self.selmon))
    }

    pub fn inc_master_count<C: Connection>(
        &mut self,
        conn: &C,
        delta: i32,
    ) -> Result<(), ServerError> {
        let n = self.tiled_on(self.selmon).len() as i32;
        let ts = self.monitors[self.selmon].active_tag_state_mut();
        ts.nmaster = (ts.nmaster as i32 + delta).clamp(0, n) as u32;
        self.arrange(conn, Some(self.selmon))
    }

    /// Adjust the master area fraction of the active tag. Values below
    /// 1.0 are relative deltas; 1.0 and above set the fraction
    /// absolutely to `f - 1.0`. Results outside [0.1, 0.9] are ignored.
    pub fn set_master_fraction<C: Connection>(
        &mut self,
        conn: &C,
        f: f32,
    ) -> Result<(), ServerError> {
        if self.monitors[self.selmon]
            .active_tag_state()
            .layout
            .is_none()
        {
            return Ok(());
        }
        let cur = self.monitors[self.selmon].active_tag_state().mfact;
        let next = if f >= 1.0 { f - 1.0 } else { cur + f };
        if !(0.1..=0.9).contains(&next) {
            return Ok(());
        }
        self.monitors[self.selmon].active_tag_state_mut().mfact = next;
        self.arrange(conn, Some(self.selmon))
    }

    /// Select a layout by index; an out-of-range index toggles between
    /// the two layouts instead.
    pub fn set_layout<C: Connection>(&mut self, conn: &C, index: usize) -> Result<(), ServerError> {
        let ts = self.monitors[self.selmon].active_tag_state_mut();
        let next = LayoutKind::from_index(index)
            .unwrap_or_else(|| ts.layout.unwrap_or(LayoutKind::Tile).toggled());
        ts.layout = Some(next);
        ts.symbol = next.symbol().to_string();
        if self.monitors[self.selmon].sel.is_some() {
            self.arrange(conn, Some(self.selmon))
        } else {
            self.refresh_bars();
            Ok(())
        }
    }

    pub fn toggle_bar<C: Connection>(&mut self, conn: &C) -> Result<(), ServerError> {
        let bar_height = self.config.bar_height;
        let m = &mut self.monitors[self.selmon];
        m.show_bar = !m.show_bar;
        m.update_work_area(bar_height);
        self.arrange(conn, Some(self.selmon))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{put_client, session};
    use super::*;
    use crate::core::{Rect, WindowId};
    use crate::server::mock::{MockConnection, MockWindow};

    fn with_windows(ids: &[u64]) -> MockConnection {
        let mut conn = MockConnection::new();
        for id in ids {
            conn.add_window(WindowId(*id), MockWindow::default());
        }
        conn
    }

    #[test]
    fn test_view_switches_and_view_last_returns() {
        let mut wm = session(1);
        let a = put_client(&mut wm, 1, 0, 0);
        let conn = with_windows(&[1]);

        wm.view(&conn, 3).expect("view 3");
        assert_eq!(wm.monitors[0].active_tag(), 3);
        assert!(!wm.is_visible(a));
        assert_eq!(wm.selected(), None);

        wm.view_last(&conn).expect("view last");
        assert_eq!(wm.monitors[0].active_tag(), 0);
        assert_eq!(wm.selected(), Some(a));
    }

    #[test]
    fn test_view_same_tag_is_noop() {
        let mut wm = session(1);
        let conn = MockConnection::new();
        wm.view(&conn, 3).expect("view");
        wm.view(&conn, 3).expect("view again");
        // The previous tag is still 0, not 3: the second view did not
        // flip the slot.
        assert_eq!(wm.monitors[0].previous_tag(), 0);
    }

    #[test]
    fn test_out_of_range_view_is_view_last() {
        let mut wm = session(1);
        let conn = MockConnection::new();
        wm.view(&conn, 5).expect("view");
        wm.view(&conn, 99).expect("alias");
        assert_eq!(wm.monitors[0].active_tag(), 0);
        assert_eq!(wm.monitors[0].previous_tag(), 5);
    }

    #[test]
    fn test_cycle_view_wraps() {
        let mut wm = session(1);
        let conn = MockConnection::new();
        wm.cycle_view(&conn, -1).expect("backward");
        assert_eq!(wm.monitors[0].active_tag(), 8);
        wm.cycle_view(&conn, 1).expect("forward");
        assert_eq!(wm.monitors[0].active_tag(), 0);
    }

    #[test]
    fn test_assign_tag_hides_client_and_refocuses() {
        let mut wm = session(1);
        let a = put_client(&mut wm, 1, 0, 0);
        let b = put_client(&mut wm, 2, 0, 0);
        let conn = with_windows(&[1, 2]);

        wm.assign_tag(&conn, 4).expect("assign");
        assert_eq!(wm.client(b).expect("managed").tag, 4);
        assert!(!wm.is_visible(b));
        assert_eq!(wm.selected(), Some(a));

        // Out of range does nothing.
        wm.assign_tag(&conn, 99).expect("ignored");
        assert_eq!(wm.client(a).expect("managed").tag, 0);
    }

    #[test]
    fn test_master_count_clamped_to_tiled() {
        let mut wm = session(1);
        put_client(&mut wm, 1, 0, 0);
        put_client(&mut wm, 2, 0, 0);
        let conn = with_windows(&[1, 2]);

        wm.inc_master_count(&conn, 5).expect("inc");
        assert_eq!(wm.monitors[0].active_tag_state().nmaster, 2);
        wm.inc_master_count(&conn, -10).expect("dec");
        assert_eq!(wm.monitors[0].active_tag_state().nmaster, 0);
    }

    #[test]
    fn test_master_fraction_relative_absolute_and_bounds() {
        let mut wm = session(1);
        put_client(&mut wm, 1, 0, 0);
        let conn = with_windows(&[1]);

        wm.set_master_fraction(&conn, 0.05).expect("relative");
        assert!((wm.monitors[0].active_tag_state().mfact - 0.55).abs() < 1e-6);

        wm.set_master_fraction(&conn, 1.75).expect("absolute");
        assert!((wm.monitors[0].active_tag_state().mfact - 0.75).abs() < 1e-6);

        wm.set_master_fraction(&conn, 0.5).expect("rejected");
        assert!((wm.monitors[0].active_tag_state().mfact - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_layout_parameters_are_per_tag() {
        let mut wm = session(1);
        put_client(&mut wm, 1, 0, 0);
        let conn = with_windows(&[1]);
        wm.set_master_fraction(&conn, 1.7).expect("set");
        wm.view(&conn, 1).expect("view");
        assert!((wm.monitors[0].active_tag_state().mfact - 0.5).abs() < 1e-6);
        wm.view_last(&conn).expect("back");
        assert!((wm.monitors[0].active_tag_state().mfact - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_set_layout_selects_and_toggles() {
        let mut wm = session(1);
        let conn = MockConnection::new();
        wm.set_layout(&conn, 1).expect("monocle");
        assert_eq!(
            wm.monitors[0].active_tag_state().layout,
            Some(LayoutKind::Monocle)
        );
        wm.set_layout(&conn, 99).expect("toggle");
        assert_eq!(
            wm.monitors[0].active_tag_state().layout,
            Some(LayoutKind::Tile)
        );
    }

    #[test]
    fn test_toggle_bar_reclaims_work_area() {
        let mut wm = session(1);
        let conn = MockConnection::new();
        wm.toggle_bar(&conn).expect("hide");
        assert_eq!(wm.monitors[0].work, Rect::new(0, 0, 1280, 800));
        wm.toggle_bar(&conn).expect("show");
        assert_eq!(wm.monitors[0].work, Rect::new(0, 20, 1280, 780));
    }

    #[test]
    fn test_toggle_floating_excludes_from_tiling() {
        let mut wm = session(1);
        let a = put_client(&mut wm, 1, 0, 0);
        put_client(&mut wm, 2, 0, 0);
        wm.monitors[0].sel = Some(a);
        let conn = with_windows(&[1, 2]);

        wm.toggle_floating(&conn).expect("float");
        assert!(wm.client(a).expect("managed").floating);
        assert_eq!(wm.tiled_on(0), vec![WindowId(2)]);

        wm.toggle_floating(&conn).expect("tile");
        assert!(!wm.client(a).expect("managed").floating);
    }

    #[test]
    fn test_fixed_client_cannot_stop_floating() {
        let mut wm = session(1);
        let a = put_client(&mut wm, 1, 0, 0);
        {
            let c = wm.client_mut(a).expect("managed");
            c.fixed = true;
            c.floating = true;
        }
        let conn = with_windows(&[1]);
        wm.toggle_floating(&conn).expect("toggle");
        assert!(wm.client(a).expect("managed").floating);
    }
}

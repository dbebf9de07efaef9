//! Output topology reconciliation.

use crate::core::{Monitor, Rect};
use crate::server::{Connection, ServerError};

use super::Wm;

impl Wm {
    /// Bring the monitor list in line with the server's current output
    /// topology. Returns whether anything changed; the caller refocuses
    /// and rearranges on a dirty result.
    ///
    /// Monitors are matched to outputs by index. Extra outputs grow the
    /// list at the tail, lost outputs shrink it from the tail, and every
    /// client of a removed monitor migrates to the first one with its
    /// tag intact.
    pub fn reconcile_outputs<C: Connection>(&mut self, conn: &C) -> Result<bool, ServerError> {
        self.screen = conn.screen_size();
        let mut unique: Vec<Rect> = Vec::new();
        for r in conn.outputs()? {
            // Mirrored outputs report identical geometry; one monitor
            // serves them all.
            if !unique.contains(&r) {
                unique.push(r);
            }
        }
        if unique.is_empty() {
            unique.push(Rect::new(0, 0, self.screen.0, self.screen.1));
        }

        let mut dirty = false;
        while self.monitors.len() < unique.len() {
            let num = self.monitors.len();
            self.monitors.push(Monitor::new(
                num,
                self.config.tags.len(),
                self.config.mfact,
                self.config.nmaster,
                self.config.show_bar,
            ));
            tracing::info!("Output {} appeared", num);
            dirty = true;
        }
        for (i, r) in unique.iter().enumerate() {
            if self.monitors[i].rect != *r {
                tracing::info!("Output {} is now {:?}", i, r);
                self.monitors[i].rect = *r;
                self.monitors[i].update_work_area(self.config.bar_height);
                dirty = true;
            }
        }
        while self.monitors.len() > unique.len() {
            dirty = true;
            let dead = match self.monitors.pop() {
                Some(m) => m,
                None => break,
            };
            tracing::info!(
                "Output {} disappeared, migrating {} clients",
                dead.num,
                dead.clients.len()
            );
            for w in dead.clients {
                if let Some(c) = self.client_mut(w) {
                    c.monitor = 0;
                }
                self.attach(w);
                self.attach_stack(w);
            }
            if self.selmon >= self.monitors.len() {
                self.selmon = 0;
            }
        }
        if dirty {
            let (x, y) = conn.pointer_position()?;
            self.selmon = self.monitor_at(x, y);
        }
        Ok(dirty)
    }
}

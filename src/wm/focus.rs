//! Focus Module
//!
//! Input focus with ICCCM take-focus negotiation, `_NET_ACTIVE_WINDOW`
//! bookkeeping and pointer warps after keyboard-driven layout changes.

use anyhow::Result;
use tracing::debug;
use x11rb::protocol::xproto::{Timestamp, Window};
use x11rb::CURRENT_TIME;

use crate::shared::WindowKind;
use crate::wm::display::Display;
use crate::wm::error::log_warn;
use crate::wm::ewmh;
use crate::wm::hints;
use crate::wm::WindowManager;

impl<D: Display> WindowManager<D> {
    /// Focus a tiled window, or the root to clear focus.
    ///
    /// Clients advertising WM_TAKE_FOCUS are asked to take focus themselves;
    /// everyone else gets it set directly.
    pub fn set_focus(&mut self, window: Window, time: Timestamp) -> Result<()> {
        let root = self.display.root();
        let tiled = self
            .tree
            .frame(window)
            .is_some_and(|f| f.client.kind == WindowKind::Normal);
        if window != root && !tiled {
            return Ok(());
        }

        let previous = self.focus;
        self.focus = (window != root).then_some(window);

        let atoms = self.display.atoms();
        if window != root && hints::supports_protocol(&self.display, window, atoms.wm_take_focus) {
            debug!("Sending WM_TAKE_FOCUS to 0x{:x}", window);
            self.display.send_client_message(
                window,
                atoms.wm_protocols,
                [atoms.wm_take_focus, time, 0, 0, 0],
            )?;
        } else {
            self.display.set_input_focus(window, time)?;
        }
        ewmh::set_active_window(&self.display, self.focus)?;

        if previous != self.focus {
            for w in [previous, self.focus].into_iter().flatten() {
                self.redraw_titlebar(w);
            }
        }
        Ok(())
    }

    /// Hand focus back to the root window.
    pub fn remove_focus(&mut self) {
        let root = self.display.root();
        log_warn(self.set_focus(root, CURRENT_TIME), "clear focus");
    }

    fn redraw_titlebar(&self, window: Window) {
        if let Some(frame) = self.tree.frame(window) {
            let focused = self.focus == Some(window);
            log_warn(self.decorations.draw(&self.display, frame, focused), "draw titlebar");
        }
    }

    /// Put the pointer in the middle of a frame so focus-follows-mouse
    /// keeps up with keyboard moves.
    pub fn warp_pointer_to(&self, window: Window) {
        if let Some(frame) = self.tree.frame(window) {
            let (x, y) = frame.geometry.center();
            log_warn(self.display.warp_pointer(x, y), "warp pointer");
        }
    }
}

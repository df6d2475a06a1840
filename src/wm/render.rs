//! Render Module
//!
//! Pushes the geometry computed by the layout engine to the server,
//! top-down: output docks, then the active workspace, then each frame.

use anyhow::Result;
use tracing::debug;
use x11rb::protocol::xproto::Window;

use crate::wm::decorations::Decorations;
use crate::wm::display::Display;
use crate::wm::error::log_warn;
use crate::wm::frame::Frame;
use crate::wm::workspace::{Workspace, WorkspaceId};
use crate::wm::WindowManager;

/// Tell the client where it is, in root coordinates.
pub fn configure_notify<D: Display>(display: &D, decorations: &Decorations, frame: &Frame) -> Result<()> {
    display.send_configure_notify(frame.window(), decorations.client_geometry(frame))
}

/// Configure one frame (and its client inside the frame window).
/// Unmapped clients are left alone.
pub fn frame<D: Display>(display: &D, decorations: &Decorations, frame: &Frame, focused: bool) -> Result<()> {
    if !frame.client.is_mapped() {
        return Ok(());
    }

    match frame.client.parent {
        Some(parent) => {
            display.configure_window(parent, frame.geometry)?;
            display.configure_window(frame.window(), decorations.client_area(frame.geometry))?;
            decorations.draw(display, frame, focused)?;
        }
        None => display.configure_window(frame.window(), frame.geometry)?,
    }
    configure_notify(display, decorations, frame)
}

/// Lay out and configure every frame of a workspace.
pub fn workspace<D: Display>(
    display: &D,
    decorations: &Decorations,
    workspace: &mut Workspace,
    inner_gap: u32,
    focus: Option<Window>,
) {
    workspace.arrange(inner_gap);
    for f in workspace.frames() {
        log_warn(
            frame(display, decorations, f, focus == Some(f.window())),
            "render frame",
        );
    }
}

impl<D: Display> WindowManager<D> {
    pub fn render_workspace(&mut self, id: WorkspaceId) {
        let Some(ws) = self.tree.workspace_mut(id) else {
            return;
        };
        workspace(&self.display, &self.decorations, ws, self.config.inner_gap, self.focus);
        debug!("Rendered workspace {}", id);
    }

    /// Docks first, then the active workspace.
    pub fn render_output(&mut self) {
        let output = self.tree.output_mut();
        output.arrange_docks();
        for dock in output.docks() {
            log_warn(frame(&self.display, &self.decorations, dock, false), "render dock");
        }
        let active = self.tree.active_id();
        self.render_workspace(active);
    }
}

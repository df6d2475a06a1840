//! Actions Module
//!
//! Executes the actions bound in the registry against the active window.

use anyhow::Result;
use tracing::{debug, info, warn};
use x11rb::protocol::xproto::{Timestamp, Window};

use crate::wm::display::Display;
use crate::wm::error::WmError;
use crate::wm::keyboard::Action;
use crate::wm::spawn;
use crate::wm::tree::Location;
use crate::wm::workspace::WorkspaceId;
use crate::wm::WindowManager;

impl<D: Display> WindowManager<D> {
    pub fn run_action(&mut self, action: Action, time: Timestamp) -> Result<()> {
        match action {
            Action::Close => {
                let Some((window, _)) = self.active_tiled() else {
                    return Ok(());
                };
                if let Some(frame) = self.tree.frame(window) {
                    frame.client.close(&self.display, time)?;
                }
            }
            Action::Exit => {
                info!("Exit requested");
                self.running = false;
            }
            Action::Move(direction) => {
                let Some((window, id)) = self.active_tiled() else {
                    return Ok(());
                };
                if let Some(ws) = self.tree.workspace_mut(id) {
                    ws.move_frame(window, direction)?;
                }
                self.render_workspace(id);
                self.warp_pointer_to(window);
            }
            Action::Resize(axis, percent) => {
                let Some((window, id)) = self.active_tiled() else {
                    return Ok(());
                };
                if let Some(ws) = self.tree.workspace_mut(id) {
                    ws.resize_frame(window, axis, percent)?;
                }
                self.render_workspace(id);
                self.warp_pointer_to(window);
            }
            Action::SwitchWorkspace(id) => self.switch_workspace(id)?,
            Action::MoveToWorkspace(id) => {
                let Some((window, _)) = self.active_tiled() else {
                    return Ok(());
                };
                self.move_frame_to_workspace(window, id)?;
            }
            Action::Spawn(command) => spawn::spawn_shell(&self.config.shell, &command),
        }
        Ok(())
    }

    /// The focused window and its workspace, if it is still tiled
    fn active_tiled(&self) -> Option<(Window, WorkspaceId)> {
        let Some(window) = self.focus else {
            debug!("No active window");
            return None;
        };
        match self.tree.locate(window) {
            Some(Location::Tiled(id)) => Some((window, id)),
            _ => {
                warn!("Active window 0x{:x} is no longer managed", window);
                None
            }
        }
    }

    /// Move a tiled window to another workspace of the output.
    pub fn move_frame_to_workspace(&mut self, window: Window, target: WorkspaceId) -> Result<()> {
        let Some(Location::Tiled(source)) = self.tree.locate(window) else {
            return Err(WmError::FrameNotFound(window).into());
        };
        if source == target {
            return Ok(());
        }
        self.tree.ensure_attached(target)?;

        let frame = self
            .tree
            .workspace_mut(source)
            .and_then(|ws| ws.remove_frame(window))
            .ok_or(WmError::FrameNotFound(window))?;
        frame.client.unmap(&self.display)?;

        let visible = self.tree.active_id() == target;
        if let Some(ws) = self.tree.workspace_mut(target) {
            ws.add_frame(frame);
            if visible {
                if let Some(frame) = ws.frame_mut(window) {
                    frame.client.map(&self.display)?;
                }
            }
        }
        debug!("Moved 0x{:x} from workspace {} to {}", window, source, target);

        self.render_workspace(source);
        self.render_workspace(target);
        if self.focus == Some(window) {
            self.remove_focus();
        }
        self.update_desktop_hints()
    }
}

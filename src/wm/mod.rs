//! Window Manager Module
//!
//! The tiling core: the layout tree, the event dispatcher and the action
//! registry, driven by a single blocking event loop.

pub mod actions;
pub mod client;
pub mod column;
pub mod decorations;
pub mod display;
pub mod error;
pub mod events;
pub mod ewmh;
pub mod focus;
pub mod frame;
pub mod hints;
pub mod keyboard;
pub mod keysym;
pub mod output;
pub mod render;
pub mod spawn;
pub mod tree;
pub mod workspace;

#[cfg(test)]
pub mod testing;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};
use x11rb::protocol::xproto::Window;

use crate::config::Config;
use crate::shared::WindowKind;
use crate::wm::client::Client;
use crate::wm::decorations::Decorations;
use crate::wm::display::Display;
use crate::wm::error::log_warn;
use crate::wm::ewmh::DesktopHints;
use crate::wm::frame::Frame;
use crate::wm::keyboard::ActionRegistry;
use crate::wm::tree::{Location, Tree};
use crate::wm::workspace::WorkspaceId;

/// Size of the workspace pool
pub const MAX_WORKSPACES: u8 = 10;

pub struct WindowManager<D: Display> {
    display: D,
    config: Config,
    decorations: Decorations,
    tree: Tree,
    actions: ActionRegistry,
    /// Window holding input focus; `None` when focus is on the root
    focus: Option<Window>,
    running: bool,
}

impl<D: Display> WindowManager<D> {
    /// Load the keymap, grab the bound keys and publish the initial hints.
    pub fn new(display: D, config: Config) -> Result<Self> {
        let keymap = display
            .keyboard_mapping()
            .context("Failed to load the keyboard mapping")?;
        let actions = ActionRegistry::new(&config, keymap, MAX_WORKSPACES);
        actions.grab_keys(&display);

        let screen = display.screen_geometry();
        let tree = Tree::new(screen, MAX_WORKSPACES, config.outer_gap);
        info!(
            "Output {}x{} with {} workspaces",
            screen.width, screen.height, MAX_WORKSPACES
        );

        let mut wm = Self {
            decorations: Decorations::from_config(&config),
            display,
            config,
            tree,
            actions,
            focus: None,
            running: true,
        };
        log_warn(wm.update_desktop_hints(), "publish desktop hints");
        wm.remove_focus();
        wm.display.flush()?;
        Ok(wm)
    }

    /// Manage every viewable, non-override-redirect window that already
    /// exists.
    pub fn scan_windows(&mut self) -> Result<()> {
        let windows = self
            .display
            .top_level_windows()
            .context("Failed to query the root window's children")?;

        let mut managed = 0;
        for window in windows {
            let Some(info) = log_warn(self.display.window_info(window), "read window attributes")
            else {
                continue;
            };
            if info.override_redirect || !info.viewable {
                continue;
            }
            match self.manage_window(window, true) {
                Ok(()) => managed += 1,
                Err(e) => warn!("Failed to manage existing window 0x{:x}: {:#}", window, e),
            }
        }
        info!("Adopted {} existing windows", managed);

        self.update_desktop_hints()?;
        self.display.flush()
    }

    /// Process events until an exit is requested or the connection dies.
    pub fn run(&mut self) -> Result<()> {
        info!("Entering event loop");
        while self.running {
            let event = self.display.next_event()?;
            self.handle_event(event);
        }
        info!("Leaving event loop");
        Ok(())
    }

    /// Classify a window and place it: Normal windows are framed and tiled
    /// on the active workspace, docks are reserved on the output.
    pub fn manage_window(&mut self, window: Window, viewable: bool) -> Result<()> {
        if self.tree.is_managed(window) {
            return Ok(());
        }

        let kind = hints::window_kind(&self.display, window);
        if kind == WindowKind::Unknown {
            bail!("Could not determine the type of 0x{:x}", window);
        }
        // Selected before reparenting so the resulting UnmapNotify reaches the
        // client's own mask, where `pending_unmaps` expects it.
        self.display
            .select_client_events(window)
            .with_context(|| format!("Failed to select events on 0x{:x}", window))?;
        let client = Client::manage(&self.display, window, kind, viewable, self.config.border_color)?;
        let frame = Frame::new(client);

        match kind {
            WindowKind::Dock => self.add_dock(window, frame),
            WindowKind::Normal | WindowKind::Unknown => {
                let id = self.tree.active_id();
                if let Some(ws) = self.tree.workspace_mut(id) {
                    ws.add_frame(frame);
                    if let Some(frame) = ws.frame_mut(window) {
                        frame.client.map(&self.display)?;
                    }
                }
                info!("Managing 0x{:x} on workspace {}", window, id);
                self.render_workspace(id);
                Ok(())
            }
        }
    }

    fn add_dock(&mut self, window: Window, frame: Frame) -> Result<()> {
        let struts = hints::read_struts(&self.display, window)?;
        let area = self.tree.output_mut().add_dock(frame, &struts)?;
        info!("Managing dock 0x{:x} at the {:?} edge", window, area);

        self.tree.update_tiling();
        if let Some(dock) = self.tree.output_mut().dock_mut(window) {
            dock.client.map(&self.display)?;
        }
        self.render_output();
        Ok(())
    }

    /// Forget a destroyed window: destroy its frame window, unlink it from
    /// the tree and re-render what it leaves behind.
    pub fn delete_frame(&mut self, window: Window) -> Result<()> {
        let Some((mut frame, location)) = self.tree.remove(window) else {
            return Err(error::WmError::FrameNotFound(window).into());
        };
        log_warn(frame.client.on_destroy(&self.display), "destroy frame window");
        debug!("Unmanaged 0x{:x}", window);

        match location {
            Location::Tiled(id) => self.render_workspace(id),
            Location::Dock(_) => self.render_output(),
        }
        if self.focus == Some(window) {
            self.remove_focus();
        }
        Ok(())
    }

    /// Show workspace `target` on the output.
    ///
    /// Unknown ids and workspaces owned by another output are errors that
    /// leave the current state untouched.
    pub fn switch_workspace(&mut self, target: WorkspaceId) -> Result<()> {
        self.tree.ensure_attached(target)?;
        let previous = self.tree.active_id();
        if previous == target {
            return Ok(());
        }

        if let Some(ws) = self.tree.workspace(previous) {
            for frame in ws.frames() {
                log_warn(frame.client.unmap(&self.display), "hide window");
            }
        }
        if let Some(ws) = self.tree.workspace_mut(target) {
            for frame in ws.frames_mut() {
                log_warn(frame.client.map(&self.display), "show window");
            }
        }
        self.tree.set_active(target);
        info!("Switched to workspace {}", target);

        self.render_workspace(target);
        self.remove_focus();
        self.update_desktop_hints()
    }

    /// Republish the desktop and client-list hints in full.
    pub fn update_desktop_hints(&self) -> Result<()> {
        DesktopHints::collect(self.tree.output(), &self.tree.workspaces).publish(&self.display)
    }
}

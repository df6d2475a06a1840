//! Tree Module
//!
//! Ownership root of the layout: the outputs and the fixed workspace pool.
//! Upward links are plain ids, so every lookup goes through here.

use tracing::debug;
use x11rb::protocol::xproto::Window;

use crate::shared::Geometry;
use crate::wm::error::WmError;
use crate::wm::frame::Frame;
use crate::wm::output::{Output, OutputId};
use crate::wm::workspace::{Workspace, WorkspaceId};

/// Where a managed window lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Tiled(WorkspaceId),
    Dock(OutputId),
}

#[derive(Debug)]
pub struct Tree {
    outputs: Vec<Output>,
    /// Workspace pool, indexed by id
    pub workspaces: Vec<Workspace>,
}

impl Tree {
    /// One output covering `screen`, a pool of `count` workspaces, and
    /// workspace 0 attached and active.
    pub fn new(screen: Geometry, count: u8, outer_gap: u32) -> Self {
        let mut workspaces: Vec<Workspace> = (0..count.max(1))
            .map(|id| Workspace::new(id, outer_gap))
            .collect();
        let output = Output::new(0, screen, &mut workspaces[0]);
        Self {
            outputs: vec![output],
            workspaces,
        }
    }

    /// The single supported output
    pub fn output(&self) -> &Output {
        &self.outputs[0]
    }

    pub fn output_mut(&mut self) -> &mut Output {
        &mut self.outputs[0]
    }

    pub fn active_id(&self) -> WorkspaceId {
        self.output().active
    }

    pub fn workspace(&self, id: WorkspaceId) -> Option<&Workspace> {
        self.workspaces.get(usize::from(id)).filter(|w| w.id == id)
    }

    pub fn workspace_mut(&mut self, id: WorkspaceId) -> Option<&mut Workspace> {
        self.workspaces.get_mut(usize::from(id)).filter(|w| w.id == id)
    }

    pub fn locate(&self, window: Window) -> Option<Location> {
        if let Some(ws) = self.workspaces.iter().find(|w| w.find(window).is_some()) {
            return Some(Location::Tiled(ws.id));
        }
        self.outputs
            .iter()
            .find(|o| o.docks().any(|f| f.window() == window))
            .map(|o| Location::Dock(o.id))
    }

    pub fn is_managed(&self, window: Window) -> bool {
        self.locate(window).is_some()
    }

    pub fn frame(&self, window: Window) -> Option<&Frame> {
        self.workspaces
            .iter()
            .find_map(|w| w.frame(window))
            .or_else(|| {
                self.outputs
                    .iter()
                    .find_map(|o| o.docks().find(|f| f.window() == window))
            })
    }

    pub fn frame_mut(&mut self, window: Window) -> Option<&mut Frame> {
        match self.locate(window)? {
            Location::Tiled(id) => self.workspace_mut(id)?.frame_mut(window),
            Location::Dock(_) => self.outputs.iter_mut().find_map(|o| o.dock_mut(window)),
        }
    }

    /// Frame whose client or frame window is `window`
    pub fn frame_owning(&self, window: Window) -> Option<&Frame> {
        self.workspaces
            .iter()
            .flat_map(|w| w.frames())
            .chain(self.outputs.iter().flat_map(|o| o.docks()))
            .find(|f| f.owns(window))
    }

    /// Unlink a frame from wherever it lives.
    pub fn remove(&mut self, window: Window) -> Option<(Frame, Location)> {
        let location = self.locate(window)?;
        let frame = match location {
            Location::Tiled(id) => self.workspace_mut(id)?.remove_frame(window)?,
            Location::Dock(_) => {
                let frame = self.output_mut().remove_dock(window)?;
                self.update_tiling();
                frame
            }
        };
        Some((frame, location))
    }

    /// Attach a detached workspace to the output; fails for unknown ids and
    /// for workspaces owned by another output.
    pub fn ensure_attached(&mut self, id: WorkspaceId) -> Result<(), WmError> {
        let output = &mut self.outputs[0];
        let workspace = self
            .workspaces
            .get_mut(usize::from(id))
            .filter(|w| w.id == id)
            .ok_or(WmError::NoSuchWorkspace(id))?;

        match workspace.output {
            None => {
                output.attach(workspace);
                Ok(())
            }
            Some(owner) if owner != output.id => Err(WmError::MultipleOutputs(id)),
            Some(_) => Ok(()),
        }
    }

    /// Make `target` the active workspace; the previous one is detached
    /// when it holds no columns.
    pub fn set_active(&mut self, target: WorkspaceId) {
        let output = &mut self.outputs[0];
        let previous = output.active;
        output.active = target;
        if previous == target {
            return;
        }
        if let Some(workspace) = self
            .workspaces
            .get_mut(usize::from(previous))
            .filter(|w| w.columns.is_empty())
        {
            output.detach(workspace);
        }
        debug!("Workspace {} -> {}", previous, target);
    }

    /// Recompute the area of every attached workspace after a dock change.
    pub fn update_tiling(&mut self) {
        for output in &self.outputs {
            output.update_tiling(&mut self.workspaces);
        }
    }
}

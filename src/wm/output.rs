//! Output Module
//!
//! A physical display region: the workspaces attached to it, the active
//! one, and the dock strips reserved at its top and bottom edges.

use tracing::debug;
use x11rb::protocol::xproto::Window;

use crate::shared::Geometry;
use crate::wm::error::WmError;
use crate::wm::frame::Frame;
use crate::wm::hints::Struts;
use crate::wm::workspace::{Workspace, WorkspaceId};

pub type OutputId = usize;

/// Edge a dock is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockArea {
    Top,
    Bottom,
}

impl DockArea {
    /// Pick the edge from a dock's struts; equal top and bottom is ambiguous.
    pub fn from_struts(struts: &Struts) -> Result<(Self, u32), WmError> {
        if struts.top > struts.bottom {
            Ok((DockArea::Top, struts.top))
        } else if struts.bottom > struts.top {
            Ok((DockArea::Bottom, struts.bottom))
        } else {
            Err(WmError::AmbiguousDock {
                top: struts.top,
                bottom: struts.bottom,
            })
        }
    }
}

#[derive(Debug, Clone)]
pub struct Output {
    pub id: OutputId,
    pub geometry: Geometry,
    /// Attached workspaces, sorted by id
    pub workspaces: Vec<WorkspaceId>,
    /// The visible workspace; always one of `workspaces`
    pub active: WorkspaceId,
    top_docks: Vec<Frame>,
    bottom_docks: Vec<Frame>,
}

impl Output {
    /// Create an output showing `initial`.
    pub fn new(id: OutputId, geometry: Geometry, initial: &mut Workspace) -> Self {
        let mut output = Self {
            id,
            geometry,
            workspaces: Vec::new(),
            active: initial.id,
            top_docks: Vec::new(),
            bottom_docks: Vec::new(),
        };
        output.attach(initial);
        output
    }

    /// Area left for workspaces once the docks are subtracted
    pub fn workspace_area(&self) -> Geometry {
        let top = self.dock_height(DockArea::Top);
        let bottom = self.dock_height(DockArea::Bottom);
        Geometry::new(
            self.geometry.x,
            self.geometry.y + top as i32,
            self.geometry.width,
            self.geometry.height.saturating_sub(top + bottom),
        )
    }

    pub fn dock_height(&self, area: DockArea) -> u32 {
        self.docks_in(area).iter().map(|f| f.height).sum()
    }

    fn docks_in(&self, area: DockArea) -> &Vec<Frame> {
        match area {
            DockArea::Top => &self.top_docks,
            DockArea::Bottom => &self.bottom_docks,
        }
    }

    pub fn docks(&self) -> impl Iterator<Item = &Frame> {
        self.top_docks.iter().chain(self.bottom_docks.iter())
    }

    pub fn docks_mut(&mut self) -> impl Iterator<Item = &mut Frame> {
        self.top_docks.iter_mut().chain(self.bottom_docks.iter_mut())
    }

    pub fn dock_mut(&mut self, window: Window) -> Option<&mut Frame> {
        self.docks_mut().find(|f| f.window() == window)
    }

    pub fn is_attached(&self, id: WorkspaceId) -> bool {
        self.workspaces.contains(&id)
    }

    /// Attach `workspace`, keeping the list sorted, and hand it this
    /// output's area.
    pub fn attach(&mut self, workspace: &mut Workspace) {
        workspace.output = Some(self.id);
        if let Err(index) = self.workspaces.binary_search(&workspace.id) {
            self.workspaces.insert(index, workspace.id);
        }
        workspace.set_area(self.workspace_area());
        debug!("Attached workspace {} to output {}", workspace.id, self.id);
    }

    pub fn detach(&mut self, workspace: &mut Workspace) {
        self.workspaces.retain(|id| *id != workspace.id);
        workspace.output = None;
        debug!("Detached workspace {} from output {}", workspace.id, self.id);
    }

    /// Record a dock whose height is its strut on the chosen edge.
    pub fn add_dock(&mut self, mut frame: Frame, struts: &Struts) -> Result<DockArea, WmError> {
        let (area, height) = DockArea::from_struts(struts)?;
        frame.height = height;
        frame.column = None;
        match area {
            DockArea::Top => self.top_docks.push(frame),
            DockArea::Bottom => self.bottom_docks.push(frame),
        }
        Ok(area)
    }

    pub fn remove_dock(&mut self, window: Window) -> Option<Frame> {
        for docks in [&mut self.top_docks, &mut self.bottom_docks] {
            if let Some(index) = docks.iter().position(|f| f.window() == window) {
                return Some(docks.remove(index));
            }
        }
        None
    }

    /// Hand the current area to every attached workspace.
    pub fn update_tiling(&self, workspaces: &mut [Workspace]) {
        let area = self.workspace_area();
        for workspace in workspaces.iter_mut().filter(|w| self.is_attached(w.id)) {
            workspace.set_area(area);
        }
    }

    /// Stack top docks down from the top edge and bottom docks up to the
    /// bottom edge.
    pub fn arrange_docks(&mut self) {
        let geometry = self.geometry;
        let mut y = geometry.y;
        for dock in &mut self.top_docks {
            dock.geometry = Geometry::new(geometry.x, y, geometry.width, dock.height);
            y += dock.height as i32;
        }

        let bottom: u32 = self.bottom_docks.iter().map(|f| f.height).sum();
        let mut y = geometry.y + geometry.height.saturating_sub(bottom) as i32;
        for dock in &mut self.bottom_docks {
            dock.geometry = Geometry::new(geometry.x, y, geometry.width, dock.height);
            y += dock.height as i32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::WindowKind;
    use crate::wm::client::Client;

    fn frame(window: Window, kind: WindowKind) -> Frame {
        Frame::new(Client::new(window, kind))
    }

    fn struts(top: u32, bottom: u32) -> Struts {
        Struts { left: 0, right: 0, top, bottom }
    }

    fn setup() -> (Output, Vec<Workspace>) {
        let mut workspaces: Vec<Workspace> = (0..10).map(|id| Workspace::new(id, 0)).collect();
        let output = Output::new(0, Geometry::new(0, 0, 1920, 1080), &mut workspaces[0]);
        (output, workspaces)
    }

    #[test]
    fn test_new_attaches_initial_workspace() {
        let (output, workspaces) = setup();
        assert_eq!(output.workspaces, vec![0]);
        assert_eq!(output.active, 0);
        assert_eq!(workspaces[0].output, Some(0));
        assert_eq!(workspaces[0].area(), Geometry::new(0, 0, 1920, 1080));
        assert_eq!(workspaces[1].output, None);
    }

    #[test]
    fn test_attach_keeps_sorted_and_detach_clears() {
        let (mut output, mut workspaces) = setup();
        output.attach(&mut workspaces[5]);
        output.attach(&mut workspaces[2]);
        output.attach(&mut workspaces[5]);
        assert_eq!(output.workspaces, vec![0, 2, 5]);

        output.detach(&mut workspaces[2]);
        assert_eq!(output.workspaces, vec![0, 5]);
        assert_eq!(workspaces[2].output, None);
    }

    #[test]
    fn test_top_dock_shrinks_and_restores_area() {
        let (mut output, mut workspaces) = setup();
        output.attach(&mut workspaces[1]);
        workspaces[0].add_frame(frame(0x10, WindowKind::Normal));
        workspaces[1].add_frame(frame(0x11, WindowKind::Normal));
        workspaces[1].add_frame(frame(0x12, WindowKind::Normal));
        let original = output.workspace_area();

        assert_eq!(output.add_dock(frame(0x20, WindowKind::Dock), &struts(30, 0)), Ok(DockArea::Top));
        output.update_tiling(&mut workspaces);
        for ws in &workspaces[..2] {
            assert_eq!(ws.area(), Geometry::new(0, 30, 1920, 1050));
            assert!(ws.columns.iter().all(|c| c.total_height() == 1050));
        }

        assert!(output.remove_dock(0x20).is_some());
        output.update_tiling(&mut workspaces);
        assert_eq!(output.workspace_area(), original);
        for ws in &workspaces[..2] {
            assert_eq!(ws.area(), original);
            assert!(ws.columns.iter().all(|c| c.total_height() == 1080));
        }
    }

    #[test]
    fn test_equal_struts_are_rejected() {
        let (mut output, _) = setup();
        let result = output.add_dock(frame(0x20, WindowKind::Dock), &struts(0, 0));
        assert_eq!(result, Err(WmError::AmbiguousDock { top: 0, bottom: 0 }));
        assert_eq!(output.docks().count(), 0);
    }

    #[test]
    fn test_arrange_docks() {
        let (mut output, _) = setup();
        output.add_dock(frame(0x20, WindowKind::Dock), &struts(24, 0)).unwrap();
        output.add_dock(frame(0x21, WindowKind::Dock), &struts(0, 20)).unwrap();
        output.add_dock(frame(0x22, WindowKind::Dock), &struts(0, 16)).unwrap();
        output.arrange_docks();

        let geometries: Vec<Geometry> = output.docks().map(|f| f.geometry).collect();
        assert_eq!(
            geometries,
            vec![
                Geometry::new(0, 0, 1920, 24),
                Geometry::new(0, 1044, 1920, 20),
                Geometry::new(0, 1064, 1920, 16),
            ]
        );
        assert_eq!(output.workspace_area(), Geometry::new(0, 24, 1920, 1020));
    }
}

//! Frame Module
//!
//! A tiling slot owning exactly one client.

use x11rb::protocol::xproto::Window;

use crate::shared::Geometry;
use crate::wm::client::Client;

/// Identifier of a column, unique within its workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnId(pub u32);

#[derive(Debug, Clone)]
pub struct Frame {
    pub client: Client,
    /// Height share within the owning column (docks: the strut height)
    pub height: u32,
    /// Absolute geometry from the last layout pass
    pub geometry: Geometry,
    /// Owning column; `None` while detached or for docks
    pub column: Option<ColumnId>,
}

impl Frame {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            height: 0,
            geometry: Geometry::default(),
            column: None,
        }
    }

    pub fn window(&self) -> Window {
        self.client.window
    }

    /// Whether `window` is this frame's client or its frame window
    pub fn owns(&self, window: Window) -> bool {
        self.client.window == window || self.client.frame_window() == window
    }
}

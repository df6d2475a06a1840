//! Window state shared between the tiling tree and the X11 layer
//!
//! Plain value types with no protocol access, so the layout engine can be
//! exercised without a display connection.

/// Window geometry in root coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Shrink the rectangle by `inset` pixels on every side.
    ///
    /// Saturates at zero instead of wrapping when the inset is larger
    /// than half of a dimension.
    pub fn inset(&self, inset: u32) -> Self {
        Self {
            x: self.x + inset as i32,
            y: self.y + inset as i32,
            width: self.width.saturating_sub(inset * 2),
            height: self.height.saturating_sub(inset * 2),
        }
    }

    /// Centre point, used for pointer warps
    pub fn center(&self) -> (i32, i32) {
        (
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }
}

/// Classification of a window taken from `_NET_WM_WINDOW_TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowKind {
    /// Tiled application window, wrapped in a frame window
    #[default]
    Normal,
    /// Panel/bar reserving a strip at the top or bottom of an output
    Dock,
    /// Type property could not be read; such windows are not managed
    Unknown,
}

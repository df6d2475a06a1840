//! Workspace Module
//!
//! One virtual desktop: an ordered row of columns tiled horizontally.
//! Column widths always sum to the content width, and frame heights in each
//! column to the content height. A workspace holding a single frame skips
//! the column math and gives that frame the whole workspace area.

use tracing::debug;
use x11rb::protocol::xproto::Window;

use crate::shared::Geometry;
use crate::wm::column::{equalize, make_room, Column};
use crate::wm::error::WmError;
use crate::wm::frame::{ColumnId, Frame};
use crate::wm::output::OutputId;

/// Stable workspace id, also the index into the workspace pool
pub type WorkspaceId = u8;

/// Smallest share an element may be resized to, in percent of the container
pub const MIN_SHARE_PERCENT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Column width
    Horizontal,
    /// Frame height within its column
    Vertical,
}

#[derive(Debug, Clone)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub columns: Vec<Column>,
    /// Output this workspace is attached to
    pub output: Option<OutputId>,
    /// Outer gap around the tiling area
    gap: u32,
    /// Area granted by the output (screen minus docks)
    full_area: Geometry,
    next_column: u32,
}

impl Workspace {
    pub fn new(id: WorkspaceId, gap: u32) -> Self {
        Self {
            id,
            columns: Vec::new(),
            output: None,
            gap,
            full_area: Geometry::default(),
            next_column: 0,
        }
    }

    /// Content area the columns tile (output area minus the outer gap)
    pub fn area(&self) -> Geometry {
        self.full_area.inset(self.gap)
    }

    /// Adopt a new output area and re-tile.
    pub fn set_area(&mut self, full_area: Geometry) {
        self.full_area = full_area;
        self.update_tiling();
    }

    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.columns.iter().flat_map(|c| c.frames.iter())
    }

    pub fn frames_mut(&mut self) -> impl Iterator<Item = &mut Frame> {
        self.columns.iter_mut().flat_map(|c| c.frames.iter_mut())
    }

    pub fn frame_count(&self) -> usize {
        self.columns.iter().map(|c| c.frames.len()).sum()
    }

    /// Column and row of the frame holding `window`
    pub fn find(&self, window: Window) -> Option<(usize, usize)> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(ci, c)| c.position(window).map(|fi| (ci, fi)))
    }

    pub fn frame(&self, window: Window) -> Option<&Frame> {
        let (ci, fi) = self.find(window)?;
        Some(&self.columns[ci].frames[fi])
    }

    pub fn frame_mut(&mut self, window: Window) -> Option<&mut Frame> {
        let (ci, fi) = self.find(window)?;
        Some(&mut self.columns[ci].frames[fi])
    }

    /// Insert a column at the start or the end; returns its index.
    pub fn create_column(&mut self, at_start: bool) -> usize {
        let width = self.area().width;
        let mut column = Column::new(ColumnId(self.next_column), self.id);
        self.next_column += 1;
        column.width = make_room(self.columns.iter_mut().map(|c| &mut c.width), width);

        if at_start {
            self.columns.insert(0, column);
            0
        } else {
            self.columns.push(column);
            self.columns.len() - 1
        }
    }

    /// Remove the column at `index` and share its width out equally.
    pub fn delete_column(&mut self, index: usize) -> Column {
        let column = self.columns.remove(index);
        let width = self.area().width;
        equalize(self.columns.iter_mut().map(|c| &mut c.width), width);
        column
    }

    /// Tile a new frame: the first two frames each open a column, later
    /// ones stack in the last column.
    pub fn add_frame(&mut self, frame: Frame) {
        let height = self.area().height;
        if self.columns.len() < 2 {
            self.create_column(false);
        }
        if let Some(column) = self.columns.last_mut() {
            column.add_frame(frame, height);
        }
    }

    /// Unlink the frame holding `window`, dropping its column if emptied.
    pub fn remove_frame(&mut self, window: Window) -> Option<Frame> {
        let (ci, fi) = self.find(window)?;
        let height = self.area().height;
        let frame = self.columns[ci].remove_frame_at(fi, height);
        if self.columns[ci].is_empty() {
            self.delete_column(ci);
        }
        Some(frame)
    }

    /// Move a frame to the neighbouring column (Left/Right), or swap it with
    /// its neighbour in the column (Up/Down).
    pub fn move_frame(&mut self, window: Window, direction: Direction) -> Result<(), WmError> {
        let (ci, fi) = self.find(window).ok_or(WmError::FrameNotFound(window))?;

        match direction {
            Direction::Up | Direction::Down => {
                self.columns[ci].swap(fi, direction == Direction::Up);
            }
            Direction::Left | Direction::Right => {
                let height = self.area().height;
                let frame = self.columns[ci].remove_frame_at(fi, height);

                let mut source = ci;
                let target = match direction {
                    Direction::Left if ci == 0 => {
                        source += 1;
                        self.create_column(true)
                    }
                    Direction::Left => ci - 1,
                    _ if ci + 1 == self.columns.len() => self.create_column(false),
                    _ => ci + 1,
                };
                self.columns[target].add_frame(frame, height);

                if self.columns[source].is_empty() {
                    self.delete_column(source);
                }
                debug!("Moved 0x{:x} {:?}, {} columns", window, direction, self.columns.len());
            }
        }
        Ok(())
    }

    /// Grow (or shrink, for a negative `percent`) a frame's column width or
    /// its height within the column.
    ///
    /// The delta is `dimension * percent / 100`; every sibling gives up an
    /// equal share and the target gains the sum. Fewer than two participants
    /// is a no-op; a result below the floor is rejected untouched.
    pub fn resize_frame(&mut self, window: Window, axis: Axis, percent: i32) -> Result<(), WmError> {
        let (ci, fi) = self.find(window).ok_or(WmError::FrameNotFound(window))?;
        let area = self.area();

        let (mut shares, target, total): (Vec<&mut u32>, usize, u32) = match axis {
            Axis::Horizontal => (
                self.columns.iter_mut().map(|c| &mut c.width).collect(),
                ci,
                area.width,
            ),
            Axis::Vertical => (
                self.columns[ci].frames.iter_mut().map(|f| &mut f.height).collect(),
                fi,
                area.height,
            ),
        };

        if shares.len() < 2 {
            return Ok(());
        }

        let minimum = total * MIN_SHARE_PERCENT / 100;
        let delta = i64::from(total) * i64::from(percent) / 100;
        let siblings = shares.len() as i64 - 1;
        let part = delta / siblings;

        let resized: Vec<i64> = shares
            .iter()
            .enumerate()
            .map(|(i, share)| {
                if i == target {
                    i64::from(**share) + part * siblings
                } else {
                    i64::from(**share) - part
                }
            })
            .collect();

        if let Some(size) = resized.iter().copied().find(|s| *s < i64::from(minimum)) {
            return Err(WmError::BelowMinimum { size, minimum });
        }

        for (share, size) in shares.iter_mut().zip(resized) {
            **share = size as u32;
        }
        Ok(())
    }

    /// Re-split frame heights equally in every column. Column widths are
    /// re-split only when they no longer fill the content width.
    pub fn update_tiling(&mut self) {
        let area = self.area();
        let width: u32 = self.columns.iter().map(|c| c.width).sum();
        if width != area.width {
            equalize(self.columns.iter_mut().map(|c| &mut c.width), area.width);
        }
        for column in &mut self.columns {
            column.update_tiling(area.height);
        }
    }

    /// Compute every frame's absolute geometry, each tiled frame inset by
    /// `inner_gap`.
    pub fn arrange(&mut self, inner_gap: u32) {
        if self.frame_count() == 1 {
            let full = self.full_area;
            if let Some(frame) = self.frames_mut().next() {
                frame.geometry = full;
            }
            return;
        }

        let area = self.area();
        let mut x = area.x;
        for column in &mut self.columns {
            let mut y = area.y;
            for frame in &mut column.frames {
                frame.geometry = Geometry::new(x, y, column.width, frame.height).inset(inner_gap);
                y += frame.height as i32;
            }
            x += column.width as i32;
        }
    }
}

//! Column Module
//!
//! A vertical stack of frames sharing one width allocation. Frame heights
//! always sum to the workspace content height.

use x11rb::protocol::xproto::Window;

use crate::wm::frame::{ColumnId, Frame};
use crate::wm::workspace::WorkspaceId;

/// Rescale `shares` to make room for one more element of a container of
/// size `total`, and return the newcomer's share.
///
/// The newcomer targets `total / (n + 1)`; existing shares are scaled by
/// `(total - target) / total` and truncated, and whatever truncation leaves
/// over is credited to the newcomer.
pub fn make_room<'a>(shares: impl ExactSizeIterator<Item = &'a mut u32>, total: u32) -> u32 {
    let count = shares.len() as u32;
    if count == 0 || total == 0 {
        for share in shares {
            *share = 0;
        }
        return total;
    }

    let target = total / (count + 1);
    let remaining = f64::from(total - target);
    let mut used: u32 = 0;
    for share in shares {
        *share = (f64::from(*share) / f64::from(total) * remaining) as u32;
        used += *share;
    }
    total.saturating_sub(used)
}

/// Split `total` equally; the division remainder goes to the last share.
pub fn equalize<'a>(shares: impl ExactSizeIterator<Item = &'a mut u32>, total: u32) {
    let count = shares.len() as u32;
    if count == 0 {
        return;
    }
    let each = total / count;
    let remainder = total - each * count;
    for (index, share) in shares.enumerate() {
        *share = if index as u32 == count - 1 {
            each + remainder
        } else {
            each
        };
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub id: ColumnId,
    /// Owning workspace
    pub workspace: WorkspaceId,
    /// Width share within the workspace
    pub width: u32,
    pub frames: Vec<Frame>,
}

impl Column {
    pub fn new(id: ColumnId, workspace: WorkspaceId) -> Self {
        Self {
            id,
            workspace,
            width: 0,
            frames: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn position(&self, window: Window) -> Option<usize> {
        self.frames.iter().position(|f| f.window() == window)
    }

    /// Append `frame` to the bottom of the stack.
    pub fn add_frame(&mut self, mut frame: Frame, height: u32) {
        frame.height = make_room(self.frames.iter_mut().map(|f| &mut f.height), height);
        frame.column = Some(self.id);
        self.frames.push(frame);
    }

    /// Remove the frame at `index` and share its height out equally.
    pub fn remove_frame_at(&mut self, index: usize, height: u32) -> Frame {
        let mut frame = self.frames.remove(index);
        frame.column = None;
        self.update_tiling(height);
        frame
    }

    pub fn remove_frame(&mut self, window: Window, height: u32) -> Option<Frame> {
        let index = self.position(window)?;
        Some(self.remove_frame_at(index, height))
    }

    /// Re-split `height` equally between the frames.
    pub fn update_tiling(&mut self, height: u32) {
        equalize(self.frames.iter_mut().map(|f| &mut f.height), height);
    }

    /// Swap the frame at `index` with its neighbour above (`up`) or below.
    /// Returns false at the boundary.
    pub fn swap(&mut self, index: usize, up: bool) -> bool {
        let other = if up {
            match index.checked_sub(1) {
                Some(other) => other,
                None => return false,
            }
        } else {
            index + 1
        };
        if other >= self.frames.len() {
            return false;
        }
        self.frames.swap(index, other);
        true
    }

    #[cfg(test)]
    pub fn total_height(&self) -> u32 {
        self.frames.iter().map(|f| f.height).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::WindowKind;
    use crate::wm::client::Client;

    fn frame(window: Window) -> Frame {
        Frame::new(Client::new(window, WindowKind::Normal))
    }

    fn heights(column: &Column) -> Vec<u32> {
        column.frames.iter().map(|f| f.height).collect()
    }

    #[test]
    fn test_first_frame_takes_full_height() {
        let mut column = Column::new(ColumnId(1), 0);
        column.add_frame(frame(1), 1080);
        assert_eq!(heights(&column), vec![1080]);
        assert_eq!(column.frames[0].column, Some(ColumnId(1)));
    }

    #[test]
    fn test_insert_sums_are_exact() {
        for height in [1080, 1061, 997, 7] {
            let mut column = Column::new(ColumnId(1), 0);
            for window in 1..=9 {
                column.add_frame(frame(window), height);
                assert_eq!(column.total_height(), height, "height {} after {} frames", height, window);
            }
        }
    }

    #[test]
    fn test_insert_is_proportional() {
        let mut column = Column::new(ColumnId(1), 0);
        column.add_frame(frame(1), 1080);
        column.add_frame(frame(2), 1080);
        assert_eq!(heights(&column), vec![540, 540]);
        column.add_frame(frame(3), 1080);
        assert_eq!(heights(&column), vec![360, 360, 360]);
    }

    #[test]
    fn test_leftover_goes_to_newcomer() {
        let mut column = Column::new(ColumnId(1), 0);
        column.add_frame(frame(1), 1000);
        column.add_frame(frame(2), 1000);
        column.add_frame(frame(3), 1000);
        assert_eq!(heights(&column), vec![333, 333, 334]);
    }

    #[test]
    fn test_remove_re_equalizes_exactly() {
        let mut column = Column::new(ColumnId(1), 0);
        for window in 1..=4 {
            column.add_frame(frame(window), 1000);
        }
        let removed = column.remove_frame(2, 1000).unwrap();
        assert_eq!(removed.column, None);
        assert_eq!(heights(&column), vec![333, 333, 334]);
        assert_eq!(column.total_height(), 1000);
        assert!(column.remove_frame(42, 1000).is_none());
    }

    #[test]
    fn test_swap_stops_at_boundary() {
        let mut column = Column::new(ColumnId(1), 0);
        for window in 1..=3 {
            column.add_frame(frame(window), 900);
        }
        assert!(!column.swap(0, true));
        assert!(!column.swap(2, false));
        assert!(column.swap(0, false));
        let order: Vec<Window> = column.frames.iter().map(|f| f.window()).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn test_equalize_credits_last() {
        let mut shares = vec![0u32; 3];
        equalize(shares.iter_mut(), 1920);
        assert_eq!(shares, vec![640, 640, 640]);
        equalize(shares.iter_mut(), 1921);
        assert_eq!(shares, vec![640, 640, 641]);
    }
}

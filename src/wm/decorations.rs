//! Window decorations: the border and the optional single-line titlebar
//! drawn on the frame window of a Normal client.

use anyhow::Result;

use crate::config::Config;
use crate::shared::Geometry;
use crate::wm::display::Display;
use crate::wm::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decorations {
    pub border: u32,
    /// Titlebar height; 0 disables the titlebar
    pub titlebar: u32,
    pub background: u32,
    pub font_active: u32,
    pub font_inactive: u32,
}

impl Decorations {
    pub fn from_config(config: &Config) -> Self {
        Self {
            border: config.border_width,
            titlebar: config.titlebar.height,
            background: config.titlebar.background,
            font_active: config.titlebar.font_color_active,
            font_inactive: config.titlebar.font_color_inactive,
        }
    }

    /// Client rectangle inside a frame window of size `frame`, relative to
    /// the frame window
    pub fn client_area(&self, frame: Geometry) -> Geometry {
        let top = self.border + self.titlebar;
        Geometry::new(
            self.border as i32,
            top as i32,
            frame.width.saturating_sub(2 * self.border),
            frame.height.saturating_sub(top + self.border),
        )
    }

    /// Titlebar strip relative to the frame window
    pub fn titlebar_area(&self, frame: Geometry) -> Option<Geometry> {
        if self.titlebar == 0 {
            return None;
        }
        Some(Geometry::new(
            self.border as i32,
            self.border as i32,
            frame.width.saturating_sub(2 * self.border),
            self.titlebar,
        ))
    }

    /// Where the client ends up in root coordinates
    pub fn client_geometry(&self, frame: &Frame) -> Geometry {
        if frame.client.parent.is_none() {
            return frame.geometry;
        }
        let inner = self.client_area(frame.geometry);
        Geometry::new(
            frame.geometry.x + inner.x,
            frame.geometry.y + inner.y,
            inner.width,
            inner.height,
        )
    }

    /// Paint the titlebar of a framed client.
    pub fn draw<D: Display>(&self, display: &D, frame: &Frame, focused: bool) -> Result<()> {
        let (Some(parent), Some(area)) = (frame.client.parent, self.titlebar_area(frame.geometry)) else {
            return Ok(());
        };
        let foreground = if focused {
            self.font_active
        } else {
            self.font_inactive
        };
        display.draw_titlebar(parent, area, self.background, foreground, &frame.client.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::WindowKind;
    use crate::wm::client::Client;
    use crate::wm::testing::{Call, MockDisplay};

    fn decorations() -> Decorations {
        Decorations {
            border: 2,
            titlebar: 18,
            background: 0xa1d1cf,
            font_active: 0x000000,
            font_inactive: 0x555555,
        }
    }

    fn framed(geometry: Geometry) -> Frame {
        let mut client = Client::new(0x10, WindowKind::Normal);
        client.parent = Some(0x11);
        client.title = "term".into();
        let mut frame = Frame::new(client);
        frame.geometry = geometry;
        frame
    }

    #[test]
    fn test_client_area_leaves_room_for_titlebar() {
        let area = decorations().client_area(Geometry::new(100, 100, 960, 540));
        assert_eq!(area, Geometry::new(2, 20, 956, 518));
    }

    #[test]
    fn test_client_geometry_in_root_coordinates() {
        let frame = framed(Geometry::new(960, 0, 960, 540));
        assert_eq!(decorations().client_geometry(&frame), Geometry::new(962, 20, 956, 518));

        let mut dock = Frame::new(Client::new(0x20, WindowKind::Dock));
        dock.geometry = Geometry::new(0, 0, 1920, 30);
        assert_eq!(decorations().client_geometry(&dock), dock.geometry);
    }

    #[test]
    fn test_draw_uses_focus_colour() {
        let display = MockDisplay::new();
        let frame = framed(Geometry::new(0, 0, 960, 540));
        decorations().draw(&display, &frame, true).unwrap();
        decorations().draw(&display, &frame, false).unwrap();
        assert_eq!(
            display.calls(),
            vec![
                Call::DrawTitlebar(0x11, "term".into(), 0x000000),
                Call::DrawTitlebar(0x11, "term".into(), 0x555555),
            ]
        );
    }

    #[test]
    fn test_no_titlebar_when_disabled() {
        let display = MockDisplay::new();
        let plain = Decorations { titlebar: 0, ..decorations() };
        plain.draw(&display, &framed(Geometry::new(0, 0, 10, 10)), true).unwrap();
        assert!(display.calls().is_empty());
    }
}

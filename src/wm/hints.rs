//! Hints Module
//!
//! Reads the ICCCM/EWMH properties that drive management decisions:
//! window type, struts, protocols and titles.

use anyhow::Result;
use tracing::warn;
use x11rb::protocol::xproto::{Atom, Window};

use crate::shared::WindowKind;
use crate::wm::display::Display;

/// Reserved screen margins published by a dock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Struts {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Struts {
    /// Parse the leading left/right/top/bottom values of a strut property
    pub fn from_values(values: &[u32]) -> Option<Self> {
        match values {
            [left, right, top, bottom, ..] => Some(Self {
                left: *left,
                right: *right,
                top: *top,
                bottom: *bottom,
            }),
            _ => None,
        }
    }
}

/// Classify a window from `_NET_WM_WINDOW_TYPE`.
///
/// A missing type defaults to Normal; an unreadable one is Unknown.
pub fn window_kind<D: Display>(display: &D, window: Window) -> WindowKind {
    let atoms = display.atoms();
    let types = match display.get_property32(window, atoms.net_wm_window_type) {
        Ok(types) => types,
        Err(e) => {
            warn!("Failed to read the window type of 0x{:x}: {:#}", window, e);
            return WindowKind::Unknown;
        }
    };

    if types.contains(&atoms.net_wm_window_type_dock) {
        WindowKind::Dock
    } else {
        WindowKind::Normal
    }
}

/// Read `_NET_WM_STRUT_PARTIAL`, falling back to `_NET_WM_STRUT`.
pub fn read_struts<D: Display>(display: &D, window: Window) -> Result<Struts> {
    let atoms = display.atoms();
    for property in [atoms.net_wm_strut_partial, atoms.net_wm_strut] {
        if let Some(struts) = Struts::from_values(&display.get_property32(window, property)?) {
            return Ok(struts);
        }
    }
    Ok(Struts::default())
}

/// Atoms listed in `WM_PROTOCOLS`
pub fn read_protocols<D: Display>(display: &D, window: Window) -> Vec<Atom> {
    display
        .get_property32(window, display.atoms().wm_protocols)
        .unwrap_or_default()
}

pub fn supports_protocol<D: Display>(display: &D, window: Window, protocol: Atom) -> bool {
    read_protocols(display, window).contains(&protocol)
}

/// Window title from `_NET_WM_NAME`, falling back to `WM_NAME`
pub fn read_title<D: Display>(display: &D, window: Window) -> String {
    let atoms = display.atoms();
    for property in [atoms.net_wm_name, atoms.wm_name] {
        match display.get_property8(window, property) {
            Ok(bytes) if !bytes.is_empty() => {
                return String::from_utf8_lossy(&bytes)
                    .trim_end_matches('\0')
                    .to_string();
            }
            _ => {}
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::testing::MockDisplay;

    #[test]
    fn test_window_kind_defaults_to_normal() {
        let display = MockDisplay::new();
        assert_eq!(window_kind(&display, 0x10), WindowKind::Normal);

        let atoms = display.atoms().clone();
        display
            .set_property32(0x10, atoms.net_wm_window_type, 4, &[atoms.net_wm_window_type_dock])
            .unwrap();
        assert_eq!(window_kind(&display, 0x10), WindowKind::Dock);

        display.vanish(0x10);
        assert_eq!(window_kind(&display, 0x10), WindowKind::Unknown);
    }

    #[test]
    fn test_struts_prefer_partial() {
        let display = MockDisplay::new();
        let atoms = display.atoms().clone();
        display.set_property32(0x10, atoms.net_wm_strut, 6, &[0, 0, 20, 0]).unwrap();
        assert_eq!(read_struts(&display, 0x10).unwrap().top, 20);

        let partial = [0, 0, 30, 0, 0, 0, 0, 0, 0, 1919, 0, 0];
        display.set_property32(0x10, atoms.net_wm_strut_partial, 6, &partial).unwrap();
        assert_eq!(
            read_struts(&display, 0x10).unwrap(),
            Struts { left: 0, right: 0, top: 30, bottom: 0 }
        );
    }

    #[test]
    fn test_short_strut_is_ignored() {
        assert_eq!(Struts::from_values(&[1, 2, 3]), None);
    }

    #[test]
    fn test_title_falls_back_to_wm_name() {
        let display = MockDisplay::new();
        let atoms = display.atoms().clone();
        display.set_property8(0x10, atoms.wm_name, 31, b"xterm\0").unwrap();
        assert_eq!(read_title(&display, 0x10), "xterm");

        display.set_property8(0x10, atoms.net_wm_name, atoms.utf8_string, "café".as_bytes()).unwrap();
        assert_eq!(read_title(&display, 0x10), "café");
    }
}

//! Client Module
//!
//! Identity and protocol-level behaviour of one managed window: its frame
//! window, title, and the map/unmap/destroy lifecycle.

use anyhow::{Context, Result};
use tracing::debug;
use x11rb::protocol::xproto::{Atom, Timestamp, Window};

use crate::shared::WindowKind;
use crate::wm::display::Display;
use crate::wm::hints;

/// Lifecycle state of a managed window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientState {
    /// Accepted and (for Normal windows) reparented, not yet mapped
    #[default]
    Managed,
    Mapped,
    Unmapped,
    Destroyed,
}

/// Managed client window
#[derive(Debug, Clone)]
pub struct Client {
    /// Client window ID
    pub window: Window,
    /// Frame window wrapping a Normal client; docks have none
    pub parent: Option<Window>,
    pub kind: WindowKind,
    pub state: ClientState,
    /// Cached `_NET_WM_NAME`/`WM_NAME`
    pub title: String,
    /// UnmapNotify events caused by our own reparenting, still to arrive
    pending_unmaps: u32,
}

impl Client {
    /// A client record with no protocol side effects
    pub fn new(window: Window, kind: WindowKind) -> Self {
        Self {
            window,
            parent: None,
            kind,
            state: ClientState::Managed,
            title: String::new(),
            pending_unmaps: 0,
        }
    }

    /// Take ownership of `window`.
    ///
    /// Normal windows get a frame window and are reparented into it. A window
    /// that is already viewable generates an UnmapNotify on its own event mask
    /// when reparented; that event is swallowed by `on_unmap`.
    pub fn manage<D: Display>(
        display: &D,
        window: Window,
        kind: WindowKind,
        viewable: bool,
        background: u32,
    ) -> Result<Self> {
        let mut client = Self::new(window, kind);
        client.title = hints::read_title(display, window);

        if kind != WindowKind::Dock {
            let parent = display
                .create_frame_window(background)
                .context("Failed to create frame window")?;
            display
                .reparent_window(window, parent, 0, 0)
                .with_context(|| format!("Failed to reparent 0x{:x}", window))?;
            client.parent = Some(parent);
            if viewable {
                client.pending_unmaps += 1;
            }
            debug!("Reparented 0x{:x} into frame 0x{:x}", window, parent);
        }

        Ok(client)
    }

    /// Window carrying the decoration: the frame if any, else the client
    pub fn frame_window(&self) -> Window {
        self.parent.unwrap_or(self.window)
    }

    pub fn is_mapped(&self) -> bool {
        self.state == ClientState::Mapped
    }

    /// Map the frame window, then the client.
    pub fn map<D: Display>(&mut self, display: &D) -> Result<()> {
        if let Some(parent) = self.parent {
            display.map_window(parent)?;
        }
        display.map_window(self.window)?;
        self.state = ClientState::Mapped;
        Ok(())
    }

    /// Hide the frame window at once and request an unmap of the client;
    /// the state flips when the client's UnmapNotify arrives.
    pub fn unmap<D: Display>(&self, display: &D) -> Result<()> {
        if let Some(parent) = self.parent {
            display.unmap_window(parent)?;
        }
        display.unmap_window(self.window)
    }

    /// React to an UnmapNotify. Returns whether the client changed state.
    pub fn on_unmap<D: Display>(&mut self, display: &D) -> Result<bool> {
        if self.pending_unmaps > 0 {
            self.pending_unmaps -= 1;
            return Ok(false);
        }
        if self.state == ClientState::Unmapped {
            return Ok(false);
        }
        self.state = ClientState::Unmapped;
        if let Some(parent) = self.parent {
            display.unmap_window(parent)?;
        }
        Ok(true)
    }

    /// React to a DestroyNotify: the frame window goes with the client.
    pub fn on_destroy<D: Display>(&mut self, display: &D) -> Result<()> {
        self.state = ClientState::Destroyed;
        if let Some(parent) = self.parent.take() {
            display.destroy_window(parent)?;
        }
        Ok(())
    }

    /// React to a PropertyNotify. Returns whether the title changed.
    pub fn on_property<D: Display>(&mut self, display: &D, atom: Atom) -> bool {
        let atoms = display.atoms();
        if atom != atoms.net_wm_name && atom != atoms.wm_name {
            return false;
        }
        let title = hints::read_title(display, self.window);
        if title == self.title {
            return false;
        }
        debug!("Title of 0x{:x} is now {:?}", self.window, title);
        self.title = title;
        true
    }

    /// Ask the client to close through WM_DELETE_WINDOW, or destroy it.
    pub fn close<D: Display>(&self, display: &D, time: Timestamp) -> Result<()> {
        let atoms = display.atoms();
        if hints::supports_protocol(display, self.window, atoms.wm_delete_window) {
            debug!("Sending WM_DELETE_WINDOW to 0x{:x}", self.window);
            display.send_client_message(
                self.window,
                atoms.wm_protocols,
                [atoms.wm_delete_window, time, 0, 0, 0],
            )
        } else {
            debug!("Destroying 0x{:x}", self.window);
            display.destroy_window(self.window)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::testing::{Call, MockDisplay};

    #[test]
    fn test_manage_normal_reparents() {
        let display = MockDisplay::new();
        let client = Client::manage(&display, 0x400, WindowKind::Normal, false, 0).unwrap();
        let parent = client.parent.unwrap();
        assert!(display.calls().contains(&Call::Reparent(0x400, parent)));
        assert_eq!(client.frame_window(), parent);
    }

    #[test]
    fn test_manage_dock_skips_reparent() {
        let display = MockDisplay::new();
        let client = Client::manage(&display, 0x400, WindowKind::Dock, false, 0).unwrap();
        assert_eq!(client.parent, None);
        assert!(display.calls().is_empty());
    }

    #[test]
    fn test_map_maps_parent_first() {
        let display = MockDisplay::new();
        let mut client = Client::manage(&display, 0x400, WindowKind::Normal, false, 0).unwrap();
        let parent = client.parent.unwrap();
        display.clear_calls();

        client.map(&display).unwrap();
        assert_eq!(display.calls(), vec![Call::Map(parent), Call::Map(0x400)]);
        assert!(client.is_mapped());
    }

    #[test]
    fn test_unmap_hides_frame_then_waits_for_notify() {
        let display = MockDisplay::new();
        let mut client = Client::manage(&display, 0x400, WindowKind::Normal, false, 0).unwrap();
        let parent = client.parent.unwrap();
        client.map(&display).unwrap();
        display.clear_calls();

        client.unmap(&display).unwrap();
        assert!(client.is_mapped());
        assert_eq!(display.calls(), vec![Call::Unmap(parent), Call::Unmap(0x400)]);

        display.clear_calls();
        assert!(client.on_unmap(&display).unwrap());
        assert_eq!(client.state, ClientState::Unmapped);
        assert!(!client.on_unmap(&display).unwrap());
        assert_eq!(display.calls(), vec![Call::Unmap(parent)]);
    }

    #[test]
    fn test_reparent_unmap_is_ignored() {
        let display = MockDisplay::new();
        let mut client = Client::manage(&display, 0x400, WindowKind::Normal, true, 0).unwrap();
        client.map(&display).unwrap();

        assert!(!client.on_unmap(&display).unwrap());
        assert!(client.is_mapped());
        assert!(client.on_unmap(&display).unwrap());
    }

    #[test]
    fn test_destroy_takes_parent_down() {
        let display = MockDisplay::new();
        let mut client = Client::manage(&display, 0x400, WindowKind::Normal, false, 0).unwrap();
        let parent = client.parent.unwrap();
        client.on_destroy(&display).unwrap();
        assert_eq!(client.state, ClientState::Destroyed);
        assert!(display.calls().contains(&Call::Destroy(parent)));
    }

    #[test]
    fn test_close_prefers_delete_protocol() {
        let display = MockDisplay::new();
        let atoms = display.atoms().clone();
        display.set_property32(0x400, atoms.wm_protocols, 4, &[atoms.wm_delete_window]).unwrap();

        let client = Client::new(0x400, WindowKind::Normal);
        client.close(&display, 77).unwrap();
        assert_eq!(
            display.calls().last(),
            Some(&Call::ClientMessage(0x400, atoms.wm_protocols, [atoms.wm_delete_window, 77, 0, 0, 0]))
        );
    }

    #[test]
    fn test_close_destroys_without_protocol() {
        let display = MockDisplay::new();
        let client = Client::new(0x400, WindowKind::Normal);
        client.close(&display, 0).unwrap();
        assert_eq!(display.calls(), vec![Call::Destroy(0x400)]);
    }

    #[test]
    fn test_on_property_refreshes_title() {
        let display = MockDisplay::new();
        let atoms = display.atoms().clone();
        let mut client = Client::new(0x400, WindowKind::Normal);
        display.set_property8(0x400, atoms.net_wm_name, atoms.utf8_string, b"editor").unwrap();

        assert!(client.on_property(&display, atoms.net_wm_name));
        assert_eq!(client.title, "editor");
        assert!(!client.on_property(&display, atoms.net_wm_name));
        assert!(!client.on_property(&display, atoms.net_wm_strut));
    }
}

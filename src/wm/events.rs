//! Events Module
//!
//! The closed set of protocol events the manager reacts to, and the
//! dispatcher routing each one to its handler.

use anyhow::Result;
use tracing::{debug, warn};
use x11rb::protocol::xproto::{Atom, Keycode, Timestamp, Window};
use x11rb::protocol::Event;

use crate::shared::Geometry;
use crate::wm::display::Display;
use crate::wm::error::log_warn;
use crate::wm::render;
use crate::wm::tree::Location;
use crate::wm::WindowManager;

/// Inbound protocol event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WmEvent {
    KeyPress {
        keycode: Keycode,
        state: u16,
        time: Timestamp,
    },
    EnterNotify {
        window: Window,
        time: Timestamp,
    },
    ConfigureRequest {
        window: Window,
        geometry: Geometry,
    },
    MapNotify {
        window: Window,
    },
    MapRequest {
        window: Window,
    },
    UnmapNotify {
        window: Window,
        /// Window the notification was delivered to: the client itself, or
        /// its parent through SubstructureNotify
        event: Window,
    },
    DestroyNotify {
        window: Window,
    },
    PropertyNotify {
        window: Window,
        atom: Atom,
    },
    ClientMessage {
        window: Window,
        message_type: Atom,
        data: [u32; 5],
    },
    Expose {
        window: Window,
    },
}

impl WmEvent {
    /// Convert an x11rb event; events the manager ignores yield `None`.
    pub fn from_x11(event: Event) -> Option<Self> {
        Some(match event {
            Event::KeyPress(e) => WmEvent::KeyPress {
                keycode: e.detail,
                state: u16::from(e.state),
                time: e.time,
            },
            Event::EnterNotify(e) => WmEvent::EnterNotify {
                window: e.event,
                time: e.time,
            },
            Event::ConfigureRequest(e) => WmEvent::ConfigureRequest {
                window: e.window,
                geometry: Geometry::new(
                    i32::from(e.x),
                    i32::from(e.y),
                    u32::from(e.width),
                    u32::from(e.height),
                ),
            },
            Event::MapNotify(e) => WmEvent::MapNotify { window: e.window },
            Event::MapRequest(e) => WmEvent::MapRequest { window: e.window },
            Event::UnmapNotify(e) => WmEvent::UnmapNotify {
                window: e.window,
                event: e.event,
            },
            Event::DestroyNotify(e) => WmEvent::DestroyNotify { window: e.window },
            Event::PropertyNotify(e) => WmEvent::PropertyNotify {
                window: e.window,
                atom: e.atom,
            },
            Event::ClientMessage(e) if e.format == 32 => WmEvent::ClientMessage {
                window: e.window,
                message_type: e.type_,
                data: e.data.as_data32(),
            },
            // Only the last Expose of a series triggers a redraw
            Event::Expose(e) if e.count == 0 => WmEvent::Expose { window: e.window },
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            WmEvent::KeyPress { .. } => "KeyPress",
            WmEvent::EnterNotify { .. } => "EnterNotify",
            WmEvent::ConfigureRequest { .. } => "ConfigureRequest",
            WmEvent::MapNotify { .. } => "MapNotify",
            WmEvent::MapRequest { .. } => "MapRequest",
            WmEvent::UnmapNotify { .. } => "UnmapNotify",
            WmEvent::DestroyNotify { .. } => "DestroyNotify",
            WmEvent::PropertyNotify { .. } => "PropertyNotify",
            WmEvent::ClientMessage { .. } => "ClientMessage",
            WmEvent::Expose { .. } => "Expose",
        }
    }
}

impl<D: Display> WindowManager<D> {
    /// Route one event. Failures are logged and never stop the loop.
    pub fn handle_event(&mut self, event: WmEvent) {
        let name = event.name();
        let result = match event {
            WmEvent::KeyPress {
                keycode,
                state,
                time,
            } => self.on_key_press(keycode, state, time),
            WmEvent::EnterNotify { window, time } => self.on_enter_notify(window, time),
            WmEvent::ConfigureRequest { window, geometry } => {
                self.on_configure_request(window, geometry)
            }
            WmEvent::MapNotify { window } => self.on_map_notify(window),
            WmEvent::MapRequest { window } => self.on_map_request(window),
            WmEvent::UnmapNotify { window, event } => self.on_unmap_notify(window, event),
            WmEvent::DestroyNotify { window } => self.on_destroy_notify(window),
            WmEvent::PropertyNotify { window, atom } => self.on_property_notify(window, atom),
            WmEvent::ClientMessage {
                window,
                message_type,
                data,
            } => self.on_client_message(window, message_type, data),
            WmEvent::Expose { window } => self.on_expose(window),
        };

        if let Err(e) = result {
            warn!("Failed to handle {}: {:#}", name, e);
        }
        log_warn(self.display.flush(), "flush");
    }

    fn on_key_press(&mut self, keycode: Keycode, state: u16, time: Timestamp) -> Result<()> {
        let Some(action) = self.actions.resolve(keycode, state).cloned() else {
            return Ok(());
        };
        debug!("Key {} (state 0x{:x}) -> {:?}", keycode, state, action);
        self.run_action(action, time)
    }

    fn on_enter_notify(&mut self, window: Window, time: Timestamp) -> Result<()> {
        if !matches!(self.tree.locate(window), Some(Location::Tiled(_))) {
            return Ok(());
        }
        self.set_focus(window, time)
    }

    /// The tiling layout wins: managed windows get their current geometry
    /// back, unmanaged ones have their request echoed.
    fn on_configure_request(&mut self, window: Window, geometry: Geometry) -> Result<()> {
        match self.tree.frame(window) {
            Some(frame) => render::configure_notify(&self.display, &self.decorations, frame),
            None => self.display.send_configure_notify(window, geometry),
        }
    }

    fn on_map_notify(&mut self, window: Window) -> Result<()> {
        if let Some(frame) = self.tree.frame(window) {
            render::configure_notify(&self.display, &self.decorations, frame)?;
        }
        Ok(())
    }

    fn on_map_request(&mut self, window: Window) -> Result<()> {
        if self.tree.is_managed(window) {
            return Ok(());
        }
        let override_redirect = self
            .display
            .window_info(window)
            .map(|info| info.override_redirect)
            .unwrap_or(false);
        if !override_redirect {
            if let Err(e) = self.manage_window(window, false) {
                warn!("Failed to manage window 0x{:x}: {:#}", window, e);
            }
        }
        self.update_desktop_hints()
    }

    /// Only the copy delivered to the client's own StructureNotify counts;
    /// the root's SubstructureNotify copy of the same unmap is dropped.
    fn on_unmap_notify(&mut self, window: Window, event: Window) -> Result<()> {
        if event != window {
            return Ok(());
        }
        let Some(location) = self.tree.locate(window) else {
            return Ok(());
        };
        let changed = match self.tree.frame_mut(window) {
            Some(frame) => frame.client.on_unmap(&self.display)?,
            None => false,
        };
        if !changed {
            return Ok(());
        }

        match location {
            Location::Tiled(id) => {
                if let Some(workspace) = self.tree.workspace_mut(id) {
                    workspace.update_tiling();
                }
                self.render_workspace(id);
            }
            Location::Dock(_) => self.render_output(),
        }
        Ok(())
    }

    fn on_destroy_notify(&mut self, window: Window) -> Result<()> {
        if !self.tree.is_managed(window) {
            return Ok(());
        }
        self.delete_frame(window)?;
        self.update_desktop_hints()
    }

    fn on_property_notify(&mut self, window: Window, atom: Atom) -> Result<()> {
        let focused = self.focus == Some(window);
        let Some(frame) = self.tree.frame_mut(window) else {
            return Ok(());
        };
        if frame.client.on_property(&self.display, atom) {
            self.decorations.draw(&self.display, frame, focused)?;
        }
        Ok(())
    }

    fn on_client_message(&mut self, window: Window, message_type: Atom, data: [u32; 5]) -> Result<()> {
        if message_type != self.display.atoms().net_current_desktop {
            debug!("Ignoring client message {} for 0x{:x}", message_type, window);
            return Ok(());
        }
        let index = data[0] as usize;
        match self.tree.output().workspaces.get(index).copied() {
            Some(id) => self.switch_workspace(id),
            None => {
                warn!("Desktop index {} out of range", index);
                Ok(())
            }
        }
    }

    fn on_expose(&mut self, window: Window) -> Result<()> {
        let Some(frame) = self.tree.frame_owning(window) else {
            return Ok(());
        };
        let focused = self.focus == Some(frame.window());
        self.decorations.draw(&self.display, frame, focused)
    }
}

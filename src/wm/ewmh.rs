//! EWMH (Extended Window Manager Hints) implementation
//!
//! Interned atoms, the `_NET_SUPPORTED` list and the desktop/taskbar hints
//! that are republished in full whenever the tree changes shape.

use anyhow::{Context, Result};
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{Atom, AtomEnum, ConnectionExt as _, Window};

use crate::wm::display::Display;
use crate::wm::error::log_warn;
use crate::wm::output::Output;
use crate::wm::workspace::Workspace;

/// Holds every atom the manager reads or writes
#[derive(Debug, Clone)]
pub struct Atoms {
    pub utf8_string: Atom,
    pub wm_name: Atom,
    pub wm_protocols: Atom,
    pub wm_delete_window: Atom,
    pub wm_take_focus: Atom,
    pub net_supported: Atom,
    pub net_supporting_wm_check: Atom,
    pub net_wm_name: Atom,
    pub net_wm_window_type: Atom,
    pub net_wm_window_type_dock: Atom,
    pub net_wm_window_type_normal: Atom,
    pub net_wm_strut: Atom,
    pub net_wm_strut_partial: Atom,
    pub net_number_of_desktops: Atom,
    pub net_desktop_names: Atom,
    pub net_desktop_viewport: Atom,
    pub net_current_desktop: Atom,
    pub net_wm_desktop: Atom,
    pub net_client_list: Atom,
    pub net_active_window: Atom,
}

impl Atoms {
    /// Intern all atoms on a live connection
    pub fn new<C: Connection>(conn: &C) -> Result<Self> {
        Self::intern_with(|name| {
            Ok(conn
                .intern_atom(false, name.as_bytes())
                .with_context(|| format!("Failed to intern {}", name))?
                .reply()?
                .atom)
        })
    }

    /// Build the atom table from any name → atom resolver.
    pub fn intern_with<F>(mut intern: F) -> Result<Self>
    where
        F: FnMut(&str) -> Result<Atom>,
    {
        Ok(Self {
            utf8_string: intern("UTF8_STRING")?,
            wm_name: u32::from(AtomEnum::WM_NAME),
            wm_protocols: intern("WM_PROTOCOLS")?,
            wm_delete_window: intern("WM_DELETE_WINDOW")?,
            wm_take_focus: intern("WM_TAKE_FOCUS")?,
            net_supported: intern("_NET_SUPPORTED")?,
            net_supporting_wm_check: intern("_NET_SUPPORTING_WM_CHECK")?,
            net_wm_name: intern("_NET_WM_NAME")?,
            net_wm_window_type: intern("_NET_WM_WINDOW_TYPE")?,
            net_wm_window_type_dock: intern("_NET_WM_WINDOW_TYPE_DOCK")?,
            net_wm_window_type_normal: intern("_NET_WM_WINDOW_TYPE_NORMAL")?,
            net_wm_strut: intern("_NET_WM_STRUT")?,
            net_wm_strut_partial: intern("_NET_WM_STRUT_PARTIAL")?,
            net_number_of_desktops: intern("_NET_NUMBER_OF_DESKTOPS")?,
            net_desktop_names: intern("_NET_DESKTOP_NAMES")?,
            net_desktop_viewport: intern("_NET_DESKTOP_VIEWPORT")?,
            net_current_desktop: intern("_NET_CURRENT_DESKTOP")?,
            net_wm_desktop: intern("_NET_WM_DESKTOP")?,
            net_client_list: intern("_NET_CLIENT_LIST")?,
            net_active_window: intern("_NET_ACTIVE_WINDOW")?,
        })
    }

    /// Atoms advertised through `_NET_SUPPORTED`
    pub fn supported(&self) -> Vec<Atom> {
        vec![
            self.net_supported,
            self.net_supporting_wm_check,
            self.net_wm_name,
            self.net_wm_window_type,
            self.net_wm_window_type_dock,
            self.net_wm_window_type_normal,
            self.net_wm_strut,
            self.net_wm_strut_partial,
            self.net_number_of_desktops,
            self.net_desktop_names,
            self.net_desktop_viewport,
            self.net_current_desktop,
            self.net_wm_desktop,
            self.net_client_list,
            self.net_active_window,
        ]
    }
}

/// Snapshot of the desktop/taskbar hints for one output
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DesktopHints {
    /// Names of the attached workspaces, in output order
    pub names: Vec<String>,
    /// Index of the active workspace within `names`
    pub current: u32,
    /// Tiled windows of every attached workspace, then docks
    pub clients: Vec<Window>,
    /// Desktop index for each window in `clients`
    pub desktops: Vec<(Window, u32)>,
}

impl DesktopHints {
    /// Collect the hints for an output from the workspace pool.
    ///
    /// Docks are reported on the active desktop.
    pub fn collect(output: &Output, workspaces: &[Workspace]) -> Self {
        let mut hints = Self::default();

        for (index, id) in output.workspaces.iter().enumerate() {
            let index = index as u32;
            hints.names.push((u32::from(*id) + 1).to_string());
            if *id == output.active {
                hints.current = index;
            }

            let Some(workspace) = workspaces.iter().find(|w| w.id == *id) else {
                continue;
            };
            for frame in workspace.frames() {
                hints.clients.push(frame.window());
                hints.desktops.push((frame.window(), index));
            }
        }

        for dock in output.docks() {
            hints.clients.push(dock.window());
            hints.desktops.push((dock.window(), hints.current));
        }

        hints
    }

    /// Write every hint to the root window, then `_NET_WM_DESKTOP` per client.
    pub fn publish<D: Display>(&self, display: &D) -> Result<()> {
        let atoms = display.atoms();
        let root = display.root();
        let count = self.names.len() as u32;

        display.set_property32(
            root,
            atoms.net_number_of_desktops,
            AtomEnum::CARDINAL.into(),
            &[count],
        )?;
        display.set_property32(
            root,
            atoms.net_desktop_viewport,
            AtomEnum::CARDINAL.into(),
            &vec![0; 2 * self.names.len()],
        )?;

        let mut names = Vec::new();
        for name in &self.names {
            names.extend_from_slice(name.as_bytes());
            names.push(0);
        }
        display.set_property8(root, atoms.net_desktop_names, atoms.utf8_string, &names)?;
        display.set_property32(
            root,
            atoms.net_current_desktop,
            AtomEnum::CARDINAL.into(),
            &[self.current],
        )?;
        display.set_property32(
            root,
            atoms.net_client_list,
            AtomEnum::WINDOW.into(),
            &self.clients,
        )?;

        for (window, desktop) in &self.desktops {
            log_warn(
                display.set_property32(
                    *window,
                    atoms.net_wm_desktop,
                    AtomEnum::CARDINAL.into(),
                    &[*desktop],
                ),
                "set _NET_WM_DESKTOP",
            );
        }

        debug!(
            "Published {} desktops (current {}), {} clients",
            count,
            self.current,
            self.clients.len()
        );
        Ok(())
    }
}

/// Update `_NET_ACTIVE_WINDOW`; `None` clears it to 0.
pub fn set_active_window<D: Display>(display: &D, window: Option<Window>) -> Result<()> {
    let atoms = display.atoms();
    display.set_property32(
        display.root(),
        atoms.net_active_window,
        AtomEnum::WINDOW.into(),
        &[window.unwrap_or(0)],
    )
}

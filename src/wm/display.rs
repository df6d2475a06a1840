//! Display Module
//!
//! The protocol seam between the manager and the X server. The core only
//! talks to the `Display` trait; `X11Display` implements it over an x11rb
//! `RustConnection` and owns everything tied to the connection's lifetime
//! (atoms, screen geometry, the supporting-WM-check window, the titlebar font).

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;
use x11rb::{COPY_DEPTH_FROM_PARENT, COPY_FROM_PARENT, CURRENT_TIME, NONE};

use crate::shared::Geometry;
use crate::wm::events::WmEvent;
use crate::wm::ewmh::Atoms;
use crate::wm::keyboard::Keymap;

/// Events selected on the root window to become the window manager
fn root_event_mask() -> EventMask {
    EventMask::SUBSTRUCTURE_REDIRECT
        | EventMask::SUBSTRUCTURE_NOTIFY
        | EventMask::KEY_PRESS
        | EventMask::PROPERTY_CHANGE
        | EventMask::FOCUS_CHANGE
        | EventMask::STRUCTURE_NOTIFY
}

/// Events selected on every managed client window
fn client_event_mask() -> EventMask {
    EventMask::STRUCTURE_NOTIFY | EventMask::ENTER_WINDOW | EventMask::PROPERTY_CHANGE
}

/// Events selected on the frame windows wrapping Normal clients
fn frame_event_mask() -> EventMask {
    EventMask::SUBSTRUCTURE_REDIRECT
        | EventMask::EXPOSURE
        | EventMask::BUTTON_PRESS
        | EventMask::BUTTON_RELEASE
        | EventMask::FOCUS_CHANGE
}

/// Attributes of a window the manager does not own yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowInfo {
    pub override_redirect: bool,
    pub viewable: bool,
}

/// Protocol operations the window manager core depends on.
///
/// Every call is fire-and-check: errors are returned to the caller, never
/// retried here.
pub trait Display {
    fn root(&self) -> Window;
    fn atoms(&self) -> &Atoms;
    /// Rectangle of the (single) output
    fn screen_geometry(&self) -> Geometry;

    /// Create an unmapped, override-redirect frame window
    fn create_frame_window(&self, background: u32) -> Result<Window>;
    fn reparent_window(&self, window: Window, parent: Window, x: i16, y: i16) -> Result<()>;
    fn map_window(&self, window: Window) -> Result<()>;
    fn unmap_window(&self, window: Window) -> Result<()>;
    fn destroy_window(&self, window: Window) -> Result<()>;
    fn configure_window(&self, window: Window, geometry: Geometry) -> Result<()>;
    /// Send a synthetic ConfigureNotify describing `geometry` in root coordinates
    fn send_configure_notify(&self, window: Window, geometry: Geometry) -> Result<()>;
    fn send_client_message(&self, window: Window, message_type: Atom, data: [u32; 5]) -> Result<()>;
    fn select_client_events(&self, window: Window) -> Result<()>;

    fn get_property32(&self, window: Window, property: Atom) -> Result<Vec<u32>>;
    fn get_property8(&self, window: Window, property: Atom) -> Result<Vec<u8>>;
    fn set_property32(&self, window: Window, property: Atom, type_: Atom, values: &[u32]) -> Result<()>;
    fn set_property8(&self, window: Window, property: Atom, type_: Atom, values: &[u8]) -> Result<()>;

    fn set_input_focus(&self, window: Window, time: Timestamp) -> Result<()>;
    fn grab_key(&self, keycode: Keycode, modifiers: u16) -> Result<()>;
    fn warp_pointer(&self, x: i32, y: i32) -> Result<()>;
    fn keyboard_mapping(&self) -> Result<Keymap>;
    fn window_info(&self, window: Window) -> Result<WindowInfo>;
    /// Children of the root window, bottom to top
    fn top_level_windows(&self) -> Result<Vec<Window>>;

    /// Fill `area` of `window` and draw `title` over it
    fn draw_titlebar(
        &self,
        window: Window,
        area: Geometry,
        background: u32,
        foreground: u32,
        title: &str,
    ) -> Result<()>;

    fn flush(&self) -> Result<()>;
    /// Block until the next event the manager handles
    fn next_event(&self) -> Result<WmEvent>;
}

/// X11 display context, created once and released on drop
pub struct X11Display {
    conn: RustConnection,
    root: Window,
    screen: Geometry,
    depth: u8,
    visual: Visualid,
    atoms: Atoms,
    check_window: Window,
    font: Font,
    min_keycode: Keycode,
    max_keycode: Keycode,
}

impl X11Display {
    /// Connect to `$DISPLAY` and take over the root window.
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X server")?;
        info!("Connected to X server, screen {}", screen_num);

        let setup = conn.setup();
        let screen = &setup.roots[screen_num];
        let root = screen.root;
        let geometry = Geometry::new(
            0,
            0,
            u32::from(screen.width_in_pixels),
            u32::from(screen.height_in_pixels),
        );
        let depth = screen.root_depth;
        let visual = screen.root_visual;
        let min_keycode = setup.min_keycode;
        let max_keycode = setup.max_keycode;

        conn.change_window_attributes(
            root,
            &ChangeWindowAttributesAux::new().event_mask(root_event_mask()),
        )?
        .check()
        .context("Another window manager is already running")?;
        debug!("Selected substructure redirect on root 0x{:x}", root);

        let atoms = Atoms::new(&conn)?;

        let check_window = conn.generate_id()?;
        conn.create_window(
            COPY_DEPTH_FROM_PARENT,
            check_window,
            root,
            -1,
            -1,
            1,
            1,
            0,
            WindowClass::INPUT_ONLY,
            COPY_FROM_PARENT,
            &CreateWindowAux::new().override_redirect(1),
        )?;
        for window in [root, check_window] {
            conn.change_property32(
                PropMode::REPLACE,
                window,
                atoms.net_supporting_wm_check,
                AtomEnum::WINDOW,
                &[check_window],
            )?;
        }
        conn.change_property8(
            PropMode::REPLACE,
            check_window,
            atoms.net_wm_name,
            atoms.utf8_string,
            env!("CARGO_PKG_NAME").as_bytes(),
        )?;
        conn.change_property32(
            PropMode::REPLACE,
            root,
            atoms.net_supported,
            AtomEnum::ATOM,
            &atoms.supported(),
        )?;

        let font = conn.generate_id()?;
        conn.open_font(font, b"fixed")?
            .check()
            .context("Failed to open the core \"fixed\" font")?;

        conn.flush()?;
        info!("Became window manager (check window 0x{:x})", check_window);

        Ok(Self {
            conn,
            root,
            screen: geometry,
            depth,
            visual,
            atoms,
            check_window,
            font,
            min_keycode,
            max_keycode,
        })
    }

    fn get_property(&self, window: Window, property: Atom) -> Result<GetPropertyReply> {
        Ok(self
            .conn
            .get_property(false, window, property, AtomEnum::ANY, 0, u32::MAX / 4)?
            .reply()?)
    }
}

impl Display for X11Display {
    fn root(&self) -> Window {
        self.root
    }

    fn atoms(&self) -> &Atoms {
        &self.atoms
    }

    fn screen_geometry(&self) -> Geometry {
        self.screen
    }

    fn create_frame_window(&self, background: u32) -> Result<Window> {
        let window = self.conn.generate_id()?;
        self.conn.create_window(
            self.depth,
            window,
            self.root,
            0,
            0,
            1,
            1,
            0,
            WindowClass::INPUT_OUTPUT,
            self.visual,
            &CreateWindowAux::new()
                .background_pixel(background)
                .override_redirect(1)
                .event_mask(frame_event_mask()),
        )?;
        Ok(window)
    }

    fn reparent_window(&self, window: Window, parent: Window, x: i16, y: i16) -> Result<()> {
        self.conn.reparent_window(window, parent, x, y)?;
        Ok(())
    }

    fn map_window(&self, window: Window) -> Result<()> {
        self.conn.map_window(window)?;
        Ok(())
    }

    fn unmap_window(&self, window: Window) -> Result<()> {
        self.conn.unmap_window(window)?;
        Ok(())
    }

    fn destroy_window(&self, window: Window) -> Result<()> {
        self.conn.destroy_window(window)?;
        Ok(())
    }

    fn configure_window(&self, window: Window, geometry: Geometry) -> Result<()> {
        self.conn.configure_window(
            window,
            &ConfigureWindowAux::new()
                .x(geometry.x)
                .y(geometry.y)
                .width(geometry.width.max(1))
                .height(geometry.height.max(1)),
        )?;
        Ok(())
    }

    fn send_configure_notify(&self, window: Window, geometry: Geometry) -> Result<()> {
        let event = ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: window,
            window,
            above_sibling: NONE,
            x: geometry.x as i16,
            y: geometry.y as i16,
            width: geometry.width as u16,
            height: geometry.height as u16,
            border_width: 0,
            override_redirect: false,
        };
        self.conn
            .send_event(false, window, EventMask::STRUCTURE_NOTIFY, event)?;
        Ok(())
    }

    fn send_client_message(&self, window: Window, message_type: Atom, data: [u32; 5]) -> Result<()> {
        let event = ClientMessageEvent::new(32, window, message_type, data);
        self.conn
            .send_event(false, window, EventMask::NO_EVENT, event)?;
        Ok(())
    }

    fn select_client_events(&self, window: Window) -> Result<()> {
        self.conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().event_mask(client_event_mask()),
        )?;
        Ok(())
    }

    fn get_property32(&self, window: Window, property: Atom) -> Result<Vec<u32>> {
        let reply = self.get_property(window, property)?;
        Ok(reply.value32().map(|v| v.collect()).unwrap_or_default())
    }

    fn get_property8(&self, window: Window, property: Atom) -> Result<Vec<u8>> {
        let reply = self.get_property(window, property)?;
        Ok(reply.value8().map(|v| v.collect()).unwrap_or_default())
    }

    fn set_property32(&self, window: Window, property: Atom, type_: Atom, values: &[u32]) -> Result<()> {
        self.conn
            .change_property32(PropMode::REPLACE, window, property, type_, values)?;
        Ok(())
    }

    fn set_property8(&self, window: Window, property: Atom, type_: Atom, values: &[u8]) -> Result<()> {
        self.conn
            .change_property8(PropMode::REPLACE, window, property, type_, values)?;
        Ok(())
    }

    fn set_input_focus(&self, window: Window, time: Timestamp) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, window, time)?;
        Ok(())
    }

    fn grab_key(&self, keycode: Keycode, modifiers: u16) -> Result<()> {
        self.conn
            .grab_key(
                false,
                self.root,
                ModMask::from(modifiers),
                keycode,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )?
            .check()
            .with_context(|| format!("Failed to grab keycode {} (mask 0x{:x})", keycode, modifiers))?;
        Ok(())
    }

    fn warp_pointer(&self, x: i32, y: i32) -> Result<()> {
        self.conn
            .warp_pointer(NONE, self.root, 0, 0, 0, 0, x as i16, y as i16)?;
        Ok(())
    }

    fn keyboard_mapping(&self) -> Result<Keymap> {
        let count = self.max_keycode - self.min_keycode + 1;
        let reply = self
            .conn
            .get_keyboard_mapping(self.min_keycode, count)?
            .reply()
            .context("Failed to load the keyboard mapping")?;
        Ok(Keymap::new(
            self.min_keycode,
            reply.keysyms_per_keycode,
            reply.keysyms,
        ))
    }

    fn window_info(&self, window: Window) -> Result<WindowInfo> {
        let attrs = self.conn.get_window_attributes(window)?.reply()?;
        Ok(WindowInfo {
            override_redirect: attrs.override_redirect,
            viewable: attrs.map_state == MapState::VIEWABLE,
        })
    }

    fn top_level_windows(&self) -> Result<Vec<Window>> {
        Ok(self.conn.query_tree(self.root)?.reply()?.children)
    }

    fn draw_titlebar(
        &self,
        window: Window,
        area: Geometry,
        background: u32,
        foreground: u32,
        title: &str,
    ) -> Result<()> {
        let gc = self.conn.generate_id()?;
        self.conn.create_gc(
            gc,
            window,
            &CreateGCAux::new()
                .foreground(background)
                .background(background)
                .font(self.font),
        )?;
        self.conn.poly_fill_rectangle(
            window,
            gc,
            &[Rectangle {
                x: area.x as i16,
                y: area.y as i16,
                width: area.width as u16,
                height: area.height as u16,
            }],
        )?;

        // ImageText8 carries at most 255 bytes
        let text = &title.as_bytes()[..title.len().min(255)];
        if !text.is_empty() {
            self.conn
                .change_gc(gc, &ChangeGCAux::new().foreground(foreground))?;
            let baseline = area.y + (area.height as i32 * 3) / 4;
            self.conn
                .image_text8(window, gc, (area.x + 4) as i16, baseline as i16, text)?;
        }
        self.conn.free_gc(gc)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.conn.flush()?;
        Ok(())
    }

    fn next_event(&self) -> Result<WmEvent> {
        self.conn.flush()?;
        loop {
            let event = self
                .conn
                .wait_for_event()
                .context("Lost the connection to the X server")?;
            if let Event::Error(err) = &event {
                warn!("X11 error: {:?}", err);
                continue;
            }
            if let Some(event) = WmEvent::from_x11(event) {
                return Ok(event);
            }
        }
    }
}

impl Drop for X11Display {
    fn drop(&mut self) {
        let _ = self.conn.destroy_window(self.check_window);
        let _ = self.conn.close_font(self.font);
        let _ = self
            .conn
            .set_input_focus(InputFocus::POINTER_ROOT, self.root, CURRENT_TIME);
        let _ = self.conn.flush();
        debug!("Released display resources");
    }
}

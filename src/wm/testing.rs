//! Recording display used by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};

use anyhow::{anyhow, Result};
use x11rb::protocol::xproto::{Atom, Keycode, Keysym, Timestamp, Window};

use crate::shared::Geometry;
use crate::wm::display::{Display, WindowInfo};
use crate::wm::events::WmEvent;
use crate::wm::ewmh::Atoms;
use crate::wm::keyboard::Keymap;

pub const ROOT: Window = 0x1;

/// Side effect requested through the display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateFrame(Window),
    Reparent(Window, Window),
    Map(Window),
    Unmap(Window),
    Destroy(Window),
    Configure(Window, Geometry),
    ConfigureNotify(Window, Geometry),
    ClientMessage(Window, Atom, [u32; 5]),
    SelectEvents(Window),
    SetProperty(Window, Atom),
    SetInputFocus(Window, Timestamp),
    GrabKey(Keycode, u16),
    WarpPointer(i32, i32),
    DrawTitlebar(Window, String, u32),
}

pub struct MockDisplay {
    atoms: Atoms,
    screen: Geometry,
    calls: RefCell<Vec<Call>>,
    properties32: RefCell<HashMap<(Window, Atom), Vec<u32>>>,
    properties8: RefCell<HashMap<(Window, Atom), Vec<u8>>>,
    info: RefCell<HashMap<Window, WindowInfo>>,
    children: RefCell<Vec<Window>>,
    events: RefCell<VecDeque<WmEvent>>,
    /// Windows whose property reads fail as if already destroyed
    gone: RefCell<HashSet<Window>>,
    next_window: Cell<Window>,
}

impl MockDisplay {
    pub fn new() -> Self {
        let mut next: Atom = 100;
        let atoms = Atoms::intern_with(|_| {
            next += 1;
            Ok(next)
        })
        .unwrap();

        Self {
            atoms,
            screen: Geometry::new(0, 0, 1920, 1080),
            calls: RefCell::new(Vec::new()),
            properties32: RefCell::new(HashMap::new()),
            properties8: RefCell::new(HashMap::new()),
            info: RefCell::new(HashMap::new()),
            children: RefCell::new(Vec::new()),
            events: RefCell::new(VecDeque::new()),
            gone: RefCell::new(HashSet::new()),
            next_window: Cell::new(0x0080_0000),
        }
    }

    /// Keyboard map with the US layout's letter, digit and Return keycodes
    pub fn us_keymap() -> Keymap {
        const ROWS: [(Keycode, &str); 4] = [
            (10, "1234567890"),
            (24, "qwertyuiop"),
            (38, "asdfghjkl"),
            (52, "zxcvbnm"),
        ];
        let min: Keycode = 8;
        let mut keysyms: Vec<Keysym> = vec![0; 2 * (256 - usize::from(min))];
        let mut set = |keycode: Keycode, sym: Keysym, shifted: Keysym| {
            let offset = 2 * usize::from(keycode - min);
            keysyms[offset] = sym;
            keysyms[offset + 1] = shifted;
        };
        for (first, row) in ROWS {
            for (i, c) in row.chars().enumerate() {
                set(first + i as Keycode, c as Keysym, c.to_ascii_uppercase() as Keysym);
            }
        }
        set(36, 0xff0d, 0xff0d);
        Keymap::new(min, 2, keysyms)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn property32(&self, window: Window, property: Atom) -> Option<Vec<u32>> {
        self.properties32.borrow().get(&(window, property)).cloned()
    }

    pub fn property8(&self, window: Window, property: Atom) -> Option<Vec<u8>> {
        self.properties8.borrow().get(&(window, property)).cloned()
    }

    /// Register an existing top-level window for the startup scan
    pub fn add_top_level(&self, window: Window, info: WindowInfo) {
        self.children.borrow_mut().push(window);
        self.info.borrow_mut().insert(window, info);
    }

    pub fn set_info(&self, window: Window, info: WindowInfo) {
        self.info.borrow_mut().insert(window, info);
    }

    /// Make property reads on `window` fail with BadWindow
    pub fn vanish(&self, window: Window) {
        self.gone.borrow_mut().insert(window);
    }

    fn check_alive(&self, window: Window) -> Result<()> {
        if self.gone.borrow().contains(&window) {
            return Err(anyhow!("BadWindow 0x{:x}", window));
        }
        Ok(())
    }

    pub fn push_event(&self, event: WmEvent) {
        self.events.borrow_mut().push_back(event);
    }

    /// The most recently created frame window
    pub fn last_frame(&self) -> Window {
        self.next_window.get() - 1
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl Display for MockDisplay {
    fn root(&self) -> Window {
        ROOT
    }

    fn atoms(&self) -> &Atoms {
        &self.atoms
    }

    fn screen_geometry(&self) -> Geometry {
        self.screen
    }

    fn create_frame_window(&self, _background: u32) -> Result<Window> {
        let window = self.next_window.get();
        self.next_window.set(window + 1);
        self.record(Call::CreateFrame(window));
        Ok(window)
    }

    fn reparent_window(&self, window: Window, parent: Window, _x: i16, _y: i16) -> Result<()> {
        self.record(Call::Reparent(window, parent));
        Ok(())
    }

    fn map_window(&self, window: Window) -> Result<()> {
        self.record(Call::Map(window));
        Ok(())
    }

    fn unmap_window(&self, window: Window) -> Result<()> {
        self.record(Call::Unmap(window));
        Ok(())
    }

    fn destroy_window(&self, window: Window) -> Result<()> {
        self.record(Call::Destroy(window));
        Ok(())
    }

    fn configure_window(&self, window: Window, geometry: Geometry) -> Result<()> {
        self.record(Call::Configure(window, geometry));
        Ok(())
    }

    fn send_configure_notify(&self, window: Window, geometry: Geometry) -> Result<()> {
        self.record(Call::ConfigureNotify(window, geometry));
        Ok(())
    }

    fn send_client_message(&self, window: Window, message_type: Atom, data: [u32; 5]) -> Result<()> {
        self.record(Call::ClientMessage(window, message_type, data));
        Ok(())
    }

    fn select_client_events(&self, window: Window) -> Result<()> {
        self.record(Call::SelectEvents(window));
        Ok(())
    }

    fn get_property32(&self, window: Window, property: Atom) -> Result<Vec<u32>> {
        self.check_alive(window)?;
        Ok(self.property32(window, property).unwrap_or_default())
    }

    fn get_property8(&self, window: Window, property: Atom) -> Result<Vec<u8>> {
        self.check_alive(window)?;
        Ok(self.property8(window, property).unwrap_or_default())
    }

    fn set_property32(&self, window: Window, property: Atom, _type: Atom, values: &[u32]) -> Result<()> {
        self.properties32
            .borrow_mut()
            .insert((window, property), values.to_vec());
        self.record(Call::SetProperty(window, property));
        Ok(())
    }

    fn set_property8(&self, window: Window, property: Atom, _type: Atom, values: &[u8]) -> Result<()> {
        self.properties8
            .borrow_mut()
            .insert((window, property), values.to_vec());
        self.record(Call::SetProperty(window, property));
        Ok(())
    }

    fn set_input_focus(&self, window: Window, time: Timestamp) -> Result<()> {
        self.record(Call::SetInputFocus(window, time));
        Ok(())
    }

    fn grab_key(&self, keycode: Keycode, modifiers: u16) -> Result<()> {
        self.record(Call::GrabKey(keycode, modifiers));
        Ok(())
    }

    fn warp_pointer(&self, x: i32, y: i32) -> Result<()> {
        self.record(Call::WarpPointer(x, y));
        Ok(())
    }

    fn keyboard_mapping(&self) -> Result<Keymap> {
        Ok(Self::us_keymap())
    }

    fn window_info(&self, window: Window) -> Result<WindowInfo> {
        self.info
            .borrow()
            .get(&window)
            .copied()
            .ok_or_else(|| anyhow!("BadWindow 0x{:x}", window))
    }

    fn top_level_windows(&self) -> Result<Vec<Window>> {
        Ok(self.children.borrow().clone())
    }

    fn draw_titlebar(
        &self,
        window: Window,
        _area: Geometry,
        _background: u32,
        foreground: u32,
        title: &str,
    ) -> Result<()> {
        self.record(Call::DrawTitlebar(window, title.to_string(), foreground));
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn next_event(&self) -> Result<WmEvent> {
        self.events
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("connection closed"))
    }
}

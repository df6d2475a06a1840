//! Keyboard Module
//!
//! The keyboard map, key binding parsing and the action registry that maps
//! (keysym, modifiers) pairs to window manager actions.

use bitflags::bitflags;
use tracing::{debug, warn};
use x11rb::protocol::xproto::{Keycode, Keysym};

use crate::config::Config;
use crate::wm::display::Display;
use crate::wm::error::log_warn;
use crate::wm::keysym::{self, *};
use crate::wm::workspace::{Axis, Direction, WorkspaceId};

bitflags! {
    /// Core protocol modifier mask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u16 {
        const SHIFT   = 1 << 0;
        const LOCK    = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1    = 1 << 3;
        const MOD2    = 1 << 4;
        const MOD3    = 1 << 5;
        const MOD4    = 1 << 6;
        const MOD5    = 1 << 7;
    }
}

impl Modifiers {
    /// Caps Lock and Num Lock never change which binding fires
    pub const IGNORED: Modifiers = Modifiers::LOCK.union(Modifiers::MOD2);

    /// Modifiers of an event state, without lock and pointer-button bits
    pub fn from_state(state: u16) -> Self {
        Self::from_bits_truncate(state).difference(Self::IGNORED)
    }

    /// Every mask that must be grabbed so lock keys don't defeat a binding
    pub fn grab_variants(self) -> [u16; 4] {
        let base = self.bits();
        let lock = Modifiers::LOCK.bits();
        let num = Modifiers::MOD2.bits();
        [base, base | lock, base | num, base | lock | num]
    }

    fn parse_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "shift" => Some(Self::SHIFT),
            "lock" => Some(Self::LOCK),
            "control" | "ctrl" => Some(Self::CONTROL),
            "mod1" | "alt" => Some(Self::MOD1),
            "mod2" => Some(Self::MOD2),
            "mod3" => Some(Self::MOD3),
            "mod4" | "super" => Some(Self::MOD4),
            "mod5" => Some(Self::MOD5),
            _ => None,
        }
    }
}

/// Parse a `[Modifier+]*Keysym` binding such as `Mod4+Shift+p`.
pub fn parse_binding(binding: &str) -> Option<(Keysym, Modifiers)> {
    let mut parts: Vec<&str> = binding.split('+').map(str::trim).collect();
    let sym = keysym::from_name(parts.pop()?)?;
    let mut modifiers = Modifiers::empty();
    for part in parts {
        modifiers |= Modifiers::parse_name(part)?;
    }
    Some((sym, modifiers))
}

/// Keycode → keysym table from GetKeyboardMapping
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    min_keycode: Keycode,
    keysyms_per_keycode: u8,
    keysyms: Vec<Keysym>,
}

impl Keymap {
    pub fn new(min_keycode: Keycode, keysyms_per_keycode: u8, keysyms: Vec<Keysym>) -> Self {
        Self {
            min_keycode,
            keysyms_per_keycode,
            keysyms,
        }
    }

    /// Unshifted keysym of a keycode
    pub fn keysym(&self, keycode: Keycode) -> Option<Keysym> {
        let per = usize::from(self.keysyms_per_keycode);
        let offset = usize::from(keycode.checked_sub(self.min_keycode)?);
        self.keysyms.get(offset * per).copied()
    }

    /// Every keycode producing `keysym` in any column
    pub fn keycodes(&self, keysym: Keysym) -> Vec<Keycode> {
        if self.keysyms_per_keycode == 0 {
            return Vec::new();
        }
        self.keysyms
            .chunks(usize::from(self.keysyms_per_keycode))
            .enumerate()
            .filter(|(_, syms)| syms.contains(&keysym))
            .filter_map(|(i, _)| u8::try_from(usize::from(self.min_keycode) + i).ok())
            .collect()
    }
}

/// What a key binding does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Gracefully close the active window
    Close,
    /// Leave the event loop
    Exit,
    /// Move the active window's frame
    Move(Direction),
    /// Resize the active window's frame by a percentage of the area
    Resize(Axis, i32),
    SwitchWorkspace(WorkspaceId),
    MoveToWorkspace(WorkspaceId),
    /// Run a command through the configured shell
    Spawn(String),
}

/// Key binding
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub keysym: Keysym,
    pub modifiers: Modifiers,
    pub action: Action,
    /// Keycodes producing `keysym` on the current keyboard map
    pub keycodes: Vec<Keycode>,
}

/// Action registry built once at startup
pub struct ActionRegistry {
    keymap: Keymap,
    bindings: Vec<KeyBinding>,
}

impl ActionRegistry {
    /// Build the fixed table, one switch/move pair per workspace slot, then
    /// the configured shell-command bindings.
    pub fn new(config: &Config, keymap: Keymap, workspaces: u8) -> Self {
        let mut registry = Self {
            keymap,
            bindings: Vec::new(),
        };

        let super_shift = Modifiers::MOD4 | Modifiers::SHIFT;
        registry.bind(XK_Q, super_shift, Action::Close);
        registry.bind(XK_T, super_shift | Modifiers::MOD1, Action::Exit);
        registry.bind(XK_D, Modifiers::MOD4, Action::Spawn(config.launcher_command.clone()));
        registry.bind(XK_RETURN, super_shift, Action::Spawn(config.terminal_command.clone()));
        registry.bind(XK_H, super_shift, Action::Move(Direction::Left));
        registry.bind(XK_J, super_shift, Action::Move(Direction::Down));
        registry.bind(XK_K, super_shift, Action::Move(Direction::Up));
        registry.bind(XK_L, super_shift, Action::Move(Direction::Right));
        registry.bind(XK_Y, super_shift, Action::Resize(Axis::Horizontal, -5));
        registry.bind(XK_O, super_shift, Action::Resize(Axis::Horizontal, 5));
        registry.bind(XK_U, super_shift, Action::Resize(Axis::Vertical, 5));
        registry.bind(XK_I, super_shift, Action::Resize(Axis::Vertical, -5));

        for slot in 0..workspaces.min(10) {
            let sym = workspace_keysym(slot);
            registry.bind(sym, Modifiers::MOD4, Action::SwitchWorkspace(slot));
            registry.bind(sym, super_shift, Action::MoveToWorkspace(slot));
        }

        for (binding, command) in &config.keybindings {
            match parse_binding(binding) {
                Some((sym, modifiers)) => {
                    registry.bind(sym, modifiers, Action::Spawn(command.clone()))
                }
                None => warn!("Skipping unparseable key binding {:?}", binding),
            }
        }

        debug!("Registered {} key bindings", registry.bindings.len());
        registry
    }

    fn bind(&mut self, keysym: Keysym, modifiers: Modifiers, action: Action) {
        let keycodes = self.keymap.keycodes(keysym);
        if keycodes.is_empty() {
            debug!("No keycode for keysym 0x{:x}, {:?} stays unbound", keysym, action);
        }
        self.bindings.push(KeyBinding {
            keysym,
            modifiers,
            action,
            keycodes,
        });
    }

    /// Find the action for a key press; unbound combinations yield `None`.
    pub fn resolve(&self, keycode: Keycode, state: u16) -> Option<&Action> {
        let keysym = self.keymap.keysym(keycode)?;
        let modifiers = Modifiers::from_state(state);
        self.bindings
            .iter()
            .find(|b| b.keysym == keysym && b.modifiers == modifiers)
            .map(|b| &b.action)
    }

    /// Grab every bound keycode on the root window, with lock-key variants.
    pub fn grab_keys<D: Display>(&self, display: &D) {
        let mut grabbed = 0;
        for binding in &self.bindings {
            for keycode in &binding.keycodes {
                for mask in binding.modifiers.grab_variants() {
                    if log_warn(display.grab_key(*keycode, mask), "grab key").is_some() {
                        grabbed += 1;
                    }
                }
            }
        }
        debug!("Grabbed {} key combinations", grabbed);
    }
}

//! Keysym Module
//!
//! Keysym values from `X11/keysymdef.h` and `X11/XF86keysym.h` for the keys
//! the manager binds, plus name lookup for bindings read from the config.

use x11rb::protocol::xproto::Keysym;

pub const XK_SPACE: Keysym = 0x0020;
pub const XK_0: Keysym = 0x0030;
pub const XK_1: Keysym = 0x0031;
pub const XK_9: Keysym = 0x0039;

pub const XK_D: Keysym = 0x0064;
pub const XK_H: Keysym = 0x0068;
pub const XK_I: Keysym = 0x0069;
pub const XK_J: Keysym = 0x006a;
pub const XK_K: Keysym = 0x006b;
pub const XK_L: Keysym = 0x006c;
pub const XK_O: Keysym = 0x006f;
pub const XK_Q: Keysym = 0x0071;
pub const XK_T: Keysym = 0x0074;
pub const XK_U: Keysym = 0x0075;
pub const XK_Y: Keysym = 0x0079;

pub const XK_BACKSPACE: Keysym = 0xff08;
pub const XK_TAB: Keysym = 0xff09;
pub const XK_RETURN: Keysym = 0xff0d;
pub const XK_ESCAPE: Keysym = 0xff1b;
pub const XK_DELETE: Keysym = 0xffff;
pub const XK_HOME: Keysym = 0xff50;
pub const XK_LEFT: Keysym = 0xff51;
pub const XK_UP: Keysym = 0xff52;
pub const XK_RIGHT: Keysym = 0xff53;
pub const XK_DOWN: Keysym = 0xff54;
pub const XK_END: Keysym = 0xff57;
pub const XK_PRINT: Keysym = 0xff61;
pub const XK_F1: Keysym = 0xffbe;

pub const XF86_MON_BRIGHTNESS_UP: Keysym = 0x1008_ff02;
pub const XF86_MON_BRIGHTNESS_DOWN: Keysym = 0x1008_ff03;
pub const XF86_AUDIO_LOWER_VOLUME: Keysym = 0x1008_ff11;
pub const XF86_AUDIO_MUTE: Keysym = 0x1008_ff12;
pub const XF86_AUDIO_RAISE_VOLUME: Keysym = 0x1008_ff13;
pub const XF86_AUDIO_PLAY: Keysym = 0x1008_ff14;
pub const XF86_AUDIO_STOP: Keysym = 0x1008_ff15;
pub const XF86_AUDIO_PREV: Keysym = 0x1008_ff16;
pub const XF86_AUDIO_NEXT: Keysym = 0x1008_ff17;
pub const XF86_AUDIO_MIC_MUTE: Keysym = 0x1008_ffb2;

const NAMED: &[(&str, Keysym)] = &[
    ("space", XK_SPACE),
    ("BackSpace", XK_BACKSPACE),
    ("Tab", XK_TAB),
    ("Return", XK_RETURN),
    ("Escape", XK_ESCAPE),
    ("Delete", XK_DELETE),
    ("Home", XK_HOME),
    ("End", XK_END),
    ("Left", XK_LEFT),
    ("Up", XK_UP),
    ("Right", XK_RIGHT),
    ("Down", XK_DOWN),
    ("Print", XK_PRINT),
    ("XF86MonBrightnessUp", XF86_MON_BRIGHTNESS_UP),
    ("XF86MonBrightnessDown", XF86_MON_BRIGHTNESS_DOWN),
    ("XF86AudioLowerVolume", XF86_AUDIO_LOWER_VOLUME),
    ("XF86AudioMute", XF86_AUDIO_MUTE),
    ("XF86AudioRaiseVolume", XF86_AUDIO_RAISE_VOLUME),
    ("XF86AudioPlay", XF86_AUDIO_PLAY),
    ("XF86AudioStop", XF86_AUDIO_STOP),
    ("XF86AudioPrev", XF86_AUDIO_PREV),
    ("XF86AudioNext", XF86_AUDIO_NEXT),
    ("XF86AudioMicMute", XF86_AUDIO_MIC_MUTE),
];

/// Keysym for a workspace slot: `1`..`9` for slots 0..8, `0` for slot 9
pub fn workspace_keysym(slot: u8) -> Keysym {
    if slot == 9 {
        XK_0
    } else {
        XK_1 + Keysym::from(slot)
    }
}

/// Resolve a keysym name as written in `keysymdef.h` (without the `XK_` prefix).
///
/// Single ASCII letters and digits map to their Latin-1 keysyms; upper-case
/// letters resolve to the lower-case keysym since bindings carry Shift
/// explicitly. `F1`..`F12` are accepted as well.
pub fn from_name(name: &str) -> Option<Keysym> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphanumeric() {
            return Some(Keysym::from(c.to_ascii_lowercase() as u8));
        }
    }

    if let Some(n) = name.strip_prefix('F').and_then(|n| n.parse::<u32>().ok()) {
        if (1..=12).contains(&n) {
            return Some(XK_F1 + n - 1);
        }
    }

    NAMED
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, sym)| *sym)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(from_name("q"), Some(XK_Q));
        assert_eq!(from_name("Q"), Some(XK_Q));
        assert_eq!(from_name("7"), Some(0x37));
        assert_eq!(from_name("Return"), Some(XK_RETURN));
        assert_eq!(from_name("xf86audiomute"), Some(XF86_AUDIO_MUTE));
        assert_eq!(from_name("F12"), Some(0xffc9));
        assert_eq!(from_name("F13"), None);
        assert_eq!(from_name("NoSuchKey"), None);
    }

    #[test]
    fn test_workspace_keysym() {
        assert_eq!(workspace_keysym(0), XK_1);
        assert_eq!(workspace_keysym(8), XK_9);
        assert_eq!(workspace_keysym(9), XK_0);
    }
}

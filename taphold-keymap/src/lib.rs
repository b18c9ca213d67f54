//! Shared key vocabulary and binding tables for the tap-hold engine.
//!
//! This crate is `no_std`-compatible so the same definitions can serve a
//! firmware build and the native simulator. It holds the output-symbol
//! vocabulary (HID keycodes), the dual-role and tap-dance binding types,
//! and the default tables the engines are configured with at startup.

#![cfg_attr(not(test), no_std)]

/// Engine time unit. Hosts feed timestamps from a monotonic millisecond
/// counter; elapsed time is computed with wrapping arithmetic so a
/// wrapping hardware timer is fine.
pub type Millis = u32;

/// Default tapping term: a key held down longer than this, without being
/// released or pre-empted, resolves as a hold.
pub const TAPPING_TERM: Millis = 180;

/// Trailing delay attached to hold emissions, giving the host OS time to
/// pace the synthetic key event.
pub const HOLD_EMIT_DELAY: Millis = 250;

/// USB HID keycodes.
/// See USB HID Usage Tables, Section 10 (Keyboard/Keypad Page 0x07).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Keycode {
    // Letters
    A = 0x04,
    B = 0x05,
    C = 0x06,
    D = 0x07,
    E = 0x08,
    F = 0x09,
    G = 0x0A,
    H = 0x0B,
    I = 0x0C,
    J = 0x0D,
    K = 0x0E,
    L = 0x0F,
    M = 0x10,
    N = 0x11,
    O = 0x12,
    P = 0x13,
    Q = 0x14,
    R = 0x15,
    S = 0x16,
    T = 0x17,
    U = 0x18,
    V = 0x19,
    W = 0x1A,
    X = 0x1B,
    Y = 0x1C,
    Z = 0x1D,

    // Numbers
    N1 = 0x1E,
    N2 = 0x1F,
    N3 = 0x20,
    N4 = 0x21,
    N5 = 0x22,
    N6 = 0x23,
    N7 = 0x24,
    N8 = 0x25,
    N9 = 0x26,
    N0 = 0x27,

    // Control keys
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    LBracket = 0x2F,
    RBracket = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Grave = 0x35,
    Comma = 0x36,
    Dot = 0x37,
    Slash = 0x38,
}

impl Keycode {
    /// Display name for logs and table listings.
    pub fn display_name(self) -> &'static str {
        match self {
            Keycode::A => "A",
            Keycode::B => "B",
            Keycode::C => "C",
            Keycode::D => "D",
            Keycode::E => "E",
            Keycode::F => "F",
            Keycode::G => "G",
            Keycode::H => "H",
            Keycode::I => "I",
            Keycode::J => "J",
            Keycode::K => "K",
            Keycode::L => "L",
            Keycode::M => "M",
            Keycode::N => "N",
            Keycode::O => "O",
            Keycode::P => "P",
            Keycode::Q => "Q",
            Keycode::R => "R",
            Keycode::S => "S",
            Keycode::T => "T",
            Keycode::U => "U",
            Keycode::V => "V",
            Keycode::W => "W",
            Keycode::X => "X",
            Keycode::Y => "Y",
            Keycode::Z => "Z",
            Keycode::N1 => "1",
            Keycode::N2 => "2",
            Keycode::N3 => "3",
            Keycode::N4 => "4",
            Keycode::N5 => "5",
            Keycode::N6 => "6",
            Keycode::N7 => "7",
            Keycode::N8 => "8",
            Keycode::N9 => "9",
            Keycode::N0 => "0",
            Keycode::Enter => "Ent",
            Keycode::Escape => "Esc",
            Keycode::Backspace => "Bksp",
            Keycode::Tab => "Tab",
            Keycode::Space => "Spc",
            Keycode::Minus => "-",
            Keycode::Equal => "=",
            Keycode::LBracket => "[",
            Keycode::RBracket => "]",
            Keycode::Backslash => "\\",
            Keycode::Semicolon => ";",
            Keycode::Quote => "'",
            Keycode::Grave => "`",
            Keycode::Comma => ",",
            Keycode::Dot => ".",
            Keycode::Slash => "/",
        }
    }

    /// Parse a key name as written in scripts and keymap files.
    ///
    /// Names are lowercase; punctuation keys accept both the literal
    /// character and a spelled-out alias (`;` / `semicolon`).
    pub fn from_name(name: &str) -> Option<Keycode> {
        let kc = match name {
            "a" => Keycode::A,
            "b" => Keycode::B,
            "c" => Keycode::C,
            "d" => Keycode::D,
            "e" => Keycode::E,
            "f" => Keycode::F,
            "g" => Keycode::G,
            "h" => Keycode::H,
            "i" => Keycode::I,
            "j" => Keycode::J,
            "k" => Keycode::K,
            "l" => Keycode::L,
            "m" => Keycode::M,
            "n" => Keycode::N,
            "o" => Keycode::O,
            "p" => Keycode::P,
            "q" => Keycode::Q,
            "r" => Keycode::R,
            "s" => Keycode::S,
            "t" => Keycode::T,
            "u" => Keycode::U,
            "v" => Keycode::V,
            "w" => Keycode::W,
            "x" => Keycode::X,
            "y" => Keycode::Y,
            "z" => Keycode::Z,
            "1" => Keycode::N1,
            "2" => Keycode::N2,
            "3" => Keycode::N3,
            "4" => Keycode::N4,
            "5" => Keycode::N5,
            "6" => Keycode::N6,
            "7" => Keycode::N7,
            "8" => Keycode::N8,
            "9" => Keycode::N9,
            "0" => Keycode::N0,
            "enter" | "ent" => Keycode::Enter,
            "escape" | "esc" => Keycode::Escape,
            "backspace" | "bspc" => Keycode::Backspace,
            "tab" => Keycode::Tab,
            "space" | "spc" => Keycode::Space,
            "-" | "minus" => Keycode::Minus,
            "=" | "equal" => Keycode::Equal,
            "[" | "lbracket" => Keycode::LBracket,
            "]" | "rbracket" => Keycode::RBracket,
            "\\" | "backslash" => Keycode::Backslash,
            ";" | "semicolon" => Keycode::Semicolon,
            "'" | "quote" => Keycode::Quote,
            "`" | "grave" => Keycode::Grave,
            "," | "comma" => Keycode::Comma,
            "." | "dot" => Keycode::Dot,
            "/" | "slash" => Keycode::Slash,
            _ => return None,
        };
        Some(kc)
    }
}

/// A dual-role key: tapped it emits `tap`, held past the tapping term it
/// emits `hold`. A per-key `term` overrides the engine default.
#[derive(Copy, Clone, Debug)]
pub struct DualRole {
    pub tap: Keycode,
    pub hold: Keycode,
    pub term: Option<Millis>,
}

/// A tap-dance key: one tap emits `single`, two taps within the tapping
/// term emit `double`.
#[derive(Copy, Clone, Debug)]
pub struct Dance {
    pub single: Keycode,
    pub double: Keycode,
}

const fn dual(tap: Keycode, hold: Keycode) -> DualRole {
    DualRole { tap, hold, term: None }
}

/// Default dual-role table.
///
/// The board has no number row, so the top letter row doubles as one:
/// tap Q for Q, hold Q for 1. The home-row pairs at the bottom of the
/// table put a few heavily used control keys under the left hand. The
/// A/Tab pair uses a shorter window, tuned so that holding A while
/// thinking doesn't fire a stray Tab during normal typing rolls.
pub static DUAL_ROLE_KEYS: [DualRole; 14] = [
    dual(Keycode::Q, Keycode::N1),
    dual(Keycode::W, Keycode::N2),
    dual(Keycode::E, Keycode::N3),
    dual(Keycode::R, Keycode::N4),
    dual(Keycode::T, Keycode::N5),
    dual(Keycode::Y, Keycode::N6),
    dual(Keycode::U, Keycode::N7),
    dual(Keycode::I, Keycode::N8),
    dual(Keycode::O, Keycode::N9),
    dual(Keycode::P, Keycode::N0),
    DualRole { tap: Keycode::A, hold: Keycode::Tab, term: Some(130) },
    dual(Keycode::G, Keycode::Quote),
    dual(Keycode::Semicolon, Keycode::Enter),
    dual(Keycode::Z, Keycode::Grave),
];

/// Default tap-dance table: one tap for slash, two for backslash, so the
/// backslash doesn't need its own key.
pub static DANCE_KEYS: [Dance; 1] = [Dance {
    single: Keycode::Slash,
    double: Keycode::Backslash,
}];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_letters_and_digits() {
        assert_eq!(Keycode::from_name("q"), Some(Keycode::Q));
        assert_eq!(Keycode::from_name("1"), Some(Keycode::N1));
        assert_eq!(Keycode::from_name("0"), Some(Keycode::N0));
    }

    #[test]
    fn test_from_name_aliases() {
        assert_eq!(Keycode::from_name(";"), Keycode::from_name("semicolon"));
        assert_eq!(Keycode::from_name("\\"), Keycode::from_name("backslash"));
        assert_eq!(Keycode::from_name("ent"), Some(Keycode::Enter));
    }

    #[test]
    fn test_from_name_unknown() {
        assert_eq!(Keycode::from_name("hyper"), None);
        assert_eq!(Keycode::from_name(""), None);
    }

    #[test]
    fn test_display_names_roundtrip_through_from_name() {
        for binding in &DUAL_ROLE_KEYS {
            for kc in [binding.tap, binding.hold] {
                let name = kc.display_name().to_ascii_lowercase();
                assert_eq!(Keycode::from_name(&name), Some(kc), "name {:?}", name);
            }
        }
    }

    #[test]
    fn test_default_table_has_unique_tap_symbols() {
        for (i, a) in DUAL_ROLE_KEYS.iter().enumerate() {
            for b in &DUAL_ROLE_KEYS[i + 1..] {
                assert_ne!(a.tap, b.tap);
            }
        }
    }

    #[test]
    fn test_override_is_shorter_than_default() {
        for binding in &DUAL_ROLE_KEYS {
            if let Some(term) = binding.term {
                assert!(term < TAPPING_TERM);
            }
        }
    }
}

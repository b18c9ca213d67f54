//! Keymap files: the JSON configuration surface for the binding tables.
//!
//! A keymap file can override the tapping term, the hold delay, and both
//! binding tables. Omitted timing fields fall back to the built-in
//! constants; key names use the same vocabulary as event scripts.
//!
//! ```json
//! {
//!   "tapping_term": 180,
//!   "hold_delay": 250,
//!   "dual_role": [
//!     { "tap": "q", "hold": "1" },
//!     { "tap": "a", "hold": "tab", "term": 130 }
//!   ],
//!   "tap_dance": [
//!     { "single": "/", "double": "\\" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use taphold_keymap::{
    Dance, DualRole, Keycode, Millis, DANCE_KEYS, DUAL_ROLE_KEYS, HOLD_EMIT_DELAY, TAPPING_TERM,
};

/// A fully resolved keymap: binding tables plus timing, either the
/// built-in defaults or loaded from a file.
pub struct Keymap {
    pub dual_role: Vec<DualRole>,
    pub dance: Vec<Dance>,
    pub tapping_term: Millis,
    pub hold_delay: Millis,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct KeymapFile {
    #[serde(default = "default_tapping_term")]
    tapping_term: Millis,
    #[serde(default = "default_hold_delay")]
    hold_delay: Millis,
    #[serde(default)]
    dual_role: Vec<DualRoleEntry>,
    #[serde(default)]
    tap_dance: Vec<DanceEntry>,
}

fn default_tapping_term() -> Millis {
    TAPPING_TERM
}

fn default_hold_delay() -> Millis {
    HOLD_EMIT_DELAY
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DualRoleEntry {
    tap: String,
    hold: String,
    #[serde(default)]
    term: Option<Millis>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DanceEntry {
    single: String,
    double: String,
}

/// Parse a key name as written in scripts and keymap files.
pub fn parse_key(name: &str) -> Result<Keycode> {
    Keycode::from_name(&name.to_ascii_lowercase())
        .ok_or_else(|| anyhow!("unknown key name '{}'", name))
}

impl Keymap {
    /// The tables compiled into `taphold-keymap`.
    pub fn default_tables() -> Self {
        Self {
            dual_role: DUAL_ROLE_KEYS.to_vec(),
            dance: DANCE_KEYS.to_vec(),
            tapping_term: TAPPING_TERM,
            hold_delay: HOLD_EMIT_DELAY,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let file: KeymapFile = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        Self::from_file(file)
    }

    fn from_file(file: KeymapFile) -> Result<Self> {
        let mut dual_role = Vec::with_capacity(file.dual_role.len());
        for entry in &file.dual_role {
            dual_role.push(DualRole {
                tap: parse_key(&entry.tap)?,
                hold: parse_key(&entry.hold)?,
                term: entry.term,
            });
        }

        let mut dance = Vec::with_capacity(file.tap_dance.len());
        for entry in &file.tap_dance {
            dance.push(Dance {
                single: parse_key(&entry.single)?,
                double: parse_key(&entry.double)?,
            });
        }

        Ok(Self {
            dual_role,
            dance,
            tapping_term: file.tapping_term,
            hold_delay: file.hold_delay,
        })
    }

    /// Reject tables the replay dispatch cannot address unambiguously: a
    /// physical key is identified by its tap symbol, so tap symbols must
    /// be unique across both tables.
    pub fn check(&self) -> Result<()> {
        let mut seen: Vec<Keycode> = Vec::new();
        let identities = self
            .dual_role
            .iter()
            .map(|b| b.tap)
            .chain(self.dance.iter().map(|d| d.single));
        for kc in identities {
            if seen.contains(&kc) {
                bail!("key '{}' is bound more than once", kc.display_name());
            }
            seen.push(kc);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_full_file() {
        let json = r#"{
            "tapping_term": 200,
            "hold_delay": 100,
            "dual_role": [
                { "tap": "q", "hold": "1" },
                { "tap": "a", "hold": "tab", "term": 130 }
            ],
            "tap_dance": [
                { "single": "/", "double": "\\" }
            ]
        }"#;
        let file: KeymapFile = serde_json::from_str(json).unwrap();
        let keymap = Keymap::from_file(file).unwrap();

        assert_eq!(keymap.tapping_term, 200);
        assert_eq!(keymap.hold_delay, 100);
        assert_eq!(keymap.dual_role.len(), 2);
        assert_eq!(keymap.dual_role[0].tap, Keycode::Q);
        assert_eq!(keymap.dual_role[1].term, Some(130));
        assert_eq!(keymap.dance[0].double, Keycode::Backslash);
        keymap.check().unwrap();
    }

    #[test]
    fn test_timing_defaults_apply() {
        let json = r#"{ "dual_role": [ { "tap": "q", "hold": "1" } ] }"#;
        let file: KeymapFile = serde_json::from_str(json).unwrap();
        let keymap = Keymap::from_file(file).unwrap();

        assert_eq!(keymap.tapping_term, TAPPING_TERM);
        assert_eq!(keymap.hold_delay, HOLD_EMIT_DELAY);
        assert!(keymap.dance.is_empty());
    }

    #[test]
    fn test_unknown_key_name_is_rejected() {
        let json = r#"{ "dual_role": [ { "tap": "hyper", "hold": "1" } ] }"#;
        let file: KeymapFile = serde_json::from_str(json).unwrap();
        assert!(Keymap::from_file(file).is_err());
    }

    #[test]
    fn test_duplicate_tap_symbol_is_rejected() {
        let json = r#"{
            "dual_role": [
                { "tap": "q", "hold": "1" },
                { "tap": "q", "hold": "2" }
            ]
        }"#;
        let file: KeymapFile = serde_json::from_str(json).unwrap();
        let keymap = Keymap::from_file(file).unwrap();
        assert!(keymap.check().is_err());
    }

    #[test]
    fn test_default_tables_pass_check() {
        Keymap::default_tables().check().unwrap();
    }
}

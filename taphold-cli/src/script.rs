//! Event scripts: the replay input format.
//!
//! One physical key transition per line, `<time-ms> <press|release>
//! <key>`, with times non-decreasing. Blank lines and `#` comments are
//! ignored:
//!
//! ```text
//! # tap Q, then hold W past the tapping term
//! 0    press   q
//! 150  release q
//! 300  press   w
//! 600  release w
//! ```

use anyhow::{bail, Context, Result};
use taphold_keymap::{Keycode, Millis};

use crate::keymap_file::parse_key;

/// A parsed key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptEvent {
    pub at: Millis,
    pub key: Keycode,
    pub pressed: bool,
}

/// Parse an event script into a time-ordered event list.
pub fn parse_script(input: &str) -> Result<Vec<ScriptEvent>> {
    let mut events: Vec<ScriptEvent> = Vec::new();

    for (line_num, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(at), Some(verb), Some(key)) = (fields.next(), fields.next(), fields.next())
        else {
            bail!("line {}: expected '<time> <press|release> <key>'", line_num + 1);
        };
        if fields.next().is_some() {
            bail!("line {}: trailing fields", line_num + 1);
        }

        let at: Millis = at
            .parse()
            .with_context(|| format!("line {}: invalid time '{}'", line_num + 1, at))?;
        let pressed = match verb {
            "press" => true,
            "release" => false,
            other => bail!("line {}: unknown verb '{}'", line_num + 1, other),
        };
        let key = parse_key(key).with_context(|| format!("line {}", line_num + 1))?;

        if let Some(prev) = events.last() {
            if at < prev.at {
                bail!("line {}: time {} goes backwards", line_num + 1, at);
            }
        }

        events.push(ScriptEvent { at, key, pressed });
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_script() {
        let script = "# a quick tap\n\
                      0   press   q\n\
                      \n\
                      150 release q\n";
        let events = parse_script(script).unwrap();
        assert_eq!(
            events,
            vec![
                ScriptEvent { at: 0, key: Keycode::Q, pressed: true },
                ScriptEvent { at: 150, key: Keycode::Q, pressed: false },
            ]
        );
    }

    #[test]
    fn test_punctuation_key_names() {
        let events = parse_script("0 press /\n10 press semicolon\n").unwrap();
        assert_eq!(events[0].key, Keycode::Slash);
        assert_eq!(events[1].key, Keycode::Semicolon);
    }

    #[test]
    fn test_rejects_unknown_verb() {
        assert!(parse_script("0 tap q\n").is_err());
    }

    #[test]
    fn test_rejects_unknown_key() {
        assert!(parse_script("0 press hyper\n").is_err());
    }

    #[test]
    fn test_rejects_time_going_backwards() {
        assert!(parse_script("10 press q\n5 release q\n").is_err());
    }

    #[test]
    fn test_rejects_short_line() {
        assert!(parse_script("10 press\n").is_err());
    }

    #[test]
    fn test_rejects_trailing_fields() {
        assert!(parse_script("10 press q extra\n").is_err());
    }
}

//! Per-key tap-hold classification.
//!
//! Each dual-role key is `Idle` between activations. A press makes it
//! the single pending key; it leaves that state exactly once, as a tap
//! (released inside the tapping term, or pre-empted by another press) or
//! as a hold (the term expires while it is still down, observed from the
//! periodic tick). The engine never reorders events: it is a
//! deterministic function of the order the host delivers them in.

use log::{debug, trace};
use taphold_keymap::{DualRole, Millis};

use crate::{elapsed, ConfigError, Disposition, KeyId, SymbolSink};

/// Upper bound on the dual-role binding table. Keeps per-key state in a
/// fixed array; real boards bind a couple dozen keys at most.
pub const MAX_DUAL_ROLE_KEYS: usize = 32;

/// Press-cycle state of one dual-role key.
#[derive(Copy, Clone)]
struct KeyState {
    pressed_at: Millis,
    /// True once the current activation has emitted its symbol. Keys
    /// start resolved so that nothing is pending before the first press.
    resolved: bool,
}

/// The tap-hold classifier.
///
/// Owns per-key timing state for a table of dual-role keys. The host
/// feeds it every key transition via [`TapHold::on_key_event`] and calls
/// [`TapHold::on_tick`] once per scan cycle; emissions go to the
/// [`SymbolSink`] passed into each call.
pub struct TapHold<'a> {
    bindings: &'a [DualRole],
    states: [KeyState; MAX_DUAL_ROLE_KEYS],
    /// At most one key is down and unresolved at a time.
    active: Option<KeyId>,
    default_term: Millis,
    hold_delay: Millis,
}

impl<'a> TapHold<'a> {
    /// One-time setup. `bindings` is borrowed for the life of the engine,
    /// `default_term` applies to keys without a per-key override, and
    /// `hold_delay` is attached to every hold emission.
    pub fn new(
        bindings: &'a [DualRole],
        default_term: Millis,
        hold_delay: Millis,
    ) -> Result<Self, ConfigError> {
        if bindings.len() > MAX_DUAL_ROLE_KEYS {
            return Err(ConfigError::CapacityExceeded {
                count: bindings.len(),
                capacity: MAX_DUAL_ROLE_KEYS,
            });
        }
        if default_term == 0 {
            return Err(ConfigError::ZeroDefaultTerm);
        }
        if let Some(key) = bindings.iter().position(|b| b.term == Some(0)) {
            return Err(ConfigError::ZeroTerm { key });
        }

        Ok(Self {
            bindings,
            states: [KeyState {
                pressed_at: 0,
                resolved: true,
            }; MAX_DUAL_ROLE_KEYS],
            active: None,
            default_term,
            hold_delay,
        })
    }

    /// Tapping term for `key`: the per-key override if present, else the
    /// engine default.
    fn effective_term(&self, key: KeyId) -> Millis {
        self.bindings[key].term.unwrap_or(self.default_term)
    }

    /// The key currently down and awaiting classification, if any.
    pub fn pending(&self) -> Option<KeyId> {
        self.active
    }

    /// Feed one physical key transition.
    ///
    /// `key` indexes the binding table; out-of-range values stand for
    /// keys this engine does not own. Those always come back
    /// [`Disposition::PassThrough`], but a press still runs the
    /// pre-emption sweep first, so the host should route every event
    /// through here before its own dispatch.
    pub fn on_key_event(
        &mut self,
        key: KeyId,
        pressed: bool,
        now: Millis,
        sink: &mut dyn SymbolSink,
    ) -> Disposition {
        // Any press while a key awaits classification resolves that key
        // as a tap. In a fast roll like Q-then-U the user wants "qu", not
        // the hold symbol, so a pending key can never become a hold once
        // another press lands. The sweep also force-resolves stale
        // pending state that would break the one-pending-key invariant.
        if pressed {
            for i in 0..self.bindings.len() {
                if i != key && !self.states[i].resolved {
                    debug_assert!(self.active == Some(i), "key {} pending but not active", i);
                    sink.emit(self.bindings[i].tap, 0);
                    self.states[i].resolved = true;
                    debug!("key {} pre-empted, resolved as tap at {}", i, now);
                }
            }
            self.active = None;
        }

        let Some(&binding) = self.bindings.get(key) else {
            return Disposition::PassThrough;
        };

        if pressed {
            self.states[key] = KeyState {
                pressed_at: now,
                resolved: false,
            };
            self.active = Some(key);
            trace!("key {} down at {}, awaiting classification", key, now);
        } else {
            if !self.states[key].resolved {
                // Released inside the tapping term.
                sink.emit(binding.tap, 0);
                self.states[key].resolved = true;
                debug!("key {} resolved as tap at {}", key, now);
            }
            // Otherwise the hold already fired from the tick (or the key
            // was pre-empted); the release carries no further information.
            if self.active == Some(key) {
                self.active = None;
            }
        }

        Disposition::Consumed
    }

    /// Periodic check, called once per host scan cycle. If the pending
    /// key has outlived its tapping term, its hold symbol fires here,
    /// before the key is even released. Idempotent and cheap when nothing
    /// is pending.
    pub fn on_tick(&mut self, now: Millis, sink: &mut dyn SymbolSink) {
        let Some(key) = self.active else { return };

        if elapsed(now, self.states[key].pressed_at) > self.effective_term(key) {
            sink.emit(self.bindings[key].hold, self.hold_delay);
            self.states[key].resolved = true;
            self.active = None;
            debug!("key {} resolved as hold at {}", key, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taphold_keymap::Keycode;

    #[derive(Default)]
    struct Recorder {
        emitted: Vec<(Keycode, Millis)>,
    }

    impl SymbolSink for Recorder {
        fn emit(&mut self, symbol: Keycode, delay: Millis) {
            self.emitted.push((symbol, delay));
        }
    }

    fn bindings() -> [DualRole; 2] {
        [
            DualRole { tap: Keycode::Q, hold: Keycode::N1, term: None },
            DualRole { tap: Keycode::A, hold: Keycode::Tab, term: Some(130) },
        ]
    }

    #[test]
    fn test_rejects_zero_default_term() {
        let b = bindings();
        assert_eq!(TapHold::new(&b, 0, 250).err(), Some(ConfigError::ZeroDefaultTerm));
    }

    #[test]
    fn test_rejects_zero_term_override() {
        let b = [DualRole { tap: Keycode::Q, hold: Keycode::N1, term: Some(0) }];
        assert_eq!(TapHold::new(&b, 180, 250).err(), Some(ConfigError::ZeroTerm { key: 0 }));
    }

    #[test]
    fn test_rejects_oversized_table() {
        let b = [DualRole { tap: Keycode::Q, hold: Keycode::N1, term: None }; 33];
        assert_eq!(
            TapHold::new(&b, 180, 250).err(),
            Some(ConfigError::CapacityExceeded { count: 33, capacity: 32 })
        );
    }

    #[test]
    fn test_empty_table_passes_everything_through() {
        let mut engine = TapHold::new(&[], 180, 250).unwrap();
        let mut sink = Recorder::default();
        assert_eq!(engine.on_key_event(0, true, 0, &mut sink), Disposition::PassThrough);
        assert!(sink.emitted.is_empty());
    }

    #[test]
    fn test_per_key_term_override() {
        let b = bindings();
        let mut engine = TapHold::new(&b, 180, 250).unwrap();
        let mut sink = Recorder::default();

        // Key 1 overrides the term to 130: held for 131 ms it is a hold.
        engine.on_key_event(1, true, 0, &mut sink);
        engine.on_tick(130, &mut sink);
        assert!(sink.emitted.is_empty());
        engine.on_tick(131, &mut sink);
        assert_eq!(sink.emitted, vec![(Keycode::Tab, 250)]);

        // Released at 129 ms it is a tap.
        engine.on_key_event(1, false, 200, &mut sink);
        engine.on_key_event(1, true, 300, &mut sink);
        engine.on_key_event(1, false, 429, &mut sink);
        assert_eq!(sink.emitted.last(), Some(&(Keycode::A, 0)));
    }

    #[test]
    fn test_hold_survives_timer_wrap() {
        let b = bindings();
        let mut engine = TapHold::new(&b, 180, 250).unwrap();
        let mut sink = Recorder::default();

        let pressed_at = u32::MAX - 50;
        engine.on_key_event(0, true, pressed_at, &mut sink);
        engine.on_tick(pressed_at.wrapping_add(181), &mut sink);
        assert_eq!(sink.emitted, vec![(Keycode::N1, 250)]);
    }

    #[test]
    fn test_press_of_plain_key_cancels_pending_hold() {
        let b = bindings();
        let mut engine = TapHold::new(&b, 180, 250).unwrap();
        let mut sink = Recorder::default();

        engine.on_key_event(0, true, 0, &mut sink);
        // A key outside the table still pre-empts before passing through.
        assert_eq!(
            engine.on_key_event(usize::MAX, true, 5, &mut sink),
            Disposition::PassThrough
        );
        assert_eq!(sink.emitted, vec![(Keycode::Q, 0)]);
        assert_eq!(engine.pending(), None);

        // The later release of key 0 is consumed without a second symbol.
        engine.on_key_event(0, false, 40, &mut sink);
        assert_eq!(sink.emitted.len(), 1);
    }
}

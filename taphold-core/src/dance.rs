//! Single-vs-double tap classification.
//!
//! A dance key emits one symbol when tapped once and a different symbol
//! when tapped twice inside the tapping term. The second press resolves
//! the dance immediately; a lone press resolves as a single tap when the
//! term expires, observed from the periodic tick, or as soon as any
//! other key interrupts it.

use log::debug;
use taphold_keymap::{Dance, Millis};

use crate::{elapsed, ConfigError, Disposition, KeyId, SymbolSink};

/// A dance in flight: the key and the time of its most recent press.
#[derive(Copy, Clone)]
struct Pending {
    key: KeyId,
    pressed_at: Millis,
}

/// The tap-dance classifier. Same dispatch contract as the tap-hold
/// engine: the host offers it events and a periodic tick, emissions go
/// through the sink, exactly one symbol per dance cycle.
pub struct TapDance<'a> {
    bindings: &'a [Dance],
    pending: Option<Pending>,
    term: Millis,
}

impl<'a> TapDance<'a> {
    pub fn new(bindings: &'a [Dance], term: Millis) -> Result<Self, ConfigError> {
        if term == 0 {
            return Err(ConfigError::ZeroDefaultTerm);
        }
        Ok(Self {
            bindings,
            pending: None,
            term,
        })
    }

    /// The dance key currently awaiting a second tap, if any.
    pub fn pending(&self) -> Option<KeyId> {
        self.pending.map(|p| p.key)
    }

    fn resolve_single(&mut self, sink: &mut dyn SymbolSink) {
        if let Some(p) = self.pending.take() {
            sink.emit(self.bindings[p.key].single, 0);
            debug!("dance key {} resolved as single tap", p.key);
        }
    }

    /// Resolve a pending dance early because another key's press was
    /// consumed elsewhere in the host's dispatch chain and will never
    /// reach [`TapDance::on_key_event`].
    pub fn interrupt(&mut self, now: Millis, sink: &mut dyn SymbolSink) {
        if self.pending.is_some() {
            debug!("dance interrupted at {}", now);
            self.resolve_single(sink);
        }
    }

    /// Feed one physical key transition. Out-of-range `key` values pass
    /// through, though a press still resolves any pending dance first.
    pub fn on_key_event(
        &mut self,
        key: KeyId,
        pressed: bool,
        now: Millis,
        sink: &mut dyn SymbolSink,
    ) -> Disposition {
        if pressed {
            if let Some(p) = self.pending {
                if p.key == key && elapsed(now, p.pressed_at) <= self.term {
                    // Second tap inside the window.
                    self.pending = None;
                    sink.emit(self.bindings[key].double, 0);
                    debug!("dance key {} resolved as double tap at {}", key, now);
                    return Disposition::Consumed;
                }
                // Another key, or a window that expired before the tick
                // noticed: the old dance is a single, and this press
                // starts over below.
                self.resolve_single(sink);
            }

            if key < self.bindings.len() {
                self.pending = Some(Pending {
                    key,
                    pressed_at: now,
                });
                return Disposition::Consumed;
            }
            return Disposition::PassThrough;
        }

        // Releases carry no information for a dance; consume ours so the
        // host's default path doesn't see half of the activation.
        if key < self.bindings.len() {
            Disposition::Consumed
        } else {
            Disposition::PassThrough
        }
    }

    /// Periodic check: a lone press whose window has expired becomes a
    /// single tap.
    pub fn on_tick(&mut self, now: Millis, sink: &mut dyn SymbolSink) {
        let Some(p) = self.pending else { return };

        if elapsed(now, p.pressed_at) > self.term {
            self.resolve_single(sink);
        }
    }
}

//! Host polling loop simulator.
//!
//! Stands in for the firmware's scan loop: advance a millisecond clock,
//! tick the classifiers once per cycle, and deliver key transitions at
//! their timestamps. Every event runs down the dispatch chain (tap-hold
//! first, then tap-dance, then the host's default path) and stops at
//! the first classifier that consumes it.

use anyhow::Result;
use log::debug;
use taphold_core::{Disposition, Millis, SymbolSink, TapDance, TapHold};
use taphold_keymap::Keycode;

use crate::keymap_file::Keymap;
use crate::script::ScriptEvent;

pub struct Simulator<'a> {
    keymap: &'a Keymap,
    taphold: TapHold<'a>,
    dance: TapDance<'a>,
}

impl<'a> Simulator<'a> {
    pub fn new(keymap: &'a Keymap) -> Result<Self> {
        let taphold = TapHold::new(&keymap.dual_role, keymap.tapping_term, keymap.hold_delay)?;
        let dance = TapDance::new(&keymap.dance, keymap.tapping_term)?;
        Ok(Self {
            keymap,
            taphold,
            dance,
        })
    }

    /// Advance both classifiers one scan cycle.
    pub fn tick(&mut self, now: Millis, sink: &mut dyn SymbolSink) {
        self.taphold.on_tick(now, sink);
        self.dance.on_tick(now, sink);
    }

    /// Route one key transition through the dispatch chain. Returns
    /// [`Disposition::PassThrough`] when neither classifier owns the key
    /// and the host's default processing should handle it.
    pub fn deliver(
        &mut self,
        key: Keycode,
        pressed: bool,
        now: Millis,
        sink: &mut dyn SymbolSink,
    ) -> Disposition {
        // A physical key is addressed by its tap symbol; keys in neither
        // table get the out-of-range id and fall through.
        let dual_id = self
            .keymap
            .dual_role
            .iter()
            .position(|b| b.tap == key)
            .unwrap_or(usize::MAX);

        match self.taphold.on_key_event(dual_id, pressed, now, sink) {
            Disposition::Consumed => {
                // The dance engine never sees this event, but a consumed
                // press must still interrupt a pending dance.
                if pressed {
                    self.dance.interrupt(now, sink);
                }
                Disposition::Consumed
            }
            Disposition::PassThrough => {
                let dance_id = self
                    .keymap
                    .dance
                    .iter()
                    .position(|d| d.single == key)
                    .unwrap_or(usize::MAX);
                self.dance.on_key_event(dance_id, pressed, now, sink)
            }
        }
    }

    /// True when no classification is in flight.
    pub fn settled(&self) -> bool {
        self.taphold.pending().is_none() && self.dance.pending().is_none()
    }
}

/// Print sink: one line per emission, stamped with the simulated clock.
struct PrintSink {
    now: Millis,
}

impl SymbolSink for PrintSink {
    fn emit(&mut self, symbol: Keycode, delay: Millis) {
        if delay > 0 {
            println!(
                "[t={:>6}] emit {} (trailing delay {} ms)",
                self.now,
                symbol.display_name(),
                delay
            );
        } else {
            println!("[t={:>6}] emit {}", self.now, symbol.display_name());
        }
    }
}

/// Replay a parsed script against the keymap at the firmware's 1 ms scan
/// rate, printing emissions and pass-through events, and running on past
/// the last event until every pending classification has resolved.
pub fn replay(keymap: &Keymap, events: &[ScriptEvent]) -> Result<()> {
    let mut sim = Simulator::new(keymap)?;
    let mut sink = PrintSink { now: 0 };
    let last = events.last().map(|e| e.at).unwrap_or(0);

    let mut idx = 0;
    let mut t: Millis = 0;
    loop {
        sink.now = t;
        sim.tick(t, &mut sink);
        while idx < events.len() && events[idx].at == t {
            let ev = events[idx];
            if sim.deliver(ev.key, ev.pressed, t, &mut sink) == Disposition::PassThrough {
                let verb = if ev.pressed { "press" } else { "release" };
                println!("[t={:>6}] pass-through {} {}", t, verb, ev.key.display_name());
            }
            idx += 1;
        }
        if t >= last && sim.settled() {
            break;
        }
        t += 1;
    }

    debug!("replay of {} events settled at t={}", events.len(), t);
    Ok(())
}

//! Tap-hold disambiguation engine for dual-purpose keyboard keys.
//!
//! The host polling loop owns the hardware: it scans the matrix, keeps a
//! monotonic millisecond counter, and knows how to put a key event on the
//! wire. This crate owns the classification: given press/release events
//! and a periodic tick, it decides per key whether a physical activation
//! was a quick tap (emit the primary symbol) or a sustained hold (emit
//! the secondary symbol), and never emits both.
//!
//! Two classifiers are provided:
//! - [`TapHold`]: tap vs. hold, resolved by the tapping term or by
//!   pre-emption when another key is struck first
//! - [`TapDance`]: single vs. double tap within the tapping term
//!
//! Both are plain synchronous state machines with no I/O; output goes
//! through the [`SymbolSink`] the host passes into every call. The crate
//! is `no_std`-compatible.

#![cfg_attr(not(test), no_std)]

mod dance;
mod engine;

pub use dance::TapDance;
pub use engine::{TapHold, MAX_DUAL_ROLE_KEYS};

pub use taphold_keymap::{Keycode, Millis};

/// Dense index of a key within the binding table handed to an engine.
/// Out-of-range values mean "not one of this engine's keys".
pub type KeyId = usize;

/// What the host should do with a key event after offering it to a
/// classifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// The classifier took ownership of the event. The host must not run
    /// its default key processing for it.
    Consumed,
    /// Not this classifier's key. The host continues down its dispatch
    /// chain.
    PassThrough,
}

/// The host's output-symbol sink. One call per resolved key activation.
///
/// `delay` is a trailing pause the host should insert after putting the
/// symbol on the wire, in the same time units as the timestamps; `0`
/// means none. Hold emissions carry a delay so the host OS has time to
/// pace the synthetic event.
pub trait SymbolSink {
    fn emit(&mut self, symbol: Keycode, delay: Millis);
}

/// Rejected engine configuration.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{count} bindings exceed the engine capacity of {capacity}")]
    CapacityExceeded { count: usize, capacity: usize },
    #[error("default tapping term is zero")]
    ZeroDefaultTerm,
    #[error("tapping term override for key {key} is zero")]
    ZeroTerm { key: KeyId },
}

/// Elapsed time between two wrapping millisecond timestamps.
pub(crate) fn elapsed(now: Millis, since: Millis) -> Millis {
    now.wrapping_sub(since)
}

// Per-cadence single-flight gate
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    /// Periodic current reading + stats.
    Fast,
    /// History + alerts + stats, on range selection and at startup.
    Range,
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cadence::Fast => f.write_str("fast"),
            Cadence::Range => f.write_str("range"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceState {
    Idle,
    InFlight,
}

/// Idle -> InFlight on a successful `try_enter`, back to Idle when the guard
/// drops. Triggers while InFlight are refused, not queued.
#[derive(Debug, Default)]
pub struct CadenceGate {
    in_flight: AtomicBool,
}

impl CadenceGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_enter(&self) -> Option<GateGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GateGuard { gate: self })
    }

    pub fn state(&self) -> CadenceState {
        if self.in_flight.load(Ordering::Acquire) {
            CadenceState::InFlight
        } else {
            CadenceState::Idle
        }
    }
}

/// Releases the gate on every exit path, including early returns and panics.
#[must_use = "the gate is released as soon as the guard is dropped"]
pub struct GateGuard<'a> {
    gate: &'a CadenceGate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_entry_is_refused() {
        let gate = CadenceGate::new();
        let guard = gate.try_enter();
        assert!(guard.is_some());
        assert_eq!(gate.state(), CadenceState::InFlight);
        assert!(gate.try_enter().is_none());

        drop(guard);
        assert_eq!(gate.state(), CadenceState::Idle);
        assert!(gate.try_enter().is_some());
    }

    #[test]
    fn test_released_on_panic() {
        let gate = CadenceGate::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = gate.try_enter();
            panic!("cycle blew up");
        }));
        assert!(result.is_err());
        assert_eq!(gate.state(), CadenceState::Idle);
    }
}

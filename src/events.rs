//! Audit events emitted to the observer collaborator.
//!
//! The observer is a pure sink: the engine never reads anything back from
//! it. Stack resolution emits exactly one of `Resolved`, `Fizzled` or
//! `Declined` per entry; combat, casting and zone changes emit their own
//! events as they happen.

use crate::ids::{ObjectId, PlayerId};
use crate::zone::Zone;

/// An auditable occurrence inside the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A stack entry resolved; `log` is the effect engine's output.
    Resolved { name: String, log: Vec<String> },
    /// A stack entry fizzled because every declared target was illegal.
    Fizzled { name: String },
    /// An optional stack entry whose controller declined to resolve it.
    Declined { name: String },
    /// A spell or ability was put on the stack.
    SpellCast { name: String, controller: PlayerId },
    /// Combat damage was dealt.
    CombatDamage {
        source: ObjectId,
        amount: u32,
        blocked: bool,
    },
    /// An object changed zones.
    ZoneChange {
        object: ObjectId,
        from: Option<Zone>,
        to: Zone,
    },
    AttackerDeclared { creature: ObjectId },
    BlockerDeclared { blocker: ObjectId, attacker: ObjectId },
    PermanentDestroyed { object: ObjectId },
    PlayerLost { player: PlayerId },
}

/// Receives engine events. Purely a sink; no return value is consumed.
pub trait Observer {
    fn notify(&mut self, event: &GameEvent);
}

/// Observer that discards everything.
#[derive(Debug, Default)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn notify(&mut self, _event: &GameEvent) {}
}

/// Observer that records every event, for tests and audit logs.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count events matching a predicate.
    pub fn count(&self, predicate: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

impl Observer for EventLog {
    fn notify(&mut self, event: &GameEvent) {
        self.events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_records() {
        let mut log = EventLog::new();
        log.notify(&GameEvent::Fizzled {
            name: "Shock".to_string(),
        });
        assert_eq!(log.events.len(), 1);
        assert_eq!(log.count(|e| matches!(e, GameEvent::Fizzled { .. })), 1);
    }
}

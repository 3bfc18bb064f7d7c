//! Handles into the game-state arena.
//!
//! Entities never hold owning references to each other: a controller is a
//! [`PlayerId`], an effect source is an [`ObjectId`], a permanent's
//! definition is a [`CardId`], and turning any of them back into an entity
//! is a lookup on [`crate::game_state::GameState`]. That keeps the object
//! graph acyclic even though cards, permanents and players all refer to
//! one another in rules text.
//!
//! Allocation draws from process-wide counters, so handles stay unique
//! across every game state a test run constructs. Uniqueness is the only
//! guarantee; holes and ordering mean nothing.

use std::sync::atomic::{AtomicU8, AtomicU32, AtomicU64, Ordering};

static NEXT_PLAYER: AtomicU8 = AtomicU8::new(0);
// Object and card handles start at 1 so a zeroed struct never aliases a
// live entity.
static NEXT_OBJECT: AtomicU64 = AtomicU64::new(1);
static NEXT_CARD: AtomicU32 = AtomicU32::new(1);

/// Handle of a player. Stored wherever game state records an owner or
/// controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Allocate the next free player handle.
    pub fn new() -> Self {
        Self(NEXT_PLAYER.fetch_add(1, Ordering::Relaxed))
    }

    /// Pin a handle to a fixed seat number. Tests use this when they need
    /// ids that do not depend on allocation order.
    pub fn from_index(index: u8) -> Self {
        Self(index)
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle of a card, permanent or token in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl ObjectId {
    /// Allocate the next free object handle.
    pub fn new() -> Self {
        Self(NEXT_OBJECT.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle of a compiled card definition, linking permanents back to the
/// metadata and IR they were built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CardId(pub u32);

impl CardId {
    /// Allocate the next free definition handle.
    pub fn new() -> Self {
        Self(NEXT_CARD.fetch_add(1, Ordering::Relaxed))
    }
}

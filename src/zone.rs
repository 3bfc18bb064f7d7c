//! The zones cards move between.
//!
//! Rules text names zones in prose ("put it into your graveyard"), so the
//! parser maps names to variants with [`Zone::from_name`] and
//! [`crate::game_state::GameState::move_card`] takes the variant as its
//! destination. Visibility matters to the audit trail: a move into a
//! hidden zone should not have its card named in observer events.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Library,
    Hand,
    Battlefield,
    Graveyard,
    Stack,
    Exile,
    Command,
}

impl Zone {
    /// Hidden zones: only the owner knows what sits here. Libraries and
    /// hands are the two this engine tracks.
    pub fn is_hidden(self) -> bool {
        matches!(self, Zone::Library | Zone::Hand)
    }

    /// Whether every player may inspect this zone's contents. Everything
    /// that is not hidden is open information.
    pub fn is_public(self) -> bool {
        !self.is_hidden()
    }

    /// Parse a zone name as it appears in rules text ("graveyard",
    /// "command zone"). Returns `None` for anything outside the closed set.
    pub fn from_name(name: &str) -> Option<Zone> {
        match name.trim().to_ascii_lowercase().as_str() {
            "library" => Some(Zone::Library),
            "hand" => Some(Zone::Hand),
            "battlefield" => Some(Zone::Battlefield),
            "graveyard" => Some(Zone::Graveyard),
            "stack" => Some(Zone::Stack),
            "exile" => Some(Zone::Exile),
            "command" | "command zone" => Some(Zone::Command),
            _ => None,
        }
    }

    /// The zone name as it appears in rules text.
    pub fn name(&self) -> &'static str {
        match self {
            Zone::Library => "library",
            Zone::Hand => "hand",
            Zone::Battlefield => "battlefield",
            Zone::Graveyard => "graveyard",
            Zone::Stack => "stack",
            Zone::Exile => "exile",
            Zone::Command => "command zone",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

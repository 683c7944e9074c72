//! Lookup from wire-level game type to its rule implementation.

use std::collections::HashMap;

use partyroom_protocol::GameType;

use crate::baskin_robbins::BaskinRobbins31;
use crate::nunchi::Nunchi;
use crate::rules::GameRules;
use crate::three_six_nine::ThreeSixNine;
use crate::two_truths::TwoTruths;

/// The set of playable game variants.
///
/// Built once at startup and shared read-only; rooms resolve a variant
/// per game start, so registration after that point only affects new
/// games.
#[derive(Default)]
pub struct GameRegistry {
    rules: HashMap<GameType, Box<dyn GameRules>>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All built-in variants.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(Nunchi));
        registry.register(Box::new(ThreeSixNine));
        registry.register(Box::new(TwoTruths));
        registry.register(Box::new(BaskinRobbins31));
        registry
    }

    /// Registers a variant, replacing any previous one for the same type.
    pub fn register(&mut self, rules: Box<dyn GameRules>) {
        self.rules.insert(rules.game_type(), rules);
    }

    pub fn get(&self, game_type: GameType) -> Option<&dyn GameRules> {
        self.rules.get(&game_type).map(Box::as_ref)
    }

    pub fn contains(&self, game_type: GameType) -> bool {
        self.rules.contains_key(&game_type)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for GameRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameRegistry")
            .field("types", &self.rules.keys().collect::<Vec<_>>())
            .finish()
    }
}

use std::collections::HashSet;

use super::{BinToHex, DecToHex, HexArithmetic, HexToDec, QuestionProvider, RecognizeWord};
use crate::{error::RegistryError, models::Operator};

/// Games in menu order, each with an id no other game shares.
pub struct GameRegistry {
    games: Vec<Box<dyn QuestionProvider>>,
}

impl GameRegistry {
    /// Build a registry, rejecting duplicate ids.
    pub fn new(games: Vec<Box<dyn QuestionProvider>>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for game in &games {
            if !seen.insert(game.id().to_string()) {
                return Err(RegistryError::DuplicateId(game.id().to_string()));
            }
        }
        Ok(Self { games })
    }

    /// The full catalogue. Ids are persisted in the score file and must stay stable.
    pub fn standard(words: Vec<String>) -> Result<Self, RegistryError> {
        Self::new(vec![
            Box::new(BinToHex::new("game_3_sec")),
            Box::new(HexArithmetic::single("game_hexsum", Operator::Add)),
            Box::new(HexArithmetic::single("game_hexmul", Operator::Mul)),
            Box::new(HexArithmetic::single("game_hexdiff", Operator::Sub)),
            Box::new(HexArithmetic::mixed("game_arithm")),
            Box::new(HexToDec::new("game_dec_6_sec")),
            Box::new(DecToHex::new("game_hex_6_sec")),
            Box::new(RecognizeWord::new("recognize_code_point_word", words)),
        ])
    }

    /// Number of games.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Whether no game is registered.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Game at zero-based menu position `index`.
    pub fn get(&self, index: usize) -> Option<&dyn QuestionProvider> {
        self.games.get(index).map(|game| game.as_ref())
    }

    /// Games in menu order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn QuestionProvider> {
        self.games.iter().map(|game| game.as_ref())
    }

    /// Ids in menu order.
    pub fn ids(&self) -> Vec<String> {
        self.iter().map(|game| game.id().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::default_words;

    #[test]
    fn standard_catalogue_has_unique_ids() -> Result<(), RegistryError> {
        let registry = GameRegistry::standard(default_words())?;
        let ids = registry.ids();
        assert_eq!(registry.len(), 8);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
        assert_eq!(ids[0], "game_3_sec");
        assert_eq!(ids[7], "recognize_code_point_word");
        assert_eq!(registry.get(4).map(|game| game.name()), Some("Hex arithmetic"));
        let diff = registry.iter().find(|game| game.id() == "game_hexdiff");
        assert_eq!(diff.map(|game| game.name()), Some("Hex diff"));
        assert!(registry.get(8).is_none());
        Ok(())
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = GameRegistry::new(vec![
            Box::new(HexToDec::new("same")),
            Box::new(DecToHex::new("same")),
        ]);
        assert_eq!(result.err(), Some(RegistryError::DuplicateId("same".to_string())));
    }
}

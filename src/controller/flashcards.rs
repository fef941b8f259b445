use crate::models::Entry;
use crate::services::sampler::{self, DEFAULT_CARD_LIMIT};

/// 闪卡：从完整集合随机抽取，源集合或张数变化时重新抽
#[derive(Debug, Clone)]
pub struct Flashcards {
    max_cards: usize,
    cards: Vec<Entry>,
}

impl Default for Flashcards {
    fn default() -> Self {
        Self { max_cards: DEFAULT_CARD_LIMIT, cards: Vec::new() }
    }
}

impl Flashcards {
    pub fn new(max_cards: usize, source: &[Entry]) -> Self {
        let mut cards = Self { max_cards, cards: Vec::new() };
        cards.shuffle(source);
        cards
    }

    pub fn cards(&self) -> &[Entry] {
        &self.cards
    }

    /// "换一批"，源集合变了也走这里
    pub fn shuffle(&mut self, source: &[Entry]) {
        self.cards = sampler::pick_random(source, self.max_cards);
    }

    pub fn set_max_cards(&mut self, max_cards: usize, source: &[Entry]) {
        self.max_cards = max_cards;
        self.shuffle(source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashSet;

    fn source(n: i32) -> Vec<Entry> {
        (1..=n)
            .map(|id| Entry { id, text: format!("w{id}"), annotation: String::new(), created_at: Utc::now() })
            .collect()
    }

    #[test]
    fn default_limit_caps_at_collection_size() {
        let items = source(8);
        let cards = Flashcards::new(DEFAULT_CARD_LIMIT, &items);
        assert_eq!(cards.cards().len(), 8);
    }

    #[test]
    fn changing_count_resamples() {
        let items = source(40);
        let mut cards = Flashcards::default();
        cards.shuffle(&items);
        assert_eq!(cards.cards().len(), 20);

        cards.set_max_cards(0, &items);
        assert_eq!(cards.cards().len(), 1);

        cards.set_max_cards(5, &items);
        let ids: HashSet<i32> = cards.cards().iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn empty_source_shows_no_cards() {
        let mut cards = Flashcards::new(10, &[]);
        assert!(cards.cards().is_empty());
        cards.shuffle(&[]);
        assert!(cards.cards().is_empty());
    }
}

// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::Serialize;

use crate::types::card::FlashCard;
use crate::types::deck::Deck;
use crate::types::prefs::ReviewPrefs;
use crate::types::state::CardState;
use crate::types::timestamp::Timestamp;

/// How never-seen cards are mixed into a session.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NewCardPolicy {
    /// All due cards compete on due date alone.
    Unlimited,
    /// Previously seen cards come first; at most this many new cards fill
    /// the remaining slots.
    Capped(usize),
}

impl NewCardPolicy {
    pub fn from_prefs(prefs: &ReviewPrefs) -> Self {
        NewCardPolicy::Capped(prefs.new_card_limit)
    }
}

/// The cards to review now, in presentation order.
pub fn due_cards(
    deck: &Deck,
    limit: usize,
    policy: NewCardPolicy,
    now: Timestamp,
) -> Vec<FlashCard> {
    let due: Vec<&FlashCard> = deck
        .cards()
        .iter()
        .filter(|card| card.memory().is_due(now))
        .collect();
    let selected: Vec<&FlashCard> = match policy {
        NewCardPolicy::Unlimited => {
            let mut due = due;
            due.sort_by_key(|card| card.memory().due);
            due.into_iter().take(limit).collect()
        }
        NewCardPolicy::Capped(new_card_limit) => {
            let (mut fresh, mut reviewish): (Vec<&FlashCard>, Vec<&FlashCard>) = due
                .into_iter()
                .partition(|card| card.memory().state == CardState::New);
            reviewish.sort_by_key(|card| card.memory().due);
            fresh.sort_by_key(|card| card.memory().due);
            let mut selected: Vec<&FlashCard> = reviewish.into_iter().take(limit).collect();
            let remaining = (limit - selected.len()).min(new_card_limit);
            selected.extend(fresh.into_iter().take(remaining));
            selected
        }
    };
    log::debug!(
        "Selected {} of {} cards in deck {}.",
        selected.len(),
        deck.cards().len(),
        deck.name()
    );
    selected.into_iter().cloned().collect()
}

/// Card tallies, with Learning and Relearning collapsed into `learning`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
pub struct CardCounts {
    pub new: usize,
    pub learning: usize,
    pub review: usize,
}

impl CardCounts {
    fn tally<'a>(cards: impl Iterator<Item = &'a FlashCard>) -> Self {
        let mut counts = CardCounts::default();
        for card in cards {
            match card.memory().state {
                CardState::New => counts.new += 1,
                CardState::Learning | CardState::Relearning => counts.learning += 1,
                CardState::Review => counts.review += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.new + self.learning + self.review
    }
}

pub fn card_counts(deck: &Deck) -> CardCounts {
    CardCounts::tally(deck.cards().iter())
}

pub fn due_card_counts(deck: &Deck, now: Timestamp) -> CardCounts {
    CardCounts::tally(deck.cards().iter().filter(|card| card.memory().is_due(now)))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn now() -> Timestamp {
        Timestamp::parse("2025-06-01T09:00:00.000Z").unwrap()
    }

    fn card_in(state: CardState, due: Timestamp, front: &str) -> FlashCard {
        let card = FlashCard::new(front, "A", now());
        let mut memory = card.memory().clone();
        memory.state = state;
        memory.due = due;
        if state != CardState::New {
            memory.reps = 1;
        }
        card.with_memory(memory)
    }

    /// Three new cards and two review cards, all due.
    fn mixed_deck() -> Deck {
        let now = now();
        let mut deck = Deck::new("Test", now);
        for i in 0..3 {
            deck.add_card(card_in(CardState::New, now, &format!("New{i}")));
        }
        for i in 0..2 {
            let due = now.plus(Duration::seconds(-1));
            deck.add_card(card_in(CardState::Review, due, &format!("Rev{i}")));
        }
        deck
    }

    fn count_state(cards: &[FlashCard], state: CardState) -> usize {
        cards.iter().filter(|c| c.memory().state == state).count()
    }

    #[test]
    fn test_new_cards_are_due() {
        let now = now();
        let mut deck = Deck::new("Test", now);
        deck.add_card(FlashCard::new("Q1", "A1", now));
        deck.add_card(FlashCard::new("Q2", "A2", now));
        assert_eq!(due_cards(&deck, 10, NewCardPolicy::Unlimited, now).len(), 2);
    }

    #[test]
    fn test_unlimited_respects_limit() {
        let now = now();
        let mut deck = Deck::new("Test", now);
        for i in 0..5 {
            deck.add_card(FlashCard::new(format!("Q{i}"), format!("A{i}"), now));
        }
        assert_eq!(due_cards(&deck, 3, NewCardPolicy::Unlimited, now).len(), 3);
    }

    #[test]
    fn test_capped_mixes_review_and_new() {
        let due = due_cards(&mixed_deck(), 5, NewCardPolicy::Capped(1), now());
        assert_eq!(due.len(), 3);
        assert_eq!(count_state(&due, CardState::Review), 2);
        assert_eq!(count_state(&due, CardState::New), 1);
        // Reviewed material comes first.
        assert_eq!(due[0].memory().state, CardState::Review);
        assert_eq!(due[1].memory().state, CardState::Review);
    }

    #[test]
    fn test_capped_zero_returns_only_review() {
        let due = due_cards(&mixed_deck(), 10, NewCardPolicy::Capped(0), now());
        assert_eq!(due.len(), 2);
        assert_eq!(count_state(&due, CardState::Review), 2);
    }

    #[test]
    fn test_capped_review_never_displaced() {
        let due = due_cards(&mixed_deck(), 2, NewCardPolicy::Capped(3), now());
        assert_eq!(due.len(), 2);
        assert_eq!(count_state(&due, CardState::Review), 2);
    }

    #[test]
    fn test_unlimited_sorts_union_by_due() {
        let due = due_cards(&mixed_deck(), 5, NewCardPolicy::Unlimited, now());
        assert_eq!(due.len(), 5);
        let fronts: Vec<&str> = due.iter().map(|c| c.front()).collect();
        // The review cards are overdue by a second, so they sort first; ties
        // keep deck order.
        assert_eq!(fronts, vec!["Rev0", "Rev1", "New0", "New1", "New2"]);
    }

    #[test]
    fn test_earliest_overdue_first() {
        let now = now();
        let mut deck = Deck::new("Test", now);
        deck.add_card(card_in(CardState::Review, now.plus_days(-1), "Yesterday"));
        deck.add_card(card_in(CardState::Review, now.plus_days(-3), "Older"));
        deck.add_card(card_in(CardState::Review, now.plus_days(1), "Tomorrow"));
        let due = due_cards(&deck, 10, NewCardPolicy::Capped(10), now);
        let fronts: Vec<&str> = due.iter().map(|c| c.front()).collect();
        assert_eq!(fronts, vec!["Older", "Yesterday"]);
    }

    #[test]
    fn test_from_prefs() {
        let prefs = ReviewPrefs {
            review_count: 20,
            new_card_limit: 4,
        };
        assert_eq!(NewCardPolicy::from_prefs(&prefs), NewCardPolicy::Capped(4));
    }

    #[test]
    fn test_card_counts() {
        let now = now();
        let mut deck = Deck::new("Test", now);
        deck.add_card(card_in(CardState::New, now, "New1"));
        deck.add_card(card_in(CardState::Learning, now, "Learn1"));
        deck.add_card(card_in(CardState::Review, now, "Rev1"));
        deck.add_card(card_in(CardState::Relearning, now, "Relearn1"));
        let counts = card_counts(&deck);
        assert_eq!(
            counts,
            CardCounts {
                new: 1,
                learning: 2,
                review: 1
            }
        );
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_due_card_counts() {
        let now = now();
        let mut deck = Deck::new("Test", now);
        deck.add_card(card_in(CardState::New, now, "New1"));
        deck.add_card(card_in(CardState::Review, now.plus_days(1), "Rev1"));
        deck.add_card(card_in(CardState::Review, now.plus(Duration::seconds(-1)), "Rev2"));
        let counts = due_card_counts(&deck, now);
        assert_eq!(counts.new, 1);
        assert_eq!(counts.review, 1);
        assert_eq!(counts.learning, 0);
    }
}

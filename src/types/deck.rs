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

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::card::FlashCard;
use crate::types::id::Id;
use crate::types::timestamp::Timestamp;

/// A named, ordered collection of cards. The deck owns its cards.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    id: Id,
    name: String,
    cards: Vec<FlashCard>,
    created_at: Timestamp,
}

impl Deck {
    pub fn new(name: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id: Id::generate(),
            name: name.into(),
            cards: Vec::new(),
            created_at: now,
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cards(&self) -> &[FlashCard] {
        &self.cards
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn add_card(&mut self, card: FlashCard) {
        self.cards.push(card);
    }

    pub fn card(&self, id: &Id) -> Option<&FlashCard> {
        self.cards.iter().find(|card| card.id() == id)
    }

    /// Change a card's text. `None` leaves that side unchanged.
    pub fn edit_card(
        &mut self,
        id: &Id,
        front: Option<String>,
        back: Option<String>,
    ) -> Fallible<()> {
        let Some(card) = self.cards.iter_mut().find(|card| card.id() == id) else {
            return fail(format!("no card with id {id} in deck {}", self.name));
        };
        if let Some(front) = front {
            card.set_front(front);
        }
        if let Some(back) = back {
            card.set_back(back);
        }
        Ok(())
    }

    pub fn remove_card(&mut self, id: &Id) -> Fallible<FlashCard> {
        match self.cards.iter().position(|card| card.id() == id) {
            Some(index) => Ok(self.cards.remove(index)),
            None => fail(format!("no card with id {id} in deck {}", self.name)),
        }
    }

    /// Swap in a new version of a card (e.g. after a review), keeping its
    /// position in the deck.
    pub fn replace_card(&mut self, card: FlashCard) -> Fallible<()> {
        match self.cards.iter_mut().find(|c| c.id() == card.id()) {
            Some(slot) => {
                *slot = card;
                Ok(())
            }
            None => fail(format!("no card with id {} in deck {}", card.id(), self.name)),
        }
    }
}

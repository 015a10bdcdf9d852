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

use crate::collection::Collection;
use crate::error::Fallible;
use crate::scheduler::next_review_label;
use crate::types::id::Id;
use crate::types::timestamp::Timestamp;

pub fn add_card(directory: Option<String>, deck: &str, front: &str, back: &str) -> Fallible<()> {
    let mut coll: Collection = Collection::new(directory)?;
    let id = coll.add_card(deck, front, back, Timestamp::now())?;
    println!("Added card {id}.");
    Ok(())
}

pub fn list_cards(directory: Option<String>, deck: &str) -> Fallible<()> {
    let coll: Collection = Collection::new(directory)?;
    let deck = coll.find_deck(deck)?;
    let now = Timestamp::now();
    for card in deck.cards() {
        let memory = card.memory();
        println!(
            "{}  [{}, due {}]  {}  ->  {}",
            card.id(),
            memory.state.as_str(),
            next_review_label(card, now),
            one_line(card.front()),
            one_line(card.back())
        );
    }
    Ok(())
}

pub fn edit_card(
    directory: Option<String>,
    deck: &str,
    card: &str,
    front: Option<String>,
    back: Option<String>,
) -> Fallible<()> {
    let mut coll: Collection = Collection::new(directory)?;
    let id = Id::from(card);
    coll.edit_card(deck, &id, front, back)?;
    if let Some(card) = coll.find_deck(deck)?.card(&id) {
        println!(
            "Updated card {id}: {}  ->  {}",
            one_line(card.front()),
            one_line(card.back())
        );
    }
    Ok(())
}

pub fn delete_card(directory: Option<String>, deck: &str, card: &str) -> Fallible<()> {
    let mut coll: Collection = Collection::new(directory)?;
    coll.delete_card(deck, &Id::from(card))?;
    println!("Deleted card {card}.");
    Ok(())
}

fn one_line(text: &str) -> String {
    text.lines().collect::<Vec<&str>>().join(" / ")
}

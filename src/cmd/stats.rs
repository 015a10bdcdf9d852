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

use crate::collection::Collection;
use crate::error::Fallible;
use crate::queue::CardCounts;
use crate::queue::card_counts;
use crate::queue::due_card_counts;
use crate::types::timestamp::Timestamp;

pub fn print_stats(directory: Option<String>) -> Fallible<()> {
    let coll: Collection = Collection::new(directory)?;
    let stats = get_stats(&coll, Timestamp::now());
    let stats_json = serde_json::to_string_pretty(&stats)?;
    println!("{stats_json}");
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Stats {
    directory: String,
    deck_count: usize,
    card_count: usize,
    due_count: usize,
    decks: Vec<DeckStats>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeckStats {
    id: String,
    name: String,
    created_at: Timestamp,
    cards: CardCounts,
    due: CardCounts,
}

fn get_stats(coll: &Collection, now: Timestamp) -> Stats {
    let decks: Vec<DeckStats> = coll
        .decks()
        .iter()
        .map(|deck| DeckStats {
            id: deck.id().to_string(),
            name: deck.name().to_string(),
            created_at: deck.created_at(),
            cards: card_counts(deck),
            due: due_card_counts(deck, now),
        })
        .collect();
    Stats {
        directory: coll.directory.display().to_string(),
        deck_count: decks.len(),
        card_count: decks.iter().map(|d| d.cards.total()).sum(),
        due_count: decks.iter().map(|d| d.due.total()).sum(),
        decks,
    }
}

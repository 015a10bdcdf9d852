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
use crate::queue::card_counts;
use crate::queue::due_card_counts;
use crate::types::timestamp::Timestamp;

pub fn list_decks(directory: Option<String>) -> Fallible<()> {
    let coll: Collection = Collection::new(directory)?;
    if coll.decks().is_empty() {
        println!("No decks in {}.", coll.directory.display());
        return Ok(());
    }
    let now = Timestamp::now();
    for deck in coll.decks() {
        let counts = card_counts(deck);
        let due = due_card_counts(deck, now);
        println!(
            "{}  {}  {} cards ({} new, {} learning, {} review), {} due",
            deck.id(),
            deck.name(),
            counts.total(),
            counts.new,
            counts.learning,
            counts.review,
            due.total()
        );
    }
    Ok(())
}

pub fn new_deck(directory: Option<String>, name: &str) -> Fallible<()> {
    let mut coll: Collection = Collection::new(directory)?;
    let deck = coll.create_deck(name, Timestamp::now())?;
    println!("Created deck {} ({}).", deck.name(), deck.id());
    Ok(())
}

pub fn rename_deck(directory: Option<String>, deck: &str, name: &str) -> Fallible<()> {
    let mut coll: Collection = Collection::new(directory)?;
    coll.rename_deck(deck, name)?;
    println!("Renamed deck to {}.", name.trim());
    Ok(())
}

pub fn delete_deck(directory: Option<String>, deck: &str) -> Fallible<()> {
    let mut coll: Collection = Collection::new(directory)?;
    let deck = coll.delete_deck(deck)?;
    println!(
        "Deleted deck {} and its {} cards.",
        deck.name(),
        deck.cards().len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::create_tmp_directory;

    #[test]
    fn test_deck_commands() -> Fallible<()> {
        let directory = create_tmp_directory()?;
        let dir = Some(directory.display().to_string());
        new_deck(dir.clone(), "Spanish")?;
        list_decks(dir.clone())?;
        rename_deck(dir.clone(), "Spanish", "Español")?;
        assert!(rename_deck(dir.clone(), "Spanish", "Again").is_err());

        let coll = Collection::new(dir.clone())?;
        assert_eq!(coll.decks()[0].name(), "Español");

        delete_deck(dir.clone(), "Español")?;
        let coll = Collection::new(dir)?;
        assert!(coll.decks().is_empty());
        Ok(())
    }
}

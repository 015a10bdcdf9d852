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

use std::env::current_dir;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::Config;
use crate::error::Fallible;
use crate::error::fail;
use crate::store::DeckStore;
use crate::store::backup::ImportSummary;
use crate::store::storage::SqliteStorage;
use crate::types::card::FlashCard;
use crate::types::deck::Deck;
use crate::types::id::Id;
use crate::types::prefs::ReviewPrefs;
use crate::types::timestamp::Timestamp;

pub const DATABASE_FILE: &str = "flashdeck.db";

/// The decks in a collection directory, together with the store they are
/// persisted to and the directory's configuration.
pub struct Collection {
    pub directory: PathBuf,
    pub config: Config,
    store: DeckStore<SqliteStorage>,
    decks: Vec<Deck>,
}

impl Collection {
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        Self::open(directory)
    }

    pub fn open(directory: PathBuf) -> Fallible<Self> {
        let directory = if directory.exists() {
            directory.canonicalize()?
        } else {
            return fail("directory does not exist.");
        };

        let config = Config::load(&directory)?;
        let storage = SqliteStorage::open(&directory.join(DATABASE_FILE))?;
        let store = DeckStore::new(storage);

        let decks = {
            log::debug!("Loading decks...");
            let start = Instant::now();
            let decks = store.load_decks();
            let duration = start.elapsed().as_millis();
            log::debug!("Loaded {} decks in {duration}ms.", decks.len());
            decks
        };

        Ok(Self {
            directory,
            config,
            store,
            decks,
        })
    }

    pub fn decks(&self) -> &[Deck] {
        &self.decks
    }

    /// Find a deck by id or, failing that, by its name. A name shared by
    /// several decks is ambiguous.
    pub fn find_deck(&self, query: &str) -> Fallible<&Deck> {
        let index = self.deck_index(query)?;
        Ok(&self.decks[index])
    }

    fn deck_index(&self, query: &str) -> Fallible<usize> {
        if let Some(index) = self.decks.iter().position(|d| d.id().as_str() == query) {
            return Ok(index);
        }
        let matches: Vec<usize> = self
            .decks
            .iter()
            .enumerate()
            .filter(|(_, d)| d.name() == query)
            .map(|(index, _)| index)
            .collect();
        match matches.as_slice() {
            [index] => Ok(*index),
            [] => fail(format!("no deck named {query}.")),
            _ => fail(format!(
                "{} decks are named {query}, use the deck id instead.",
                matches.len()
            )),
        }
    }

    pub fn create_deck(&mut self, name: &str, now: Timestamp) -> Fallible<&Deck> {
        let name = deck_name(name)?;
        self.decks.push(Deck::new(name, now));
        self.save()?;
        let index = self.decks.len() - 1;
        Ok(&self.decks[index])
    }

    pub fn rename_deck(&mut self, query: &str, name: &str) -> Fallible<()> {
        let name = deck_name(name)?;
        let index = self.deck_index(query)?;
        self.decks[index].rename(name);
        self.save()
    }

    /// Delete a deck and its review preferences.
    pub fn delete_deck(&mut self, query: &str) -> Fallible<Deck> {
        let index = self.deck_index(query)?;
        let deck = self.decks.remove(index);
        self.save()?;
        self.store.remove_review_prefs(deck.id())?;
        Ok(deck)
    }

    pub fn add_card(
        &mut self,
        query: &str,
        front: &str,
        back: &str,
        now: Timestamp,
    ) -> Fallible<Id> {
        let (front, back) = (front.trim(), back.trim());
        if front.is_empty() || back.is_empty() {
            return fail("a card needs both a front and a back.");
        }
        let index = self.deck_index(query)?;
        let card = FlashCard::new(front, back, now);
        let id = card.id().clone();
        self.decks[index].add_card(card);
        self.save()?;
        Ok(id)
    }

    pub fn edit_card(
        &mut self,
        query: &str,
        card_id: &Id,
        front: Option<String>,
        back: Option<String>,
    ) -> Fallible<()> {
        let front = non_blank(front, "front")?;
        let back = non_blank(back, "back")?;
        let index = self.deck_index(query)?;
        self.decks[index].edit_card(card_id, front, back)?;
        self.save()
    }

    pub fn delete_card(&mut self, query: &str, card_id: &Id) -> Fallible<FlashCard> {
        let index = self.deck_index(query)?;
        let card = self.decks[index].remove_card(card_id)?;
        self.save()?;
        Ok(card)
    }

    /// Store a reviewed copy of a card in its deck, and persist the
    /// collection right away.
    pub fn update_card(&mut self, deck_id: &Id, card: FlashCard) -> Fallible<()> {
        let index = self.deck_index(deck_id.as_str())?;
        self.decks[index].replace_card(card)?;
        self.save()
    }

    /// Create a deck from `(front, back)` pairs.
    pub fn import_deck(
        &mut self,
        name: &str,
        pairs: Vec<(String, String)>,
        now: Timestamp,
    ) -> Fallible<&Deck> {
        let mut deck = Deck::new(deck_name(name)?, now);
        for (front, back) in pairs {
            deck.add_card(FlashCard::new(front, back, now));
        }
        log::debug!("Importing {} cards into {}.", deck.cards().len(), deck.name());
        self.decks.push(deck);
        self.save()?;
        let index = self.decks.len() - 1;
        Ok(&self.decks[index])
    }

    /// The deck's stored preferences, or the configured defaults.
    pub fn review_prefs(&self, deck_id: &Id) -> ReviewPrefs {
        self.store
            .load_review_prefs(deck_id)
            .unwrap_or_else(|| self.config.default_prefs())
    }

    pub fn set_review_prefs(&mut self, deck_id: &Id, prefs: ReviewPrefs) -> Fallible<()> {
        self.store.save_review_prefs(deck_id, prefs)
    }

    pub fn export(&self, now: Timestamp) -> Fallible<String> {
        self.store.export_state(now)
    }

    /// Replace the collection with a backup.
    pub fn restore(&mut self, text: &str, now: Timestamp) -> Fallible<ImportSummary> {
        let summary = self.store.import_state(text, now)?;
        self.decks = self.store.load_decks();
        Ok(summary)
    }

    fn save(&mut self) -> Fallible<()> {
        self.store.save_decks(&self.decks)
    }
}

fn deck_name(name: &str) -> Fallible<&str> {
    let name = name.trim();
    if name.is_empty() {
        return fail("deck name cannot be empty.");
    }
    Ok(name)
}

fn non_blank(text: Option<String>, side: &str) -> Fallible<Option<String>> {
    match text {
        Some(text) if text.trim().is_empty() => fail(format!("card {side} cannot be empty.")),
        Some(text) => Ok(Some(text.trim().to_string())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::create_tmp_directory;

    fn collection() -> Fallible<Collection> {
        Collection::open(create_tmp_directory()?)
    }

    #[test]
    fn test_non_existent_directory() {
        let result = Collection::new(Some("./derpherp".to_string()));
        assert!(result.is_err());
        let err = result.err().map(|e| e.to_string());
        assert_eq!(err, Some("error: directory does not exist.".to_string()));
    }

    #[test]
    fn test_decks_persist() -> Fallible<()> {
        let directory = create_tmp_directory()?;
        let now = Timestamp::now();
        let mut coll = Collection::open(directory.clone())?;
        let deck_id = coll.create_deck("  Spanish ", now)?.id().clone();
        coll.add_card("Spanish", "hola", "hello", now)?;

        let coll = Collection::open(directory)?;
        assert_eq!(coll.decks().len(), 1);
        let deck = coll.find_deck(deck_id.as_str())?;
        assert_eq!(deck.name(), "Spanish");
        assert_eq!(deck.cards()[0].front(), "hola");
        Ok(())
    }

    #[test]
    fn test_find_deck() -> Fallible<()> {
        let now = Timestamp::now();
        let mut coll = collection()?;
        coll.create_deck("French", now)?;
        coll.create_deck("Twice", now)?;
        let id = coll.create_deck("Twice", now)?.id().clone();
        assert_eq!(coll.find_deck("French")?.name(), "French");
        assert!(coll.find_deck("German").is_err());
        assert!(coll.find_deck("Twice").is_err());
        assert_eq!(coll.find_deck(id.as_str())?.id(), &id);
        Ok(())
    }

    #[test]
    fn test_blank_names_rejected() -> Fallible<()> {
        let now = Timestamp::now();
        let mut coll = collection()?;
        assert!(coll.create_deck("   ", now).is_err());
        coll.create_deck("Deck", now)?;
        assert!(coll.rename_deck("Deck", "").is_err());
        assert!(coll.add_card("Deck", "front", " ", now).is_err());
        Ok(())
    }

    #[test]
    fn test_card_crud() -> Fallible<()> {
        let now = Timestamp::now();
        let mut coll = collection()?;
        coll.create_deck("Deck", now)?;
        let card_id = coll.add_card("Deck", "Q", "A", now)?;
        coll.edit_card("Deck", &card_id, None, Some("B".to_string()))?;
        let deck = coll.find_deck("Deck")?;
        assert_eq!(deck.cards()[0].front(), "Q");
        assert_eq!(deck.cards()[0].back(), "B");
        coll.delete_card("Deck", &card_id)?;
        assert!(coll.find_deck("Deck")?.cards().is_empty());
        assert!(coll.delete_card("Deck", &card_id).is_err());
        Ok(())
    }

    #[test]
    fn test_review_prefs_default_and_delete() -> Fallible<()> {
        let now = Timestamp::now();
        let mut coll = collection()?;
        let id = coll.create_deck("Deck", now)?.id().clone();
        assert_eq!(coll.review_prefs(&id), coll.config.default_prefs());
        let prefs = ReviewPrefs::new(5, 2)?;
        coll.set_review_prefs(&id, prefs)?;
        assert_eq!(coll.review_prefs(&id), prefs);
        coll.delete_deck("Deck")?;
        assert!(coll.decks().is_empty());
        assert_eq!(coll.review_prefs(&id), coll.config.default_prefs());
        Ok(())
    }

    #[test]
    fn test_export_restore() -> Fallible<()> {
        let now = Timestamp::now();
        let mut source = collection()?;
        source.create_deck("Backup", now)?;
        source.add_card("Backup", "Q", "A", now)?;
        let json = source.export(now)?;

        let mut target = collection()?;
        target.create_deck("Replaced", now)?;
        let summary = target.restore(&json, now)?;
        assert_eq!(summary.deck_count, 1);
        assert_eq!(summary.card_count, 1);
        assert_eq!(target.decks(), source.decks());
        assert!(target.restore("{}", now).is_err());
        assert_eq!(target.decks(), source.decks());
        Ok(())
    }
}

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

pub mod backup;
pub mod storage;

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Fallible;
use crate::store::backup::repair_timestamps;
use crate::store::storage::Storage;
use crate::types::deck::Deck;
use crate::types::id::Id;
use crate::types::prefs::ReviewPrefs;
use crate::types::timestamp::Timestamp;

/// The key of the deck collection document.
pub const DECKS_KEY: &str = "flashdeck.decks";

/// The key of the review preferences document.
pub const REVIEW_PREFS_KEY: &str = "flashdeck.review-prefs";

/// Review preferences by deck id.
pub type PrefsMap = BTreeMap<Id, ReviewPrefs>;

/// Reads and writes decks and review preferences as whole documents.
///
/// Loading is best-effort: a missing or unreadable document loads as an
/// empty collection.
pub struct DeckStore<S: Storage> {
    storage: S,
}

impl<S: Storage> DeckStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Load every deck. Unparsable timestamps are repaired as on import, and
    /// a deck that still can't be read is skipped without losing the rest.
    pub fn load_decks(&self) -> Vec<Deck> {
        let values = match self.load_document(DECKS_KEY) {
            Some(Value::Array(values)) => values,
            Some(_) => {
                log::warn!("Storage document {DECKS_KEY} is not a list, treating it as empty.");
                return Vec::new();
            }
            None => return Vec::new(),
        };
        let now = Timestamp::now();
        let mut decks = Vec::with_capacity(values.len());
        for (index, mut value) in values.into_iter().enumerate() {
            if let Some(deck) = value.as_object_mut() {
                repair_timestamps(deck, now);
            }
            match serde_json::from_value(value) {
                Ok(deck) => decks.push(deck),
                Err(e) => log::warn!("Skipping malformed deck {index} in {DECKS_KEY}: {e}"),
            }
        }
        decks
    }

    pub fn save_decks(&mut self, decks: &[Deck]) -> Fallible<()> {
        log::debug!("Saving {} decks.", decks.len());
        self.save_document(DECKS_KEY, decks)
    }

    pub fn load_all_review_prefs(&self) -> PrefsMap {
        self.load_document(REVIEW_PREFS_KEY).unwrap_or_default()
    }

    pub fn save_all_review_prefs(&mut self, prefs: &PrefsMap) -> Fallible<()> {
        self.save_document(REVIEW_PREFS_KEY, prefs)
    }

    pub fn load_review_prefs(&self, deck_id: &Id) -> Option<ReviewPrefs> {
        self.load_all_review_prefs().get(deck_id).copied()
    }

    /// Store one deck's preferences, keeping those of other decks.
    pub fn save_review_prefs(&mut self, deck_id: &Id, prefs: ReviewPrefs) -> Fallible<()> {
        let mut all = self.load_all_review_prefs();
        all.insert(deck_id.clone(), prefs);
        self.save_all_review_prefs(&all)
    }

    pub fn remove_review_prefs(&mut self, deck_id: &Id) -> Fallible<()> {
        let mut all = self.load_all_review_prefs();
        if all.remove(deck_id).is_none() {
            return Ok(());
        }
        if all.is_empty() {
            self.storage.remove(REVIEW_PREFS_KEY)
        } else {
            self.save_all_review_prefs(&all)
        }
    }

    fn load_document<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.storage.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Could not read document {key}: {e}");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Malformed storage document {key}, treating it as empty: {e}");
                None
            }
        }
    }

    fn save_document<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Fallible<()> {
        let bytes = serde_json::to_vec(value)?;
        self.storage.set(key, &bytes)
    }
}

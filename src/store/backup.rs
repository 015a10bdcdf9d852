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

//! Whole-state backups: the `AppState` document.

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::error::Fallible;
use crate::store::DeckStore;
use crate::store::PrefsMap;
use crate::store::storage::Storage;
use crate::types::deck::Deck;
use crate::types::id::Id;
use crate::types::prefs::ReviewPrefs;
use crate::types::timestamp::Timestamp;

pub const BACKUP_VERSION: u64 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AppState<'a> {
    version: u64,
    exported_at: Timestamp,
    decks: &'a [Deck],
    review_prefs: &'a PrefsMap,
}

/// Why a backup was rejected. A rejected import leaves the store untouched.
#[derive(Debug, PartialEq)]
pub enum BackupError {
    InvalidJson(String),
    UnsupportedVersion(String),
    MissingDecks,
    InvalidDeck { index: usize, reason: String },
    Storage(String),
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            BackupError::InvalidJson(e) => write!(f, "Invalid JSON: {e}"),
            BackupError::UnsupportedVersion(v) => {
                write!(f, "Unsupported backup version: {v} (expected {BACKUP_VERSION})")
            }
            BackupError::MissingDecks => write!(f, "Missing or invalid deck data"),
            BackupError::InvalidDeck { index, reason } => {
                write!(f, "Invalid deck at index {index}: {reason}")
            }
            BackupError::Storage(e) => write!(f, "Failed to save imported data: {e}"),
        }
    }
}

impl std::error::Error for BackupError {}

#[derive(Debug, PartialEq, Eq)]
pub struct ImportSummary {
    pub deck_count: usize,
    pub card_count: usize,
    /// Unparsable timestamps that were replaced.
    pub repaired_timestamps: usize,
}

impl<S: Storage> DeckStore<S> {
    /// Serialize every deck and every deck's preferences as a pretty-printed
    /// backup document.
    pub fn export_state(&self, now: Timestamp) -> Fallible<String> {
        let decks = self.load_decks();
        let review_prefs = self.load_all_review_prefs();
        let state = AppState {
            version: BACKUP_VERSION,
            exported_at: now,
            decks: &decks,
            review_prefs: &review_prefs,
        };
        Ok(serde_json::to_string_pretty(&state)?)
    }

    /// Replace all decks with those in the backup, and merge its review
    /// preferences over the stored ones.
    pub fn import_state(
        &mut self,
        text: &str,
        now: Timestamp,
    ) -> Result<ImportSummary, BackupError> {
        let backup = parse_backup(text, now)?;
        let mut prefs = self.load_all_review_prefs();
        prefs.extend(backup.review_prefs);
        self.save_decks(&backup.decks)
            .map_err(|e| BackupError::Storage(e.message().to_string()))?;
        self.save_all_review_prefs(&prefs)
            .map_err(|e| BackupError::Storage(e.message().to_string()))?;
        let summary = ImportSummary {
            deck_count: backup.decks.len(),
            card_count: backup.decks.iter().map(|d| d.cards().len()).sum(),
            repaired_timestamps: backup.repaired_timestamps,
        };
        log::debug!(
            "Imported {} decks with {} cards.",
            summary.deck_count,
            summary.card_count
        );
        Ok(summary)
    }
}

struct ParsedBackup {
    decks: Vec<Deck>,
    review_prefs: PrefsMap,
    repaired_timestamps: usize,
}

fn parse_backup(text: &str, now: Timestamp) -> Result<ParsedBackup, BackupError> {
    let mut root: Value =
        serde_json::from_str(text).map_err(|e| BackupError::InvalidJson(e.to_string()))?;
    match root.get("version") {
        // Accepts `1` and `1.0`.
        Some(v) if v.as_f64() == Some(BACKUP_VERSION as f64) => {}
        Some(v) => return Err(BackupError::UnsupportedVersion(v.to_string())),
        None => return Err(BackupError::UnsupportedVersion("missing".to_string())),
    }
    let review_prefs = parse_review_prefs(root.get("reviewPrefs"));
    let Some(deck_values) = root.get_mut("decks").and_then(Value::as_array_mut) else {
        return Err(BackupError::MissingDecks);
    };
    let mut repaired_timestamps = 0;
    let mut decks = Vec::with_capacity(deck_values.len());
    for (index, value) in deck_values.iter_mut().enumerate() {
        let deck = value.as_object_mut().ok_or_else(|| BackupError::InvalidDeck {
            index,
            reason: "not an object".to_string(),
        })?;
        check_deck_shape(deck).map_err(|reason| BackupError::InvalidDeck {
            index,
            reason: reason.to_string(),
        })?;
        repaired_timestamps += repair_timestamps(deck, now);
        let deck: Deck = serde_json::from_value(value.take()).map_err(|e| {
            BackupError::InvalidDeck {
                index,
                reason: e.to_string(),
            }
        })?;
        decks.push(deck);
    }
    Ok(ParsedBackup {
        decks,
        review_prefs,
        repaired_timestamps,
    })
}

fn check_deck_shape(deck: &Map<String, Value>) -> Result<(), &'static str> {
    if !deck.get("id").is_some_and(Value::is_string) {
        return Err("id must be a string");
    }
    if !deck.get("name").is_some_and(Value::is_string) {
        return Err("name must be a string");
    }
    if !deck.get("cards").is_some_and(Value::is_array) {
        return Err("cards must be a list");
    }
    Ok(())
}

fn is_timestamp(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| Timestamp::parse(s).is_ok())
}

/// Replace unparsable timestamps in a deck: creation and due dates become
/// `now`, last review dates are dropped. Returns the number of repairs.
pub(super) fn repair_timestamps(deck: &mut Map<String, Value>, now: Timestamp) -> usize {
    let mut repairs = 0;
    let now_value = Value::String(now.to_rfc3339());
    if !is_timestamp(deck.get("createdAt")) {
        log::warn!("Repairing invalid creation date of deck {:?}.", deck.get("id"));
        deck.insert("createdAt".to_string(), now_value.clone());
        repairs += 1;
    }
    let cards = deck
        .get_mut("cards")
        .and_then(Value::as_array_mut)
        .into_iter()
        .flatten();
    for card in cards {
        let Some(memory) = card.get_mut("fsrs").and_then(Value::as_object_mut) else {
            // Left for deserialization to reject.
            continue;
        };
        if !is_timestamp(memory.get("due")) {
            log::warn!("Repairing invalid due date {:?}.", memory.get("due"));
            memory.insert("due".to_string(), now_value.clone());
            repairs += 1;
        }
        let last_review = memory.get("last_review");
        if last_review.is_some_and(|v| !v.is_null()) && !is_timestamp(last_review) {
            log::warn!("Dropping invalid last review date {last_review:?}.");
            memory.remove("last_review");
            repairs += 1;
        }
    }
    repairs
}

/// Well-formed preference entries; malformed ones are skipped.
fn parse_review_prefs(value: Option<&Value>) -> PrefsMap {
    let mut prefs = PrefsMap::new();
    let Some(entries) = value.and_then(Value::as_object) else {
        return prefs;
    };
    for (deck_id, entry) in entries {
        match serde_json::from_value::<ReviewPrefs>(entry.clone()) {
            Ok(p) if p.review_count > 0 => {
                prefs.insert(Id::from(deck_id.as_str()), p);
            }
            _ => log::warn!("Skipping invalid review preferences for deck {deck_id}."),
        }
    }
    prefs
}

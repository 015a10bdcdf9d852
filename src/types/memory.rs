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

use crate::fsrs::Difficulty;
use crate::fsrs::Grade;
use crate::fsrs::Stability;
use crate::fsrs::T;
use crate::fsrs::initial_difficulty;
use crate::fsrs::initial_stability;
use crate::types::state::CardState;
use crate::types::timestamp::Timestamp;

/// The scheduling state of a single card.
///
/// Values are never edited in place: the scheduler takes a snapshot and
/// returns a new `MemoryState`.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct MemoryState {
    /// When the card next becomes eligible for review.
    pub due: Timestamp,
    /// The card's stability (an FSRS parameter).
    pub stability: Stability,
    /// The card's difficulty (an FSRS parameter).
    pub difficulty: Difficulty,
    /// Whole days between the two most recent reviews.
    pub elapsed_days: T,
    /// The interval in days chosen by the last review, or zero if the card
    /// was scheduled by a learning step.
    pub scheduled_days: T,
    /// Index of the current (re)learning step.
    #[serde(default)]
    pub learning_steps: usize,
    /// The number of times the card has been reviewed.
    pub reps: u32,
    /// The number of times the card was forgotten while in review.
    pub lapses: u32,
    pub state: CardState,
    /// When the card was last reviewed, absent for new cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_review: Option<Timestamp>,
}

/// The memory state of a card that has never been reviewed. It is due
/// immediately.
pub fn new_card(now: Timestamp) -> MemoryState {
    MemoryState {
        due: now,
        stability: initial_stability(Grade::Good),
        difficulty: initial_difficulty(Grade::Good),
        elapsed_days: 0.0,
        scheduled_days: 0.0,
        learning_steps: 0,
        reps: 0,
        lapses: 0,
        state: CardState::New,
        last_review: None,
    }
}

impl MemoryState {
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.due <= now
    }
}

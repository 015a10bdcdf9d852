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

use crate::types::id::Id;
use crate::types::memory::MemoryState;
use crate::types::memory::new_card;
use crate::types::timestamp::Timestamp;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct FlashCard {
    id: Id,
    front: String,
    back: String,
    #[serde(rename = "fsrs")]
    memory: MemoryState,
}

impl FlashCard {
    pub fn new(front: impl Into<String>, back: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id: Id::generate(),
            front: front.into(),
            back: back.into(),
            memory: new_card(now),
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn front(&self) -> &str {
        &self.front
    }

    pub fn back(&self) -> &str {
        &self.back
    }

    pub fn memory(&self) -> &MemoryState {
        &self.memory
    }

    pub fn set_front(&mut self, front: impl Into<String>) {
        self.front = front.into();
    }

    pub fn set_back(&mut self, back: impl Into<String>) {
        self.back = back.into();
    }

    /// The same card with its memory state replaced.
    pub fn with_memory(&self, memory: MemoryState) -> Self {
        Self {
            id: self.id.clone(),
            front: self.front.clone(),
            back: self.back.clone(),
            memory,
        }
    }
}

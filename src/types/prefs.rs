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

/// Per-deck session settings.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPrefs {
    /// How many cards a session presents at most.
    pub review_count: usize,
    /// How many never-seen cards a session may introduce.
    pub new_card_limit: usize,
}

impl ReviewPrefs {
    pub fn new(review_count: usize, new_card_limit: usize) -> Fallible<Self> {
        if review_count == 0 {
            return fail("review count must be positive.");
        }
        Ok(Self {
            review_count,
            new_card_limit,
        })
    }
}

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

use crate::error::ErrorReport;
use crate::error::fail;

/// Where a card is in the scheduling state machine. Serialized as the
/// integers 0 to 3.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CardState {
    New,
    Learning,
    Review,
    Relearning,
}

impl CardState {
    pub fn as_str(&self) -> &str {
        match self {
            CardState::New => "new",
            CardState::Learning => "learning",
            CardState::Review => "review",
            CardState::Relearning => "relearning",
        }
    }
}

impl From<CardState> for u8 {
    fn from(value: CardState) -> Self {
        match value {
            CardState::New => 0,
            CardState::Learning => 1,
            CardState::Review => 2,
            CardState::Relearning => 3,
        }
    }
}

impl TryFrom<u8> for CardState {
    type Error = ErrorReport;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CardState::New),
            1 => Ok(CardState::Learning),
            2 => Ok(CardState::Review),
            3 => Ok(CardState::Relearning),
            _ => fail(format!("Invalid card state: {}", value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_serialize_as_integer() -> Fallible<()> {
        assert_eq!(serde_json::to_string(&CardState::Review)?, "2");
        let state: CardState = serde_json::from_str("3")?;
        assert_eq!(state, CardState::Relearning);
        Ok(())
    }

    #[test]
    fn test_reject_unknown_state() {
        let result: Result<CardState, _> = serde_json::from_str("7");
        assert!(result.is_err());
    }
}

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

//! The optional `config.toml` file in the collection directory.

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::queue::NewCardPolicy;
use crate::scheduler::MAX_INTERVAL;
use crate::scheduler::Parameters;
use crate::scheduler::Step;
use crate::types::prefs::ReviewPrefs;

pub const CONFIG_FILE: &str = "config.toml";

/// Review preferences for decks that have none stored.
pub const DEFAULT_REVIEW_COUNT: usize = 20;
pub const DEFAULT_NEW_CARD_LIMIT: usize = 10;

#[derive(Default, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    scheduler: SchedulerSection,
    #[serde(default)]
    review: ReviewSection,
}

#[derive(Default, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct SchedulerSection {
    desired_retention: Option<f64>,
    maximum_interval: Option<u32>,
    learning_steps: Option<Vec<Step>>,
    relearning_steps: Option<Vec<Step>>,
}

#[derive(Default, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct ReviewSection {
    review_count: Option<usize>,
    new_card_limit: Option<usize>,
    cap_new_cards: Option<bool>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    parameters: Parameters,
    default_prefs: ReviewPrefs,
    /// When false, new cards compete with reviews on due date alone and
    /// the new card limit is ignored.
    cap_new_cards: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parameters: Parameters::default(),
            default_prefs: ReviewPrefs {
                review_count: DEFAULT_REVIEW_COUNT,
                new_card_limit: DEFAULT_NEW_CARD_LIMIT,
            },
            cap_new_cards: true,
        }
    }
}

impl Config {
    /// Load `config.toml` from the directory. A missing file yields the
    /// defaults.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No configuration file, using defaults.");
            return Ok(Self::default());
        }
        let content = read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Fallible<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        let defaults = Self::default();

        let scheduler = file.scheduler;
        let parameters = Parameters {
            desired_retention: scheduler
                .desired_retention
                .unwrap_or(defaults.parameters.desired_retention),
            maximum_interval: scheduler
                .maximum_interval
                .unwrap_or(defaults.parameters.maximum_interval),
            learning_steps: scheduler
                .learning_steps
                .unwrap_or(defaults.parameters.learning_steps),
            relearning_steps: scheduler
                .relearning_steps
                .unwrap_or(defaults.parameters.relearning_steps),
        };
        if !(parameters.desired_retention > 0.0 && parameters.desired_retention < 1.0) {
            return fail(format!(
                "invalid configuration: desired_retention must be between 0 and 1, got {}.",
                parameters.desired_retention
            ));
        }
        if parameters.maximum_interval == 0 || parameters.maximum_interval > MAX_INTERVAL {
            return fail(format!(
                "invalid configuration: maximum_interval must be between 1 and {MAX_INTERVAL} days."
            ));
        }

        let review = file.review;
        let default_prefs = ReviewPrefs::new(
            review
                .review_count
                .unwrap_or(defaults.default_prefs.review_count),
            review
                .new_card_limit
                .unwrap_or(defaults.default_prefs.new_card_limit),
        )?;

        Ok(Self {
            parameters,
            default_prefs,
            cap_new_cards: review.cap_new_cards.unwrap_or(defaults.cap_new_cards),
        })
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn default_prefs(&self) -> ReviewPrefs {
        self.default_prefs
    }

    pub fn new_card_policy(&self, prefs: &ReviewPrefs) -> NewCardPolicy {
        if self.cap_new_cards {
            NewCardPolicy::from_prefs(prefs)
        } else {
            NewCardPolicy::Unlimited
        }
    }
}

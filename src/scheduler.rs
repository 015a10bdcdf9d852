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

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use chrono::Duration;
use serde::Deserialize;
use serde::Deserializer;

use crate::error::ErrorReport;
use crate::error::fail;
use crate::fsrs::Difficulty;
use crate::fsrs::Grade;
use crate::fsrs::Stability;
use crate::fsrs::T;
use crate::fsrs::initial_difficulty;
use crate::fsrs::initial_stability;
use crate::fsrs::interval;
use crate::fsrs::new_difficulty;
use crate::fsrs::new_stability;
use crate::fsrs::retrievability;
use crate::fsrs::short_term_stability;
use crate::types::card::FlashCard;
use crate::types::memory::MemoryState;
use crate::types::state::CardState;
use crate::types::timestamp::Timestamp;

/// The desired recall probability.
pub const TARGET_RECALL: f64 = 0.9;

/// The maximum review interval in days.
pub const MAX_INTERVAL: u32 = 36500;

/// A short delay used while a card is being (re)learned.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Step {
    minutes: u32,
}

impl Step {
    pub fn minutes(minutes: u32) -> Self {
        Self { minutes }
    }

    fn duration(self) -> Duration {
        Duration::minutes(self.minutes as i64)
    }
}

impl FromStr for Step {
    type Err = ErrorReport;

    /// Parses `<n>m`, `<n>h` or `<n>d`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (number, scale) = if let Some(number) = s.strip_suffix('m') {
            (number, 1)
        } else if let Some(number) = s.strip_suffix('h') {
            (number, 60)
        } else if let Some(number) = s.strip_suffix('d') {
            (number, 60 * 24)
        } else {
            return fail(format!("invalid step {s:?}: expected a unit of m, h or d."));
        };
        let n = match number.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => return fail(format!("invalid step {s:?}: expected a positive number.")),
        };
        match n.checked_mul(scale) {
            Some(minutes) => Ok(Step::minutes(minutes)),
            None => fail(format!("invalid step {s:?}: too long.")),
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let m = self.minutes;
        if m % (60 * 24) == 0 {
            write!(f, "{}d", m / (60 * 24))
        } else if m % 60 == 0 {
            write!(f, "{}h", m / 60)
        } else {
            write!(f, "{m}m")
        }
    }
}

impl<'de> Deserialize<'de> for Step {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let string = String::deserialize(deserializer)?;
        Step::from_str(&string).map_err(|e| serde::de::Error::custom(e.message().to_string()))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    pub desired_retention: f64,
    /// In days.
    pub maximum_interval: u32,
    pub learning_steps: Vec<Step>,
    pub relearning_steps: Vec<Step>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            desired_retention: TARGET_RECALL,
            maximum_interval: MAX_INTERVAL,
            learning_steps: vec![Step::minutes(1), Step::minutes(10)],
            relearning_steps: vec![Step::minutes(10)],
        }
    }
}

/// Compute a card's memory state after a review. The input is left
/// untouched.
pub fn review(
    memory: &MemoryState,
    grade: Grade,
    now: Timestamp,
    params: &Parameters,
) -> MemoryState {
    let elapsed_days: T = memory
        .last_review
        .map(|last| now.days_since(last))
        .unwrap_or(0) as T;
    let (stability, difficulty) = next_parameters(memory, grade, elapsed_days);
    let next = MemoryState {
        stability,
        difficulty,
        elapsed_days,
        reps: memory.reps + 1,
        last_review: Some(now),
        ..memory.clone()
    };
    match memory.state {
        CardState::New | CardState::Learning | CardState::Relearning => {
            step_outcome(memory, next, grade, now, params)
        }
        CardState::Review => review_outcome(memory, next, grade, now, params),
    }
}

/// Apply a review to a card, returning the updated copy.
pub fn review_card(
    card: &FlashCard,
    grade: Grade,
    now: Timestamp,
    params: &Parameters,
) -> FlashCard {
    card.with_memory(review(card.memory(), grade, now, params))
}

/// A short label for when the card is next due: `Now`, or the remaining
/// time floored to whole minutes (`15m`), hours (`2h`) or days (`3d`).
pub fn next_review_label(card: &FlashCard, now: Timestamp) -> String {
    let remaining = card.memory().due.since(now).num_milliseconds();
    if remaining <= 0 {
        return "Now".to_string();
    }
    let minutes = remaining / 60_000;
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h");
    }
    format!("{}d", hours / 24)
}

fn next_parameters(
    memory: &MemoryState,
    grade: Grade,
    elapsed_days: T,
) -> (Stability, Difficulty) {
    match memory.state {
        CardState::New => (initial_stability(grade), initial_difficulty(grade)),
        CardState::Learning | CardState::Review | CardState::Relearning => {
            let d = memory.difficulty.clamp(1.0, 10.0);
            let s = memory.stability;
            let stability = if elapsed_days < 1.0 {
                short_term_stability(s, grade)
            } else {
                let r = retrievability(elapsed_days, s);
                new_stability(d, s, r, grade)
            };
            (stability, new_difficulty(d, grade))
        }
    }
}

enum StepOutcome {
    /// Stay in (re)learning at the given step, due after the delay.
    Stay { step: usize, delay: Duration },
    Graduate,
}

fn next_step(steps: &[Step], current: usize, grade: Grade) -> StepOutcome {
    if steps.is_empty() {
        return StepOutcome::Graduate;
    }
    let current = current.min(steps.len() - 1);
    match grade {
        Grade::Again => StepOutcome::Stay {
            step: 0,
            delay: steps[0].duration(),
        },
        Grade::Hard => {
            let minutes = if current == 0 && steps.len() == 1 {
                (steps[0].minutes as f64 * 1.5).round()
            } else if current == 0 {
                ((steps[0].minutes + steps[1].minutes) as f64 / 2.0).round()
            } else {
                steps[current].minutes as f64
            };
            StepOutcome::Stay {
                step: current,
                delay: Duration::minutes(minutes as i64),
            }
        }
        Grade::Good => {
            if current + 1 < steps.len() {
                StepOutcome::Stay {
                    step: current + 1,
                    delay: steps[current + 1].duration(),
                }
            } else {
                StepOutcome::Graduate
            }
        }
        Grade::Easy => StepOutcome::Graduate,
    }
}

/// Move a card through its (re)learning steps. A step never lasts longer
/// than the interval an Easy grade would give.
fn step_outcome(
    memory: &MemoryState,
    next: MemoryState,
    grade: Grade,
    now: Timestamp,
    params: &Parameters,
) -> MemoryState {
    let (state, steps, current) = match memory.state {
        CardState::New => (CardState::Learning, &params.learning_steps, 0),
        CardState::Relearning => (
            CardState::Relearning,
            &params.relearning_steps,
            memory.learning_steps,
        ),
        CardState::Learning | CardState::Review => (
            CardState::Learning,
            &params.learning_steps,
            memory.learning_steps,
        ),
    };
    match next_step(steps, current, grade) {
        StepOutcome::Stay { step, delay } => {
            let easy = next_parameters(memory, Grade::Easy, next.elapsed_days).0;
            let easy_days = interval_days(easy, params);
            MemoryState {
                due: now.plus(delay.min(Duration::days(easy_days))),
                scheduled_days: 0.0,
                learning_steps: step,
                state,
                ..next
            }
        }
        StepOutcome::Graduate => {
            let days = interval_days(next.stability, params);
            graduate(next, now, days)
        }
    }
}

fn review_outcome(
    memory: &MemoryState,
    next: MemoryState,
    grade: Grade,
    now: Timestamp,
    params: &Parameters,
) -> MemoryState {
    let intervals = ReviewIntervals::new(memory, next.elapsed_days, params);
    match grade {
        Grade::Again => {
            let lapsed = MemoryState {
                lapses: memory.lapses + 1,
                ..next
            };
            match params.relearning_steps.first() {
                Some(step) => MemoryState {
                    due: now.plus(step.duration().min(Duration::days(intervals.easy))),
                    scheduled_days: 0.0,
                    learning_steps: 0,
                    state: CardState::Relearning,
                    ..lapsed
                },
                None => {
                    let days = interval_days(lapsed.stability, params).min(intervals.hard);
                    graduate(lapsed, now, days)
                }
            }
        }
        Grade::Hard => graduate(next, now, intervals.hard),
        Grade::Good => graduate(next, now, intervals.good),
        Grade::Easy => graduate(next, now, intervals.easy),
    }
}

fn graduate(next: MemoryState, now: Timestamp, days: i64) -> MemoryState {
    MemoryState {
        due: now.plus_days(days),
        scheduled_days: days as T,
        learning_steps: 0,
        state: CardState::Review,
        ..next
    }
}

/// The intervals for a successful review, forced into the order
/// hard <= good < easy.
struct ReviewIntervals {
    hard: i64,
    good: i64,
    easy: i64,
}

impl ReviewIntervals {
    fn new(memory: &MemoryState, elapsed_days: T, params: &Parameters) -> Self {
        let days = |grade| interval_days(next_parameters(memory, grade, elapsed_days).0, params);
        let max = params.maximum_interval as i64;
        let good = days(Grade::Good);
        let hard = days(Grade::Hard).min(good);
        let good = good.max(hard + 1);
        let easy = days(Grade::Easy).max(good + 1);
        Self {
            hard: hard.min(max),
            good: good.min(max),
            easy: easy.min(max),
        }
    }
}

fn interval_days(stability: Stability, params: &Parameters) -> i64 {
    interval(params.desired_retention, stability)
        .round()
        .clamp(1.0, params.maximum_interval.max(1) as f64) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;
    use crate::types::memory::new_card;

    fn start() -> Timestamp {
        Timestamp::parse("2025-06-01T09:00:00.000Z").unwrap()
    }

    /// A memory state in the given state, along with a time at which it is
    /// due.
    fn memory_in(state: CardState) -> (MemoryState, Timestamp) {
        let params = Parameters::default();
        let now = start();
        let new = new_card(now);
        match state {
            CardState::New => (new, now),
            CardState::Learning => {
                let m = review(&new, Grade::Again, now, &params);
                let due = m.due;
                (m, due)
            }
            CardState::Review => {
                let m = review(&new, Grade::Easy, now, &params);
                let due = m.due;
                (m, due)
            }
            CardState::Relearning => {
                let m = review(&new, Grade::Easy, now, &params);
                let m = review(&m, Grade::Again, m.due, &params);
                let due = m.due;
                (m, due)
            }
        }
    }

    const STATES: [CardState; 4] = [
        CardState::New,
        CardState::Learning,
        CardState::Review,
        CardState::Relearning,
    ];

    #[test]
    fn test_reps_increase_by_one() {
        let params = Parameters::default();
        for state in STATES {
            let (memory, now) = memory_in(state);
            for grade in Grade::ALL {
                let next = review(&memory, grade, now, &params);
                assert_eq!(next.reps, memory.reps + 1);
                assert_eq!(next.last_review, Some(now));
            }
        }
    }

    #[test]
    fn test_lapses_only_on_again_in_review() {
        let params = Parameters::default();
        for state in STATES {
            let (memory, now) = memory_in(state);
            for grade in Grade::ALL {
                let next = review(&memory, grade, now, &params);
                if state == CardState::Review && grade == Grade::Again {
                    assert_eq!(next.lapses, memory.lapses + 1);
                } else {
                    assert_eq!(next.lapses, memory.lapses);
                }
            }
        }
    }

    #[test]
    fn test_again_never_later_than_easy() {
        let params = Parameters::default();
        for state in STATES {
            let (memory, now) = memory_in(state);
            for offset in [0, 1, 3, 30] {
                let now = now.plus_days(offset);
                let again = review(&memory, Grade::Again, now, &params);
                let easy = review(&memory, Grade::Easy, now, &params);
                assert!(again.due <= easy.due, "state {state:?}, offset {offset}");
            }
        }
    }

    #[test]
    fn test_long_steps_never_outlast_easy() {
        let params = Parameters {
            learning_steps: vec![Step::minutes(3 * 1440)],
            relearning_steps: vec![Step::minutes(5 * 1440)],
            ..Parameters::default()
        };
        let now = start();
        let new = new_card(now);
        let learning = review(&new, Grade::Again, now, &params);
        let graduated = review(&new, Grade::Easy, now, &params);
        let relearning = review(&graduated, Grade::Again, graduated.due, &params);
        assert_eq!(learning.state, CardState::Learning);
        assert_eq!(relearning.state, CardState::Relearning);
        for memory in [&new, &learning, &graduated, &relearning] {
            for offset in [0, 1, 3] {
                let now = now.plus_days(offset);
                let again = review(memory, Grade::Again, now, &params);
                let easy = review(memory, Grade::Easy, now, &params);
                assert!(
                    again.due <= easy.due,
                    "state {:?}, offset {offset}",
                    memory.state
                );
            }
        }
    }

    #[test]
    fn test_reproducible() {
        let params = Parameters::default();
        for state in STATES {
            let (memory, now) = memory_in(state);
            for grade in Grade::ALL {
                assert_eq!(
                    review(&memory, grade, now, &params),
                    review(&memory, grade, now, &params)
                );
            }
        }
    }

    #[test]
    fn test_input_not_mutated() {
        let params = Parameters::default();
        let (memory, now) = memory_in(CardState::Review);
        let snapshot = memory.clone();
        let _ = review(&memory, Grade::Again, now, &params);
        assert_eq!(memory, snapshot);
    }

    #[test]
    fn test_new_card_transitions() {
        let params = Parameters::default();
        let now = start();
        let new = new_card(now);

        let again = review(&new, Grade::Again, now, &params);
        assert_eq!(again.state, CardState::Learning);
        assert_eq!(again.due, now.plus(Duration::minutes(1)));

        let hard = review(&new, Grade::Hard, now, &params);
        assert_eq!(hard.state, CardState::Learning);
        assert_eq!(hard.due, now.plus(Duration::minutes(6)));

        let good = review(&new, Grade::Good, now, &params);
        assert_eq!(good.state, CardState::Learning);
        assert_eq!(good.learning_steps, 1);
        assert_eq!(good.due, now.plus(Duration::minutes(10)));

        let easy = review(&new, Grade::Easy, now, &params);
        assert_eq!(easy.state, CardState::Review);
        assert!(easy.scheduled_days >= 1.0);
        assert_eq!(easy.due, now.plus_days(easy.scheduled_days as i64));
    }

    #[test]
    fn test_learning_graduates_after_last_step() {
        let params = Parameters::default();
        let now = start();
        let first = review(&new_card(now), Grade::Good, now, &params);
        assert_eq!(first.state, CardState::Learning);
        let second = review(&first, Grade::Good, first.due, &params);
        assert_eq!(second.state, CardState::Review);
        assert!(second.due >= first.due.plus_days(1));
    }

    #[test]
    fn test_learning_again_resets_step() {
        let params = Parameters::default();
        let now = start();
        let first = review(&new_card(now), Grade::Good, now, &params);
        let again = review(&first, Grade::Again, first.due, &params);
        assert_eq!(again.state, CardState::Learning);
        assert_eq!(again.learning_steps, 0);
        assert_eq!(again.due, first.due.plus(Duration::minutes(1)));
    }

    #[test]
    fn test_review_again_relearns() {
        let params = Parameters::default();
        let (memory, now) = memory_in(CardState::Review);
        let next = review(&memory, Grade::Again, now, &params);
        assert_eq!(next.state, CardState::Relearning);
        assert_eq!(next.lapses, 1);
        assert_eq!(next.due, now.plus(Duration::minutes(10)));
        assert!(next.stability < memory.stability);
        assert_eq!(next.scheduled_days, 0.0);
    }

    #[test]
    fn test_relearning_graduates_on_good() {
        let params = Parameters::default();
        let (memory, now) = memory_in(CardState::Relearning);
        let hard = review(&memory, Grade::Hard, now, &params);
        assert_eq!(hard.state, CardState::Relearning);
        assert_eq!(hard.due, now.plus(Duration::minutes(15)));
        let good = review(&memory, Grade::Good, now, &params);
        assert_eq!(good.state, CardState::Review);
    }

    #[test]
    fn test_review_intervals_ordered() {
        let params = Parameters::default();
        let (memory, now) = memory_in(CardState::Review);
        let hard = review(&memory, Grade::Hard, now, &params);
        let good = review(&memory, Grade::Good, now, &params);
        let easy = review(&memory, Grade::Easy, now, &params);
        assert!(hard.scheduled_days <= good.scheduled_days);
        assert!(good.scheduled_days < easy.scheduled_days);
        assert!(hard.stability < good.stability);
        assert!(good.stability < easy.stability);
        for m in [hard, good, easy] {
            assert_eq!(m.state, CardState::Review);
        }
    }

    #[test]
    fn test_no_relearning_steps() {
        let params = Parameters {
            relearning_steps: Vec::new(),
            ..Parameters::default()
        };
        let (memory, now) = memory_in(CardState::Review);
        let again = review(&memory, Grade::Again, now, &params);
        let easy = review(&memory, Grade::Easy, now, &params);
        assert_eq!(again.state, CardState::Review);
        assert_eq!(again.lapses, 1);
        assert!(again.due <= easy.due);
    }

    #[test]
    fn test_maximum_interval() {
        let params = Parameters {
            maximum_interval: 5,
            ..Parameters::default()
        };
        let next = review(&new_card(start()), Grade::Easy, start(), &params);
        assert_eq!(next.scheduled_days, 5.0);
    }

    #[test]
    fn test_review_card_keeps_identity() {
        let params = Parameters::default();
        let now = start();
        let card = FlashCard::new("Q", "A", now);
        let updated = review_card(&card, Grade::Good, now, &params);
        assert_eq!(updated.id(), card.id());
        assert_eq!(updated.front(), "Q");
        assert_eq!(updated.back(), "A");
        assert_eq!(updated.memory().reps, 1);
        assert_eq!(card.memory().reps, 0);
    }

    #[test]
    fn test_next_review_label() {
        let now = start();
        let card = FlashCard::new("Q", "A", now);
        assert_eq!(next_review_label(&card, now), "Now");

        let due_in = |duration: Duration| {
            let mut memory = card.memory().clone();
            memory.due = now.plus(duration);
            next_review_label(&card.with_memory(memory), now)
        };
        assert_eq!(due_in(Duration::minutes(120)), "2h");
        assert_eq!(due_in(Duration::days(3)), "3d");
        assert_eq!(due_in(Duration::minutes(15)), "15m");
        assert_eq!(due_in(Duration::minutes(59)), "59m");
        assert_eq!(due_in(Duration::hours(23) + Duration::minutes(59)), "23h");
        assert_eq!(due_in(Duration::minutes(-5)), "Now");
    }

    #[test]
    fn test_parse_step() -> Fallible<()> {
        assert_eq!("1m".parse::<Step>()?, Step::minutes(1));
        assert_eq!("2h".parse::<Step>()?, Step::minutes(120));
        assert_eq!("1d".parse::<Step>()?, Step::minutes(1440));
        assert!("0m".parse::<Step>().is_err());
        assert!("10".parse::<Step>().is_err());
        assert!("".parse::<Step>().is_err());
        assert!("3000000d".parse::<Step>().is_err());
        assert_eq!("2982616d".parse::<Step>()?, Step::minutes(2982616 * 1440));
        assert_eq!(Step::minutes(90).to_string(), "90m");
        assert_eq!(Step::minutes(120).to_string(), "2h");
        Ok(())
    }
}

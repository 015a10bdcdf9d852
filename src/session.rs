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

use crate::fsrs::Grade;
use crate::scheduler::Parameters;
use crate::scheduler::review_card;
use crate::types::card::FlashCard;
use crate::types::id::Id;
use crate::types::timestamp::Timestamp;

/// A graded card, with the card as it was before the review.
#[derive(Clone, Debug)]
pub struct Review {
    pub before: FlashCard,
    pub grade: Grade,
}

/// One pass over a batch of due cards. Each card is graded exactly once,
/// in order.
pub struct Session {
    deck_id: Id,
    cards: Vec<FlashCard>,
    reviews: Vec<Review>,
    ended: bool,
}

impl Session {
    pub fn new(deck_id: Id, cards: Vec<FlashCard>) -> Self {
        Self {
            deck_id,
            cards,
            reviews: Vec::new(),
            ended: false,
        }
    }

    pub fn deck_id(&self) -> &Id {
        &self.deck_id
    }

    /// The card awaiting a grade, if any.
    pub fn current(&self) -> Option<&FlashCard> {
        if self.ended {
            None
        } else {
            self.cards.get(self.reviews.len())
        }
    }

    /// Grade the current card. Returns the reviewed copy, which the caller
    /// must persist.
    pub fn grade(
        &mut self,
        grade: Grade,
        now: Timestamp,
        params: &Parameters,
    ) -> Option<FlashCard> {
        let before = self.current()?.clone();
        let after = review_card(&before, grade, now, params);
        log::debug!(
            "{} {} S={:.2}d D={:.2} due={}",
            before.id(),
            grade.as_str(),
            after.memory().stability,
            after.memory().difficulty,
            after.memory().due
        );
        self.reviews.push(Review { before, grade });
        Some(after)
    }

    /// Take back the last grade. Returns the card as it was before that
    /// grade, which the caller must persist again.
    pub fn undo(&mut self) -> Option<FlashCard> {
        let review = self.reviews.pop()?;
        self.ended = false;
        Some(review.before)
    }

    pub fn end(&mut self) {
        self.ended = true;
    }

    pub fn finished(&self) -> bool {
        self.current().is_none()
    }

    /// Graded cards and batch size.
    pub fn progress(&self) -> (usize, usize) {
        (self.reviews.len(), self.cards.len())
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// How many cards received each grade, in grade order.
    pub fn grade_counts(&self) -> [(Grade, usize); 4] {
        Grade::ALL.map(|grade| {
            let count = self.reviews.iter().filter(|r| r.grade == grade).count();
            (grade, count)
        })
    }

    pub fn can_undo(&self) -> bool {
        !self.reviews.is_empty()
    }
}

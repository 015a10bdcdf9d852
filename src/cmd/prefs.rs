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

use crate::collection::Collection;
use crate::error::Fallible;
use crate::types::prefs::ReviewPrefs;

/// Print a deck's review preferences, changing them first if either value
/// is given.
pub fn update_prefs(
    directory: Option<String>,
    deck: &str,
    review_count: Option<usize>,
    new_card_limit: Option<usize>,
) -> Fallible<()> {
    let mut coll: Collection = Collection::new(directory)?;
    let deck_id = coll.find_deck(deck)?.id().clone();
    let current = coll.review_prefs(&deck_id);
    let prefs = if review_count.is_some() || new_card_limit.is_some() {
        let prefs = ReviewPrefs::new(
            review_count.unwrap_or(current.review_count),
            new_card_limit.unwrap_or(current.new_card_limit),
        )?;
        coll.set_review_prefs(&deck_id, prefs)?;
        prefs
    } else {
        current
    };
    println!("review count: {}", prefs.review_count);
    println!("new card limit: {}", prefs.new_card_limit);
    Ok(())
}

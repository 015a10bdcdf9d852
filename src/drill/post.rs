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

use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use serde::Deserialize;

use crate::drill::state::MutableState;
use crate::drill::state::ServerState;
use crate::error::Fallible;
use crate::fsrs::Grade;
use crate::types::timestamp::Timestamp;

#[derive(Debug, Deserialize)]
enum Action {
    Reveal,
    Undo,
    End,
    Again,
    Hard,
    Good,
    Easy,
}

impl Action {
    fn grade(&self) -> Option<Grade> {
        match self {
            Action::Again => Some(Grade::Again),
            Action::Hard => Some(Grade::Hard),
            Action::Good => Some(Grade::Good),
            Action::Easy => Some(Grade::Easy),
            Action::Reveal | Action::Undo | Action::End => None,
        }
    }
}

#[derive(Deserialize)]
pub struct FormData {
    action: Action,
}

pub async fn post_handler(
    State(state): State<ServerState>,
    Form(form): Form<FormData>,
) -> Redirect {
    match action_handler(&state, form.action) {
        Ok(_) => {}
        Err(e) => {
            log::error!("{e}");
        }
    }
    Redirect::to("/")
}

fn action_handler(state: &ServerState, action: Action) -> Fallible<()> {
    let mut mutable = state.mutable.lock().unwrap();
    let MutableState {
        reveal,
        collection,
        session,
    } = &mut *mutable;
    match action {
        Action::Reveal => {
            if session.current().is_some() {
                *reveal = true;
            }
        }
        Action::Undo => {
            if let Some(card) = session.undo() {
                // Write the pre-review snapshot back.
                let deck_id = session.deck_id().clone();
                collection.update_card(&deck_id, card)?;
                *reveal = false;
            }
        }
        Action::End => {
            log::debug!("Session ended early.");
            session.end();
            *reveal = false;
        }
        Action::Again | Action::Hard | Action::Good | Action::Easy => {
            if !*reveal {
                log::error!("Answering a card that is not revealed.");
                return Ok(());
            }
            let Some(grade) = action.grade() else {
                return Ok(());
            };
            if let Some(card) = session.grade(grade, Timestamp::now(), &state.parameters) {
                let deck_id = session.deck_id().clone();
                collection.update_card(&deck_id, card)?;
                *reveal = false;
            }
            if session.finished() {
                log::debug!("Session completed.");
            }
        }
    }
    Ok(())
}

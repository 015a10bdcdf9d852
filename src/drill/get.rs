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

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::PreEscaped;
use maud::html;

use crate::drill::state::ServerState;
use crate::drill::template::page_template;
use crate::fsrs::Grade;
use crate::markdown::markdown_to_html;
use crate::scheduler::next_review_label;
use crate::scheduler::review_card;
use crate::types::timestamp::Timestamp;

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    let mutable = state.mutable.lock().unwrap();
    let undo_disabled = !mutable.session.can_undo();
    let body = match mutable.session.current() {
        None => {
            let reviewed = mutable.session.reviews().len();
            let counts = mutable.session.grade_counts();
            html! {
                div.finished {
                    h1 {
                        "Session Completed"
                    }
                    p {
                        (reviewed) " cards reviewed."
                    }
                    @if reviewed > 0 {
                        ul.grades {
                            @for (grade, count) in counts {
                                li { (grade_action(grade)) ": " (count) }
                            }
                        }
                    }
                    form action="/" method="post" {
                        @if undo_disabled {
                            input id="undo" type="submit" name="action" value="Undo" disabled;
                        } @else {
                            input id="undo" type="submit" name="action" value="Undo";
                        }
                    }
                }
            }
        }
        Some(card) => {
            let (done, total) = mutable.session.progress();
            let progress = format!("{done} / {total}");
            let front = markdown_to_html(card.front());
            let card_content: Markup = if mutable.reveal {
                let back = markdown_to_html(card.back());
                html! {
                    div.content {
                        div .question .rich-text {
                            (PreEscaped(front))
                        }
                        div .answer .rich-text {
                            (PreEscaped(back))
                        }
                    }
                }
            } else {
                html! {
                    div.content {
                        div .question .rich-text {
                            (PreEscaped(front))
                        }
                        div .answer .rich-text {}
                    }
                }
            };
            let card_controls = if mutable.reveal {
                // Preview when each grade would bring the card back.
                let now = Timestamp::now();
                let labels: Vec<(Grade, String)> = Grade::ALL
                    .iter()
                    .map(|&grade| {
                        let reviewed = review_card(card, grade, now, &state.parameters);
                        (grade, next_review_label(&reviewed, now))
                    })
                    .collect();
                html! {
                    form action="/" method="post" {
                        @if undo_disabled {
                            input id="undo" type="submit" name="action" value="Undo" disabled;
                        } @else {
                            input id="undo" type="submit" name="action" value="Undo";
                        }
                        div.spacer {}
                        @for (grade, label) in &labels {
                            button id=(grade.as_str()) type="submit" name="action" value=(grade_action(*grade)) {
                                (grade_action(*grade))
                                span.interval { (label) }
                            }
                        }
                        div.spacer {}
                        input id="end" type="submit" name="action" value="End";
                    }
                }
            } else {
                html! {
                    form action="/" method="post" {
                        @if undo_disabled {
                            input id="undo" type="submit" name="action" value="Undo" disabled;
                        } @else {
                            input id="undo" type="submit" name="action" value="Undo";
                        }
                        div.spacer {}
                        input id="reveal" type="submit" name="action" value="Reveal";
                        div.spacer {}
                        input id="end" type="submit" name="action" value="End";
                    }
                }
            };
            html! {
                div.root {
                    div.card {
                        div.header {
                            h1 {
                                (state.deck_name)
                            }
                            div.progress {
                                (progress)
                            }
                        }
                        (card_content)
                        div.controls {
                            (card_controls)
                        }
                    }
                }
            }
        }
    };
    let html = page_template(body);
    (StatusCode::OK, Html(html.into_string()))
}

/// The form action that submits a grade.
fn grade_action(grade: Grade) -> &'static str {
    match grade {
        Grade::Again => "Again",
        Grade::Hard => "Hard",
        Grade::Good => "Good",
        Grade::Easy => "Easy",
    }
}

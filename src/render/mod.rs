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

//! Rendering of card templates into question and answer HTML.

mod cloze;
mod template;

use std::collections::HashMap;

use anki2roam_core::Card;
use anki2roam_core::Note;

use crate::collection::notetype::DECK_SEPARATOR;
use crate::collection::notetype::Model;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::render::template::Context;
use crate::render::template::render_template;

/// Which side of the card is being rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Question,
    Answer,
}

/// Both sides of a rendered card.
#[derive(Clone, Debug, PartialEq)]
pub struct Rendering {
    pub question: String,
    pub answer: String,
}

/// Anything that can turn a card into HTML.
pub trait CardRenderer {
    fn render(&self, card: &Card, note: &Note, model: &Model, deck_name: &str) -> Fallible<Rendering>;
}

/// Renders the note type's own templates.
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateRenderer;

impl CardRenderer for TemplateRenderer {
    fn render(&self, card: &Card, note: &Note, model: &Model, deck_name: &str) -> Fallible<Rendering> {
        // Cloze note types have one template; the card ordinal picks the deletion.
        let template = if model.is_cloze() {
            model.templates.first()
        } else {
            model.templates.iter().find(|t| t.ord == card.ord)
        };
        let Some(template) = template else {
            return fail(format!(
                "note type '{}' has no template for card {} (ordinal {})",
                model.name, card.id, card.ord
            ));
        };

        let mut fields: HashMap<String, String> = model
            .fields
            .iter()
            .map(|def| {
                let value = note.fields.get(def.ord as usize).cloned().unwrap_or_default();
                (def.name.clone(), value)
            })
            .collect();
        fields.insert("Tags".to_string(), note.tags.join(" "));
        fields.insert("Deck".to_string(), deck_name.to_string());
        let subdeck = deck_name.rsplit(DECK_SEPARATOR).next().unwrap_or(deck_name);
        fields.insert("Subdeck".to_string(), subdeck.to_string());
        fields.insert("Type".to_string(), model.name.clone());
        fields.insert("Card".to_string(), template.name.clone());

        let malformed = |err: ErrorReport| {
            ErrorReport::new(format!(
                "malformed template '{}' of note type '{}': {}",
                template.name, model.name, err.message()
            ))
        };
        let cloze_ord = card.ord + 1;
        let question = render_template(
            &template.qfmt,
            &Context {
                fields: &fields,
                cloze_ord,
                side: Side::Question,
            },
        )
        .map_err(malformed)?;
        fields.insert("FrontSide".to_string(), question.clone());
        let answer = render_template(
            &template.afmt,
            &Context {
                fields: &fields,
                cloze_ord,
                side: Side::Answer,
            },
        )
        .map_err(malformed)?;
        Ok(Rendering { question, answer })
    }
}

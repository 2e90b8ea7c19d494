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

use std::collections::BTreeSet;

use crate::error::Fallible;
use crate::format::ExportFormat;
use crate::metadata::CardMetadata;
use crate::types::card::CardId;

/// Rule every export starts with, so that Anki's block-level field markup
/// flows inline in the note-taking tool.
pub const BASE_STYLE: &str = "div {display: inline;}";

/// One card, rendered and ready to be formatted.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedCard {
    pub card_id: CardId,
    /// The rendered answer, with image references relocated.
    pub answer: String,
    /// The note's field values, with image references relocated.
    pub fields: Vec<String>,
    pub metadata: CardMetadata,
    /// The CSS of the card's note type.
    pub css: String,
    /// Media file names referenced by the answer and the fields.
    pub media: Vec<String>,
}

/// Style rules, deduplicated in first-seen order.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSheet {
    rules: Vec<String>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self {
            rules: vec![BASE_STYLE.to_string()],
        }
    }

    /// Add a rule block. Returns false if an identical block is already present.
    pub fn add(&mut self, css: &str) -> bool {
        if self.rules.iter().any(|rule| rule == css) {
            return false;
        }
        self.rules.push(css.to_string());
        true
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything collected during one export run.
pub struct Assembly {
    deck_name: String,
    styles: StyleSheet,
    cards: Vec<RenderedCard>,
    media: BTreeSet<String>,
}

impl Assembly {
    pub fn new(deck_name: impl Into<String>) -> Self {
        Self {
            deck_name: deck_name.into(),
            styles: StyleSheet::new(),
            cards: Vec::new(),
            media: BTreeSet::new(),
        }
    }

    pub fn push(&mut self, card: RenderedCard) {
        self.styles.add(&card.css);
        self.media.extend(card.media.iter().cloned());
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[RenderedCard] {
        &self.cards
    }

    /// Distinct media file names referenced by the collected cards.
    pub fn media(&self) -> &BTreeSet<String> {
        &self.media
    }

    /// Format every card and join the fragments into one document.
    pub fn render(&self, format: &dyn ExportFormat) -> Fallible<String> {
        let fragments: Vec<String> = self
            .cards
            .iter()
            .map(|card| format.card_fragment(card))
            .collect::<Fallible<Vec<_>>>()?;
        Ok(format.aggregate(&self.deck_name, &self.styles, &fragments))
    }
}

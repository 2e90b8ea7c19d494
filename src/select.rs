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

use log::debug;

use anki2roam_core::Card;
use anki2roam_core::types::card::DeckId;

use crate::collection::Collection;
use crate::error::Fallible;

/// Which cards besides those sitting directly in the deck to export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Also take cards from every deck below the named one.
    pub include_subdecks: bool,
    /// Also take cards that were moved into a filtered deck from the
    /// selected decks.
    pub include_filtered: bool,
}

/// The non-suspended cards of the named deck, ascending by ID.
///
/// Suspension is checked on every card, including those found through a
/// filtered deck.
pub fn select_cards(col: &Collection, deck_name: &str, selection: Selection) -> Fallible<Vec<Card>> {
    let deck = col.deck_by_name(deck_name)?;
    let mut deck_ids: Vec<DeckId> = vec![deck.id];
    if selection.include_subdecks {
        deck_ids.extend(col.descendants(deck).iter().map(|d| d.id));
    }
    let ids = col.card_ids(&deck_ids, selection.include_filtered)?;
    let mut cards: Vec<Card> = Vec::with_capacity(ids.len());
    for id in ids {
        let card = col.card(id)?;
        if card.is_suspended() {
            debug!("Skipping suspended card {id}.");
            continue;
        }
        cards.push(card);
    }
    Ok(cards)
}

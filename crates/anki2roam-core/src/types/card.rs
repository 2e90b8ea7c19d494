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

use crate::error::ErrorReport;

pub type CardId = i64;
pub type NoteId = i64;
pub type DeckId = i64;
pub type ModelId = i64;

/// The queue value Anki uses for suspended cards.
pub const SUSPENDED_QUEUE: i64 = -1;

/// The intraday learning queue. Cards in it hold a Unix timestamp in `due`,
/// whatever their type.
pub const LEARNING_QUEUE: i64 = 1;

/// The scheduling type of a card, as stored in the `type` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardType {
    /// Never studied. `due` holds a position in the new queue.
    New,
    /// In the learning steps. `due` holds a Unix timestamp.
    Learning,
    /// Graduated. `due` is a day offset from the collection's creation.
    Due,
    /// Relearning or rescheduled through a filtered deck. `due` is a day
    /// offset, like [`CardType::Due`].
    Filtered,
}

impl TryFrom<i64> for CardType {
    type Error = ErrorReport;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CardType::New),
            1 => Ok(CardType::Learning),
            2 => Ok(CardType::Due),
            3 => Ok(CardType::Filtered),
            _ => Err(ErrorReport::new(format!("invalid card type: {value}"))),
        }
    }
}

/// A card row, read-only.
#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub note_id: NoteId,
    pub deck_id: DeckId,
    /// The deck the card came from while it sits in a filtered deck, or 0.
    pub original_deck_id: DeckId,
    /// Template ordinal. For cloze notes, the cloze number minus one.
    pub ord: u32,
    pub card_type: CardType,
    pub queue: i64,
    pub due: i64,
    /// Interval in days.
    pub interval: i64,
    /// Ease factor in permille (2500 is 250%).
    pub factor: i64,
}

impl Card {
    pub fn is_suspended(&self) -> bool {
        self.queue == SUSPENDED_QUEUE
    }

    /// Whether the card is being learnt or relearnt today.
    pub fn is_learning(&self) -> bool {
        self.card_type == CardType::Learning || self.queue == LEARNING_QUEUE
    }
}

/// A note row, read-only.
#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    pub id: NoteId,
    pub model_id: ModelId,
    pub fields: Vec<String>,
    pub tags: Vec<String>,
}

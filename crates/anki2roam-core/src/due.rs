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

//! The due date shown next to a card.
//!
//! This is a display heuristic over the stored `due` column. It never
//! schedules anything: past dates are reported as today because that is
//! when the card will next be shown.

use crate::error::Fallible;
use crate::error::fail;
use crate::types::card::Card;
use crate::types::card::CardType;
use crate::types::timestamp::Timestamp;

/// Derive when a card is next due.
///
/// - New cards have no due date.
/// - Cards in learning, including relearning cards still in the intraday
///   queue, are due now.
/// - Everything else is `collection_created + due` days, clamped to `now`.
pub fn due_date(
    card: &Card,
    collection_created: Timestamp,
    now: Timestamp,
) -> Fallible<Option<Timestamp>> {
    if card.is_learning() {
        return Ok(Some(now));
    }
    match card.card_type {
        CardType::New => Ok(None),
        CardType::Learning => Ok(Some(now)),
        CardType::Due | CardType::Filtered => {
            let Some(due) = collection_created.plus_days(card.due) else {
                return fail(format!(
                    "card {} has an out-of-range due value: {}",
                    card.id, card.due
                ));
            };
            Ok(Some(due.max(now)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::card::LEARNING_QUEUE;

    fn card(card_type: CardType, due: i64) -> Card {
        Card {
            id: 42,
            note_id: 1,
            deck_id: 1,
            original_deck_id: 0,
            ord: 0,
            card_type,
            queue: 2,
            due,
            interval: 3,
            factor: 2500,
        }
    }

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    #[test]
    fn test_new_cards_have_no_date() -> Fallible<()> {
        let created = ts("2020-01-01T04:00:00.000");
        let now = ts("2026-10-19T12:00:00.000");
        assert_eq!(due_date(&card(CardType::New, 1234), created, now)?, None);
        Ok(())
    }

    #[test]
    fn test_learning_cards_are_due_now() -> Fallible<()> {
        let created = ts("2020-01-01T04:00:00.000");
        let now = ts("2026-10-19T12:00:00.000");
        assert_eq!(
            due_date(&card(CardType::Learning, 1_760_000_000), created, now)?,
            Some(now)
        );
        Ok(())
    }

    #[test]
    fn test_relearning_in_intraday_queue_is_due_now() -> Fallible<()> {
        let created = ts("2020-01-01T04:00:00.000");
        let now = ts("2026-10-19T12:00:00.000");
        let mut relearning = card(CardType::Filtered, 1_760_000_000);
        relearning.queue = LEARNING_QUEUE;
        assert_eq!(due_date(&relearning, created, now)?, Some(now));
        Ok(())
    }

    #[test]
    fn test_future_due_is_offset_from_creation() -> Fallible<()> {
        let created = ts("2026-10-01T04:00:00.000");
        let now = ts("2026-10-19T12:00:00.000");
        let due = due_date(&card(CardType::Due, 30), created, now)?.unwrap();
        assert_eq!(due, ts("2026-10-31T04:00:00.000"));
        Ok(())
    }

    #[test]
    fn test_past_due_is_clamped_to_now() -> Fallible<()> {
        let created = ts("2020-01-01T04:00:00.000");
        let now = ts("2026-10-19T12:00:00.000");
        for card_type in [CardType::Due, CardType::Filtered] {
            let due = due_date(&card(card_type, 10), created, now)?.unwrap();
            assert_eq!(due.date(), now.date());
        }
        Ok(())
    }

    #[test]
    fn test_out_of_range_due_is_an_error() {
        let created = ts("2020-01-01T04:00:00.000");
        let now = ts("2026-10-19T12:00:00.000");
        assert!(due_date(&card(CardType::Due, i64::MAX), created, now).is_err());
    }
}

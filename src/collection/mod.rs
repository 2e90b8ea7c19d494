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

//! Read-only access to an Anki collection database.
//!
//! Both layouts are understood: the legacy one (schema 11), where decks and
//! note types live as JSON in the `col` table, and the one newer Anki
//! versions write, where they have tables of their own.

pub mod notetype;
pub mod tables;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use log::debug;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::params_from_iter;
use serde::de::DeserializeOwned;

use anki2roam_core::Card;
use anki2roam_core::CardType;
use anki2roam_core::Note;
use anki2roam_core::Timestamp;
use anki2roam_core::types::card::CardId;
use anki2roam_core::types::card::DeckId;
use anki2roam_core::types::card::ModelId;
use anki2roam_core::types::card::NoteId;

use crate::collection::notetype::Deck;
use crate::collection::notetype::Model;
use crate::collection::tables::TABLE_SCHEMA_VERSION;
use crate::collection::tables::load_decks;
use crate::collection::tables::load_models;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

/// File name of the collection database inside a profile directory.
pub const COLLECTION_FILE: &str = "collection.anki2";

/// Directory name of the media store inside a profile directory.
pub const MEDIA_DIRECTORY: &str = "collection.media";

/// Separator between the fields of a note in the `flds` column.
const FIELD_SEPARATOR: char = '\x1f';

pub struct Collection {
    conn: Connection,
    /// Creation time, seconds since the Unix epoch.
    created: i64,
    decks: Vec<Deck>,
    models: HashMap<ModelId, Model>,
}

impl Collection {
    /// Open the collection database at `path` for reading.
    pub fn open(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            return fail(format!("collection does not exist: {}", path.display()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        register_unicase(&conn)?;
        let (created, version, decks, models): (i64, i64, String, String) = conn.query_row(
            "SELECT crt, ver, decks, models FROM col",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;
        let (mut decks, models): (Vec<Deck>, HashMap<ModelId, Model>) =
            if version >= TABLE_SCHEMA_VERSION {
                (load_decks(&conn)?, load_models(&conn)?)
            } else {
                let decks: HashMap<String, Deck> = parse_schema_json("decks", &decks)?;
                let models: HashMap<String, Model> = parse_schema_json("models", &models)?;
                let models = models
                    .into_values()
                    .map(|model| (model.id, model))
                    .collect();
                (decks.into_values().collect(), models)
            };
        decks.sort_by_key(|deck| deck.id);
        debug!(
            "Opened {} (schema {version}) with {} decks and {} note types.",
            path.display(),
            decks.len(),
            models.len()
        );
        Ok(Self {
            conn,
            created,
            decks,
            models,
        })
    }

    /// When the collection was created, in local time. Due days count from here.
    pub fn created_at(&self) -> Fallible<Timestamp> {
        Timestamp::from_unix_local(self.created).ok_or_else(|| {
            ErrorReport::new(format!("invalid collection creation time: {}", self.created))
        })
    }

    pub fn deck(&self, id: DeckId) -> Option<&Deck> {
        self.decks.iter().find(|deck| deck.id == id)
    }

    /// Find a deck by its full name. Names compare case-insensitively.
    pub fn deck_by_name(&self, name: &str) -> Fallible<&Deck> {
        let wanted = name.to_lowercase();
        match self
            .decks
            .iter()
            .find(|deck| deck.name.to_lowercase() == wanted)
        {
            Some(deck) => Ok(deck),
            None => fail(format!("no deck named '{name}'")),
        }
    }

    /// All decks below `parent`, at any depth.
    pub fn descendants(&self, parent: &Deck) -> Vec<&Deck> {
        self.decks
            .iter()
            .filter(|deck| parent.is_ancestor_of(deck))
            .collect()
    }

    pub fn model(&self, id: ModelId) -> Fallible<&Model> {
        match self.models.get(&id) {
            Some(model) => Ok(model),
            None => fail(format!("no note type with id {id}")),
        }
    }

    /// IDs of the cards in any of `deck_ids`, and with `include_filtered`,
    /// of the cards whose home deck is one of them. Ascending by ID.
    pub fn card_ids(&self, deck_ids: &[DeckId], include_filtered: bool) -> Fallible<Vec<CardId>> {
        if deck_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; deck_ids.len()].join(", ");
        let mut sql = format!("SELECT id FROM cards WHERE did IN ({placeholders})");
        let mut params: Vec<DeckId> = deck_ids.to_vec();
        if include_filtered {
            sql.push_str(&format!(" OR odid IN ({placeholders})"));
            params.extend_from_slice(deck_ids);
        }
        sql.push_str(" ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params_from_iter(params), |row| row.get(0))?
            .collect::<Result<Vec<CardId>, _>>()?;
        Ok(ids)
    }

    pub fn card(&self, id: CardId) -> Fallible<Card> {
        let sql = "SELECT id, nid, did, odid, ord, type, queue, due, ivl, factor FROM cards WHERE id = ?";
        let (card, card_type): (Card, i64) = self.conn.query_row(sql, [id], |row| {
            let card = Card {
                id: row.get(0)?,
                note_id: row.get(1)?,
                deck_id: row.get(2)?,
                original_deck_id: row.get(3)?,
                ord: row.get(4)?,
                card_type: CardType::New,
                queue: row.get(6)?,
                due: row.get(7)?,
                interval: row.get(8)?,
                factor: row.get(9)?,
            };
            Ok((card, row.get(5)?))
        })?;
        Ok(Card {
            card_type: CardType::try_from(card_type)?,
            ..card
        })
    }

    pub fn note(&self, id: NoteId) -> Fallible<Note> {
        let sql = "SELECT id, mid, flds, tags FROM notes WHERE id = ?";
        let (id, model_id, fields, tags): (NoteId, ModelId, String, String) =
            self.conn.query_row(sql, [id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;
        Ok(Note {
            id,
            model_id,
            fields: fields.split(FIELD_SEPARATOR).map(String::from).collect(),
            tags: tags.split_whitespace().map(String::from).collect(),
        })
    }

    /// Close the database connection.
    pub fn close(self) -> Fallible<()> {
        self.conn.close().map_err(|(_, err)| ErrorReport::from(err))
    }
}

/// Anki declares its name columns with a case-insensitive `unicase`
/// collation, which SQLite needs to know about before it will touch them.
pub fn register_unicase(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_collation("unicase", unicase_compare)
}

fn unicase_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn parse_schema_json<T: DeserializeOwned>(column: &str, json: &str) -> Fallible<T> {
    let trimmed = json.trim();
    if trimmed.is_empty() || trimmed == "{}" {
        return fail(format!(
            "unsupported collection schema: the '{column}' column is empty"
        ));
    }
    Ok(serde_json::from_str(trimmed)?)
}

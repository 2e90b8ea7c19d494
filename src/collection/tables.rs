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

//! Decks and note types as newer Anki versions store them: one row per
//! deck, note type, field and template, with protobuf-encoded settings.

use std::collections::HashMap;

use log::debug;
use prost::Message;
use rusqlite::Connection;

use anki2roam_core::types::card::DeckId;
use anki2roam_core::types::card::ModelId;

use crate::collection::notetype::DECK_SEPARATOR;
use crate::collection::notetype::Deck;
use crate::collection::notetype::FieldDef;
use crate::collection::notetype::Model;
use crate::collection::notetype::TemplateDef;
use crate::error::ErrorReport;
use crate::error::Fallible;

/// First schema version that keeps decks and note types in tables.
pub const TABLE_SCHEMA_VERSION: i64 = 15;

/// Separator between the levels of a deck name in the `decks` table.
const STORED_DECK_SEPARATOR: char = '\x1f';

/// The parts of a note type's `config` blob the export needs.
#[derive(Clone, PartialEq, Message)]
pub struct NotetypeConfig {
    /// 0 for standard note types, 1 for cloze.
    #[prost(int32, tag = "1")]
    pub kind: i32,
    #[prost(string, tag = "3")]
    pub css: String,
}

/// The parts of a template's `config` blob the export needs.
#[derive(Clone, PartialEq, Message)]
pub struct TemplateConfig {
    #[prost(string, tag = "1")]
    pub q_format: String,
    #[prost(string, tag = "2")]
    pub a_format: String,
}

/// Every deck, ascending by ID, with `::` between name levels.
pub fn load_decks(conn: &Connection) -> Fallible<Vec<Deck>> {
    let mut stmt = conn.prepare("SELECT id, name FROM decks ORDER BY id")?;
    let decks = stmt
        .query_map([], |row| {
            let id: DeckId = row.get(0)?;
            let name: String = row.get(1)?;
            Ok(Deck {
                id,
                name: name.replace(STORED_DECK_SEPARATOR, DECK_SEPARATOR),
            })
        })?
        .collect::<Result<Vec<Deck>, _>>()?;
    Ok(decks)
}

/// Every note type with its fields and templates in ordinal order.
pub fn load_models(conn: &Connection) -> Fallible<HashMap<ModelId, Model>> {
    let mut models: HashMap<ModelId, Model> = HashMap::new();

    let mut stmt = conn.prepare("SELECT id, name, config FROM notetypes")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, ModelId>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Vec<u8>>(2)?,
        ))
    })?;
    for row in rows {
        let (id, name, config) = row?;
        let config = NotetypeConfig::decode(config.as_slice()).map_err(|err| {
            ErrorReport::new(format!("invalid settings for note type '{name}': {err}"))
        })?;
        models.insert(
            id,
            Model {
                id,
                name,
                kind: i64::from(config.kind),
                css: config.css,
                fields: Vec::new(),
                templates: Vec::new(),
            },
        );
    }

    let mut stmt = conn.prepare("SELECT ntid, ord, name FROM fields ORDER BY ntid, ord")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, ModelId>(0)?,
            row.get::<_, u32>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;
    for row in rows {
        let (model_id, ord, name) = row?;
        match models.get_mut(&model_id) {
            Some(model) => model.fields.push(FieldDef { name, ord }),
            None => debug!("Ignoring field '{name}' of missing note type {model_id}."),
        }
    }

    let mut stmt =
        conn.prepare("SELECT ntid, ord, name, config FROM templates ORDER BY ntid, ord")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, ModelId>(0)?,
            row.get::<_, u32>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Vec<u8>>(3)?,
        ))
    })?;
    for row in rows {
        let (model_id, ord, name, config) = row?;
        let Some(model) = models.get_mut(&model_id) else {
            debug!("Ignoring template '{name}' of missing note type {model_id}.");
            continue;
        };
        let config = TemplateConfig::decode(config.as_slice()).map_err(|err| {
            ErrorReport::new(format!(
                "invalid settings for template '{name}' of note type '{}': {err}",
                model.name
            ))
        })?;
        model.templates.push(TemplateDef {
            name,
            ord,
            qfmt: config.q_format,
            afmt: config.a_format,
        });
    }

    Ok(models)
}

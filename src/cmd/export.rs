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
use std::fs::create_dir_all;
use std::fs::write;
use std::path::PathBuf;

use log::debug;
use log::info;
use log::warn;

use anki2roam_core::Assembly;
use anki2roam_core::CardMetadata;
use anki2roam_core::RenderedCard;
use anki2roam_core::Timestamp;
use anki2roam_core::due::due_date;
use anki2roam_core::media::relocate_images;

use crate::collection::Collection;
use crate::config::ExportConfig;
use crate::error::Fallible;
use crate::media::copy::CopyReport;
use crate::media::copy::copy_media;
use crate::media::store::MediaStore;
use crate::render::CardRenderer;
use crate::render::TemplateRenderer;
use crate::select::select_cards;

/// What an export run produced.
#[derive(Debug)]
pub struct ExportSummary {
    pub cards: usize,
    pub documents: Vec<PathBuf>,
    /// `None` when the collection has no media folder.
    pub media: Option<CopyReport>,
}

/// Export the configured deck: write its documents and copy its media.
pub fn export_deck(config: &ExportConfig) -> Fallible<ExportSummary> {
    config.validate()?;
    let assembly = collect_deck(config, &TemplateRenderer)?;

    // Render every format before touching the output directory.
    let mut rendered: Vec<(PathBuf, String)> = Vec::new();
    for format in config.formats() {
        let path = config.document_path(format.extension());
        rendered.push((path, assembly.render(format.as_ref())?));
    }
    create_dir_all(&config.output_directory)?;
    let mut documents: Vec<PathBuf> = Vec::with_capacity(rendered.len());
    for (path, text) in rendered {
        write(&path, text)?;
        info!("Wrote {}", path.display());
        documents.push(path);
    }

    let media = copy_deck_media(config, assembly.media())?;
    Ok(ExportSummary {
        cards: assembly.cards().len(),
        documents,
        media,
    })
}

/// Read the configured deck out of the collection and render its cards.
///
/// The collection is closed before this returns.
pub fn collect_deck(config: &ExportConfig, renderer: &dyn CardRenderer) -> Fallible<Assembly> {
    info!("Exporting {} deck", config.deck_name);
    let col = Collection::open(&config.collection_path())?;
    let created: Timestamp = col.created_at()?;
    let cards = select_cards(&col, &config.deck_name, config.selection)?;

    let mut assembly = Assembly::new(config.deck_name.as_str());
    for card in cards {
        let note = col.note(card.note_id)?;
        let model = col.model(note.model_id)?;
        let home_deck = if card.original_deck_id != 0 {
            card.original_deck_id
        } else {
            card.deck_id
        };
        let deck_name = col
            .deck(home_deck)
            .map_or(config.deck_name.as_str(), |deck| deck.name.as_str());
        let rendering = renderer.render(&card, &note, model, deck_name)?;

        let answer = relocate_images(&rendering.answer, &config.media_folder);
        let mut media: Vec<String> = answer.files;
        let fields: Vec<String> = note
            .fields
            .iter()
            .map(|field| {
                let relocated = relocate_images(field, &config.media_folder);
                media.extend(relocated.files);
                relocated.text
            })
            .collect();

        let due = due_date(&card, created, config.exported_at)?.map(Timestamp::date);
        let metadata = CardMetadata::new(&card, &note, due);
        debug!("Card {}: {}", card.id, metadata.line());
        assembly.push(RenderedCard {
            card_id: card.id,
            answer: answer.text,
            fields,
            metadata,
            css: model.css.clone(),
            media,
        });
    }
    col.close()?;

    info!("Exporting {} cards", assembly.cards().len());
    Ok(assembly)
}

fn copy_deck_media(config: &ExportConfig, names: &BTreeSet<String>) -> Fallible<Option<CopyReport>> {
    let store = MediaStore::new(config.media_store_path());
    if !store.exists() {
        warn!(
            "Skipping media export as source media folder {} does not exist",
            store.root().display()
        );
        return Ok(None);
    }
    let report = copy_media(&store, &config.media_destination(), names)?;
    info!(
        "Copied {} media files ({} unchanged)",
        report.copied, report.unchanged
    );
    Ok(Some(report))
}

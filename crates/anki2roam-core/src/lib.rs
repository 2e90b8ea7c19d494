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

//! anki2roam-core: the collection-independent half of anki2roam.
//!
//! Everything in here works on plain values read out of an Anki collection:
//! - Due-date derivation and the Roam metadata summary of a card
//! - Rewriting `<img>` references to point into the exported media folder
//! - HTML to Markdown conversion of note fields
//! - The HTML and Markdown export formats and the per-run assembler

pub mod assemble;
pub mod due;
pub mod error;
pub mod format;
pub mod markdown;
pub mod media;
pub mod metadata;
pub mod types;

// Re-exports for convenience
pub use assemble::{Assembly, RenderedCard, StyleSheet};
pub use error::{ErrorReport, Fallible, fail};
pub use format::{ExportFormat, HtmlFormat, MarkdownFormat};
pub use metadata::{CardMetadata, InsertionPoint};
pub use types::card::{Card, CardType, Note};
pub use types::date::Date;
pub use types::timestamp::Timestamp;

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

mod html;
mod markdown;

pub use html::HtmlFormat;
pub use markdown::MarkdownFormat;

use crate::assemble::RenderedCard;
use crate::assemble::StyleSheet;
use crate::error::Fallible;

/// An output format: how one card is written, and how the written cards
/// are joined into a document.
pub trait ExportFormat {
    /// File extension of the document, without the dot.
    fn extension(&self) -> &'static str;

    fn card_fragment(&self, card: &RenderedCard) -> Fallible<String>;

    fn aggregate(&self, deck_name: &str, styles: &StyleSheet, fragments: &[String]) -> String;
}

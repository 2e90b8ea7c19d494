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

use std::sync::LazyLock;

use regex::Captures;
use regex::Regex;

static IMAGE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img src="(.*?)"\s?/?>"#).expect("image tag pattern"));

/// Text whose image references point into the export's media folder.
#[derive(Debug, PartialEq)]
pub struct RelocatedText {
    pub text: String,
    /// Referenced file names, in order of appearance. May repeat.
    pub files: Vec<String>,
}

/// Rewrite every `<img src="name">` in `text` to `<img src="folder/name" />`
/// and report the names.
///
/// External URLs (including protocol-relative `//host/...` ones) and `data:`
/// URIs are left as they are.
pub fn relocate_images(text: &str, media_folder: &str) -> RelocatedText {
    let mut files: Vec<String> = Vec::new();
    let text = IMAGE_TAG
        .replace_all(text, |caps: &Captures| {
            let src = &caps[1];
            if is_external(src) {
                return caps[0].to_string();
            }
            files.push(src.to_string());
            format!(r#"<img src="{media_folder}/{src}" />"#)
        })
        .into_owned();
    RelocatedText { text, files }
}

fn is_external(src: &str) -> bool {
    src.contains("://") || src.starts_with("//") || src.starts_with("data:")
}

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

use crate::render::Side;

static CLOZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{c(\d+)::(.*?)(?:::(.*?))?\}\}").expect("cloze pattern")
});

/// Render the cloze deletions in `text` for cloze number `ord`.
///
/// The active deletion is hidden behind `[...]` (or its hint) on the
/// question and highlighted on the answer. Other deletions show their text.
pub fn render_cloze(text: &str, ord: u32, side: Side) -> String {
    CLOZE
        .replace_all(text, |caps: &Captures| {
            let content = &caps[2];
            let active = caps[1].parse::<u32>().is_ok_and(|n| n == ord);
            if !active {
                return content.to_string();
            }
            match side {
                Side::Question => {
                    let hint = caps.get(3).map_or("...", |m| m.as_str());
                    format!(r#"<span class="cloze">[{hint}]</span>"#)
                }
                Side::Answer => format!(r#"<span class="cloze">{content}</span>"#),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_deletion() {
        let text = "{{c1::Paris}} is in {{c2::France}}";
        assert_eq!(
            render_cloze(text, 1, Side::Question),
            r#"<span class="cloze">[...]</span> is in France"#
        );
        assert_eq!(
            render_cloze(text, 1, Side::Answer),
            r#"<span class="cloze">Paris</span> is in France"#
        );
    }

    #[test]
    fn test_hint() {
        assert_eq!(
            render_cloze("{{c1::Paris::city}}", 1, Side::Question),
            r#"<span class="cloze">[city]</span>"#
        );
        assert_eq!(
            render_cloze("{{c1::Paris::city}}", 1, Side::Answer),
            r#"<span class="cloze">Paris</span>"#
        );
    }

    #[test]
    fn test_repeated_ordinal() {
        assert_eq!(
            render_cloze("{{c1::a}} and {{c1::b}}", 1, Side::Answer),
            r#"<span class="cloze">a</span> and <span class="cloze">b</span>"#
        );
    }

    #[test]
    fn test_no_deletions() {
        assert_eq!(render_cloze("plain", 1, Side::Answer), "plain");
    }
}

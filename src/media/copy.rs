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

use std::fs::File;
use std::fs::create_dir_all;
use std::path::Path;

use log::debug;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::media::store::MediaStore;

/// What a media copy did.
#[derive(Debug, Default, PartialEq)]
pub struct CopyReport {
    pub copied: usize,
    /// Files whose destination already had identical contents.
    pub unchanged: usize,
}

/// Copy the named files from the store into `destination`, creating it if
/// needed.
///
/// A name that cannot be located fails the whole copy.
pub fn copy_media<'a>(
    store: &MediaStore,
    destination: &Path,
    names: impl IntoIterator<Item = &'a String>,
) -> Fallible<CopyReport> {
    create_dir_all(destination)?;
    let mut report = CopyReport::default();
    for name in names {
        let located = store.locate(name).map_err(|err| {
            ErrorReport::new(format!("cannot copy media file '{name}': {err}"))
        })?;
        let target = destination.join(&located.name);
        if target.is_file() && file_hash(&located.source)? == file_hash(&target)? {
            debug!("Media file '{name}' is unchanged.");
            report.unchanged += 1;
            continue;
        }
        if let Some(parent) = target.parent() {
            create_dir_all(parent)?;
        }
        std::fs::copy(&located.source, &target)?;
        debug!("Copied '{}' to '{}'.", located.source.display(), target.display());
        report.copied += 1;
    }
    Ok(report)
}

fn file_hash(path: &Path) -> Fallible<blake3::Hash> {
    let mut hasher = blake3::Hasher::new();
    let mut file = File::open(path)?;
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize())
}

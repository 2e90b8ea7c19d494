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

use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Component;
use std::path::PathBuf;

use percent_encoding::percent_decode_str;

/// The collection's media folder. Takes file names as written in card HTML
/// and finds the file they refer to.
///
/// Names come from note content, so anything that could escape the folder
/// is rejected.
pub struct MediaStore {
    /// Path to the `collection.media` directory.
    root: PathBuf,
}

/// A media file found in the store.
#[derive(Debug, PartialEq)]
pub struct Located {
    /// Absolute path to the file.
    pub source: PathBuf,
    /// Store-relative name the file was found under.
    pub name: PathBuf,
}

/// Errors that can occur when locating a file.
#[derive(Debug, PartialEq)]
pub enum MediaStoreError {
    /// Name is the empty string.
    Empty,
    /// Name is an absolute path.
    Absolute,
    /// Name contains parent (`..`) components.
    ParentComponent,
    /// No file by that name.
    NotFound,
    /// Name points to something that is not a file.
    NotFile,
}

impl Display for MediaStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            MediaStoreError::Empty => "name is the empty string.",
            MediaStoreError::Absolute => "absolute paths are not allowed as media names.",
            MediaStoreError::ParentComponent => "name has a parent component.",
            MediaStoreError::NotFound => "file not found in the media folder.",
            MediaStoreError::NotFile => "name does not point to a file.",
        };
        write!(f, "{msg}")
    }
}

/// Decode percent-encoded characters (e.g., %20 to space).
fn percent_decode(s: &str) -> Option<String> {
    percent_decode_str(s)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

impl MediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Whether the media folder exists at all.
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Find the file a media name refers to.
    ///
    /// If no file has the name as written, the percent-decoded name is tried.
    pub fn locate(&self, name: &str) -> Result<Located, MediaStoreError> {
        match self.locate_inner(name) {
            Err(MediaStoreError::NotFound) => {
                if let Some(decoded) = percent_decode(name) {
                    if decoded != name {
                        return self.locate_inner(&decoded);
                    }
                }
                Err(MediaStoreError::NotFound)
            }
            other => other,
        }
    }

    fn locate_inner(&self, name: &str) -> Result<Located, MediaStoreError> {
        if name.trim().is_empty() {
            return Err(MediaStoreError::Empty);
        }
        let name: PathBuf = PathBuf::from(name);
        if name.components().any(|c| c == Component::ParentDir) {
            return Err(MediaStoreError::ParentComponent);
        }
        if name.is_absolute() {
            return Err(MediaStoreError::Absolute);
        }
        let source: PathBuf = self.root.join(&name);
        if !source.exists() {
            return Err(MediaStoreError::NotFound);
        }
        if !source.is_file() {
            return Err(MediaStoreError::NotFile);
        }
        Ok(Located { source, name })
    }
}

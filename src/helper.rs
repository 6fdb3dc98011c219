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

use std::fs::write;
use std::path::PathBuf;

use tempfile::TempDir;
use tempfile::tempdir;

use crate::error::Fallible;

/// The fixture dataset: "Science" with two cards, "History" with one.
pub fn sample_dataset() -> String {
    include_str!("../test/flashcards.json").to_string()
}

/// A scratch directory holding a copy of the fixture dataset. The directory
/// is deleted when the returned guard is dropped.
pub fn create_tmp_collection() -> Fallible<(TempDir, PathBuf)> {
    let dir = tempdir()?;
    let dataset = dir.path().join("flashcards.json");
    write(&dataset, sample_dataset())?;
    Ok((dir, dataset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tmp_collection() -> Fallible<()> {
        let (dir, dataset) = create_tmp_collection()?;
        assert!(dataset.exists());
        assert!(dataset.starts_with(dir.path()));
        Ok(())
    }
}

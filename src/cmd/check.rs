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


use std::path::Path;

use crate::dataset::read_dataset;
use crate::error::Fallible;

pub fn check_dataset(dataset: &Path) -> Fallible<()> {
    let _ = read_dataset(dataset)?;
    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::write;
    use std::path::Path;

    use super::check_dataset;
    use crate::error::Fallible;
    use crate::helper::create_tmp_collection;

    #[test]
    fn test_non_existent_dataset() {
        assert!(check_dataset(Path::new("./derpherp.json")).is_err());
    }

    #[test]
    fn test_dataset() -> Fallible<()> {
        let (_dir, dataset) = create_tmp_collection()?;
        assert!(check_dataset(&dataset).is_ok());
        Ok(())
    }

    #[test]
    fn test_malformed_dataset() -> Fallible<()> {
        let (_dir, dataset) = create_tmp_collection()?;
        write(&dataset, "{\"categories\": [{\"name\": \"Science\", \"flashcards\": [{}]}]}")?;
        let err = check_dataset(&dataset).unwrap_err();
        assert!(err.to_string().starts_with("error: malformed dataset:"));
        Ok(())
    }
}

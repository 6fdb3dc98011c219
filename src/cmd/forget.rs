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

use crate::error::Fallible;
use crate::mastery::MasteryLedger;
use crate::store::Store;

/// Clear the mastery record, as the page's reset button does.
pub fn forget_mastery(db_path: &Path) -> Fallible<()> {
    let store = Store::open(db_path)?;
    let mut ledger = MasteryLedger::load(store);
    let count = ledger.count();
    ledger.reset()?;
    println!("Forgot {count} mastered cards.");
    Ok(())
}

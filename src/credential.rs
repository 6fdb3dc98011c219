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

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::store::Store;

/// The store key holding the API key, verbatim.
pub const CREDENTIAL_KEY: &str = "triviadeck_openai_api_key";

const KEY_PREFIX: &str = "sk-";

#[derive(Debug, PartialEq)]
pub enum CredentialError {
    Empty,
    BadFormat,
}

impl Display for CredentialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialError::Empty => write!(f, "Please enter an API key"),
            CredentialError::BadFormat => write!(
                f,
                "Invalid API key format. OpenAI keys start with \"{KEY_PREFIX}\""
            ),
        }
    }
}

impl Error for CredentialError {}

impl From<CredentialError> for ErrorReport {
    fn from(value: CredentialError) -> Self {
        ErrorReport::new(value.to_string())
    }
}

/// Trim user input and check that it looks like an API key.
pub fn validate_credential(raw: &str) -> Result<&str, CredentialError> {
    let key = raw.trim();
    if key.is_empty() {
        Err(CredentialError::Empty)
    } else if !key.starts_with(KEY_PREFIX) {
        Err(CredentialError::BadFormat)
    } else {
        Ok(key)
    }
}

/// The saved API key, if any. Read failures count as no key.
pub fn load_credential(store: &Store) -> Option<String> {
    match store.get(CREDENTIAL_KEY) {
        Ok(key) => key,
        Err(e) => {
            log::warn!("Could not read API key: {e}");
            None
        }
    }
}

pub fn save_credential(store: &Store, raw: &str) -> Fallible<()> {
    let key = validate_credential(raw)?;
    store.set(CREDENTIAL_KEY, key)?;
    log::debug!("API key saved.");
    Ok(())
}

pub fn clear_credential(store: &Store) -> Fallible<()> {
    store.remove(CREDENTIAL_KEY)?;
    log::debug!("API key cleared.");
    Ok(())
}

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

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::Fallible;

/// The name of the configuration file looked up next to the dataset.
pub const CONFIG_FILE_NAME: &str = "triviadeck.toml";

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub ai: AiConfig,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub port: u16,
    /// Open the study page in the default browser once the server is up.
    pub open_browser: bool,
    /// Shuffle the full deck at startup so sessions start on different cards.
    pub shuffle_on_start: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            open_browser: true,
            shuffle_on_start: true,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AiConfig {
    /// The chat-completions URL.
    pub endpoint: String,
    pub model: String,
    pub temperature: f64,
    /// Give up on a request after this many seconds.
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn parse(text: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(text)?;
        Ok(config)
    }

    /// Load a configuration file. A missing file yields the defaults; an
    /// invalid one is an error.
    pub fn load(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            log::debug!("No configuration at {}, using defaults.", path.display());
            return Ok(Self::default());
        }
        log::debug!("Loading configuration from {}", path.display());
        let text = read_to_string(path)?;
        Self::parse(&text)
    }
}

// Copyright 2024 The Matrix.org Foundation C.I.C.
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

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod http;
mod output;
mod source;

pub use self::{
    http::HttpConfig,
    output::{OutputConfig, PemFormat},
    source::{is_cognito_identifier, KeySource, KeySourceConfig, KeySourceError},
};
use crate::util::ConfigurationSection;

/// Application configuration root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RootConfig {
    /// Where the key set is loaded from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<KeySourceConfig>,

    /// Where and how the converted keys are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Configuration of the HTTP client
    #[serde(default)]
    pub http: HttpConfig,
}

impl ConfigurationSection for RootConfig {
    fn validate(&self, figment: &figment::Figment) -> Result<(), figment::error::Error> {
        if let Some(source) = &self.source {
            source.validate(figment)?;
        }
        self.output.validate(figment)?;
        self.http.validate(figment)?;

        Ok(())
    }
}

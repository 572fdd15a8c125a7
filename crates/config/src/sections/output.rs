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

use camino::Utf8PathBuf;
pub use jwkpem_keystore::PemFormat;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ConfigurationSection;

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// Where and how the converted keys are written
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OutputConfig {
    /// Path of the JSON file mapping key IDs to PEM documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub path: Option<Utf8PathBuf>,

    /// Which PEM document is produced for each key
    #[serde(default, skip_serializing_if = "is_default")]
    pub format: PemFormat,

    /// Indent the JSON output
    #[serde(default, skip_serializing_if = "is_default")]
    pub pretty: bool,
}

impl ConfigurationSection for OutputConfig {
    const PATH: Option<&'static str> = Some("output");
}

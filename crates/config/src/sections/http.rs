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

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{util::annotate, ConfigurationSection};

fn default_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("jwkpem/", env!("CARGO_PKG_VERSION")).to_owned()
}

/// Configuration of the HTTP client used to download key sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HttpConfig {
    /// Time after which a request is abandoned, in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Value of the `User-Agent` header sent with requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    /// The request timeout as a [`Duration`]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl ConfigurationSection for HttpConfig {
    const PATH: Option<&'static str> = Some("http");

    fn validate(&self, figment: &figment::Figment) -> Result<(), figment::Error> {
        if self.timeout == 0 {
            return Err(annotate(
                figment,
                &["http", "timeout"],
                figment::Error::from("timeout must be at least one second".to_owned()),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use figment::{
        providers::{Format, Yaml},
        Figment, Jail,
    };

    use super::*;
    use crate::ConfigurationSectionExt;

    #[test]
    fn defaults() {
        let config = HttpConfig::extract_or_default(&Figment::new()).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.user_agent.starts_with("jwkpem/"));
    }

    #[test]
    fn load_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
                    http:
                      timeout: 30
                ",
            )?;

            let figment = Figment::new().merge(Yaml::file("config.yaml"));
            let config = HttpConfig::extract_or_default(&figment)?;

            assert_eq!(config.timeout(), Duration::from_secs(30));
            assert_eq!(config.user_agent, default_user_agent());

            Ok(())
        });
    }

    #[test]
    fn reject_zero_timeout() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
                    http:
                      timeout: 0
                ",
            )?;

            let figment = Figment::new().merge(Yaml::file("config.yaml"));
            assert!(HttpConfig::extract_or_default(&figment).is_err());

            Ok(())
        });
    }
}

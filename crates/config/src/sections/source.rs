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

use camino::{Utf8Path, Utf8PathBuf};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::{util::annotate, ConfigurationSection};

/// Path of the key set document, relative to an issuer
const WELL_KNOWN_JWKS: [&str; 2] = [".well-known", "jwks.json"];

/// Whether `value` can be used as a Cognito region or user pool ID.
///
/// Both end up in the host and path of the key set URL, so only ASCII
/// letters, digits, `-` and `_` are allowed.
#[must_use]
pub fn is_cognito_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn region_example() -> &'static str {
    "eu-west-1"
}

fn user_pool_id_example() -> &'static str {
    "eu-west-1_AbCdEfGhI"
}

/// Where the JSON Web Key Set is loaded from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum KeySourceConfig {
    /// Keys of an AWS Cognito user pool
    Cognito {
        /// AWS region of the user pool
        #[schemars(example = "region_example")]
        region: String,

        /// ID of the user pool
        #[schemars(example = "user_pool_id_example")]
        user_pool_id: String,
    },

    /// Keys published under the `/.well-known/jwks.json` path of an issuer
    Issuer {
        /// Base URL of the issuer
        issuer: Url,
    },

    /// Keys published at an arbitrary URL
    JwksUri {
        /// URL of the key set document
        jwks_uri: Url,
    },

    /// Keys stored in a local file
    File {
        /// Path to the key set document
        #[schemars(with = "String")]
        file: Utf8PathBuf,
    },
}

/// Error returned when the URL of a key set could not be computed
#[derive(Debug, Error)]
pub enum KeySourceError {
    /// The resulting URL is not valid
    #[error("invalid key set URL")]
    InvalidUrl(#[from] url::ParseError),

    /// A Cognito region or user pool ID has characters which can't go in the
    /// URL
    #[error("invalid Cognito {name} {value:?}")]
    InvalidCognitoIdentifier {
        /// Which parameter is invalid
        name: &'static str,

        /// The rejected value
        value: String,
    },

    /// The issuer URL has no path the key set location could be appended to
    #[error("{0} can't be used as an issuer URL")]
    CannotBeABase(Url),
}

/// A resolved [`KeySourceConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource<'a> {
    /// Download the key set from this URL
    Remote(Url),

    /// Read the key set from this file
    File(&'a Utf8Path),
}

impl KeySourceConfig {
    /// Resolve where the key set should be loaded from
    ///
    /// # Errors
    ///
    /// Returns an error if the computed URL is not valid
    pub fn resolve(&self) -> Result<KeySource<'_>, KeySourceError> {
        match self {
            Self::Cognito {
                region,
                user_pool_id,
            } => {
                for (name, value) in [("region", region), ("user pool ID", user_pool_id)] {
                    if !is_cognito_identifier(value) {
                        return Err(KeySourceError::InvalidCognitoIdentifier {
                            name,
                            value: value.clone(),
                        });
                    }
                }

                let url = format!(
                    "https://cognito-idp.{region}.amazonaws.com/{user_pool_id}/.well-known/jwks.json"
                );
                Ok(KeySource::Remote(Url::parse(&url)?))
            }

            Self::Issuer { issuer } => {
                let mut url = issuer.clone();
                url.path_segments_mut()
                    .map_err(|()| KeySourceError::CannotBeABase(issuer.clone()))?
                    .pop_if_empty()
                    .extend(WELL_KNOWN_JWKS);
                Ok(KeySource::Remote(url))
            }

            Self::JwksUri { jwks_uri } => Ok(KeySource::Remote(jwks_uri.clone())),

            Self::File { file } => Ok(KeySource::File(file)),
        }
    }
}

impl ConfigurationSection for KeySourceConfig {
    const PATH: Option<&'static str> = Some("source");

    fn validate(&self, figment: &figment::Figment) -> Result<(), figment::Error> {
        let Self::Cognito {
            region,
            user_pool_id,
        } = self
        else {
            return Ok(());
        };

        if !is_cognito_identifier(region) {
            return Err(annotate(
                figment,
                &["source", "region"],
                figment::Error::from(
                    "region must be made of letters, digits, `-` and `_`".to_owned(),
                ),
            ));
        }

        if !is_cognito_identifier(user_pool_id) {
            return Err(annotate(
                figment,
                &["source", "user_pool_id"],
                figment::Error::from(
                    "user pool ID must be made of letters, digits, `-` and `_`".to_owned(),
                ),
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

    fn remote(config: &KeySourceConfig) -> String {
        match config.resolve().unwrap() {
            KeySource::Remote(url) => url.to_string(),
            KeySource::File(path) => panic!("unexpected file source {path}"),
        }
    }

    #[test]
    fn cognito_url() {
        let config = KeySourceConfig::Cognito {
            region: "us-east-1".to_owned(),
            user_pool_id: "us-east-1_Abc123".to_owned(),
        };

        assert_eq!(
            remote(&config),
            "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_Abc123/.well-known/jwks.json"
        );
    }

    #[test]
    fn issuer_url() {
        for issuer in ["https://auth.example.com/realms/test", "https://auth.example.com/realms/test/"] {
            let config = KeySourceConfig::Issuer {
                issuer: issuer.parse().unwrap(),
            };

            assert_eq!(
                remote(&config),
                "https://auth.example.com/realms/test/.well-known/jwks.json"
            );
        }

        let config = KeySourceConfig::Issuer {
            issuer: "https://auth.example.com".parse().unwrap(),
        };
        assert_eq!(
            remote(&config),
            "https://auth.example.com/.well-known/jwks.json"
        );
    }

    #[test]
    fn load_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
                    source:
                      region: eu-west-1
                      user_pool_id: eu-west-1_AbCdEfGhI
                ",
            )?;

            let figment = Figment::new().merge(Yaml::file("config.yaml"));
            let config = KeySourceConfig::extract(&figment)?;

            assert_eq!(
                config,
                KeySourceConfig::Cognito {
                    region: "eu-west-1".to_owned(),
                    user_pool_id: "eu-west-1_AbCdEfGhI".to_owned(),
                }
            );

            Ok(())
        });
    }

    #[test]
    fn load_file_source() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
                    source:
                      file: ./jwks.json
                ",
            )?;

            let figment = Figment::new().merge(Yaml::file("config.yaml"));
            let config = KeySourceConfig::extract(&figment)?;

            assert_eq!(
                config.resolve().unwrap(),
                KeySource::File(Utf8Path::new("./jwks.json"))
            );

            Ok(())
        });
    }

    #[test]
    fn reject_empty_pool() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
                    source:
                      region: eu-west-1
                      user_pool_id: ""
                "#,
            )?;

            let figment = Figment::new().merge(Yaml::file("config.yaml"));
            let err = KeySourceConfig::extract(&figment).unwrap_err();
            assert_eq!(err.path, vec!["source".to_owned(), "user_pool_id".to_owned()]);

            Ok(())
        });
    }

    #[test]
    fn cognito_identifiers() {
        assert!(is_cognito_identifier("eu-west-1"));
        assert!(is_cognito_identifier("eu-west-1_AbCdEfGhI"));
        assert!(!is_cognito_identifier(""));
        assert!(!is_cognito_identifier("x.example.org/"));
        assert!(!is_cognito_identifier("eu-west-1?"));
        assert!(!is_cognito_identifier("pool/../other"));
    }

    #[test]
    fn cognito_host_injection() {
        let config = KeySourceConfig::Cognito {
            region: "x.example.org/".to_owned(),
            user_pool_id: "eu-west-1_AbCdEfGhI".to_owned(),
        };

        assert!(matches!(
            config.resolve(),
            Err(KeySourceError::InvalidCognitoIdentifier { name: "region", .. })
        ));

        let config = KeySourceConfig::Cognito {
            region: "eu-west-1".to_owned(),
            user_pool_id: "pool#fragment".to_owned(),
        };

        assert!(matches!(
            config.resolve(),
            Err(KeySourceError::InvalidCognitoIdentifier {
                name: "user pool ID",
                ..
            })
        ));
    }

    #[test]
    fn reject_region_with_host_characters() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
                    source:
                      region: x.example.org/
                      user_pool_id: eu-west-1_AbCdEfGhI
                ",
            )?;

            let figment = Figment::new().merge(Yaml::file("config.yaml"));
            let err = KeySourceConfig::extract(&figment).unwrap_err();
            assert_eq!(err.path, vec!["source".to_owned(), "region".to_owned()]);

            Ok(())
        });
    }
}

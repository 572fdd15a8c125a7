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

//! Ref: <https://www.rfc-editor.org/rfc/rfc7517.html>

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::base64::{self, DecodeError};

/// The only key type which can be converted
pub const RSA_KEY_TYPE: &str = "RSA";

/// Error raised when a key set document or one of its keys is malformed
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("could not parse JSON Web Key Set")]
    InvalidJson {
        #[from]
        inner: serde_json::Error,
    },

    #[error("parameter {parameter:?} of key {kid:?} is not valid base64url")]
    InvalidEncoding {
        kid: String,
        parameter: &'static str,
        #[source]
        inner: DecodeError,
    },

    #[error("parameter {parameter:?} of key {kid:?} is missing or empty")]
    MissingParameter { kid: String, parameter: &'static str },
}

impl FormatError {
    /// The ID of the key which caused this error, if any
    #[must_use]
    pub fn kid(&self) -> Option<&str> {
        match self {
            Self::InvalidJson { .. } => None,
            Self::InvalidEncoding { kid, .. } | Self::MissingParameter { kid, .. } => Some(kid),
        }
    }
}

/// A single key, as found in the `keys` array of a JWKS document.
///
/// The numeric members are kept encoded, they are only decoded when the key is
/// converted, so that decoding errors can be reported against the key ID.
/// Unknown members are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JsonWebKeyRecord {
    kid: String,

    kty: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    n: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    e: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    alg: Option<String>,

    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    r#use: Option<String>,
}

impl JsonWebKeyRecord {
    /// Create an RSA key record from its base64url-encoded modulus and
    /// exponent
    #[must_use]
    pub fn rsa(kid: impl Into<String>, n: impl Into<String>, e: impl Into<String>) -> Self {
        Self {
            kid: kid.into(),
            kty: RSA_KEY_TYPE.to_owned(),
            n: Some(n.into()),
            e: Some(e.into()),
            alg: None,
            r#use: None,
        }
    }

    /// Create a record with an arbitrary key type and no parameters
    #[must_use]
    pub fn new(kid: impl Into<String>, kty: impl Into<String>) -> Self {
        Self {
            kid: kid.into(),
            kty: kty.into(),
            n: None,
            e: None,
            alg: None,
            r#use: None,
        }
    }

    #[must_use]
    pub fn with_alg(mut self, alg: impl Into<String>) -> Self {
        self.alg = Some(alg.into());
        self
    }

    #[must_use]
    pub fn with_use(mut self, value: impl Into<String>) -> Self {
        self.r#use = Some(value.into());
        self
    }

    #[must_use]
    pub fn kid(&self) -> &str {
        &self.kid
    }

    #[must_use]
    pub fn kty(&self) -> &str {
        &self.kty
    }

    #[must_use]
    pub fn alg(&self) -> Option<&str> {
        self.alg.as_deref()
    }

    #[must_use]
    pub fn r#use(&self) -> Option<&str> {
        self.r#use.as_deref()
    }

    #[must_use]
    pub fn is_rsa(&self) -> bool {
        self.kty == RSA_KEY_TYPE
    }

    /// Decode the RSA modulus (`n`)
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is missing, empty or not valid
    /// base64url
    pub fn modulus(&self) -> Result<Vec<u8>, FormatError> {
        self.decode_parameter("n", self.n.as_deref())
    }

    /// Decode the RSA public exponent (`e`)
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is missing, empty or not valid
    /// base64url
    pub fn exponent(&self) -> Result<Vec<u8>, FormatError> {
        self.decode_parameter("e", self.e.as_deref())
    }

    fn decode_parameter(
        &self,
        parameter: &'static str,
        value: Option<&str>,
    ) -> Result<Vec<u8>, FormatError> {
        let value = value
            .filter(|v| !v.is_empty())
            .ok_or_else(|| FormatError::MissingParameter {
                kid: self.kid.clone(),
                parameter,
            })?;

        base64::decode(value).map_err(|inner| FormatError::InvalidEncoding {
            kid: self.kid.clone(),
            parameter,
            inner,
        })
    }
}

/// A JSON Web Key Set. The order of the keys is the order of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JsonWebKeySet {
    keys: Vec<JsonWebKeyRecord>,
}

impl std::ops::Deref for JsonWebKeySet {
    type Target = Vec<JsonWebKeyRecord>;

    fn deref(&self) -> &Self::Target {
        &self.keys
    }
}

impl IntoIterator for JsonWebKeySet {
    type Item = JsonWebKeyRecord;
    type IntoIter = std::vec::IntoIter<JsonWebKeyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

impl<'a> IntoIterator for &'a JsonWebKeySet {
    type Item = &'a JsonWebKeyRecord;
    type IntoIter = std::slice::Iter<'a, JsonWebKeyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

impl JsonWebKeySet {
    #[must_use]
    pub fn new(keys: Vec<JsonWebKeyRecord>) -> Self {
        Self { keys }
    }

    /// Parse a JWKS document
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidJson`] if the document is not a JSON
    /// object with a `keys` array of key records
    pub fn from_json(document: &str) -> Result<Self, FormatError> {
        Ok(serde_json::from_str(document)?)
    }

    /// Parse a JWKS document from raw bytes
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_json`]
    pub fn from_slice(document: &[u8]) -> Result<Self, FormatError> {
        Ok(serde_json::from_slice(document)?)
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<JsonWebKeyRecord> {
        self.keys
    }
}

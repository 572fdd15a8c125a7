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

use std::collections::BTreeMap;

use jwkpem_jose::JsonWebKeyRecord;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{rsa::RsaPublicKey, ConversionError};

/// Which PEM document is produced for each key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PemFormat {
    /// X.509 `SubjectPublicKeyInfo`, labelled `PUBLIC KEY`
    #[default]
    Spki,

    /// Bare PKCS#1 `RSAPublicKey`, labelled `RSA PUBLIC KEY`
    Pkcs1,
}

impl PemFormat {
    fn armor(self, key: &RsaPublicKey) -> String {
        match self {
            Self::Spki => key.to_public_key_pem(),
            Self::Pkcs1 => key.to_pkcs1_pem(),
        }
    }
}

/// Maps key IDs to PEM documents.
///
/// It can't be modified once built, and serializes as a JSON object with the
/// key IDs in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeyPemMap {
    inner: BTreeMap<String, String>,
}

impl KeyPemMap {
    /// Get the PEM document of a key
    #[must_use]
    pub fn get(&self, kid: &str) -> Option<&str> {
        self.inner.get(kid).map(String::as_str)
    }

    pub fn key_ids(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.inner
    }
}

impl IntoIterator for KeyPemMap {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

/// Convert a single RSA key record
///
/// # Errors
///
/// Returns an error if the key is not an RSA key, or if its modulus or
/// exponent are missing or not valid base64url
pub fn convert_key(
    record: &JsonWebKeyRecord,
    format: PemFormat,
) -> Result<String, ConversionError> {
    if !record.is_rsa() {
        return Err(ConversionError::UnsupportedKeyType {
            kid: record.kid().to_owned(),
            kty: record.kty().to_owned(),
        });
    }

    let n = record.modulus()?;
    let e = record.exponent()?;
    let key = RsaPublicKey::new(&n, &e);

    tracing::debug!(
        kid = record.kid(),
        kty = record.kty(),
        alg = record.alg(),
        "Converting key"
    );

    Ok(format.armor(&key))
}

/// Convert every key of a set to a `SubjectPublicKeyInfo` PEM document
///
/// # Errors
///
/// See [`convert_with`]
pub fn convert<'a, I>(records: I) -> Result<KeyPemMap, ConversionError>
where
    I: IntoIterator<Item = &'a JsonWebKeyRecord>,
{
    convert_with(records, PemFormat::Spki)
}

/// Convert every key of a set, in order.
///
/// The first key which can't be converted aborts the whole conversion, no
/// partial map is ever returned. When two keys share the same ID, the one
/// which comes last wins.
///
/// # Errors
///
/// Returns the error of the first key which could not be converted
pub fn convert_with<'a, I>(records: I, format: PemFormat) -> Result<KeyPemMap, ConversionError>
where
    I: IntoIterator<Item = &'a JsonWebKeyRecord>,
{
    let inner = records
        .into_iter()
        .try_fold(BTreeMap::new(), |mut pems, record| {
            let pem = convert_key(record, format)?;
            pems.insert(record.kid().to_owned(), pem);
            Ok::<_, ConversionError>(pems)
        })?;

    tracing::info!(keys = inner.len(), ?format, "Converted key set");

    Ok(KeyPemMap { inner })
}

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

//! A crate to turn the RSA keys of a JSON Web Key Set into PEM documents,
//! which can then be used by TLS and crypto libraries to verify JWTs.

#![allow(clippy::module_name_repetitions)]

use jwkpem_jose::FormatError;
use thiserror::Error;

mod convert;
pub mod der;
pub mod pem;
pub mod rsa;

pub use self::{
    convert::{convert, convert_key, convert_with, KeyPemMap, PemFormat},
    rsa::RsaPublicKey,
};

/// Error type used when a key could not be converted
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("key {kid:?} has unsupported key type {kty:?}")]
    UnsupportedKeyType { kid: String, kty: String },
}

impl ConversionError {
    /// The ID of the key which could not be converted
    #[must_use]
    pub fn kid(&self) -> Option<&str> {
        match self {
            Self::Format(inner) => inner.kid(),
            Self::UnsupportedKeyType { kid, .. } => Some(kid),
        }
    }
}

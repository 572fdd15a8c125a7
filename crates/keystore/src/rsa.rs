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

use crate::{
    der::{CanonicalInteger, DerNode, RSA_ENCRYPTION_OID},
    pem::{self, PUBLIC_KEY_LABEL, RSA_PUBLIC_KEY_LABEL},
};

/// The public half of an RSA key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    modulus: CanonicalInteger,
    public_exponent: CanonicalInteger,
}

impl RsaPublicKey {
    /// Build a key from the unsigned big-endian modulus and public exponent
    #[must_use]
    pub fn new(n: &[u8], e: &[u8]) -> Self {
        Self {
            modulus: CanonicalInteger::from_unsigned_be(n),
            public_exponent: CanonicalInteger::from_unsigned_be(e),
        }
    }

    #[must_use]
    pub fn modulus(&self) -> &CanonicalInteger {
        &self.modulus
    }

    #[must_use]
    pub fn public_exponent(&self) -> &CanonicalInteger {
        &self.public_exponent
    }

    /// Serialize the key as a PKCS#1 `RSAPublicKey`
    ///
    /// ```text
    /// RSAPublicKey ::= SEQUENCE {
    ///     modulus           INTEGER,  -- n
    ///     publicExponent    INTEGER   -- e
    /// }
    /// ```
    #[must_use]
    pub fn to_pkcs1_der(&self) -> Vec<u8> {
        DerNode::Sequence(vec![
            DerNode::Integer(self.modulus.clone()),
            DerNode::Integer(self.public_exponent.clone()),
        ])
        .to_der()
    }

    /// Serialize the key as an X.509 `SubjectPublicKeyInfo`
    #[must_use]
    pub fn to_public_key_der(&self) -> Vec<u8> {
        subject_public_key_info(self.to_pkcs1_der())
    }

    /// Serialize the key as a PKCS#1 PEM document (`RSA PUBLIC KEY`)
    #[must_use]
    pub fn to_pkcs1_pem(&self) -> String {
        pem::armor(&self.to_pkcs1_der(), RSA_PUBLIC_KEY_LABEL)
    }

    /// Serialize the key as a `SubjectPublicKeyInfo` PEM document
    /// (`PUBLIC KEY`)
    #[must_use]
    pub fn to_public_key_pem(&self) -> String {
        pem::armor(&self.to_public_key_der(), PUBLIC_KEY_LABEL)
    }
}

/// Wrap a DER-encoded `RSAPublicKey` in a `SubjectPublicKeyInfo`
///
/// ```text
/// SubjectPublicKeyInfo ::= SEQUENCE {
///     algorithm         AlgorithmIdentifier,
///     subjectPublicKey  BIT STRING
/// }
///
/// AlgorithmIdentifier ::= SEQUENCE {
///     algorithm         OBJECT IDENTIFIER, -- rsaEncryption
///     parameters        NULL
/// }
/// ```
#[must_use]
pub fn subject_public_key_info(rsa_public_key_der: Vec<u8>) -> Vec<u8> {
    let algorithm = DerNode::Sequence(vec![
        DerNode::ObjectIdentifier(RSA_ENCRYPTION_OID.to_vec()),
        DerNode::Null,
    ]);

    DerNode::Sequence(vec![algorithm, DerNode::bit_string(rsa_public_key_der)]).to_der()
}

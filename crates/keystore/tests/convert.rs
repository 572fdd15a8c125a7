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

//! Cross-check the produced documents with the RustCrypto parsers

use base64ct::Encoding;
use der::Decode;
use jwkpem_jose::{JsonWebKeyRecord, JsonWebKeySet};
use jwkpem_keystore::{convert, convert_with, ConversionError, KeyPemMap, PemFormat};
use rsa::{
    pkcs1::DecodeRsaPublicKey, pkcs8::DecodePublicKey, traits::PublicKeyParts, BigUint,
};

static GOOGLE_JWKS: &str = include_str!("./keys/google.json");
static KEYCLOAK_JWKS: &str = include_str!("./keys/keycloak.json");

const RSA_ENCRYPTION: spki::ObjectIdentifier =
    spki::ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

fn google_jwks() -> JsonWebKeySet {
    JsonWebKeySet::from_json(GOOGLE_JWKS).unwrap()
}

/// Keycloak publishes RSA keys with their self-signed certificate, and EC keys
fn keycloak_jwks() -> JsonWebKeySet {
    JsonWebKeySet::from_json(KEYCLOAK_JWKS).unwrap()
}

fn keycloak_rsa_jwks() -> JsonWebKeySet {
    JsonWebKeySet::new(
        keycloak_jwks()
            .into_iter()
            .filter(JsonWebKeyRecord::is_rsa)
            .collect(),
    )
}

fn check_public_key_pem(record: &JsonWebKeyRecord, pems: &KeyPemMap) {
    let pem = pems.get(record.kid()).expect("key is missing from the map");

    let key = rsa::RsaPublicKey::from_public_key_pem(pem).unwrap();
    assert_eq!(
        key.n(),
        &BigUint::from_bytes_be(&record.modulus().unwrap())
    );
    assert_eq!(
        key.e(),
        &BigUint::from_bytes_be(&record.exponent().unwrap())
    );
}

#[test]
fn google_keys() {
    let jwks = google_jwks();
    let pems = convert(&jwks).unwrap();

    assert_eq!(pems.len(), 2);
    for record in &jwks {
        check_public_key_pem(record, &pems);
    }
}

#[test]
fn keycloak_keys() {
    let jwks = keycloak_rsa_jwks();
    assert_eq!(jwks.len(), 6);

    let pems = convert(&jwks).unwrap();
    assert_eq!(pems.len(), 6);
    for record in &jwks {
        check_public_key_pem(record, &pems);
    }
}

#[test]
fn spki_structure() {
    let jwks = google_jwks();
    let pems = convert(&jwks).unwrap();

    for record in &jwks {
        let pem = pems.get(record.kid()).unwrap();
        let (label, der) = pem_rfc7468::decode_vec(pem.as_bytes()).unwrap();
        assert_eq!(label, "PUBLIC KEY");

        let spki = spki::SubjectPublicKeyInfoRef::from_der(&der).unwrap();
        assert_eq!(spki.algorithm.oid, RSA_ENCRYPTION);
        assert_eq!(spki.algorithm.parameters, Some(der::asn1::AnyRef::NULL));
        assert_eq!(spki.subject_public_key.unused_bits(), 0);

        let inner = spki.subject_public_key.raw_bytes();
        let key = pkcs1::RsaPublicKey::from_der(inner).unwrap();
        assert_eq!(key.modulus.as_bytes(), record.modulus().unwrap());
        assert_eq!(key.public_exponent.as_bytes(), &[0x01, 0x00, 0x01]);
    }
}

#[test]
fn pem_lines() {
    let pems = convert(&google_jwks()).unwrap();

    for (_kid, pem) in pems.iter() {
        let lines: Vec<&str> = pem.lines().collect();
        assert_eq!(lines.first(), Some(&"-----BEGIN PUBLIC KEY-----"));
        assert_eq!(lines.last(), Some(&"-----END PUBLIC KEY-----"));

        let body = &lines[1..lines.len() - 1];
        let (last, full) = body.split_last().unwrap();
        assert!(full.iter().all(|line| line.len() == 64));
        assert!(!last.is_empty() && last.len() <= 64);
    }
}

#[test]
fn matches_certificate_public_key() {
    // The SubjectPublicKeyInfo must be byte-for-byte the one embedded in the
    // certificate published alongside the key
    let document: serde_json::Value = serde_json::from_str(KEYCLOAK_JWKS).unwrap();
    let pems = convert(&keycloak_rsa_jwks()).unwrap();

    let mut checked = 0;
    for key in document["keys"].as_array().unwrap() {
        let Some(certificate) = key["x5c"][0].as_str() else {
            continue;
        };
        let certificate = base64ct::Base64::decode_vec(certificate).unwrap();

        let pem = pems.get(key["kid"].as_str().unwrap()).unwrap();
        let (_label, der) = pem_rfc7468::decode_vec(pem.as_bytes()).unwrap();

        assert!(
            certificate.windows(der.len()).any(|window| window == der),
            "public key not found in the certificate"
        );
        checked += 1;
    }

    assert_eq!(checked, 6);
}

#[test]
fn pkcs1_keys() {
    let jwks = google_jwks();
    let pems = convert_with(&jwks, PemFormat::Pkcs1).unwrap();

    for record in &jwks {
        let pem = pems.get(record.kid()).unwrap();
        let key = rsa::RsaPublicKey::from_pkcs1_pem(pem).unwrap();
        assert_eq!(
            key.n(),
            &BigUint::from_bytes_be(&record.modulus().unwrap())
        );
    }
}

#[test]
fn modulus_with_leading_zero() {
    // Some providers keep the sign byte in `n`, it must not be doubled
    let jwks = google_jwks();
    let original = &jwks[0];
    let mut n = vec![0x00];
    n.extend_from_slice(&original.modulus().unwrap());

    let record = JsonWebKeyRecord::rsa(
        "padded",
        jwkpem_jose::base64::encode(&n),
        "AQAB",
    );
    let pems = convert([&record]).unwrap();
    let padded = pems.get("padded").unwrap();

    let pems = convert([original]).unwrap();
    let unpadded = pems.get(original.kid()).unwrap();

    assert_eq!(padded, unpadded);
}

#[test]
fn ec_key_fails_the_whole_set() {
    let jwks = keycloak_jwks();
    let err = convert(&jwks).unwrap_err();

    assert!(matches!(
        &err,
        ConversionError::UnsupportedKeyType { kty, .. } if kty == "EC"
    ));
    assert_eq!(err.kid(), Some("VlsIs1LssBo6r8EuXJo81rDEoTYpUjiMkeq_PlapKfY"));
}

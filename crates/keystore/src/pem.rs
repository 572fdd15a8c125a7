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

//! PEM armoring of DER documents
//!
//! Ref: <https://www.rfc-editor.org/rfc/rfc7468>

use base64ct::Encoding;

/// Label of `SubjectPublicKeyInfo` documents
pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

/// Label of PKCS#1 `RSAPublicKey` documents
pub const RSA_PUBLIC_KEY_LABEL: &str = "RSA PUBLIC KEY";

/// Number of base64 characters per line
pub const LINE_WIDTH: usize = 64;

/// Armor a DER document as PEM, with `\n` line endings
#[must_use]
pub fn armor(der: &[u8], label: &str) -> String {
    let body = base64ct::Base64::encode_string(der);

    let mut pem = String::with_capacity(body.len() + body.len() / LINE_WIDTH + 2 * label.len() + 32);
    pem.push_str("-----BEGIN ");
    pem.push_str(label);
    pem.push_str("-----\n");

    // The base64 alphabet is ASCII, so chunking the bytes keeps valid UTF-8
    for line in body.as_bytes().chunks(LINE_WIDTH) {
        pem.extend(line.iter().copied().map(char::from));
        pem.push('\n');
    }

    pem.push_str("-----END ");
    pem.push_str(label);
    pem.push_str("-----\n");
    pem
}

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

//! Unpadded base64url decoding, as used by the numeric members of a JWK.
//!
//! Ref: <https://www.rfc-editor.org/rfc/rfc7515#appendix-C>

use base64ct::Encoding;
use thiserror::Error;

/// Error returned when a string is not valid unpadded base64url
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("invalid length {length}, no base64 input can have this length")]
    InvalidLength { length: usize },

    #[error("malformed base64 input")]
    Malformed,
}

impl From<base64ct::Error> for DecodeError {
    fn from(_: base64ct::Error) -> Self {
        Self::Malformed
    }
}

const fn is_url_safe(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_'
}

/// Decode an unpadded base64url string.
///
/// The input is translated to the standard alphabet and padded, then decoded
/// with the regular base64 decoder.
///
/// # Errors
///
/// Returns an error if the input contains a character outside of
/// `[A-Za-z0-9-_]` (which includes padding), if its length can't be the length
/// of a base64 string, or if the trailing bits are not canonical.
pub fn decode(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    if let Some((position, character)) = encoded
        .char_indices()
        .find(|(_, c)| u8::try_from(*c).map_or(true, |b| !is_url_safe(b)))
    {
        return Err(DecodeError::InvalidCharacter {
            character,
            position,
        });
    }

    let length = encoded.len();
    if length % 4 == 1 {
        return Err(DecodeError::InvalidLength { length });
    }

    let mut standard: String = encoded
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();

    while standard.len() % 4 != 0 {
        standard.push('=');
    }

    let bytes = base64ct::Base64::decode_vec(&standard)?;
    Ok(bytes)
}

/// Encode bytes as unpadded base64url.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    base64ct::Base64UrlUnpadded::encode_string(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_exponent() {
        assert_eq!(decode("AQAB").unwrap(), vec![0x01, 0x00, 0x01]);
    }

    #[test]
    fn decode_url_safe_alphabet() {
        // 0xfb 0xff maps to `-_8` in base64url, `+/8` in standard base64
        assert_eq!(decode("-_8").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn round_trip() {
        let samples: [&[u8]; 6] = [
            b"",
            b"\x00",
            b"\xff\xfe",
            b"\x01\x00\x01",
            b"hello world",
            &[0x80; 257],
        ];

        for bytes in samples {
            assert_eq!(decode(&encode(bytes)).unwrap(), bytes);
        }
    }

    #[test]
    fn reject_standard_alphabet_and_padding() {
        assert_eq!(
            decode("+/8"),
            Err(DecodeError::InvalidCharacter {
                character: '+',
                position: 0
            })
        );
        assert_eq!(
            decode("AB/8"),
            Err(DecodeError::InvalidCharacter {
                character: '/',
                position: 2
            })
        );
        assert_eq!(
            decode("AQ=="),
            Err(DecodeError::InvalidCharacter {
                character: '=',
                position: 2
            })
        );
        assert!(matches!(
            decode("AQé"),
            Err(DecodeError::InvalidCharacter { character: 'é', .. })
        ));
    }

    #[test]
    fn reject_impossible_length() {
        assert_eq!(decode("A"), Err(DecodeError::InvalidLength { length: 1 }));
        assert_eq!(
            decode("AQABA"),
            Err(DecodeError::InvalidLength { length: 5 })
        );
    }

    #[test]
    fn reject_non_canonical_trailing_bits() {
        // "AR" would carry non-zero bits past the single decoded byte
        assert_eq!(decode("AR"), Err(DecodeError::Malformed));
    }
}

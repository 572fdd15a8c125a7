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

/// The content octets of a non-negative DER `INTEGER`.
///
/// DER integers are minimal two's-complement big-endian values: leading zero
/// bytes are stripped, and a single zero byte is prepended when the most
/// significant bit is set, so that the value is not read as negative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalInteger {
    bytes: Vec<u8>,
}

impl CanonicalInteger {
    /// Canonicalize an unsigned big-endian integer
    #[must_use]
    pub fn from_unsigned_be(bytes: &[u8]) -> Self {
        let start = bytes
            .iter()
            .position(|b| *b != 0)
            .unwrap_or(bytes.len());
        let significant = &bytes[start..];

        let mut canonical = Vec::with_capacity(significant.len() + 1);
        match significant.first() {
            // Zero is encoded as a single null byte
            None => canonical.push(0x00),
            Some(first) if *first >= 0x80 => {
                canonical.push(0x00);
                canonical.extend_from_slice(significant);
            }
            Some(_) => canonical.extend_from_slice(significant),
        }

        Self { bytes: canonical }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<&[u8]> for CanonicalInteger {
    fn from(bytes: &[u8]) -> Self {
        Self::from_unsigned_be(bytes)
    }
}

impl AsRef<[u8]> for CanonicalInteger {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_leading_zeroes() {
        assert_eq!(
            CanonicalInteger::from_unsigned_be(&[0x00, 0x00, 0x01, 0x00]).as_bytes(),
            &[0x01, 0x00]
        );
        assert_eq!(
            CanonicalInteger::from_unsigned_be(&[0x01, 0x00]).as_bytes(),
            &[0x01, 0x00]
        );
    }

    #[test]
    fn keep_sign_byte() {
        assert_eq!(
            CanonicalInteger::from_unsigned_be(&[0x00, 0x00, 0x80]).as_bytes(),
            &[0x00, 0x80]
        );
        assert_eq!(
            CanonicalInteger::from_unsigned_be(&[0xff]).as_bytes(),
            &[0x00, 0xff]
        );
        assert_eq!(
            CanonicalInteger::from_unsigned_be(&[0x7f, 0xff]).as_bytes(),
            &[0x7f, 0xff]
        );
    }

    #[test]
    fn zero() {
        assert_eq!(
            CanonicalInteger::from_unsigned_be(&[0x00, 0x00]).as_bytes(),
            &[0x00]
        );
        assert_eq!(CanonicalInteger::from_unsigned_be(&[]).as_bytes(), &[0x00]);
    }
}

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

//! Just enough ASN.1 DER to serialize RSA public keys.
//!
//! Ref: <https://www.itu.int/rec/T-REC-X.690>

mod integer;

pub use self::integer::CanonicalInteger;

/// Universal tags of the types used by public key structures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    Integer = 0x02,
    BitString = 0x03,
    Null = 0x05,
    ObjectIdentifier = 0x06,
    Sequence = 0x30,
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> Self {
        tag as u8
    }
}

/// Content octets of the `rsaEncryption` object identifier
/// (`1.2.840.113549.1.1.1`)
pub const RSA_ENCRYPTION_OID: [u8; 9] = [0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01];

/// Encode a content length, in the short form below 128 and in the minimal
/// long form otherwise
#[must_use]
pub fn encode_length(length: usize) -> Vec<u8> {
    if length < 0x80 {
        // Checked just above
        #[allow(clippy::cast_possible_truncation)]
        return vec![length as u8];
    }

    let be = length.to_be_bytes();
    let start = be.iter().position(|b| *b != 0).unwrap_or(be.len() - 1);
    let significant = &be[start..];

    let mut encoded = Vec::with_capacity(significant.len() + 1);
    // A usize has at most 16 bytes, which fits in the lower 7 bits
    #[allow(clippy::cast_possible_truncation)]
    encoded.push(0x80 | significant.len() as u8);
    encoded.extend_from_slice(significant);
    encoded
}

/// Encode a tag-length-value triplet
#[must_use]
pub fn encode_tlv(tag: Tag, content: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(content.len() + 6);
    write_tlv(&mut encoded, tag, content);
    encoded
}

fn write_tlv(buf: &mut Vec<u8>, tag: Tag, content: &[u8]) {
    buf.push(tag.into());
    buf.extend_from_slice(&encode_length(content.len()));
    buf.extend_from_slice(content);
}

/// A tree of DER values, built for a single key and serialized once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerNode {
    Integer(CanonicalInteger),
    Sequence(Vec<DerNode>),
    BitString {
        bytes: Vec<u8>,
        unused_bits: u8,
    },
    ObjectIdentifier(Vec<u8>),
    Null,
}

impl DerNode {
    /// A `BIT STRING` wrapping whole bytes
    #[must_use]
    pub fn bit_string(bytes: Vec<u8>) -> Self {
        Self::BitString {
            bytes,
            unused_bits: 0,
        }
    }

    #[must_use]
    pub fn tag(&self) -> Tag {
        match self {
            Self::Integer(_) => Tag::Integer,
            Self::Sequence(_) => Tag::Sequence,
            Self::BitString { .. } => Tag::BitString,
            Self::ObjectIdentifier(_) => Tag::ObjectIdentifier,
            Self::Null => Tag::Null,
        }
    }

    /// Serialize the tree
    #[must_use]
    pub fn to_der(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_der(&mut buf);
        buf
    }

    fn write_der(&self, buf: &mut Vec<u8>) {
        match self {
            Self::Integer(value) => write_tlv(buf, Tag::Integer, value.as_bytes()),
            Self::Sequence(children) => {
                let mut content = Vec::new();
                for child in children {
                    child.write_der(&mut content);
                }
                write_tlv(buf, Tag::Sequence, &content);
            }
            Self::BitString { bytes, unused_bits } => {
                let mut content = Vec::with_capacity(bytes.len() + 1);
                content.push(*unused_bits);
                content.extend_from_slice(bytes);
                write_tlv(buf, Tag::BitString, &content);
            }
            Self::ObjectIdentifier(oid) => write_tlv(buf, Tag::ObjectIdentifier, oid),
            Self::Null => write_tlv(buf, Tag::Null, &[]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form_lengths() {
        assert_eq!(encode_length(0), vec![0x00]);
        assert_eq!(encode_length(1), vec![0x01]);
        assert_eq!(encode_length(127), vec![0x7F]);
    }

    #[test]
    fn long_form_lengths() {
        assert_eq!(encode_length(128), vec![0x81, 0x80]);
        assert_eq!(encode_length(255), vec![0x81, 0xFF]);
        assert_eq!(encode_length(256), vec![0x82, 0x01, 0x00]);
        assert_eq!(encode_length(65_535), vec![0x82, 0xFF, 0xFF]);
        assert_eq!(encode_length(65_536), vec![0x83, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn tlv() {
        assert_eq!(encode_tlv(Tag::Null, &[]), vec![0x05, 0x00]);
        assert_eq!(
            encode_tlv(Tag::Integer, &[0x01, 0x00, 0x01]),
            vec![0x02, 0x03, 0x01, 0x00, 0x01]
        );

        let content = vec![0xAB; 300];
        let encoded = encode_tlv(Tag::Sequence, &content);
        assert_eq!(&encoded[..4], &[0x30, 0x82, 0x01, 0x2C]);
        assert_eq!(&encoded[4..], &content[..]);
    }

    #[test]
    fn rsa_encryption_algorithm_identifier() {
        let node = DerNode::Sequence(vec![
            DerNode::ObjectIdentifier(RSA_ENCRYPTION_OID.to_vec()),
            DerNode::Null,
        ]);

        assert_eq!(
            node.to_der(),
            vec![
                0x30, 0x0D, 0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01,
                0x05, 0x00
            ]
        );
    }

    #[test]
    fn nodes_match_tlv_primitives() {
        let integer = CanonicalInteger::from_unsigned_be(&[0x80]);
        assert_eq!(
            DerNode::Integer(integer.clone()).to_der(),
            encode_tlv(Tag::Integer, integer.as_bytes())
        );

        assert_eq!(
            DerNode::bit_string(vec![0x01, 0x02]).to_der(),
            vec![0x03, 0x03, 0x00, 0x01, 0x02]
        );
        assert_eq!(DerNode::Null.tag(), Tag::Null);
        assert_eq!(u8::from(Tag::Sequence), 0x30);
    }
}

//! Person record and its protobuf codec.
//!
//! The wire format is standard protobuf:
//! - field 1: id (varint)
//! - field 2: name (length-delimited UTF-8)
//! - field 3: age (varint)
//!
//! One encoded record per connection; the peer closing its write side is the
//! only message boundary.

use prost::Message;

/// The structured record exchanged between client and server.
#[derive(Clone, PartialEq, Message)]
pub struct Person {
    #[prost(int64, tag = "1")]
    pub id: i64,

    #[prost(string, tag = "2")]
    pub name: String,

    #[prost(int32, tag = "3")]
    pub age: i32,
}

/// Codec errors
#[derive(Debug)]
pub enum CodecError {
    /// The peer closed the connection without sending any bytes. A zero-length
    /// buffer would otherwise decode into a default record, which is never
    /// what a client meant to send.
    EmptyPayload,
    /// Truncated or corrupt protobuf input
    Decode(prost::DecodeError),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::EmptyPayload => write!(f, "Empty payload"),
            CodecError::Decode(e) => write!(f, "Decode failed: {}", e),
        }
    }
}

impl std::error::Error for CodecError {}

/// Encode a record into its protobuf byte representation.
///
/// Encoding into a growable buffer cannot fail.
pub fn encode(person: &Person) -> Vec<u8> {
    person.encode_to_vec()
}

/// Decode a record from a complete received payload.
pub fn decode(bytes: &[u8]) -> Result<Person, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::EmptyPayload);
    }
    Person::decode(bytes).map_err(CodecError::Decode)
}

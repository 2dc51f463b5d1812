//! ICB packet codec: frames a TCP byte stream into length-prefixed packets.
//!
//! Every packet is a single length byte followed by that many payload bytes.
//! The payload is a one character command code followed by zero or more
//! fields separated by 0x01. A zero length byte is padding between packets.
use std::fmt::Display;

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

/// Largest payload a single length byte can describe.
pub const MAX_PAYLOAD_LENGTH: usize = u8::MAX as usize;

pub const FIELD_SEPARATOR: char = '\x01';

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub code: char,
    pub fields: Vec<String>,
}

impl Packet {
    pub fn new<I, S>(code: char, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Packet {
            code,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses one payload (without its length byte). Returns `None` when
    /// nothing but padding and whitespace is left.
    pub fn parse(payload: &[u8]) -> Option<Packet> {
        let bytes: Vec<u8> = payload.iter().copied().filter(|b| *b != 0).collect();
        let text = String::from_utf8_lossy(&bytes);
        let text = text.trim_end();

        let mut chars = text.chars();
        let code = chars.next()?;
        let rest = chars.as_str();

        let fields = if rest.is_empty() {
            vec![]
        } else {
            rest.split(FIELD_SEPARATOR).map(str::to_string).collect()
        };

        Some(Packet { code, fields })
    }

    /// The code and fields joined with 0x01, cut down to fit one length byte.
    pub fn payload(&self) -> Vec<u8> {
        let mut payload = String::new();
        payload.push(self.code);
        payload.push_str(&self.fields.join(&FIELD_SEPARATOR.to_string()));

        if payload.len() > MAX_PAYLOAD_LENGTH {
            let mut end = MAX_PAYLOAD_LENGTH;
            while !payload.is_char_boundary(end) {
                end -= 1;
            }
            warn!(
                "Truncating outbound {} packet from {} to {} bytes",
                self.code,
                payload.len(),
                end
            );
            payload.truncate(end);
        }

        payload.into_bytes()
    }
}

// Renders 0x01 as ^A for protocol traces.
impl Display for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.code, self.fields.join("^A"))
    }
}

#[derive(Debug, Default)]
pub struct IcbCodec;

impl Decoder for IcbCodec {
    type Item = Packet;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            while src.first() == Some(&0) {
                src.advance(1);
            }

            let length = match src.first() {
                Some(l) => *l as usize,
                None => return Ok(None),
            };

            if src.len() < length + 1 {
                src.reserve(length + 1 - src.len());
                return Ok(None);
            }

            src.advance(1);
            let payload = src.split_to(length);

            if let Some(packet) = Packet::parse(&payload) {
                return Ok(Some(packet));
            }
        }
    }
}

impl Encoder<Packet> for IcbCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = item.payload();
        dst.reserve(payload.len() + 1);
        dst.put_u8(payload.len() as u8);
        dst.put_slice(&payload);
        Ok(())
    }
}

//! Opaque event payload and frame codec
//!
//! The core never interprets event contents. An event carries a
//! source-declared kind (so a terminal sink can pick a compatible
//! on-disk representation) and an opaque byte body. The frame codec is
//! what durable sinks use for write-ahead buffering, and what recovery
//! uses to replay leftover buffers.
//!
//! Frame layout (all integers little-endian):
//!
//! ```text
//! [u16 kind_len][kind bytes][u32 body_len][body bytes]
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{Result, StageError};

/// One unit of data flowing through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Source-declared concrete type of the payload
    kind: String,

    /// Opaque serialized payload
    body: Bytes,
}

impl Event {
    /// Create an event from a kind and payload
    pub fn new(kind: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            kind: kind.into(),
            body: body.into(),
        }
    }

    /// Declared payload kind
    #[inline]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Opaque payload bytes
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Encoded frame size in bytes
    pub fn frame_len(&self) -> usize {
        2 + self.kind.len() + 4 + self.body.len()
    }

    /// Append this event's frame to a buffer
    ///
    /// The frame caps the kind at `u16::MAX` bytes and the body at
    /// `u32::MAX` bytes; exceeding either is a caller bug (the length
    /// prefix would silently truncate).
    pub fn encode(&self, buf: &mut BytesMut) {
        debug_assert!(
            self.kind.len() <= u16::MAX as usize,
            "event kind exceeds the frame's u16 length prefix"
        );
        debug_assert!(
            self.body.len() <= u32::MAX as usize,
            "event body exceeds the frame's u32 length prefix"
        );
        buf.reserve(self.frame_len());
        buf.put_u16_le(self.kind.len() as u16);
        buf.put_slice(self.kind.as_bytes());
        buf.put_u32_le(self.body.len() as u32);
        buf.put_slice(&self.body);
    }

    /// Decode one frame from the front of a buffer
    ///
    /// Returns `Ok(None)` when the buffer is empty (clean end of a
    /// stream of frames); a truncated frame is an error.
    pub fn decode(buf: &mut Bytes) -> Result<Option<Event>> {
        if buf.is_empty() {
            return Ok(None);
        }
        if buf.remaining() < 2 {
            return Err(StageError::CorruptFrame("truncated kind length".into()));
        }
        let kind_len = buf.get_u16_le() as usize;
        if buf.remaining() < kind_len {
            return Err(StageError::CorruptFrame("truncated kind".into()));
        }
        let kind = String::from_utf8(buf.split_to(kind_len).to_vec())
            .map_err(|e| StageError::CorruptFrame(format!("kind is not utf-8: {}", e)))?;
        if buf.remaining() < 4 {
            return Err(StageError::CorruptFrame("truncated body length".into()));
        }
        let body_len = buf.get_u32_le() as usize;
        if buf.remaining() < body_len {
            return Err(StageError::CorruptFrame("truncated body".into()));
        }
        let body = buf.split_to(body_len);
        Ok(Some(Event { kind, body }))
    }
}

#[cfg(test)]
#[path = "event_test.rs"]
mod event_test;

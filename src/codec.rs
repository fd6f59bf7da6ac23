use std::io::Cursor;

use bytes::{Buf, BytesMut};
use thiserror::Error as ThisError;
use tokio_util::codec::{Decoder, Encoder};

use crate::frame::{self, Frame};

/// Upper bound on the accumulation buffer, to keep a misbehaving client from
/// growing it without limit.
const MAX_FRAME_SIZE: usize = 512 * 1024 * 1024;

#[derive(Debug, ThisError)]
pub enum Error {
    /// The buffer prefix is not a syntactically valid frame. Recoverable:
    /// the session reports it to the client and discards the buffer.
    #[error("{0}")]
    Protocol(#[from] frame::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Incremental RESP framing over a `BytesMut` accumulation buffer. The codec
/// holds no state of its own: a frame that is not yet complete leaves the
/// buffer untouched and decoding simply restarts from the same bytes on the
/// next call.
pub struct FrameCodec;

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() > MAX_FRAME_SIZE {
            return Err(frame::Error::InvalidFormat.into());
        }

        let mut cursor = Cursor::new(&src[..]);
        let frame = match Frame::parse(&mut cursor) {
            Ok(frame) => frame,
            // Not enough data to parse a frame; read more.
            Err(frame::Error::Incomplete) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        // Remove the parsed frame from the buffer.
        let consumed = cursor.position() as usize;
        src.advance(consumed);

        Ok(Some(frame))
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&frame.serialize());
        Ok(())
    }
}

/// Checks the shape a client command must have: a non-empty array whose
/// elements are all bulk strings, the verb at index 0. Violations are
/// reported as an error message for the client, never as a hard failure; the
/// connection stays usable.
pub fn validate_command(frame: &Frame) -> Result<(), String> {
    let elements = match frame {
        Frame::Array(elements) => elements,
        frame => {
            return Err(format!(
                "invalid input {}. Commands must be an array of bulk strings",
                frame
            ))
        }
    };

    if elements.is_empty() {
        return Err("command not informed".to_string());
    }

    for element in elements {
        if !matches!(element, Frame::Bulk(_)) {
            return Err(format!(
                "invalid command element {}. Commands must be an array of bulk strings",
                element
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn decode_pipelined_frames() {
        let f1 = Frame::Array(vec![
            Frame::Bulk(Bytes::from("SET")),
            Frame::Bulk(Bytes::from("name")),
            Frame::Bulk(Bytes::from("john")),
        ]);
        let f2 = Frame::Array(vec![
            Frame::Bulk(Bytes::from("GET")),
            Frame::Bulk(Bytes::from("name")),
        ]);

        let mut buffer = BytesMut::new();
        buffer.extend_from_slice(&f1.serialize());
        buffer.extend_from_slice(&f2.serialize());

        let mut codec = FrameCodec;

        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(f1));
        assert_eq!(buffer.len(), f2.serialize().len());
        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(f2));
        assert_eq!(codec.decode(&mut buffer).unwrap(), None);
        assert!(buffer.is_empty());
    }

    #[test]
    fn decode_fragmented_frame() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("GET")),
            Frame::Bulk(Bytes::from("name")),
        ]);
        let bytes = frame.serialize();
        let (head, tail) = bytes.split_at(bytes.len() / 2);

        let mut codec = FrameCodec;
        let mut buffer = BytesMut::from(head);

        // The first half is pending and must be left in the buffer.
        assert_eq!(codec.decode(&mut buffer).unwrap(), None);
        assert_eq!(buffer.len(), head.len());

        buffer.extend_from_slice(tail);
        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(frame));
    }

    #[test]
    fn decode_protocol_error() {
        let mut codec = FrameCodec;
        let mut buffer = BytesMut::from(&b"$abc\r\n"[..]);

        let err = codec.decode(&mut buffer).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(frame::Error::InvalidBulkLength(_))
        ));
    }

    #[test]
    fn encode_frame() {
        let mut codec = FrameCodec;
        let mut buffer = BytesMut::new();

        codec
            .encode(Frame::Simple("OK".to_string()), &mut buffer)
            .unwrap();

        assert_eq!(&buffer[..], b"+OK\r\n");
    }

    #[test]
    fn validate_command_accepts_array_of_bulk_strings() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("GET")),
            Frame::Bulk(Bytes::from("name")),
        ]);

        assert!(validate_command(&frame).is_ok());
    }

    #[test]
    fn validate_command_rejects_non_array() {
        let err = validate_command(&Frame::Simple("GET".to_string())).unwrap_err();
        assert!(err.contains("array of bulk strings"));
    }

    #[test]
    fn validate_command_rejects_empty_array() {
        let err = validate_command(&Frame::Array(vec![])).unwrap_err();
        assert_eq!(err, "command not informed");
    }

    #[test]
    fn validate_command_rejects_non_bulk_elements() {
        let frame = Frame::Array(vec![Frame::Integer(1)]);
        let err = validate_command(&frame).unwrap_err();
        assert!(err.contains("bulk strings"));
    }
}

// https://redis.io/docs/reference/protocol-spec

use std::fmt;
use std::io::Cursor;

use bytes::Buf;
use bytes::Bytes;
use thiserror::Error as ThisError;

static CRLF: &[u8; 2] = b"\r\n";

// Upper bounds on declared sizes, mirroring the protocol limits of the real
// server (512mb bulk strings, 1m array elements). Length and count fields are
// attacker controlled, so anything larger is malformed input, not a pending
// frame, and must never reach an allocation or arithmetic step.
const MAX_BULK_LENGTH: usize = 512 * 1024 * 1024;
const MAX_ARRAY_LENGTH: usize = 1024 * 1024;

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("invalid frame data type: {0}")]
    InvalidDataType(u8),
    #[error("error converting integer value: {0}")]
    InvalidInteger(String),
    #[error("invalid bulk string length: {0}")]
    InvalidBulkLength(String),
    #[error("invalid array length: {0}")]
    InvalidArrayLength(String),
    #[error("protocol error; invalid frame format")]
    InvalidFormat,
}

/// One RESP value. Commands travel as an `Array` of `Bulk` elements; replies
/// may be any variant. `Bulk` is binary safe, everything else is text.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    Array(Vec<Frame>),
}

impl Frame {
    /// Parses one frame out of the buffer, advancing the cursor past exactly
    /// the consumed bytes. Returns `Error::Incomplete` when the buffer does
    /// not yet hold a full frame; the caller must retry from the start once
    /// more bytes arrive. Parsing is stateless: re-parsing the same bytes
    /// yields the same frame and the same cursor position.
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        // The first byte in a RESP-serialized payload always identifies its
        // type. Subsequent bytes constitute the type's contents.
        let first_byte = get_byte(src)?;
        let data_type = DataType::try_from(first_byte)?;

        match data_type {
            DataType::SimpleString => {
                let bytes = get_line(src)?.to_vec();
                let string = String::from_utf8(bytes).map_err(|_| Error::InvalidFormat)?;
                Ok(Frame::Simple(string))
            }
            DataType::SimpleError => {
                let bytes = get_line(src)?.to_vec();
                let string = String::from_utf8(bytes).map_err(|_| Error::InvalidFormat)?;
                Ok(Frame::Error(string))
            }
            DataType::Integer => {
                let line = String::from_utf8_lossy(get_line(src)?).to_string();
                let integer = line
                    .parse::<i64>()
                    .map_err(|_| Error::InvalidInteger(line))?;
                Ok(Frame::Integer(integer))
            }
            // $<length>\r\n<data>\r\n
            //
            // The payload is taken by length, never by scanning for CRLF, so
            // bulk strings may contain any byte sequence.
            DataType::BulkString => {
                let line = String::from_utf8_lossy(get_line(src)?).to_string();
                let length = line
                    .parse::<usize>()
                    .ok()
                    .filter(|length| *length <= MAX_BULK_LENGTH)
                    .ok_or(Error::InvalidBulkLength(line))?;

                let start = src.position() as usize;
                if src.remaining() < length + CRLF.len() {
                    return Err(Error::Incomplete);
                }

                let data = Bytes::copy_from_slice(&src.get_ref()[start..start + length]);
                src.advance(length);

                if get_byte(src)? != CRLF[0] || get_byte(src)? != CRLF[1] {
                    return Err(Error::InvalidFormat);
                }

                Ok(Frame::Bulk(data))
            }
            // *<number-of-elements>\r\n<element-1>...<element-n>
            DataType::Array => {
                let line = String::from_utf8_lossy(get_line(src)?).to_string();
                let length = line
                    .parse::<usize>()
                    .ok()
                    .filter(|length| *length <= MAX_ARRAY_LENGTH)
                    .ok_or(Error::InvalidArrayLength(line))?;

                // A pending child makes the whole array pending; no partial
                // progress is kept between calls. The capacity is clamped so
                // the declared count alone cannot drive the allocation.
                let mut frames = Vec::with_capacity(length.min(64));
                for _ in 0..length {
                    let frame = Self::parse(src)?;
                    frames.push(frame);
                }

                Ok(Frame::Array(frames))
            }
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Frame::Simple(s) => {
                let mut bytes = Vec::with_capacity(1 + s.len() + CRLF.len());
                bytes.push(u8::from(DataType::SimpleString));
                bytes.extend_from_slice(s.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Error(s) => {
                let mut bytes = Vec::with_capacity(1 + s.len() + CRLF.len());
                bytes.push(u8::from(DataType::SimpleError));
                bytes.extend_from_slice(s.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Integer(i) => {
                let digits = i.to_string();
                let mut bytes = Vec::with_capacity(1 + digits.len() + CRLF.len());
                bytes.push(u8::from(DataType::Integer));
                bytes.extend_from_slice(digits.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Bulk(bytes) => {
                let length_str = bytes.len().to_string();
                let mut result = Vec::with_capacity(
                    1 + length_str.len() + CRLF.len() + bytes.len() + CRLF.len(),
                );
                result.push(u8::from(DataType::BulkString));
                result.extend_from_slice(length_str.as_bytes());
                result.extend_from_slice(CRLF);
                result.extend_from_slice(bytes);
                result.extend_from_slice(CRLF);
                result
            }
            Frame::Array(arr) => {
                let length_str = arr.len().to_string();
                let mut bytes = Vec::with_capacity(1 + length_str.len() + CRLF.len());
                bytes.push(u8::from(DataType::Array));
                bytes.extend_from_slice(length_str.as_bytes());
                bytes.extend_from_slice(CRLF);
                for frame in arr {
                    bytes.extend(frame.serialize());
                }
                bytes
            }
        }
    }
}

impl From<Frame> for Vec<u8> {
    fn from(frame: Frame) -> Self {
        frame.serialize()
    }
}

/// The command-argument textual form: raw text for strings, decimal for
/// integers, a debug join for arrays. Used by the dispatcher to read verbs,
/// keys and numeric arguments out of bulk frames; never sent over the wire.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "{}", s),
            Frame::Error(s) => write!(f, "{}", s),
            Frame::Integer(i) => write!(f, "{}", i),
            Frame::Bulk(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
            Frame::Array(arr) => {
                let elements: Vec<String> = arr.iter().map(|frame| frame.to_string()).collect();
                write!(f, "Array[{}]", elements.join(","))
            }
        }
    }
}

fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let end = src.get_ref().len();

    let line_end_position = src.get_ref()[start..end]
        .windows(2)
        .position(|window| window == CRLF)
        .ok_or(Error::Incomplete)
        .map(|index| start + index)?;

    src.set_position((line_end_position + CRLF.len()) as u64);

    Ok(&src.get_ref()[start..line_end_position])
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}

#[derive(Debug)]
enum DataType {
    SimpleString, // '+'
    SimpleError,  // '-'
    Integer,      // ':'
    BulkString,   // '$'
    Array,        // '*'
}

impl TryFrom<u8> for DataType {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Error> {
        match byte {
            b'+' => Ok(Self::SimpleString),
            b'-' => Ok(Self::SimpleError),
            b':' => Ok(Self::Integer),
            b'$' => Ok(Self::BulkString),
            b'*' => Ok(Self::Array),
            _ => Err(Error::InvalidDataType(byte)),
        }
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        match value {
            DataType::SimpleString => b'+',
            DataType::SimpleError => b'-',
            DataType::Integer => b':',
            DataType::BulkString => b'$',
            DataType::Array => b'*',
        }
    }
}

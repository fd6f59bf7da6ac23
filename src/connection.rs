use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, Encoder};
use uuid::Uuid;

use crate::codec::{self, FrameCodec};
use crate::frame::Frame;

pub struct Connection {
    pub id: Uuid,
    stream: TcpStream,
    codec: FrameCodec,
    // Data is read from the socket into the read buffer. When a frame is
    // parsed, the corresponding bytes are removed from the buffer, so
    // pipelined frames from a single read are decoded one by one.
    buffer: BytesMut,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            stream,
            codec: FrameCodec,
            // Allocate the buffer with 4kb of capacity.
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Reads one complete frame, buffering socket reads until the codec can
    /// produce it. Returns `Ok(None)` on a clean EOF.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, codec::Error> {
        loop {
            if let Some(frame) = self.codec.decode(&mut self.buffer)? {
                return Ok(Some(frame));
            }

            if self.stream.read_buf(&mut self.buffer).await? == 0 {
                // A clean shutdown only happens on a frame boundary.
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(std::io::Error::from(std::io::ErrorKind::ConnectionReset).into());
            }
        }
    }

    pub async fn write_frame(&mut self, frame: Frame) -> Result<(), codec::Error> {
        let mut bytes = BytesMut::new();
        self.codec.encode(frame, &mut bytes)?;
        self.stream.write_all(&bytes).await?;
        Ok(())
    }

    /// Drops whatever is left in the accumulation buffer. Used after a
    /// protocol error: the malformed prefix is unrecoverable, but the
    /// connection itself stays usable.
    pub fn discard_buffer(&mut self) {
        self.buffer.clear();
    }
}

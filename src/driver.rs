//! Per-connection read/decode/dispatch/write loop.

use crate::codec::{finalize_checksum, Frame};
use crate::server::Server;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Drives one accepted connection: reads bytes, feeds them to the frame
/// codec and link state machine one frame at a time, finalizes the
/// outbound checksum, applies the grinder, and writes the result.
///
/// Terminates on EOF or I/O error, at which point the link state is
/// implicitly dropped along with the `Server` — there is no persisted
/// state across reconnects.
pub struct ConnectionDriver<S> {
    stream: S,
    server: Server,
    buf: BytesMut,
}

impl<S> ConnectionDriver<S>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    pub fn new(stream: S, server: Server) -> Self {
        Self {
            stream,
            server,
            buf: BytesMut::with_capacity(512),
        }
    }

    pub fn server(&self) -> &Server {
        &self.server
    }

    /// Run until the stream closes or errors.
    pub async fn run(mut self) -> std::io::Result<()> {
        let mut chunk = [0u8; 512];
        loop {
            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                log::debug!("connection {:?}: EOF", self.server.id);
                return Ok(());
            }
            self.buf.extend_from_slice(&chunk[..n]);
            self.drain_buffer().await?;
        }
    }

    async fn drain_buffer(&mut self) -> std::io::Result<()> {
        loop {
            match Frame::decode(&self.buf, self.server.ca_width) {
                Some((frame, consumed)) => {
                    log::debug!("connection {:?}: decoded frame {:?}", self.server.id, frame);
                    let _ = self.buf.split_to(consumed);
                    if let Some(reply) = self.server.step(frame) {
                        self.send(reply).await?;
                    }
                }
                None => {
                    // Either incomplete (wait for more bytes) or garbage
                    // (skip one byte and retry) — FT 1.2 gives no way to
                    // tell these apart; see codec::Frame::decode.
                    if self.buf.len() >= 2 && !looks_like_frame_start(self.buf[0]) {
                        let _ = self.buf.split_to(1);
                        continue;
                    }
                    return Ok(());
                }
            }
        }
    }

    async fn send(&mut self, frame: Frame) -> std::io::Result<()> {
        let bytes = finalize_checksum(frame.encode(self.server.ca_width));
        let bytes = self.server.grinder.apply(bytes);
        log::debug!("connection {:?}: sending {} bytes", self.server.id, bytes.len());
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await
    }
}

fn looks_like_frame_start(byte: u8) -> bool {
    matches!(byte, 0xe5 | 0x10 | 0x68)
}

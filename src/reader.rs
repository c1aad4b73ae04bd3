// MIT License - Copyright (c) 2026 Peter Wright
// AlarmDecoder protocol

//! Line reader and raw writer over a duplex byte stream.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::command::KeypadCommand;
use crate::error::{DecoderError, Result};
use crate::message::{parse, AlarmMessage};

/// Longest accepted line, excluding the newline.
pub const MAX_LINE_LEN: usize = 64 * 1024;

const READ_CHUNK: usize = 4096;

/// Reads keypad messages from, and writes keystrokes to, an AlarmDecoder device.
///
/// Incoming bytes are kept in one buffer. `start` marks the first byte of the
/// current unread line and `scanned` how far the buffer has already been
/// searched for a newline, so every byte is scanned exactly once.
pub struct AlarmDecoder<T> {
    inner: T,
    buf: Vec<u8>,
    start: usize,
    scanned: usize,
    /// Dropping bytes of an oversize line until its newline arrives
    discarding: bool,
    closed: bool,
}

impl<T> AlarmDecoder<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(READ_CHUNK),
            start: 0,
            scanned: 0,
            discarding: false,
            closed: false,
        }
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Return the transport. Buffered but unread bytes are lost.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Whether the transport has reported end of stream.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Pop the next complete line out of the buffer, if there is one.
    fn take_line(&mut self) -> Result<Option<String>> {
        loop {
            let Some(offset) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') else {
                self.scanned = self.buf.len();
                if self.discarding {
                    self.start = self.buf.len();
                } else if self.buf.len() - self.start > MAX_LINE_LEN {
                    warn!("Dropping line longer than {} bytes", MAX_LINE_LEN);
                    self.start = self.buf.len();
                    self.discarding = true;
                    return Err(DecoderError::LineTooLong { limit: MAX_LINE_LEN });
                }
                return Ok(None);
            };

            let end = self.scanned + offset;
            let line_start = self.start;
            self.start = end + 1;
            self.scanned = self.start;

            if self.discarding {
                self.discarding = false;
                continue;
            }
            return decode_line(&self.buf[line_start..end]).map(Some);
        }
    }

    /// After end of stream: the unterminated tail as a last line, then `TransportClosed`.
    fn take_remainder(&mut self) -> Result<String> {
        if self.discarding {
            self.discarding = false;
            self.start = self.buf.len();
        }
        if self.start == self.buf.len() {
            return Err(DecoderError::TransportClosed);
        }
        let line_start = self.start;
        self.start = self.buf.len();
        self.scanned = self.start;
        decode_line(&self.buf[line_start..])
    }
}

impl<T: AsyncRead + Unpin> AlarmDecoder<T> {
    /// Read and decode the next keypad message.
    ///
    /// Parse errors are returned as [`DecoderError::Parse`] and leave the
    /// stream usable. Once the transport is exhausted every call returns
    /// [`DecoderError::TransportClosed`].
    ///
    /// Cancel safe: dropping the future loses no data.
    pub async fn read_message(&mut self) -> Result<AlarmMessage> {
        let line = self.read_line().await?;
        Ok(parse(&line)?)
    }

    /// Read the next line without decoding it. A trailing `\r` is removed.
    pub async fn read_line(&mut self) -> Result<String> {
        loop {
            if let Some(line) = self.take_line()? {
                debug!("Received line: {}", line);
                return Ok(line);
            }
            if self.closed {
                return self.take_remainder();
            }
            self.fill_buf().await?;
        }
    }

    async fn fill_buf(&mut self) -> Result<()> {
        if self.start > 0 {
            self.buf.drain(..self.start);
            self.scanned -= self.start;
            self.start = 0;
        }
        self.buf.reserve(READ_CHUNK);
        let n = self.inner.read_buf(&mut self.buf).await?;
        if n == 0 {
            debug!("Reader: transport closed");
            self.closed = true;
        }
        Ok(())
    }
}

impl<T: AsyncWrite + Unpin> AlarmDecoder<T> {
    /// Write bytes to the device verbatim and flush.
    pub async fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Send a keypad command.
    pub async fn send(&mut self, command: &KeypadCommand) -> Result<()> {
        let bytes = command.to_wire_bytes()?;
        debug!("Sending keypad command: {}", command.name());
        self.write_raw(&bytes).await
    }
}

fn decode_line(bytes: &[u8]) -> Result<String> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    if bytes.len() > MAX_LINE_LEN {
        return Err(DecoderError::LineTooLong { limit: MAX_LINE_LEN });
    }
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use tokio::io::ReadBuf;

    use crate::error::ParseErrorKind;

    const ALARM_LINE: &[u8] = b"[00000000011000003A--],,,\"test\"\n";

    /// Transport that hands out one scripted chunk per read and records writes.
    #[derive(Default)]
    struct ScriptedStream {
        chunks: VecDeque<io::Result<Vec<u8>>>,
        written: Vec<u8>,
    }

    impl ScriptedStream {
        fn new(chunks: Vec<&[u8]>) -> Self {
            Self {
                chunks: chunks.into_iter().map(|c| Ok(c.to_vec())).collect(),
                written: Vec::new(),
            }
        }
    }

    impl AsyncRead for ScriptedStream {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            match self.chunks.pop_front() {
                None => Poll::Ready(Ok(())),
                Some(Err(e)) => Poll::Ready(Err(e)),
                Some(Ok(mut chunk)) => {
                    let n = chunk.len().min(buf.remaining());
                    buf.put_slice(&chunk[..n]);
                    if n < chunk.len() {
                        self.chunks.push_front(Ok(chunk.split_off(n)));
                    }
                    Poll::Ready(Ok(()))
                }
            }
        }
    }

    impl AsyncWrite for ScriptedStream {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            self.written.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_read_single_line() {
        let mut decoder = AlarmDecoder::new(ScriptedStream::new(vec![ALARM_LINE]));
        let msg = decoder.read_message().await.unwrap();
        assert_eq!(msg.raw_line(), "[00000000011000003A--],,,\"test\"");
        assert!(msg.is_alarm_sounding());
        assert!(msg.alarm_has_occurred());
        assert_eq!(msg.keypad_text(), "test");
        assert_eq!(msg.zone(), "");
    }

    #[tokio::test]
    async fn test_split_at_every_offset() {
        let mut whole = AlarmDecoder::new(ScriptedStream::new(vec![ALARM_LINE]));
        let expected = whole.read_message().await.unwrap();

        for split in 1..ALARM_LINE.len() {
            let (a, b) = ALARM_LINE.split_at(split);
            let mut decoder = AlarmDecoder::new(ScriptedStream::new(vec![a, b]));
            let msg = decoder.read_message().await.unwrap();
            assert_eq!(msg, expected, "split at {split}");
            assert!(matches!(
                decoder.read_message().await,
                Err(DecoderError::TransportClosed)
            ));
        }
    }

    #[tokio::test]
    async fn test_byte_at_a_time() {
        let chunks: Vec<&[u8]> = ALARM_LINE.chunks(1).collect();
        let mut decoder = AlarmDecoder::new(ScriptedStream::new(chunks));
        let msg = decoder.read_message().await.unwrap();
        assert_eq!(msg.keypad_text(), "test");
    }

    #[tokio::test]
    async fn test_multiple_lines_in_one_read() {
        let data: &[u8] = b"[10000000000000003A--],001,,\"one\"\n[00000000000000003A--],002,,\"two\"\n";
        let mut decoder = AlarmDecoder::new(ScriptedStream::new(vec![data]));
        assert_eq!(decoder.read_message().await.unwrap().zone(), "001");
        assert_eq!(decoder.read_message().await.unwrap().zone(), "002");
        assert!(matches!(
            decoder.read_message().await,
            Err(DecoderError::TransportClosed)
        ));
    }

    #[tokio::test]
    async fn test_crlf_stripped() {
        let data: &[u8] = b"[00000000000000003A--],,,\"crlf\"\r\n";
        let mut decoder = AlarmDecoder::new(ScriptedStream::new(vec![data]));
        let msg = decoder.read_message().await.unwrap();
        assert_eq!(msg.raw_line(), "[00000000000000003A--],,,\"crlf\"");
        assert_eq!(msg.keypad_text(), "crlf");
    }

    #[tokio::test]
    async fn test_unterminated_last_line() {
        let data: &[u8] = b"[00000000000000003A--],,,\"tail\"";
        let mut decoder = AlarmDecoder::new(ScriptedStream::new(vec![data]));
        assert_eq!(decoder.read_message().await.unwrap().keypad_text(), "tail");
        assert!(decoder.is_closed());
        assert!(matches!(
            decoder.read_message().await,
            Err(DecoderError::TransportClosed)
        ));
    }

    #[tokio::test]
    async fn test_closed_is_sticky() {
        let mut decoder = AlarmDecoder::new(ScriptedStream::default());
        for _ in 0..3 {
            assert!(matches!(
                decoder.read_message().await,
                Err(DecoderError::TransportClosed)
            ));
        }
    }

    #[tokio::test]
    async fn test_parse_error_does_not_stop_stream() {
        let data: &[u8] = b"!RFX:0123456,80\n[00000000000000003A--],,,\"ok\"\n";
        let mut decoder = AlarmDecoder::new(ScriptedStream::new(vec![data]));
        let err = decoder.read_message().await.unwrap_err();
        assert_eq!(err.parse_kind(), Some(ParseErrorKind::MalformedFrame));
        assert_eq!(decoder.read_message().await.unwrap().keypad_text(), "ok");
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let stream = ScriptedStream {
            chunks: VecDeque::from(vec![
                Ok(b"[00000000".to_vec()),
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            ]),
            written: Vec::new(),
        };
        let mut decoder = AlarmDecoder::new(stream);
        match decoder.read_message().await {
            Err(DecoderError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("expected I/O error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_line_too_long_recovers() {
        let long = vec![b'x'; MAX_LINE_LEN + 1];
        let rest: &[u8] = b"xxxx\n[00000000000000003A--],,,\"after\"\n";
        let mut decoder = AlarmDecoder::new(ScriptedStream::new(vec![long.as_slice(), rest]));
        assert!(matches!(
            decoder.read_message().await,
            Err(DecoderError::LineTooLong { limit: MAX_LINE_LEN })
        ));
        assert_eq!(decoder.read_message().await.unwrap().keypad_text(), "after");
    }

    #[tokio::test]
    async fn test_write_raw_verbatim() {
        let mut decoder = AlarmDecoder::new(ScriptedStream::default());
        decoder.write_raw(b"#").await.unwrap();
        decoder.write_raw(b"3").await.unwrap();
        decoder
            .send(&KeypadCommand::Disarm { code: "1234".to_string() })
            .await
            .unwrap();
        assert_eq!(decoder.get_ref().written, b"#312341");
    }

    #[tokio::test]
    async fn test_send_rejects_missing_code() {
        let mut decoder = AlarmDecoder::new(ScriptedStream::default());
        let err = decoder
            .send(&KeypadCommand::Disarm { code: String::new() })
            .await
            .unwrap_err();
        assert!(matches!(err, DecoderError::MissingCode));
        assert!(decoder.get_ref().written.is_empty());
    }
}

//! Incremental STOMP frame decoder.

use super::{
    Command, Frame, StompError,
    frame::unescape_header,
};

/// Frames (and pending partial data) above this size are rejected
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// One decoded unit of the inbound stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Heartbeat,
    Frame(Frame),
}

/// Buffers inbound text and yields complete frames.
///
/// A WebSocket message may carry several frames, a partial frame, or only
/// heart-beat EOLs; all three are handled.
#[derive(Debug)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    max_frame_size: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_frame_size,
        }
    }

    /// Append `chunk` and decode everything that is complete.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Inbound>, StompError> {
        self.buf.extend_from_slice(chunk);

        let mut decoded = Vec::new();
        while let Some(item) = self.next_inbound()? {
            decoded.push(item);
        }

        if self.buf.len() > self.max_frame_size {
            return Err(StompError::FrameTooLarge(self.max_frame_size));
        }
        Ok(decoded)
    }

    /// Bytes of an incomplete frame still waiting for more input
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    fn next_inbound(&mut self) -> Result<Option<Inbound>, StompError> {
        if self.buf.starts_with(b"\n") {
            self.buf.drain(..1);
            return Ok(Some(Inbound::Heartbeat));
        }
        if self.buf.starts_with(b"\r\n") {
            self.buf.drain(..2);
            return Ok(Some(Inbound::Heartbeat));
        }

        let Some((head_end, body_start)) = find_head_end(&self.buf) else {
            return Ok(None);
        };

        let head = std::str::from_utf8(&self.buf[..head_end])
            .map_err(|_| StompError::InvalidEncoding)?;
        let mut lines = head.split('\n').map(|line| line.trim_end_matches('\r'));
        let command: Command = lines.next().unwrap_or_default().parse()?;

        let mut frame = Frame::new(command);
        for line in lines {
            let (name, value) = line
                .split_once(':')
                .filter(|(name, _)| !name.is_empty())
                .ok_or_else(|| StompError::MalformedHeader(line.to_string()))?;
            frame = if command.escapes_headers() {
                frame.with_header(unescape_header(name)?, unescape_header(value)?)
            } else {
                frame.with_header(name, value)
            };
        }

        let body_end = match frame.header("content-length") {
            Some(length) => {
                let length: usize = length
                    .trim()
                    .parse()
                    .map_err(|_| StompError::InvalidContentLength(length.to_string()))?;
                let body_end = body_start
                    .checked_add(length)
                    .filter(|end| *end < self.max_frame_size)
                    .ok_or(StompError::FrameTooLarge(self.max_frame_size))?;
                if self.buf.len() <= body_end {
                    return Ok(None);
                }
                if self.buf[body_end] != 0 {
                    return Err(StompError::MissingNul);
                }
                body_end
            }
            None => match self.buf[body_start..].iter().position(|b| *b == 0) {
                Some(offset) => body_start + offset,
                None => return Ok(None),
            },
        };

        let body = std::str::from_utf8(&self.buf[body_start..body_end])
            .map_err(|_| StompError::InvalidEncoding)?
            .to_string();
        self.buf.drain(..=body_end);

        Ok(Some(Inbound::Frame(frame.with_body(body))))
    }
}

/// Locate the blank line ending the command and headers.
///
/// Returns the end of the header block and the start of the body.
fn find_head_end(buf: &[u8]) -> Option<(usize, usize)> {
    let mut index = 0;
    while let Some(offset) = buf[index..].iter().position(|b| *b == b'\n') {
        let eol = index + offset;
        let rest = &buf[eol + 1..];
        if rest.starts_with(b"\n") {
            return Some((eol, eol + 2));
        }
        if rest.starts_with(b"\r\n") {
            return Some((eol, eol + 3));
        }
        index = eol + 1;
    }
    None
}

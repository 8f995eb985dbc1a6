//! Line framing for the event stream.
//!
//! Bytes are buffered until a `\n` is seen; only complete lines are ever
//! handed out. Splitting happens on raw bytes, so a multi-byte UTF-8 sequence
//! cut by a chunk boundary is reassembled before decoding.

/// Literal marker that introduces a frame payload.
pub(crate) const DATA_PREFIX: &str = "data: ";

/// One complete, non-empty line of the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SseLine {
    /// A `data: ` line with the prefix stripped.
    Data(String),
    /// Any other non-empty line. Diagnostic only.
    Other(String),
}

#[derive(Default)]
pub(crate) struct LineDecoder {
    buf: Vec<u8>,
    // Prefix of `buf` already known to hold no newline.
    scanned: usize,
}

impl LineDecoder {
    /// Appends a chunk and returns every line it completed, in order.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SseLine> {
        self.buf.extend_from_slice(chunk);
        let mut lines = Vec::new();
        let mut start = 0;
        let mut cursor = self.scanned;
        while let Some(offset) = self.buf[cursor..].iter().position(|b| *b == b'\n') {
            let end = cursor + offset;
            if let Some(line) = classify_line(&self.buf[start..end]) {
                lines.push(line);
            }
            start = end + 1;
            cursor = start;
        }
        self.buf.drain(..start);
        self.scanned = self.buf.len();
        lines
    }

    /// Discards the unterminated trailing line, returning its length in bytes.
    pub fn finish(&mut self) -> usize {
        let discarded = self.buf.len();
        self.buf.clear();
        self.scanned = 0;
        discarded
    }

    /// Number of buffered bytes still waiting for a newline.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }
}

fn classify_line(bytes: &[u8]) -> Option<SseLine> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    if text.trim().is_empty() {
        return None;
    }
    match text.strip_prefix(DATA_PREFIX) {
        Some(payload) => Some(SseLine::Data(payload.to_string())),
        None => Some(SseLine::Other(text.into_owned())),
    }
}

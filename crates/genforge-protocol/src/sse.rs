/// One decoded Server-Sent Events frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Optional `event:` name.
    pub event: Option<String>,
    /// Concatenated `data:` lines.
    pub data: String,
}

/// Incremental SSE decoder.
///
/// Feed raw transport chunks with [`SseDecoder::push_chunk`]; complete
/// frames are returned as they become available and partial frames are
/// buffered until the blank-line delimiter arrives. Chunk boundaries
/// may fall anywhere, including inside a multi-byte character.
#[derive(Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    /// Appends a chunk and drains every complete frame from the buffer.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(end) = frame_boundary(&self.buf) {
            let rest = self.buf.split_off(end.start + end.len);
            let frame_bytes = &self.buf[..end.start];
            if let Some(frame) = parse_frame(frame_bytes) {
                frames.push(frame);
            }
            self.buf = rest;
        }
        frames
    }
}

struct Boundary {
    start: usize,
    len: usize,
}

fn frame_boundary(buf: &[u8]) -> Option<Boundary> {
    let mut i = 0;
    while i < buf.len() {
        match buf[i] {
            b'\n' if buf.get(i + 1) == Some(&b'\n') => {
                return Some(Boundary { start: i, len: 2 });
            }
            b'\r' if buf[i + 1..].starts_with(b"\n\r\n") => {
                return Some(Boundary { start: i, len: 4 });
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn parse_frame(bytes: &[u8]) -> Option<SseFrame> {
    let text = String::from_utf8_lossy(bytes);
    let mut event = None;
    let mut data = String::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        // Lines starting with ':' are comments (keep-alive).
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event = Some(value.to_string()),
            "data" => {
                if !data.is_empty() {
                    data.push('\n');
                }
                data.push_str(value);
            }
            _ => {}
        }
    }
    if event.is_none() && data.is_empty() {
        return None;
    }
    Some(SseFrame { event, data })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reassembles_frames_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(
            decoder
                .push_chunk(b"event: code_delta\ndata: {\"conte")
                .is_empty()
        );
        let frames = decoder.push_chunk(b"nt\":\"hi\"}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("code_delta"));
        assert_eq!(frames[0].data, "{\"content\":\"hi\"}");
    }

    #[test]
    fn drains_multiple_frames_from_one_chunk() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_chunk(b"data: a\n\ndata: b\n\ndata: c");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].data, "a");
        assert_eq!(frames[1].data, "b");
        // Trailing partial frame stays buffered.
        let frames = decoder.push_chunk(b"\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "c");
    }

    #[test]
    fn handles_crlf_delimited_frames() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_chunk(b"event: done\r\ndata: {}\r\n\r\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("done"));
        assert_eq!(frames[0].data, "{}");
    }

    #[test]
    fn comment_only_frames_are_dropped() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_chunk(b": ping\n\ndata: real\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "real");
    }

    #[test]
    fn joins_multi_line_data() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_chunk(b"data: line1\ndata: line2\n\n");
        assert_eq!(frames[0].data, "line1\nline2");
    }
}

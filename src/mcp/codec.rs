//! Newline-delimited JSON framing for the stdio transport.

use std::io;

use bytes::BytesMut;
use serde::Serialize;
use tokio_util::codec::{Decoder, Encoder};

/// Splits input on `\n` (tolerating `\r\n`) and writes one compact JSON value per line.
///
/// An incomplete trailing line stays in the buffer until the rest arrives.
#[derive(Debug, Default)]
pub struct JsonLinesCodec {
    // Bytes already scanned for a newline, so a long partial line is not rescanned.
    scanned: usize,
}

impl JsonLinesCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

impl Decoder for JsonLinesCodec {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, io::Error> {
        let start = self.scanned.min(buf.len());
        match buf[start..].iter().position(|b| *b == b'\n') {
            Some(offset) => {
                let end = start + offset;
                let line = buf.split_to(end + 1);
                self.scanned = 0;
                Ok(Some(decode_line(&line[..end])))
            }
            None => {
                self.scanned = buf.len();
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, io::Error> {
        if let Some(line) = self.decode(buf)? {
            return Ok(Some(line));
        }
        self.scanned = 0;
        if buf.is_empty() {
            return Ok(None);
        }
        let rest = buf.split_to(buf.len());
        Ok(Some(decode_line(&rest)))
    }
}

impl<T: Serialize> Encoder<T> for JsonLinesCodec {
    type Error = io::Error;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), io::Error> {
        let json = serde_json::to_vec(&item)?;
        dst.reserve(json.len() + 1);
        dst.extend_from_slice(&json);
        dst.extend_from_slice(b"\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partial_line_waits_for_the_rest() {
        let mut codec = JsonLinesCodec::new();
        let mut buf = BytesMut::from(&br#"{"jsonrpc":"2.0","id":1,"#[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(br#""method":"tools/list"}"#);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"\n");
        assert_eq!(
            codec.decode(&mut buf).unwrap().as_deref(),
            Some(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
        );
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert!(buf.is_empty());
    }

    #[test]
    fn several_lines_in_one_chunk() {
        let mut codec = JsonLinesCodec::new();
        let mut buf = BytesMut::from(&b"a\r\n\nb\nc"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("a"));
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some(""));
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("b"));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert_eq!(codec.decode_eof(&mut buf).unwrap().as_deref(), Some("c"));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let mut codec = JsonLinesCodec::new();
        let mut buf = BytesMut::from(&b"\xff\xfe\n"[..]);
        let line = codec.decode(&mut buf).unwrap().unwrap();
        assert!(line.contains('\u{FFFD}'));
    }

    #[test]
    fn encodes_compact_json_lines() {
        let mut codec = JsonLinesCodec::new();
        let mut out = BytesMut::new();
        codec.encode(json!({"id": 1, "ok": true}), &mut out).unwrap();
        assert_eq!(&out[..], b"{\"id\":1,\"ok\":true}\n");
    }
}

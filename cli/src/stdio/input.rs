//! Decoding of the hook event read from stdin.
//!
//! Events are normally UTF-8 JSON, but shells on Windows pipe UTF-16.

use std::io::Read;

use encoding_rs::Encoding;

pub const STDIN_ENCODING_ENV: &str = "OPSGATE_STDIN_ENCODING";

pub fn read_stdin_text() -> Result<String, std::io::Error> {
    let mut buf = Vec::new();
    std::io::stdin().read_to_end(&mut buf)?;
    let forced = std::env::var(STDIN_ENCODING_ENV).ok();
    Ok(decode_event_bytes(&buf, forced.as_deref()))
}

/// `forced` names an encoding label and wins when it is recognized.
/// Otherwise: BOM, then a UTF-16 null-byte heuristic, then UTF-8 (lossy).
pub fn decode_event_bytes(bytes: &[u8], forced: Option<&str>) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    if let Some(enc) = forced.and_then(|l| Encoding::for_label(l.trim().as_bytes())) {
        tracing::debug!(target: "opsgate.stdin", encoding = enc.name(), bytes = bytes.len(), "forced encoding");
        let (cow, _, _) = enc.decode(bytes);
        return cow.into_owned();
    }

    if let Some((enc, bom_len)) = Encoding::for_bom(bytes) {
        tracing::debug!(target: "opsgate.stdin", encoding = enc.name(), bytes = bytes.len(), "bom detected");
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        return cow.into_owned();
    }

    if let Some(enc) = sniff_utf16(bytes) {
        tracing::debug!(target: "opsgate.stdin", encoding = enc.name(), bytes = bytes.len(), "utf-16 sniffed");
        let (cow, _, _) = enc.decode(bytes);
        return cow.into_owned();
    }

    String::from_utf8_lossy(bytes).into_owned()
}

fn sniff_utf16(bytes: &[u8]) -> Option<&'static Encoding> {
    let sample = &bytes[..bytes.len().min(64)];
    if sample.len() < 2 {
        return None;
    }

    let (mut even, mut odd) = (0usize, 0usize);
    for (i, b) in sample.iter().enumerate() {
        if *b == 0 {
            if i % 2 == 0 {
                even += 1;
            } else {
                odd += 1;
            }
        }
    }

    let threshold = sample.len() / 4;
    if odd > threshold && odd > even * 2 {
        Some(encoding_rs::UTF_16LE)
    } else if even > threshold && even > odd * 2 {
        Some(encoding_rs::UTF_16BE)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT: &str = r#"{"tool_name":"Bash","tool_input":{"command":"kubectl get pods"}}"#;

    fn utf16le(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn empty_input() {
        assert_eq!(decode_event_bytes(&[], None), "");
    }

    #[test]
    fn plain_utf8_event() {
        assert_eq!(decode_event_bytes(EVENT.as_bytes(), None), EVENT);
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(EVENT.as_bytes());
        assert_eq!(decode_event_bytes(&bytes, None), EVENT);
    }

    #[test]
    fn utf16le_without_bom_is_sniffed() {
        assert_eq!(decode_event_bytes(&utf16le(EVENT), None), EVENT);
    }

    #[test]
    fn forced_label_wins_and_unknown_label_is_ignored() {
        assert_eq!(decode_event_bytes(&[0x41, 0x00, 0x42, 0x00], Some("utf-16le")), "AB");
        assert_eq!(decode_event_bytes(b"{}", Some("no-such-encoding")), "{}");
    }
}

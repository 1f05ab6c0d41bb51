/// Acceptance check for attached images.
///
/// No image content is analysed. A payload counts as an image when it is long enough
/// to be more than a placeholder and decodes as base64.
use base64::Engine;

pub const MIN_IMAGE_PAYLOAD_LEN: usize = 100;
pub const IMAGE_NOTE: &str = " (Note: Image received and processed)";

pub fn validate_image_payload(blob: &str) -> bool {
    let encoded = strip_data_url(blob.trim());
    if encoded.len() <= MIN_IMAGE_PAYLOAD_LEN {
        return false;
    }
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .is_ok_and(|bytes| !bytes.is_empty())
}

/// `data:image/png;base64,AAAA` → `AAAA`.
fn strip_data_url(blob: &str) -> &str {
    match blob.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, data)| data),
        None => blob,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(len: usize) -> String {
        base64::engine::general_purpose::STANDARD.encode(vec![0x89u8; len])
    }

    #[test]
    fn accepts_real_base64() {
        assert!(validate_image_payload(&encoded(120)));
    }

    #[test]
    fn accepts_data_urls() {
        let blob = format!("data:image/png;base64,{}", encoded(120));
        assert!(validate_image_payload(&blob));
    }

    #[test]
    fn rejects_short_payloads() {
        assert!(!validate_image_payload(""));
        assert!(!validate_image_payload(&encoded(30)));
    }

    #[test]
    fn rejects_long_garbage() {
        assert!(!validate_image_payload(&"not base64 at all! ".repeat(10)));
    }
}

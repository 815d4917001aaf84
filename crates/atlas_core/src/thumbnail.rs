use crate::error::StoreError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;

/// Decodes a base64 PNG as produced by `canvas.toDataURL()`.
///
/// A `data:image/...;base64,` header is stripped when present.
pub fn decode_thumbnail(encoded: &str) -> Result<Bytes, StoreError> {
    let payload = match encoded.strip_prefix("data:image") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| StoreError::InvalidInput("malformed data URL".into()))?,
        None => encoded,
    };

    STANDARD
        .decode(payload.trim())
        .map(Bytes::from)
        .map_err(|e| StoreError::InvalidInput(format!("thumbnail is not valid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

    #[test]
    fn decodes_raw_base64() {
        assert_eq!(decode_thumbnail("iVBORw==").unwrap().as_ref(), PNG_MAGIC);
    }

    #[test]
    fn strips_data_url_header() {
        let data = decode_thumbnail("data:image/png;base64,iVBORw==").unwrap();
        assert_eq!(data.as_ref(), PNG_MAGIC);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            decode_thumbnail("not base64!"),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            decode_thumbnail("data:image/png;base64"),
            Err(StoreError::InvalidInput(_))
        ));
    }
}

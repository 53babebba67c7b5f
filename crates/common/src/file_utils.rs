use crate::ValidationError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::{Component, Path};

/// Reasons a caller-supplied photo identifier is refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoIdError {
    Empty,
    TooLong,
    ContainsNullByte,
    ContainsPathSeparator,
    IsSpecialDirectory,
    NotASingleComponent,
}

impl PhotoIdError {
    pub fn message(&self) -> &'static str {
        match self {
            PhotoIdError::Empty => "Photo id cannot be empty",
            PhotoIdError::TooLong => "Photo id is longer than 255 bytes",
            PhotoIdError::ContainsNullByte => "Photo id cannot contain null bytes",
            PhotoIdError::ContainsPathSeparator => "Photo id cannot contain path separators (/ or \\)",
            PhotoIdError::IsSpecialDirectory => "Photo id cannot be '.' or '..'",
            PhotoIdError::NotASingleComponent => "Photo id must name a file directly in the upload directory",
        }
    }
}

impl std::fmt::Display for PhotoIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for PhotoIdError {}

/// Check that `id` can only name an entry directly inside the upload root.
///
/// This is purely lexical and touches no filesystem state, so it is safe to
/// run on arbitrary request input before any path is built from it.
pub fn validate_photo_id(id: &str) -> Result<(), PhotoIdError> {
    if id.is_empty() {
        return Err(PhotoIdError::Empty);
    }
    if id.len() > 255 {
        return Err(PhotoIdError::TooLong);
    }
    if id.contains('\0') {
        return Err(PhotoIdError::ContainsNullByte);
    }
    // Backslash is rejected on every platform, not only Windows
    if id.contains('/') || id.contains('\\') {
        return Err(PhotoIdError::ContainsPathSeparator);
    }
    if id == "." || id == ".." {
        return Err(PhotoIdError::IsSpecialDirectory);
    }

    let mut components = Path::new(id).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name.to_str() == Some(id) => Ok(()),
        _ => Err(PhotoIdError::NotASingleComponent),
    }
}

/// Decode the `image` field of an upload.
///
/// Everything up to and including the first comma is dropped, so both
/// `data:image/jpeg;base64,<payload>` and a bare base64 payload are accepted.
/// Line breaks inside the payload are ignored, as in MIME-wrapped base64.
pub fn decode_image_payload(image: &str) -> Result<Vec<u8>, ValidationError> {
    let payload = match image.find(',') {
        Some(idx) => &image[idx + 1..],
        None => image,
    };
    let payload: String = payload
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n'))
        .collect();
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ValidationError::InvalidImage(e.to_string()))?;
    if bytes.is_empty() {
        return Err(ValidationError::InvalidImage("image is empty".to_string()));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_valid() {
        assert!(validate_photo_id("3f0c1a9e-7c1b-4d7e-9a55-0d7f7e1c2b3a:1718000000000000000.jpg").is_ok());
        assert!(validate_photo_id("photo.jpg").is_ok());
        assert!(validate_photo_id("..hidden").is_ok());
    }

    #[test]
    fn test_empty_and_oversized() {
        assert_eq!(validate_photo_id(""), Err(PhotoIdError::Empty));
        assert_eq!(validate_photo_id(&"a".repeat(256)), Err(PhotoIdError::TooLong));
    }

    #[test]
    fn test_traversal_and_absolute_paths() {
        for id in ["../secret.jpg", "..\\secret.jpg", "/etc/passwd", "\\etc", "a/../../b", "a/"] {
            assert_eq!(
                validate_photo_id(id),
                Err(PhotoIdError::ContainsPathSeparator),
                "{id}"
            );
        }
        assert_eq!(validate_photo_id(".."), Err(PhotoIdError::IsSpecialDirectory));
        assert_eq!(validate_photo_id("."), Err(PhotoIdError::IsSpecialDirectory));
    }

    #[test]
    fn test_null_byte() {
        assert_eq!(validate_photo_id("a\0.jpg"), Err(PhotoIdError::ContainsNullByte));
    }

    #[test]
    fn test_decode_data_url() {
        assert_eq!(
            decode_image_payload("data:image/jpeg;base64,aGVsbG8=").unwrap(),
            b"hello"
        );
    }

    #[test]
    fn test_decode_raw_base64() {
        assert_eq!(decode_image_payload("aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn test_decode_line_wrapped_base64() {
        assert_eq!(
            decode_image_payload("data:image/jpeg;base64,aGVsbG8g\nd29ybGQ=").unwrap(),
            b"hello world"
        );
        assert_eq!(
            decode_image_payload("aGVsbG8g\r\nd29y\r\nbGQ=\r\n").unwrap(),
            b"hello world"
        );
        // other whitespace is still rejected
        assert!(matches!(
            decode_image_payload("aGVsbG8g d29ybGQ="),
            Err(ValidationError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_decode_only_strips_up_to_first_comma() {
        // the second comma stays in the payload and is not valid base64
        assert!(matches!(
            decode_image_payload("data:x,aGVs,bG8="),
            Err(ValidationError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_decode_rejects_garbage_and_empty() {
        assert!(matches!(
            decode_image_payload("data:image/jpeg;base64,***"),
            Err(ValidationError::InvalidImage(_))
        ));
        assert!(matches!(
            decode_image_payload("data:image/jpeg;base64,"),
            Err(ValidationError::InvalidImage(_))
        ));
    }
}

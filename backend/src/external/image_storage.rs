//! Item image storage on the local filesystem
//!
//! Images arrive base64-encoded, with or without a data-URL prefix. The
//! format is sniffed from the magic bytes and the file is written as
//! `{item_id}.{ext}` under the configured images directory.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Sniff the image format from the first bytes of the payload
fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("webp")
    } else if bytes.starts_with(b"BM") {
        Some("bmp")
    } else {
        None
    }
}

/// Decode a base64 image payload, tolerating a `data:image/...;base64,` prefix
pub fn decode_base64_image(data: &str) -> AppResult<Vec<u8>> {
    let encoded = match data.split_once(";base64,") {
        Some((_, encoded)) => encoded,
        None => data,
    };

    STANDARD
        .decode(encoded.trim())
        .map_err(|e| AppError::StorageError(format!("Invalid base64 image data: {}", e)))
}

/// Decode and store an item image, returning the stored file name.
pub async fn save_image_from_base64(
    images_dir: &str,
    item_id: &str,
    data: &str,
) -> AppResult<String> {
    let bytes = decode_base64_image(data)?;

    let ext = sniff_extension(&bytes).ok_or_else(|| {
        AppError::StorageError("Unsupported image format, expected png/jpg/gif/webp/bmp".into())
    })?;

    tokio::fs::create_dir_all(images_dir)
        .await
        .map_err(|e| AppError::StorageError(format!("Failed to create images dir: {}", e)))?;

    let file_name = format!("{}.{}", item_id, ext);
    let path = Path::new(images_dir).join(&file_name);
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| AppError::StorageError(format!("Failed to write image: {}", e)))?;

    Ok(file_name)
}

/// Remove a stored image. Best-effort: a missing file is not an error and
/// other failures are only logged.
pub async fn delete_image(images_dir: &str, file_name: &str) {
    let path = Path::new(images_dir).join(file_name);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(file = %path.display(), "failed to delete image: {}", e);
        }
    }
}

/// Public URL under which a stored image is served
pub fn image_url(base_url: &str, file_name: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_extension() {
        assert_eq!(
            sniff_extension(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00]),
            Some("png")
        );
        assert_eq!(sniff_extension(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("jpg"));
        assert_eq!(sniff_extension(b"GIF89a trailing"), Some("gif"));
        assert_eq!(sniff_extension(b"RIFF\x00\x00\x00\x00WEBPVP8 "), Some("webp"));
        assert_eq!(sniff_extension(b"BM\x00\x00"), Some("bmp"));
        assert_eq!(sniff_extension(b"not an image"), None);
    }

    #[test]
    fn test_decode_with_data_url_prefix() {
        let encoded = STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0]);
        let data = format!("data:image/jpeg;base64,{}", encoded);
        let bytes = decode_base64_image(&data).unwrap();
        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[test]
    fn test_decode_without_prefix() {
        let encoded = STANDARD.encode(b"GIF89a");
        let bytes = decode_base64_image(&encoded).unwrap();
        assert_eq!(bytes, b"GIF89a");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_base64_image("not base64!!!").is_err());
    }

    #[test]
    fn test_image_url_joins_cleanly() {
        assert_eq!(image_url("/images", "bolt-m3.png"), "/images/bolt-m3.png");
        assert_eq!(image_url("/images/", "bolt-m3.png"), "/images/bolt-m3.png");
    }
}

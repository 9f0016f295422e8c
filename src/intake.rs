//! 画像の受け取り
//!
//! ファイルパスまたはバイト列で渡された画像を検査し、解析に渡せる形にする。
//! 拡張子ではなく中身で形式を判定する。

use crate::error::{FoodAiError, Result};
use image::ImageFormat;
use std::path::{Path, PathBuf};

/// 既定のサイズ上限（10MB）
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

const SUPPORTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// 解析対象の画像
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// 元ファイルのパス（バイト列で受け取った場合は None）
    pub path: Option<PathBuf>,
    pub file_name: String,
    pub mime_type: &'static str,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// 一時ファイルに書き出すときの拡張子
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("img")
    }
}

/// ファイルから画像を読み込む
pub fn load_image(path: &Path, max_bytes: u64) -> Result<ImageUpload> {
    if !path.is_file() {
        return Err(FoodAiError::FileNotFound(path.display().to_string()));
    }

    let size = std::fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(FoodAiError::ImageTooLarge {
            size,
            limit: max_bytes,
        });
    }

    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut upload = from_bytes(file_name, bytes, max_bytes)?;
    upload.path = Some(path.to_path_buf());
    Ok(upload)
}

/// バイト列から画像を受け取る
pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>, max_bytes: u64) -> Result<ImageUpload> {
    let file_name = file_name.into();

    if bytes.is_empty() {
        return Err(FoodAiError::InvalidImage(format!("{} (空のファイル)", file_name)));
    }
    if bytes.len() as u64 > max_bytes {
        return Err(FoodAiError::ImageTooLarge {
            size: bytes.len() as u64,
            limit: max_bytes,
        });
    }

    let format = image::guess_format(&bytes)
        .ok()
        .filter(|f| SUPPORTED_FORMATS.contains(f))
        .ok_or_else(|| FoodAiError::InvalidImage(format!("{} (未対応の形式)", file_name)))?;

    Ok(ImageUpload {
        path: None,
        file_name,
        mime_type: format.to_mime_type(),
        format,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn test_from_bytes_png() {
        let upload = from_bytes("meal.png", PNG_HEADER.to_vec(), DEFAULT_MAX_IMAGE_BYTES).unwrap();
        assert_eq!(upload.format, ImageFormat::Png);
        assert_eq!(upload.mime_type, "image/png");
        assert_eq!(upload.extension(), "png");
        assert!(upload.path.is_none());
    }

    #[test]
    fn test_from_bytes_jpeg_with_wrong_name() {
        // 拡張子ではなく中身で判定する
        let upload = from_bytes("meal.txt", JPEG_HEADER.to_vec(), DEFAULT_MAX_IMAGE_BYTES).unwrap();
        assert_eq!(upload.mime_type, "image/jpeg");
    }

    #[test]
    fn test_from_bytes_rejects_text() {
        let result = from_bytes("notes.jpg", b"hello world".to_vec(), DEFAULT_MAX_IMAGE_BYTES);
        assert!(matches!(result, Err(FoodAiError::InvalidImage(_))));
    }

    #[test]
    fn test_from_bytes_rejects_empty() {
        let result = from_bytes("empty.jpg", Vec::new(), DEFAULT_MAX_IMAGE_BYTES);
        assert!(matches!(result, Err(FoodAiError::InvalidImage(_))));
    }

    #[test]
    fn test_load_image_too_large() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("big.jpg");
        let mut bytes = JPEG_HEADER.to_vec();
        bytes.resize(2048, 0);
        std::fs::write(&path, &bytes).unwrap();

        let result = load_image(&path, 1024);
        assert!(matches!(
            result,
            Err(FoodAiError::ImageTooLarge { size: 2048, limit: 1024 })
        ));
    }

    #[test]
    fn test_load_image_missing() {
        let result = load_image(Path::new("/nonexistent/food-ai/meal.jpg"), DEFAULT_MAX_IMAGE_BYTES);
        assert!(matches!(result, Err(FoodAiError::FileNotFound(_))));
    }

    #[test]
    fn test_load_image_ok() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("lunch.png");
        std::fs::write(&path, PNG_HEADER).unwrap();

        let upload = load_image(&path, DEFAULT_MAX_IMAGE_BYTES).unwrap();
        assert_eq!(upload.file_name, "lunch.png");
        assert_eq!(upload.path.as_deref(), Some(path.as_path()));
        assert_eq!(upload.bytes, PNG_HEADER);
    }
}

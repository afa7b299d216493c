use crate::error::AppError;
use crate::gateway::{UploadFile, data_uri};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Client-side handle of a picked file that has not been uploaded yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageId(Uuid);

impl ImageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw file as picked or dropped by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub id: ImageId,
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
    pub preview_data_uri: String,
}

impl ImageAsset {
    /// Sniff the bytes and build the preview; anything that is not a
    /// png/jpeg/webp/gif is refused.
    pub fn from_file(file: LocalFile) -> Result<Self, AppError> {
        let format = image::guess_format(&file.bytes)
            .map_err(|_| AppError::Upload(format!("{} is not an image", file.name)))?;
        let mime = match format {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
            other => {
                return Err(AppError::Upload(format!(
                    "{}: unsupported image type {other:?}",
                    file.name
                )));
            }
        };
        Ok(Self {
            id: ImageId::new(),
            preview_data_uri: data_uri(mime, &file.bytes),
            file_name: file.name,
            mime,
            bytes: file.bytes,
        })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn to_upload(&self) -> UploadFile {
        UploadFile {
            name: self.file_name.clone(),
            mime: self.mime.to_string(),
            bytes: self.bytes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::PNG_1X1;

    #[test]
    fn accepts_png_and_builds_preview() {
        let asset = ImageAsset::from_file(LocalFile::new("face.png", PNG_1X1.to_vec())).unwrap();
        assert_eq!(asset.mime, "image/png");
        assert!(asset.preview_data_uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
        assert_eq!(asset.to_upload().name, "face.png");
    }

    #[test]
    fn refuses_non_images() {
        let err = ImageAsset::from_file(LocalFile::new("notes.txt", b"hello there".to_vec()))
            .unwrap_err();
        assert!(matches!(err, AppError::Upload(_)));
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(ImageId::new(), ImageId::new());
    }
}

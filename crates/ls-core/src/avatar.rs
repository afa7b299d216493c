use crate::ids::{AvatarId, AvatarImageId, StoredImagePath};
use crate::time;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored picture of an avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarImage {
    pub id: AvatarImageId,
    pub path: StoredImagePath,
    #[serde(default)]
    pub thumbnail_path: Option<StoredImagePath>,
    #[serde(default, with = "time::iso_opt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Saved template image usable as the visual basis of a generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub id: AvatarId,
    pub name: String,
    #[serde(default)]
    pub image_path: Option<StoredImagePath>,
    #[serde(default)]
    pub thumbnail_path: Option<StoredImagePath>,
    #[serde(default)]
    pub images: Vec<AvatarImage>,
    #[serde(default, with = "time::iso_opt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Avatar {
    /// Image sent to generation: the first variant, else the legacy single path
    pub fn primary_image(&self) -> Option<&StoredImagePath> {
        self.images
            .first()
            .map(|img| &img.path)
            .or(self.image_path.as_ref())
    }
}

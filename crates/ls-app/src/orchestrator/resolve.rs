//! Turning the image selection of a context into stored paths.

use crate::error::AppError;
use crate::state::{BatchImage, Context, ImageAsset, ImageId, ImageSource, ViewState};
use ls_core::ids::{AvatarId, StoredImagePath};
use ls_core::script::{BatchImageMode, BatchKey};
use std::collections::{BTreeMap, HashMap};

/// Where the shared image of a context comes from
#[derive(Debug, Clone, PartialEq)]
pub enum FixedSource {
    Avatar(AvatarId),
    Uploads(Vec<ImageId>),
}

/// Snapshot of the selection taken while validating. Uploads happen between
/// planning and [`ImagePlan::finish`], so avatar ids are checked again there.
#[derive(Debug, Clone)]
pub struct ImagePlan {
    mode: BatchImageMode,
    fixed: Option<FixedSource>,
    assignments: BTreeMap<BatchKey, BatchImage>,
    keys: Vec<BatchKey>,
    uploads: Vec<ImageAsset>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedImages {
    pub image_paths: Vec<StoredImagePath>,
    pub batch_images: BTreeMap<BatchKey, StoredImagePath>,
}

fn fixed_source(state: &ViewState, ctx: Context) -> Result<FixedSource, AppError> {
    let context = state.context(ctx);
    match context.image_source() {
        ImageSource::Avatar => {
            let id = context
                .selected_avatar()
                .ok_or_else(|| AppError::validation("Select an avatar"))?;
            if state.avatar(id).is_none() {
                return Err(AppError::validation(format!("Avatar {id} no longer exists")));
            }
            Ok(FixedSource::Avatar(id.clone()))
        }
        ImageSource::Upload => {
            if context.images().is_empty() {
                return Err(AppError::validation("Add at least one image"));
            }
            Ok(FixedSource::Uploads(context.images().iter().map(|i| i.id).collect()))
        }
    }
}

impl ImagePlan {
    pub fn single(state: &ViewState) -> Result<Self, AppError> {
        let fixed = fixed_source(state, Context::Single)?;
        let uploads = match &fixed {
            FixedSource::Uploads(_) => state.context(Context::Single).images().to_vec(),
            FixedSource::Avatar(_) => Vec::new(),
        };
        Ok(Self {
            mode: BatchImageMode::Fixed,
            fixed: Some(fixed),
            assignments: BTreeMap::new(),
            keys: Vec::new(),
            uploads,
        })
    }

    /// Requires at least one usable source; completeness of individual
    /// assignments is checked separately by [`ImagePlan::check_complete`]
    pub fn batch(state: &ViewState) -> Result<Self, AppError> {
        let mode = state.batch_image_mode();
        let keys: Vec<BatchKey> = state
            .preview()
            .map(|p| p.batch_keys().collect())
            .unwrap_or_default();

        let (fixed, assignments) = match mode {
            BatchImageMode::Fixed => (Some(fixed_source(state, Context::Multi)?), BTreeMap::new()),
            BatchImageMode::Individual => {
                let assignments = state.batch_images().clone();
                match fixed_source(state, Context::Multi) {
                    Ok(fixed) => (Some(fixed), assignments),
                    Err(err) if assignments.is_empty() => return Err(err),
                    Err(_) => (None, assignments),
                }
            }
        };

        let multi = state.context(Context::Multi);
        let uploads = multi
            .images()
            .iter()
            .filter(|img| {
                matches!(&fixed, Some(FixedSource::Uploads(ids)) if ids.contains(&img.id))
                    || assignments.values().any(|a| *a == BatchImage::Upload(img.id))
            })
            .cloned()
            .collect();

        Ok(Self {
            mode,
            fixed,
            assignments,
            keys,
            uploads,
        })
    }

    /// In individual mode every batch needs an image it can actually use
    pub fn check_complete(&self) -> Result<(), AppError> {
        if self.mode != BatchImageMode::Individual {
            return Ok(());
        }
        for key in &self.keys {
            match self.assignments.get(key) {
                None => {
                    return Err(AppError::ImageResolution(format!("Batch {key} has no image")));
                }
                Some(BatchImage::Shared) if self.fixed.is_none() => {
                    return Err(AppError::ImageResolution(format!(
                        "Batch {key} uses the shared image but none is selected"
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    pub fn mode(&self) -> BatchImageMode {
        self.mode
    }

    /// Images that must be uploaded before submitting, in context order
    pub fn uploads(&self) -> &[ImageAsset] {
        &self.uploads
    }

    /// Map the plan onto stored paths. `uploaded` pairs with [`ImagePlan::uploads`].
    pub fn finish(
        &self,
        uploaded: &[StoredImagePath],
        state: &ViewState,
    ) -> Result<ResolvedImages, AppError> {
        if uploaded.len() != self.uploads.len() {
            return Err(AppError::ImageResolution("upload result does not match".into()));
        }
        let by_id: HashMap<ImageId, &StoredImagePath> = self
            .uploads
            .iter()
            .map(|img| img.id)
            .zip(uploaded)
            .collect();

        let avatar_path = |id: &AvatarId| -> Result<StoredImagePath, AppError> {
            state
                .avatar(id)
                .and_then(|a| a.primary_image())
                .cloned()
                .ok_or_else(|| AppError::ImageResolution(format!("Avatar {id} is no longer available")))
        };
        let upload_path = |id: &ImageId| -> Result<StoredImagePath, AppError> {
            by_id
                .get(id)
                .map(|p| (*p).clone())
                .ok_or_else(|| AppError::ImageResolution("An assigned image was not uploaded".into()))
        };

        let fixed_paths = match &self.fixed {
            Some(FixedSource::Avatar(id)) => vec![avatar_path(id)?],
            Some(FixedSource::Uploads(ids)) => ids.iter().map(upload_path).collect::<Result<_, _>>()?,
            None => Vec::new(),
        };

        let mut batch_images = BTreeMap::new();
        if self.mode == BatchImageMode::Individual {
            for key in &self.keys {
                let path = match self.assignments.get(key) {
                    Some(BatchImage::Shared) => fixed_paths.first().cloned().ok_or_else(|| {
                        AppError::ImageResolution(format!("Batch {key} has no shared image"))
                    })?,
                    Some(BatchImage::Avatar(id)) => avatar_path(id)?,
                    Some(BatchImage::Upload(id)) => upload_path(id)?,
                    None => {
                        return Err(AppError::ImageResolution(format!("Batch {key} has no image")));
                    }
                };
                batch_images.insert(*key, path);
            }
        }

        let image_paths = if fixed_paths.is_empty() {
            let mut distinct: Vec<StoredImagePath> = Vec::new();
            for path in batch_images.values() {
                if !distinct.contains(path) {
                    distinct.push(path.clone());
                }
            }
            distinct
        } else {
            fixed_paths
        };

        if image_paths.is_empty() {
            return Err(AppError::ImageResolution("No image to generate with".into()));
        }
        Ok(ResolvedImages {
            image_paths,
            batch_images,
        })
    }
}

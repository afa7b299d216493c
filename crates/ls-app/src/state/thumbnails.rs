use crate::gateway::{GatewayError, data_uri};
use ls_core::avatar::Avatar;
use ls_core::ids::AvatarId;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thumbnail {
    Loading,
    Ready(String),
    Failed,
}

/// Avatar pictures fetched on demand for the items being shown
#[derive(Debug, Default)]
pub struct ThumbnailCache {
    entries: HashMap<AvatarId, Thumbnail>,
}

impl ThumbnailCache {
    pub fn get(&self, id: &AvatarId) -> Option<&Thumbnail> {
        self.entries.get(id)
    }

    /// Ids among `shown` with nothing cached yet; they are marked as loading
    pub fn claim_missing<'a>(&mut self, shown: impl IntoIterator<Item = &'a AvatarId>) -> Vec<AvatarId> {
        let mut claimed = Vec::new();
        for id in shown {
            if !self.entries.contains_key(id) {
                self.entries.insert(id.clone(), Thumbnail::Loading);
                claimed.push(id.clone());
            }
        }
        claimed
    }

    pub fn store(&mut self, id: AvatarId, result: Result<Vec<u8>, GatewayError>) {
        let entry = match result {
            Ok(bytes) => match image::guess_format(&bytes) {
                Ok(format) => Thumbnail::Ready(data_uri(format.to_mime_type(), &bytes)),
                Err(_) => Thumbnail::Failed,
            },
            Err(_) => Thumbnail::Failed,
        };
        self.entries.insert(id, entry);
    }

    /// Drop entries for avatars no longer listed
    pub fn retain(&mut self, avatars: &[Avatar]) {
        self.entries
            .retain(|id, _| avatars.iter().any(|a| &a.id == id));
    }

    pub fn remove(&mut self, id: &AvatarId) {
        self.entries.remove(id);
    }
}

//! Opaque handles handed out by the backend.
//!
//! The client only ever compares and forwards these; it never parses or
//! builds one itself.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

opaque_id!(AvatarId);
opaque_id!(AvatarImageId);
opaque_id!(ProjectId);
opaque_id!(TagId);
opaque_id!(JobId);
opaque_id!(
    /// Backend location of an uploaded or avatar image
    StoredImagePath
);
opaque_id!(
    /// Backend location of a rendered video
    StoredVideoPath
);

impl StoredVideoPath {
    /// Last path segment, used as a display/download name
    pub fn file_name(&self) -> &str {
        self.0
            .rsplit(['/', '\\'])
            .find(|segment| !segment.is_empty())
            .unwrap_or("video.mp4")
    }
}

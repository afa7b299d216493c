use crate::ids::{JobId, StoredVideoPath};
use crate::time;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn icon(&self) -> &str {
        match self {
            Self::Pending => "⏳",
            Self::Processing => "⚡",
            Self::Completed => "✅",
            Self::Failed => "❌",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Waiting",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobKind {
    #[serde(rename = "single_video", alias = "single")]
    Single,
    #[serde(rename = "batch_videos", alias = "batch")]
    Batch,
    #[default]
    #[serde(other)]
    Other,
}

/// Backend-tracked unit of generation work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(rename = "type", default)]
    pub kind: JobKind,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: f32,
    #[serde(default, alias = "created_at", with = "time::iso_opt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, with = "time::iso_opt")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub video_path: Option<StoredVideoPath>,
}

impl Job {
    /// Wall time between start and completion, or up to `now` while running
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        let start = self.started_at?;
        let end = self.completed_at.unwrap_or(now);
        Some((end - start).num_seconds().max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_groups() {
        assert!(JobStatus::Pending.is_active());
        assert!(JobStatus::Processing.is_active());
        assert!(JobStatus::Completed.is_complete());
        assert!(JobStatus::Failed.is_complete());
        assert!(!JobStatus::Failed.is_active());
    }

    #[test]
    fn decodes_service_job_record() {
        let job: Job = serde_json::from_value(json!({
            "id": "job_1234abcd",
            "type": "batch_videos",
            "status": "completed",
            "progress": 100,
            "started_at": "2025-05-01T10:00:00.000001",
            "completed_at": "2025-05-01T10:02:30.5",
            "video_path": "temp/outputs/final.mp4",
            "metadata": {"num_scripts": 2}
        }))
        .unwrap();
        assert_eq!(job.kind, JobKind::Batch);
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.elapsed_secs(Utc::now()), Some(150));
    }

    #[test]
    fn unknown_kind_is_other() {
        let job: Job = serde_json::from_value(json!({
            "id": "job_x",
            "type": "video_generation",
            "status": "processing"
        }))
        .unwrap();
        assert_eq!(job.kind, JobKind::Other);
        assert!(job.video_path.is_none());
    }
}

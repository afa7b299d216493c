use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ScriptId = u32;

/// Contiguous, size-bounded slice of a script, the unit sent for synthesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub batch_number: u32,
    pub text: String,
    pub char_count: usize,
}

/// One user script as segmented by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub id: ScriptId,
    pub text: String,
    pub batches: Vec<Batch>,
    #[serde(default)]
    pub total_chars: usize,
}

impl Script {
    /// First `max_chars` characters followed by an ellipsis when cut
    pub fn excerpt(&self, max_chars: usize) -> String {
        excerpt(&self.text, max_chars)
    }

    pub fn batch_keys(&self) -> impl Iterator<Item = BatchKey> + '_ {
        self.batches.iter().map(|b| BatchKey::new(self.id, b.batch_number))
    }
}

pub fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewSummary {
    pub total_scripts: usize,
    pub total_batches: usize,
    pub total_chars: usize,
}

/// Segmented scripts returned by the preview operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    pub scripts: Vec<Script>,
    #[serde(default)]
    pub summary: PreviewSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreviewError {
    #[error("preview contains no scripts")]
    Empty,
    #[error("script {script_id} has no batches")]
    NoBatches { script_id: ScriptId },
    #[error("script {script_id}: expected batch {expected}, found {found}")]
    BatchOrder {
        script_id: ScriptId,
        expected: u32,
        found: u32,
    },
    #[error("duplicate script id {0}")]
    DuplicateScript(ScriptId),
}

impl Preview {
    /// Check batch numbering and recompute the character totals.
    ///
    /// Batches must be numbered `1..=n` in order. A script's total is the sum of
    /// its batch counts, which is what gets synthesized.
    pub fn validated(mut self) -> Result<Self, PreviewError> {
        if self.scripts.is_empty() {
            return Err(PreviewError::Empty);
        }
        let mut seen = std::collections::HashSet::new();
        for script in &mut self.scripts {
            if !seen.insert(script.id) {
                return Err(PreviewError::DuplicateScript(script.id));
            }
            if script.batches.is_empty() {
                return Err(PreviewError::NoBatches { script_id: script.id });
            }
            for (idx, batch) in script.batches.iter().enumerate() {
                let expected = idx as u32 + 1;
                if batch.batch_number != expected {
                    return Err(PreviewError::BatchOrder {
                        script_id: script.id,
                        expected,
                        found: batch.batch_number,
                    });
                }
            }
            script.total_chars = script.batches.iter().map(|b| b.char_count).sum();
        }
        self.summary = PreviewSummary {
            total_scripts: self.scripts.len(),
            total_batches: self.scripts.iter().map(|s| s.batches.len()).sum(),
            total_chars: self.scripts.iter().map(|s| s.total_chars).sum(),
        };
        Ok(self)
    }

    pub fn script(&self, id: ScriptId) -> Option<&Script> {
        self.scripts.iter().find(|s| s.id == id)
    }

    pub fn batch_keys(&self) -> impl Iterator<Item = BatchKey> + '_ {
        self.scripts.iter().flat_map(Script::batch_keys)
    }
}

/// `(script, batch)` composite key, `"{script}_{batch}"` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchKey {
    pub script_id: ScriptId,
    pub batch_number: u32,
}

impl BatchKey {
    pub fn new(script_id: ScriptId, batch_number: u32) -> Self {
        Self { script_id, batch_number }
    }
}

impl fmt::Display for BatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.script_id, self.batch_number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid batch key: {0}")]
pub struct InvalidBatchKey(pub String);

impl FromStr for BatchKey {
    type Err = InvalidBatchKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (script, batch) = s
            .split_once('_')
            .ok_or_else(|| InvalidBatchKey(s.to_string()))?;
        match (script.parse(), batch.parse()) {
            (Ok(script_id), Ok(batch_number)) => Ok(Self::new(script_id, batch_number)),
            _ => Err(InvalidBatchKey(s.to_string())),
        }
    }
}

impl Serialize for BatchKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BatchKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Whether one shared image applies to every batch or each batch gets its own
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchImageMode {
    #[default]
    Fixed,
    Individual,
}

impl BatchImageMode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Fixed => "fixed",
            Self::Individual => "individual",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(n: u32, text: &str) -> Batch {
        Batch {
            batch_number: n,
            text: text.to_string(),
            char_count: text.chars().count(),
        }
    }

    fn script(id: ScriptId, batches: Vec<Batch>) -> Script {
        Script {
            id,
            text: batches.iter().map(|b| b.text.as_str()).collect::<Vec<_>>().join("\n\n"),
            batches,
            total_chars: 0,
        }
    }

    #[test]
    fn validated_recomputes_totals() {
        let preview = Preview {
            scripts: vec![
                script(1, vec![batch(1, "Hello world."), batch(2, "This is batch two.")]),
                script(2, vec![batch(1, "Solo")]),
            ],
            summary: PreviewSummary::default(),
        }
        .validated()
        .unwrap();

        let first = &preview.scripts[0];
        assert_eq!(first.total_chars, 12 + 18);
        assert_eq!(preview.summary.total_scripts, 2);
        assert_eq!(preview.summary.total_batches, 3);
        assert_eq!(preview.summary.total_chars, 34);
    }

    #[test]
    fn validated_rejects_gaps_and_zero_base() {
        let gap = Preview {
            scripts: vec![script(1, vec![batch(1, "a"), batch(3, "b")])],
            summary: PreviewSummary::default(),
        };
        assert_eq!(
            gap.validated(),
            Err(PreviewError::BatchOrder { script_id: 1, expected: 2, found: 3 })
        );

        let zero = Preview {
            scripts: vec![script(4, vec![batch(0, "a")])],
            summary: PreviewSummary::default(),
        };
        assert!(matches!(zero.validated(), Err(PreviewError::BatchOrder { .. })));
    }

    #[test]
    fn validated_rejects_empty_and_duplicates() {
        let empty = Preview { scripts: vec![], summary: PreviewSummary::default() };
        assert_eq!(empty.validated(), Err(PreviewError::Empty));

        let dup = Preview {
            scripts: vec![script(1, vec![batch(1, "a")]), script(1, vec![batch(1, "b")])],
            summary: PreviewSummary::default(),
        };
        assert_eq!(dup.validated(), Err(PreviewError::DuplicateScript(1)));
    }

    #[test]
    fn batch_key_wire_form() {
        let key = BatchKey::new(3, 12);
        assert_eq!(key.to_string(), "3_12");
        assert_eq!("3_12".parse::<BatchKey>(), Ok(key));
        assert!("3-12".parse::<BatchKey>().is_err());
        assert!("a_1".parse::<BatchKey>().is_err());
    }

    #[test]
    fn excerpt_cuts_on_chars() {
        assert_eq!(excerpt("ação rápida", 4), "ação...");
        assert_eq!(excerpt("short", 10), "short");
    }
}

//! Attachment selection: eligibility policy, interactive disambiguation and download

pub mod fetch;
pub mod pending;
pub mod selector;

pub use fetch::{AttachmentFetcher, HttpFetcher};
pub use pending::{Activation, PendingSelection, PendingSelections, Resolution};
pub use selector::{SelectionControl, SelectionPrompt, select};

use std::time::Duration;

/// Suffixes accepted by "Create Paste"
pub const PASTE_SUFFIXES: &[&str] = &[
    ".txt", ".log", ".csv", ".md", ".cfg", ".json", ".json5", ".toml", ".yml", ".yaml", ".ini",
    ".conf", ".gradle", ".properties", ".mcmeta", ".snbt", ".html", ".htm", ".iml", ".xml", ".js",
    ".ts", ".zs", ".py", ".java", ".sh", ".bat", ".cmd", ".ps1",
];

/// Suffixes accepted by "Validate Config"
pub const CONFIG_SUFFIXES: &[&str] = &[".json", ".json5"];

/// Most eligible attachments offered as buttons before giving up
pub const MAX_SELECTABLE: usize = 5;

/// Case-insensitive file name suffix check
pub fn has_suffix(name: &str, suffix: &str) -> bool {
    name.to_lowercase().ends_with(&suffix.to_lowercase())
}

/// Snapshot of one message attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentCandidate {
    /// Platform attachment id, used as the selection key
    pub id: String,
    pub file_name: String,
    pub source_url: String,
    pub size_bytes: u64,
}

impl AttachmentCandidate {
    pub fn new(
        id: impl Into<String>,
        file_name: impl Into<String>,
        source_url: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            source_url: source_url.into(),
            size_bytes,
        }
    }
}

/// Why an attachment cannot be selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    WrongType,
    TooLarge,
}

impl Rejection {
    pub fn label(self) -> &'static str {
        match self {
            Rejection::WrongType => "Wrong file type",
            Rejection::TooLarge => "Too large",
        }
    }
}

/// Per-feature eligibility rules
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    pub allowed_suffixes: &'static [&'static str],
    /// `None` means unbounded
    pub max_size_bytes: Option<u64>,
    pub max_candidates: usize,
    /// How long a selection prompt waits for the invoker
    pub timeout: Duration,
}

impl SelectionPolicy {
    /// Policy for "Create Paste"
    pub fn paste(max_size_bytes: u64, timeout: Duration) -> Self {
        Self {
            allowed_suffixes: PASTE_SUFFIXES,
            max_size_bytes: Some(max_size_bytes),
            max_candidates: MAX_SELECTABLE,
            timeout,
        }
    }

    /// Policy for "Validate Config"
    pub fn config(timeout: Duration) -> Self {
        Self {
            allowed_suffixes: CONFIG_SUFFIXES,
            max_size_bytes: None,
            max_candidates: MAX_SELECTABLE,
            timeout,
        }
    }

    /// Check a single attachment against this policy
    pub fn check(&self, candidate: &AttachmentCandidate) -> std::result::Result<(), Rejection> {
        let name = candidate.file_name.to_lowercase();
        if !self.allowed_suffixes.iter().any(|s| name.ends_with(s)) {
            return Err(Rejection::WrongType);
        }
        match self.max_size_bytes {
            Some(max) if candidate.size_bytes > max => Err(Rejection::TooLarge),
            _ => Ok(()),
        }
    }

    /// Split attachments into eligible ones and rejected ones, keeping message order
    pub fn partition(&self, candidates: &[AttachmentCandidate]) -> Partition {
        let mut partition = Partition::default();
        for candidate in candidates {
            let verdict = self.check(candidate);
            if verdict.is_ok() {
                partition.eligible.push(candidate.clone());
            }
            partition.entries.push((candidate.clone(), verdict.err()));
        }
        partition
    }
}

/// Result of applying a [`SelectionPolicy`] to a message's attachments
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub eligible: Vec<AttachmentCandidate>,
    /// Every attachment in message order with its rejection, if any
    pub entries: Vec<(AttachmentCandidate, Option<Rejection>)>,
}

impl Partition {
    /// Whether some attachment had an allowed type but exceeded the size bound
    pub fn has_oversized(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, r)| *r == Some(Rejection::TooLarge))
    }

    /// One control per attachment; only eligible ones are enabled
    pub fn controls(&self) -> Vec<SelectionControl> {
        self.entries
            .iter()
            .map(|(candidate, rejection)| match rejection {
                None => SelectionControl {
                    key: candidate.id.clone(),
                    label: candidate.file_name.clone(),
                    enabled: true,
                },
                Some(reason) => SelectionControl {
                    key: candidate.id.clone(),
                    label: format!("{} ({})", candidate.file_name, reason.label()),
                    enabled: false,
                },
            })
            .collect()
    }
}

/// How attachment selection ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Chosen(AttachmentCandidate),
    NoneEligible,
    TooManyCandidates,
    OversizedOnly,
    TimedOut,
}

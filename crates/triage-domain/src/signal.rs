//! Signal Set - the normalized extraction of one issue
//!
//! Signal Sets are produced by an external extractor and are immutable once
//! built. Every constructor path (deserialization or the `with_*` builders)
//! applies the ingestion normalization from [`crate::normalize`].

use crate::normalize::{
    collapse_whitespace, normalize_error_signature, normalize_label, normalize_step,
    strip_line_suffix,
};
use crate::{IssueId, SignalError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stack traces are compared on their first frames only
pub const MAX_STACK_FRAMES: usize = 3;

/// Reaction key for a thumbs-up
pub const THUMBS_UP: &str = "+1";

/// Seconds in one day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// One comment on an issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Comment author login
    pub author: String,

    /// Whether the author is an automation account
    #[serde(default)]
    pub is_bot: bool,

    /// When the comment was posted (Unix seconds, UTC)
    #[serde(default)]
    pub created_at: i64,
}

/// One stack frame, line numbers ignored
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackFrame {
    /// Function or method name
    pub function: String,

    /// Source file, without a `:line` suffix
    pub file: String,
}

impl StackFrame {
    /// Create a normalized frame
    pub fn new(function: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
        }
        .normalized()
    }

    fn normalized(self) -> Self {
        Self {
            function: collapse_whitespace(&self.function),
            file: strip_line_suffix(&self.file),
        }
    }

    /// Whether two frames name the same function in the same file
    pub fn same_as(&self, other: &StackFrame) -> bool {
        self.function.eq_ignore_ascii_case(&other.function)
            && self.file.eq_ignore_ascii_case(&other.file)
    }
}

/// Environment tokens reported with an issue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Operating system
    #[serde(default)]
    pub os: Option<String>,

    /// Runtime (JDK, Node, IDE build, ...)
    #[serde(default)]
    pub runtime: Option<String>,

    /// Product version the reporter is running
    #[serde(default)]
    pub version: Option<String>,
}

impl Environment {
    /// Create an environment tuple
    pub fn new(
        os: Option<&str>,
        runtime: Option<&str>,
        version: Option<&str>,
    ) -> Self {
        Self {
            os: os.map(str::to_string),
            runtime: runtime.map(str::to_string),
            version: version.map(str::to_string),
        }
    }

    /// Whether no environment token was reported
    pub fn is_empty(&self) -> bool {
        self.tuple().iter().all(Option::is_none)
    }

    /// The `(os, runtime, version)` tuple in canonical form
    pub fn tuple(&self) -> [Option<String>; 3] {
        let canon = |v: &Option<String>| {
            v.as_deref()
                .map(normalize_label)
                .filter(|s| !s.is_empty())
        };
        [canon(&self.os), canon(&self.runtime), canon(&self.version)]
    }
}

/// Direct parent relationship reported by the tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    /// Repository holding the parent issue (`owner/name`)
    pub repository: String,

    /// Parent issue number
    pub number: u64,
}

/// The normalized signal set of one issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SignalSetRecord")]
pub struct SignalSet {
    /// Issue number
    pub id: IssueId,

    /// Repository the issue lives in (`owner/name`)
    pub repository: Option<String>,

    /// Issue title
    pub title: String,

    /// Issue body text
    pub body: String,

    /// Labels, lower-cased and deduplicated in first-seen order
    pub labels: Vec<String>,

    /// Creation time (Unix seconds, UTC)
    pub created_at: i64,

    /// Comments in posting order
    pub comments: Vec<Comment>,

    /// Reaction counts by reaction type (distinct users per type)
    pub reactions: BTreeMap<String, u32>,

    /// Normalized error signatures
    pub error_signatures: Vec<String>,

    /// Head of the stack trace, at most [`MAX_STACK_FRAMES`] frames
    pub stack_frames: Vec<StackFrame>,

    /// Normalized reproduction steps in order
    pub repro_steps: Vec<String>,

    /// Environment tokens
    pub environment: Environment,

    /// Last release the reporter saw working, if stated
    pub last_working_version: Option<String>,

    /// Free-text symptom summary (the title stands in when absent)
    pub symptom: Option<String>,

    /// Trigger condition text ("after resume", "on first launch", ...)
    pub trigger: Option<String>,

    /// Parent issue reported by the tracker
    pub parent_link: Option<ParentLink>,

    /// Issues mentioned in the body or comments
    pub cross_references: Vec<IssueId>,
}

/// Wire form of a Signal Set before ingestion normalization
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SignalSetRecord {
    id: u64,
    repository: Option<String>,
    title: String,
    body: String,
    labels: Vec<String>,
    created_at: i64,
    comments: Vec<Comment>,
    reactions: BTreeMap<String, u32>,
    error_signatures: Vec<String>,
    stack_frames: Vec<StackFrame>,
    repro_steps: Vec<String>,
    environment: Environment,
    last_working_version: Option<String>,
    symptom: Option<String>,
    trigger: Option<String>,
    parent_link: Option<ParentLink>,
    cross_references: Vec<u64>,
}

impl From<SignalSetRecord> for SignalSet {
    fn from(record: SignalSetRecord) -> Self {
        SignalSet {
            id: IssueId::new(record.id),
            repository: record.repository,
            title: record.title,
            body: record.body,
            labels: record.labels,
            created_at: record.created_at,
            comments: record.comments,
            reactions: record.reactions,
            error_signatures: record.error_signatures,
            stack_frames: record.stack_frames,
            repro_steps: record.repro_steps,
            environment: record.environment,
            last_working_version: record.last_working_version,
            symptom: record.symptom,
            trigger: record.trigger,
            parent_link: record.parent_link,
            cross_references: record.cross_references.into_iter().map(IssueId::new).collect(),
        }
        .normalized()
    }
}

impl SignalSet {
    /// Create a signal set with only the required fields
    pub fn new(
        id: u64,
        title: impl Into<String>,
        body: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: IssueId::new(id),
            repository: None,
            title: title.into(),
            body: body.into(),
            labels: Vec::new(),
            created_at,
            comments: Vec::new(),
            reactions: BTreeMap::new(),
            error_signatures: Vec::new(),
            stack_frames: Vec::new(),
            repro_steps: Vec::new(),
            environment: Environment::default(),
            last_working_version: None,
            symptom: None,
            trigger: None,
            parent_link: None,
            cross_references: Vec::new(),
        }
    }

    /// Apply ingestion normalization
    ///
    /// Labels are folded and deduplicated, error signatures lose their line
    /// numbers, stack frames are truncated, and empty entries are dropped.
    pub fn normalized(mut self) -> Self {
        let mut labels: Vec<String> = Vec::with_capacity(self.labels.len());
        for label in self.labels.iter().map(|l| normalize_label(l)) {
            if !label.is_empty() && !labels.contains(&label) {
                labels.push(label);
            }
        }
        self.labels = labels;

        let mut signatures: Vec<String> = Vec::with_capacity(self.error_signatures.len());
        for signature in self.error_signatures.iter().map(|s| normalize_error_signature(s)) {
            if !signature.is_empty() && !signatures.contains(&signature) {
                signatures.push(signature);
            }
        }
        self.error_signatures = signatures;

        self.stack_frames = self
            .stack_frames
            .into_iter()
            .map(StackFrame::normalized)
            .filter(|f| !f.function.is_empty() || !f.file.is_empty())
            .take(MAX_STACK_FRAMES)
            .collect();

        self.repro_steps = self
            .repro_steps
            .iter()
            .map(|s| normalize_step(s))
            .filter(|s| !s.is_empty())
            .collect();

        self.cross_references.sort();
        self.cross_references.dedup();
        self
    }

    /// Set the repository (`owner/name`)
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    /// Add labels
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.extend(labels.into_iter().map(Into::into));
        self.normalized()
    }

    /// Add a comment
    pub fn with_comment(mut self, author: impl Into<String>, is_bot: bool, created_at: i64) -> Self {
        self.comments.push(Comment {
            author: author.into(),
            is_bot,
            created_at,
        });
        self
    }

    /// Set the count for one reaction type
    pub fn with_reaction(mut self, kind: impl Into<String>, count: u32) -> Self {
        self.reactions.insert(kind.into(), count);
        self
    }

    /// Add an error signature
    pub fn with_error_signature(mut self, signature: impl Into<String>) -> Self {
        self.error_signatures.push(signature.into());
        self.normalized()
    }

    /// Append a stack frame (frames past the third are ignored)
    pub fn with_stack_frame(mut self, function: impl Into<String>, file: impl Into<String>) -> Self {
        self.stack_frames.push(StackFrame::new(function, file));
        self.normalized()
    }

    /// Add reproduction steps in order
    pub fn with_repro_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.repro_steps.extend(steps.into_iter().map(Into::into));
        self.normalized()
    }

    /// Set the environment tuple
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Set the last release the reporter saw working
    pub fn with_last_working_version(mut self, version: impl Into<String>) -> Self {
        self.last_working_version = Some(version.into());
        self
    }

    /// Set the symptom summary
    pub fn with_symptom(mut self, symptom: impl Into<String>) -> Self {
        self.symptom = Some(symptom.into());
        self
    }

    /// Set the trigger condition
    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }

    /// Set the tracker-reported parent issue
    pub fn with_parent_link(mut self, repository: impl Into<String>, number: u64) -> Self {
        self.parent_link = Some(ParentLink {
            repository: repository.into(),
            number,
        });
        self
    }

    /// Add a cross-referenced issue
    pub fn with_cross_reference(mut self, id: u64) -> Self {
        self.cross_references.push(IssueId::new(id));
        self.normalized()
    }

    /// Whether the issue carries a label (case-insensitive)
    pub fn has_label(&self, label: &str) -> bool {
        let wanted = normalize_label(label);
        self.labels.iter().any(|l| *l == wanted)
    }

    /// Number of comments written by people rather than bots
    pub fn human_comment_count(&self) -> usize {
        self.comments.iter().filter(|c| !c.is_bot).count()
    }

    /// Number of distinct users who reacted with a thumbs-up
    pub fn thumbs_up(&self) -> u32 {
        self.reactions.get(THUMBS_UP).copied().unwrap_or(0)
    }

    /// Reproduction-step key, `None` when no steps were extracted
    pub fn repro_key(&self) -> Option<String> {
        if self.repro_steps.is_empty() {
            None
        } else {
            Some(self.repro_steps.join(" > "))
        }
    }

    /// Lower-cased title, body and labels for keyword search
    pub fn searchable_text(&self) -> String {
        let mut text = String::with_capacity(self.title.len() + self.body.len() + 64);
        text.push_str(&self.title.to_lowercase());
        text.push('\n');
        text.push_str(&self.body.to_lowercase());
        for label in &self.labels {
            text.push('\n');
            text.push_str(label);
        }
        text
    }

    /// Symptom text, falling back to the title
    pub fn symptom_text(&self) -> &str {
        match self.symptom.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => &self.title,
        }
    }

    /// Whether `other` is cross-referenced from this issue
    pub fn references(&self, other: IssueId) -> bool {
        self.cross_references.binary_search(&other).is_ok()
    }

    /// Check the fields every component relies on
    pub fn validate_identity(&self) -> Result<(), SignalError> {
        if !self.id.is_valid() {
            return Err(SignalError::invalid(self.id, "issue id must be greater than 0"));
        }
        Ok(())
    }

    /// Check that the creation timestamp is not negative
    pub fn validate_created_at_sign(&self) -> Result<(), SignalError> {
        if self.created_at < 0 {
            return Err(SignalError::invalid(
                self.id,
                format!("creation timestamp {} is negative", self.created_at),
            ));
        }
        Ok(())
    }

    /// Check the creation timestamp against the evaluation time
    pub fn validate_created_at(&self, evaluation_time: i64) -> Result<(), SignalError> {
        self.validate_created_at_sign()?;
        if self.created_at > evaluation_time {
            return Err(SignalError::invalid(
                self.id,
                format!(
                    "creation timestamp {} is after evaluation time {}",
                    self.created_at, evaluation_time
                ),
            ));
        }
        Ok(())
    }

    /// Whole days elapsed between creation and `evaluation_time`
    pub fn days_open(&self, evaluation_time: i64) -> i64 {
        (evaluation_time - self.created_at).max(0) / SECONDS_PER_DAY
    }
}

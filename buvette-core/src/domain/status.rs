use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::CoreError;

/// Three-step workflow shared by timesheets and checklist responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Draft,
    Submitted,
    Validated,
}

impl WorkflowStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStatus::Draft => "DRAFT",
            WorkflowStatus::Submitted => "SUBMITTED",
            WorkflowStatus::Validated => "VALIDATED",
        }
    }

    /// Validated records are frozen: their lines can no longer be replaced.
    pub fn is_locked(self) -> bool {
        matches!(self, WorkflowStatus::Validated)
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(WorkflowStatus::Draft),
            "SUBMITTED" => Ok(WorkflowStatus::Submitted),
            "VALIDATED" => Ok(WorkflowStatus::Validated),
            other => Err(CoreError::validation(format!("unknown status '{other}'"))),
        }
    }
}

impl TryFrom<String> for WorkflowStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Which end of the event an inventory count was taken at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotKind {
    Initial,
    Final,
}

impl SnapshotKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SnapshotKind::Initial => "INITIAL",
            SnapshotKind::Final => "FINAL",
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnapshotKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIAL" => Ok(SnapshotKind::Initial),
            "FINAL" => Ok(SnapshotKind::Final),
            other => Err(CoreError::validation(format!(
                "unknown snapshot type '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for SnapshotKind {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_validated_is_locked() {
        assert!(!WorkflowStatus::Draft.is_locked());
        assert!(!WorkflowStatus::Submitted.is_locked());
        assert!(WorkflowStatus::Validated.is_locked());
    }

    #[test]
    fn parses_stored_names() {
        assert_eq!("SUBMITTED".parse::<WorkflowStatus>().unwrap(), WorkflowStatus::Submitted);
        assert_eq!("FINAL".parse::<SnapshotKind>().unwrap(), SnapshotKind::Final);
        assert!("submitted".parse::<WorkflowStatus>().is_err());
    }

    #[test]
    fn serde_matches_stored_names() {
        let json = serde_json::to_string(&WorkflowStatus::Validated).unwrap();
        assert_eq!(json, "\"VALIDATED\"");
        let kind: SnapshotKind = serde_json::from_str("\"INITIAL\"").unwrap();
        assert_eq!(kind, SnapshotKind::Initial);
    }
}

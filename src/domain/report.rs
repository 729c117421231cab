use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Pdf,
    Csv,
}

impl ReportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Csv => "csv",
        }
    }
}

/// Server response to a generation request; held only until the flow ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedReport {
    pub format: ReportFormat,
    pub download_url: String,
    pub file_name: String,
}

/// Where the report flow currently is. There is no cancellation; the only
/// early exit from the in-progress phases is `Error`, which also resets
/// progress to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportPhase {
    Idle,
    Generating,
    Downloading { percent: u8 },
    Verifying,
    Opening,
    Error { message: String },
}

impl ReportPhase {
    /// True while a run is underway; the UI disables the generate button
    /// in these phases.
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            ReportPhase::Generating
                | ReportPhase::Downloading { .. }
                | ReportPhase::Verifying
                | ReportPhase::Opening
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_active_phases_count_as_in_progress() {
        for phase in [
            ReportPhase::Generating,
            ReportPhase::Downloading { percent: 40 },
            ReportPhase::Verifying,
            ReportPhase::Opening,
        ] {
            assert!(phase.is_in_progress(), "{phase:?} should be in progress");
        }
        assert!(!ReportPhase::Idle.is_in_progress());
        assert!(!ReportPhase::Error {
            message: "boom".to_string()
        }
        .is_in_progress());
    }
}

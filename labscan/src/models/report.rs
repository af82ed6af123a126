use serde::{Deserialize, Serialize};

use super::LabTest;

/// Outcome of one pass over an uploaded lab report image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LabReport {
    /// Lines as returned by the recognizer, in reading order.
    pub recognized_text: Vec<String>,
    pub data: Vec<LabTest>,
}

impl LabReport {
    pub fn out_of_range(&self) -> impl Iterator<Item = &LabTest> {
        self.data.iter().filter(|t| t.lab_test_out_of_range)
    }
}

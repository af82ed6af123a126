use regex::Captures;
use tracing::debug;

use super::patterns::LinePattern;
use crate::error::{LabScanError, Result};
use crate::models::{LabTest, ReferenceRange};

/// Turns recognized report lines into [`LabTest`] records.
///
/// Every grammar in [`LinePattern::ALL`] is tried against every line, so a
/// line that satisfies both grammars contributes a record for each. Output
/// order follows line order, then grammar order, then match position.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabTestExtractor;

impl LabTestExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> Result<Vec<LabTest>> {
        let mut tests = Vec::new();
        for line in lines {
            tests.extend(self.extract_line(line.as_ref())?);
        }

        debug!(
            lines = lines.len(),
            records = tests.len(),
            "Lab test extraction finished"
        );
        Ok(tests)
    }

    pub fn extract_line(&self, line: &str) -> Result<Vec<LabTest>> {
        let mut tests = Vec::new();
        for pattern in LinePattern::ALL {
            for caps in pattern.regex().captures_iter(line) {
                tests.push(build_lab_test(pattern, &caps)?);
            }
        }
        Ok(tests)
    }
}

/// Extract every lab test from `lines` with the default grammars.
pub fn extract_lab_tests<S: AsRef<str>>(lines: &[S]) -> Result<Vec<LabTest>> {
    LabTestExtractor::new().extract(lines)
}

fn build_lab_test(pattern: LinePattern, caps: &Captures<'_>) -> Result<LabTest> {
    let name = required_group(pattern, caps, LinePattern::NAME)?;
    let value = required_group(pattern, caps, LinePattern::VALUE)?;
    let unit = caps.get(LinePattern::UNIT).map(|m| m.as_str());
    let min = parse_bound(required_group(pattern, caps, LinePattern::MIN)?)?;
    let max = parse_bound(required_group(pattern, caps, LinePattern::MAX)?)?;

    Ok(LabTest::new(name, value, unit, ReferenceRange::new(min, max)))
}

fn required_group<'h>(
    pattern: LinePattern,
    caps: &Captures<'h>,
    index: usize,
) -> Result<&'h str> {
    caps.get(index).map(|m| m.as_str()).ok_or_else(|| {
        LabScanError::PatternEvaluation(format!(
            "{} form matched without capture group {index}",
            pattern.name()
        ))
    })
}

fn parse_bound(raw: &str) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|e| {
        LabScanError::PatternEvaluation(format!("invalid reference bound '{raw}': {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(
        name: &str,
        value: &str,
        unit: Option<&str>,
        range: &str,
        flagged: bool,
    ) -> LabTest {
        LabTest {
            test_name: name.to_string(),
            test_value: value.to_string(),
            bio_reference_range: range.to_string(),
            test_unit: unit.map(String::from),
            lab_test_out_of_range: flagged,
        }
    }

    #[test]
    fn test_colon_form_with_unit() {
        let tests = extract_lab_tests(&["Glucose: 85 mg/dL (70-99)"]).unwrap();
        assert_eq!(
            tests,
            vec![record("Glucose", "85", Some("mg/dL"), "70.0-99.0", false)]
        );
    }

    #[test]
    fn test_spaced_form() {
        let tests = extract_lab_tests(&["Hemoglobin 16.5 g/dL 13.5 - 17.5"]).unwrap();
        assert_eq!(
            tests,
            vec![record("Hemoglobin", "16.5", Some("g/dL"), "13.5-17.5", false)]
        );
    }

    #[test]
    fn test_colon_form_without_unit_is_flagged() {
        let tests = extract_lab_tests(&["WBC: 15.2 (4.5-11.0)"]).unwrap();
        assert_eq!(tests, vec![record("WBC", "15.2", None, "4.5-11.0", true)]);
        assert_eq!(tests[0].unit(), "");
    }

    #[test]
    fn test_lines_without_range_yield_nothing() {
        let lines = [
            "CITY GENERAL HOSPITAL",
            "Patient Name John Smith",
            "Report date 2024-01-05",
            "",
        ];
        assert!(extract_lab_tests(&lines).unwrap().is_empty());
    }

    #[test]
    fn test_below_minimum_is_flagged() {
        let tests = extract_lab_tests(&["Ferritin: 8 ng/mL (12-150)"]).unwrap();
        assert!(tests[0].lab_test_out_of_range);
    }

    #[test]
    fn test_boundary_values_are_in_range() {
        let tests =
            extract_lab_tests(&["Glucose: 70 mg/dL (70-99)", "Glucose: 99.0 mg/dL (70-99)"])
                .unwrap();
        assert_eq!(tests.len(), 2);
        assert!(tests.iter().all(|t| !t.lab_test_out_of_range));
    }

    #[test]
    fn test_multiple_matches_on_one_line() {
        let line = "Sodium: 140 mmol/L (135-145) Potassium: 6.1 mmol/L (3.5-5.1)";
        let tests = extract_lab_tests(&[line]).unwrap();
        assert_eq!(
            tests,
            vec![
                record("Sodium", "140", Some("mmol/L"), "135.0-145.0", false),
                record("Potassium", "6.1", Some("mmol/L"), "3.5-5.1", true),
            ]
        );
    }

    #[test]
    fn test_line_matching_both_forms_yields_duplicates() {
        let line = "Glucose 85 mg/dL 70 - 99 Glucose: 85 mg/dL (70-99)";
        let tests = extract_lab_tests(&[line]).unwrap();
        assert_eq!(tests.len(), 2);
        assert_eq!(tests[0], tests[1]);
        assert_eq!(tests[0].test_name, "Glucose");
    }

    #[test]
    fn test_colon_matches_precede_spaced_matches() {
        let line = "Glucose 85 mg/dL 70 - 99 Fasting: 90 mg/dL (70-99)";
        let names: Vec<_> = extract_lab_tests(&[line])
            .unwrap()
            .into_iter()
            .map(|t| t.test_name)
            .collect();
        assert_eq!(names, vec!["Fasting", "Glucose"]);
    }

    #[test]
    fn test_output_follows_line_order() {
        let lines = [
            "Hemoglobin 16.5 g/dL 13.5 - 17.5",
            "Glucose: 85 mg/dL (70-99)",
            "WBC: 15.2 (4.5-11.0)",
        ];
        let names: Vec<_> = extract_lab_tests(&lines)
            .unwrap()
            .into_iter()
            .map(|t| t.test_name)
            .collect();
        assert_eq!(names, vec!["Hemoglobin", "Glucose", "WBC"]);
    }

    #[test]
    fn test_non_numeric_value_is_not_flagged() {
        let tests = extract_lab_tests(&["Glucose: 8.5.1 mg/dL (70-99)"]).unwrap();
        assert_eq!(tests[0].test_value, "8.5.1");
        assert!(!tests[0].lab_test_out_of_range);
    }

    #[test]
    fn test_malformed_bound_is_an_evaluation_error() {
        let result = extract_lab_tests(&["Glucose: 85 mg/dL (7.0.1-99)"]);
        assert!(matches!(result, Err(LabScanError::PatternEvaluation(_))));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let lines = vec![
            "Glucose: 85 mg/dL (70-99)".to_string(),
            "Hemoglobin 16.5 g/dL 13.5 - 17.5".to_string(),
        ];
        let extractor = LabTestExtractor::new();
        assert_eq!(
            extractor.extract(&lines).unwrap(),
            extractor.extract(&lines).unwrap()
        );
    }
}

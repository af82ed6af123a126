use std::sync::LazyLock;

use regex::Regex;

/// `Glucose: 85 mg/dL (70-99)`; the unit is optional.
static COLON_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"([A-Za-z\s\(\)]+):\s*([0-9\.]+)\s*([a-zA-Z/%]+)?\s*\(([0-9\.]+)\s*-\s*([0-9\.]+)\)",
    )
    .expect("colon form pattern must compile")
});

/// `Hemoglobin 16.5 g/dL 13.5 - 17.5`; the unit is required.
static SPACED_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"([A-Za-z\s\(\)]+)\s+([0-9\.]+)\s+([a-zA-Z/%]+)\s+([0-9\.]+)\s*-\s*([0-9\.]+)",
    )
    .expect("spaced form pattern must compile")
});

/// Line grammars recognised on a lab report, in evaluation order.
///
/// Every grammar exposes the same five capture groups: name, value, unit,
/// range minimum and range maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePattern {
    Colon,
    Spaced,
}

impl LinePattern {
    pub const ALL: [LinePattern; 2] = [LinePattern::Colon, LinePattern::Spaced];

    pub const NAME: usize = 1;
    pub const VALUE: usize = 2;
    pub const UNIT: usize = 3;
    pub const MIN: usize = 4;
    pub const MAX: usize = 5;

    pub fn regex(&self) -> &'static Regex {
        match self {
            LinePattern::Colon => &COLON_FORM,
            LinePattern::Spaced => &SPACED_FORM,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LinePattern::Colon => "colon",
            LinePattern::Spaced => "spaced",
        }
    }
}

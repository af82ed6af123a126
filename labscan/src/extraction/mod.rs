//! Lab test extraction from recognized report text.
//!
//! OCR output is noisy: lines may be merged, split or partially garbled.
//! The extractor therefore works line by line with a small set of tolerant
//! grammars and never assumes a clean table layout.
//!
//! ```rust,ignore
//! let tests = extract_lab_tests(&["Glucose: 85 mg/dL (70-99)"])?;
//! assert_eq!(tests[0].bio_reference_range, "70.0-99.0");
//! ```

mod extractor;
mod patterns;

pub use extractor::{extract_lab_tests, LabTestExtractor};
pub use patterns::LinePattern;

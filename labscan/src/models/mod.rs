mod report;

pub use lab_test::*;
pub use report::*;

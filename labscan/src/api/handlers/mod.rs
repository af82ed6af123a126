pub(crate) mod health;

pub use health::health_check;
pub use lab_tests::get_lab_tests;

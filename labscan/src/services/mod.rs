mod lab_report;

pub use lab_report::LabReportService;

pub mod excel;
pub mod format;
pub mod payslip;
pub mod pipeline;
pub mod words;

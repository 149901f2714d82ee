//! Report rendering: terminal formats and the PDF artifact

pub mod formatter;
pub mod pdf;

//! PWL (piecewise linear) text codec: one `time<TAB>value` breakpoint per line.

pub mod reader;
pub mod writer;

pub use reader::{read_file, read_records};
pub use writer::{format_record, format_time, format_value, write_file, write_records};

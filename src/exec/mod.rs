//! Result-file access: one SQLite file per benchmark execution, holding an
//! `exec_info(Property, Value)` key-value table.

pub mod info;
pub mod read;

pub use info::{ExecInfo, MissingFields, RequiredFields};
pub use read::{EXEC_INFO_TABLE, read_exec_info};

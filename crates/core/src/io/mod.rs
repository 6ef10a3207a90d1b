//! I/O for measurement records and station tables
//!
//! Readers accept any `std::io::Read` source; the `_path` variants open a file.

mod readings;
mod station_table;

pub use readings::{read_readings, read_readings_path, Reading, ReadingColumns};
pub use station_table::{read_station_table, read_station_table_path, StationTable};

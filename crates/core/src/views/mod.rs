pub mod day_boundary;
pub mod interval_table;
pub mod time_axis;

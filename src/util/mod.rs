pub mod paths;
pub mod time;
pub mod units;

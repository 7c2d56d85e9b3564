pub mod coerce;
pub mod prediction;
pub mod records;

pub mod rates;
pub mod schedule;

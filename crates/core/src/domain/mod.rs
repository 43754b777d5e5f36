pub mod category;
pub mod contract;
pub mod prediction;
pub mod statistics;

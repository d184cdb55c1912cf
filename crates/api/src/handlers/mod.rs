pub mod analysis;
pub mod records;

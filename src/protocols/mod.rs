pub mod at;
pub mod cfs;

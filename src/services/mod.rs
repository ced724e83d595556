pub mod billing;
pub mod memory;
pub mod repository;
pub mod sales;
pub mod stores;

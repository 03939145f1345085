pub mod analysis;
pub mod dataset_store;
pub mod file_processor;

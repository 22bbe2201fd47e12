pub mod csv_provider;
pub mod frame_processing;

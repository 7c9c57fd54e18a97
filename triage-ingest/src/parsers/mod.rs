pub mod csv_batch;
pub mod json_batch;

// Storage layer (S3)

pub mod s3_client;

pub use s3_client::*;

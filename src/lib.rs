pub mod add;
pub mod init;
pub mod models;
pub mod review;
pub mod srs;
pub mod stats;
pub mod utils;

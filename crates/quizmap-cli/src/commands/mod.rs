pub mod compare;
pub mod diagnose;
pub mod init;
pub mod stats;
pub mod validate;

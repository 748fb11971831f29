pub mod browser;
pub mod models;
pub mod source;

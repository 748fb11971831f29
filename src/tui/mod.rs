pub mod app;
pub mod edit;
pub mod fetch;
pub mod handlers;
pub mod ui;

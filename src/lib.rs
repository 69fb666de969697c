pub mod api;
pub mod app;
pub mod channel;
pub mod directory;
pub mod error;
pub mod history;
pub mod router;
pub mod selector;
pub mod session;
pub mod ui;
pub mod utils;

pub mod clipboard;
pub mod data;
pub mod odds;
pub mod persist;
pub mod state;

pub mod api;
pub mod sentiment;

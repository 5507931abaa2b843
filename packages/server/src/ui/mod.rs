//! UI 層: HTTP / WebSocket の入り口

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;

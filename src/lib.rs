//! Shared pad server: many WebSocket connections editing one piece of text
//! per room, last writer wins, with debounced write-behind to disk.

pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod websocket;
pub mod ws;

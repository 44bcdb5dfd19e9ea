// Live API client modules
//
// Hand-written client for the live platform's room endpoints, all wrapped
// in the `{ code, msg, data }` envelope.

pub mod client;
pub mod models;
pub mod room;

pub use client::{DEFAULT_API_BASE, LiveClient};

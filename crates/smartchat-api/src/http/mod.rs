//! HTTP layer: websocket relay endpoint, plain chat endpoints, health and
//! the embedded client page.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;

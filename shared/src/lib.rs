//! Shared domain layer for the shop ordering backend
//!
//! Everything in this crate is I/O free: domain entities, the identifier and
//! price primitives, the order status flow machine, and the unified error
//! system. The server crate layers persistence and HTTP on top.

pub mod error;
pub mod models;
pub mod types;
pub mod util;

pub use error::{AppError, AppResult, ErrorCode};
pub use types::{Id, Price};

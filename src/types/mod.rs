//! Shared request/response types.

mod pagination;
mod response;

pub use pagination::ListQuery;
pub use response::MessageResponse;

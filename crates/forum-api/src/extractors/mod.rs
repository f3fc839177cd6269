//! Axum extractors that reject with [`ApiError`](crate::response::ApiError)

mod body;
mod path;

pub use body::JsonBody;
pub use path::UidPath;

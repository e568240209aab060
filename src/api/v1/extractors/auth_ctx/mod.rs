mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;

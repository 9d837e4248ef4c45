//! Common types used across the application.

pub mod context;
pub mod id;
pub mod money;
pub mod pagination;

pub use context::RequestContext;
pub use id::*;
pub use money::{AMOUNT_SCALE, CurrencyCode, exceeds_scale};
pub use pagination::{PageMeta, PageRequest, PageResponse};

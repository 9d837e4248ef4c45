//! Tenant/session context.
//!
//! The session layer resolves the current tenant and user; core operations
//! receive them explicitly and never infer them.

use serde::{Deserialize, Serialize};

use super::id::{TenantId, UserId};

/// The tenant and user on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Current tenant.
    pub tenant_id: TenantId,
    /// Current user.
    pub user_id: UserId,
}

impl RequestContext {
    /// Creates a new request context.
    #[must_use]
    pub const fn new(tenant_id: TenantId, user_id: UserId) -> Self {
        Self { tenant_id, user_id }
    }
}

//! Per-request tenant scoping
//!
//! Tenancy is always an explicit parameter: handlers resolve the company from
//! the `x-company-id` header and pass the context down into every repository
//! call. No ambient or thread-local tenant state exists anywhere.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    pub company_id: i64,
}

impl TenantContext {
    pub fn new(company_id: i64) -> Self {
        Self { company_id }
    }
}

//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped with `clamp_limit` / `clamp_offset` before they reach
/// a repository.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Pagination plus a free-text `search` term.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub search: Option<String>,
}

/// `?role_key=` for endpoints that evaluate rules under a role.
#[derive(Debug, Deserialize)]
pub struct RoleKeyParams {
    pub role_key: String,
}

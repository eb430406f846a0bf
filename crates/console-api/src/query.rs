//! List query parameters
//!
//! Mirrors the backend's list endpoints: pagination, one sort column,
//! free-text search (`_q`), and per-resource filters. Only present
//! fields are rendered, so defaults stay off the wire.

use crate::models::{CertificateStatus, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Common list parameters.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(column.into());
        self.sort_order = Some(order);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".into(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".into(), limit.to_string()));
        }
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sortBy".into(), sort_by.clone()));
        }
        if let Some(order) = self.sort_order {
            pairs.push(("sortType".into(), order.as_str().into()));
        }
        if let Some(search) = &self.search {
            pairs.push(("_q".into(), search.clone()));
        }
        pairs
    }
}

/// User list parameters: common ones plus role/status filters.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub list: ListQuery,
    pub role: Option<UserRole>,
    pub status: Option<bool>,
}

impl UserQuery {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = self.list.to_query();
        if let Some(role) = self.role {
            pairs.push(("role".into(), role.as_str().into()));
        }
        if let Some(status) = self.status {
            pairs.push(("status".into(), status.to_string()));
        }
        pairs
    }
}

/// Certificate list parameters.
#[derive(Debug, Clone, Default)]
pub struct CertificateQuery {
    pub list: ListQuery,
    pub status: Option<CertificateStatus>,
    pub is_revoked: Option<bool>,
}

impl CertificateQuery {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = self.list.to_query();
        if let Some(status) = self.status {
            pairs.push(("status".into(), status.as_str().into()));
        }
        if let Some(is_revoked) = self.is_revoked {
            pairs.push(("isRevoked".into(), is_revoked.to_string()));
        }
        pairs
    }
}

//! Query parameters for list endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::config::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::domain::EscrowStatus;
use crate::errors::{AppError, AppResult};
use crate::infra::EscrowFilter;

/// Listing query: optional status filter plus limit/offset pagination.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Restrict to one lifecycle status, e.g. `pending`
    pub status: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            status: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl ListQuery {
    /// Validate and convert into a repository filter. An unknown status
    /// string is a validation error rather than an empty result.
    pub fn to_filter(&self) -> AppResult<EscrowFilter> {
        let status = match &self.status {
            Some(s) => Some(
                EscrowStatus::parse(s)
                    .ok_or_else(|| AppError::validation(format!("Unknown status '{}'", s)))?,
            ),
            None => None,
        };

        Ok(EscrowFilter {
            status,
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
            offset: self.offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped_to_the_maximum() {
        let query = ListQuery {
            status: None,
            limit: 10_000,
            offset: 5,
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.limit, MAX_PAGE_SIZE);
        assert_eq!(filter.offset, 5);
    }

    #[test]
    fn unknown_status_is_a_validation_error() {
        let query = ListQuery {
            status: Some("refunded".into()),
            ..Default::default()
        };
        assert!(matches!(
            query.to_filter(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn known_status_is_parsed() {
        let query = ListQuery {
            status: Some("awaiting_deposit".into()),
            ..Default::default()
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.status, Some(EscrowStatus::AwaitingDeposit));
    }
}

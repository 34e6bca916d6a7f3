//! Rewrite incompatibility
//!
//! Codes:
//! - FAST_PAGINATE_BOUND_PARAMETER
//! - FAST_PAGINATE_UNION
//! - FAST_PAGINATE_NON_KEY_GROUPING
//!
//! An incompatibility is a planning outcome, not a failure. The guard resolves
//! every one of them by falling back to unmodified pagination.

use std::fmt;

/// Result of planning the key-only query
pub type PlanResult<T> = Result<T, Incompatibility>;

/// Reason a query shape cannot be split into key + row queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncompatibilityCode {
    /// A retained order/having expression carries a bound parameter marker
    BoundParameter,
    /// The query has UNION members
    Union,
    /// GROUP BY over something other than the primary key alone
    NonKeyGrouping,
}

impl IncompatibilityCode {
    pub fn code(&self) -> &'static str {
        match self {
            IncompatibilityCode::BoundParameter => "FAST_PAGINATE_BOUND_PARAMETER",
            IncompatibilityCode::Union => "FAST_PAGINATE_UNION",
            IncompatibilityCode::NonKeyGrouping => "FAST_PAGINATE_NON_KEY_GROUPING",
        }
    }
}

impl fmt::Display for IncompatibilityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query shape that cannot be safely decomposed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incompatibility {
    code: IncompatibilityCode,
    message: String,
}

impl Incompatibility {
    pub fn bound_parameter(expression: impl Into<String>) -> Self {
        Self {
            code: IncompatibilityCode::BoundParameter,
            message: format!(
                "Retained expression '{}' contains a bound parameter",
                expression.into()
            ),
        }
    }

    pub fn union() -> Self {
        Self {
            code: IncompatibilityCode::Union,
            message: "UNION queries cannot be paginated by key".into(),
        }
    }

    pub fn non_key_grouping(groups: impl Into<String>) -> Self {
        Self {
            code: IncompatibilityCode::NonKeyGrouping,
            message: format!("Query is grouped by {}, not the primary key alone", groups.into()),
        }
    }

    pub fn code(&self) -> IncompatibilityCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Incompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl std::error::Error for Incompatibility {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            Incompatibility::bound_parameter("abs(x - ?)").code().code(),
            "FAST_PAGINATE_BOUND_PARAMETER"
        );
        assert_eq!(Incompatibility::union().code(), IncompatibilityCode::Union);
        assert_eq!(
            Incompatibility::non_key_grouping("author_id").code().code(),
            "FAST_PAGINATE_NON_KEY_GROUPING"
        );
    }

    #[test]
    fn test_display() {
        let err = Incompatibility::bound_parameter("abs(score - ?) as distance");
        let text = err.to_string();
        assert!(text.starts_with("[FAST_PAGINATE_BOUND_PARAMETER]"));
        assert!(text.contains("abs(score - ?)"));
    }
}

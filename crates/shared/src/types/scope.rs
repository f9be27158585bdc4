//! Company scoping for multi-tenant operations.

use serde::{Deserialize, Serialize};

/// The tenant context for a request.
///
/// Every core and repository operation takes an explicit `CompanyScope` rather
/// than reading ambient state; the API layer constructs it from validated JWT
/// claims and threads it down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyScope(String);

impl CompanyScope {
    /// Creates a new company scope.
    #[must_use]
    pub fn new(company_code: impl Into<String>) -> Self {
        Self(company_code.into())
    }

    /// Returns the company code.
    #[must_use]
    pub fn company_code(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CompanyScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

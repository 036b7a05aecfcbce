//! Company — a descriptive tuple embedded in settings.
//!
//! Unlike the other domain types, a company is not a repository entity: it
//! carries no [`Code`](super::code::Code) and is referenced only by the
//! settings/cutoff manager.

use serde::{Deserialize, Serialize};

/// Descriptive company record persisted as part of settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Company {
    /// Legal name.
    pub name: String,
    /// Taxpayer identification number.
    pub taxpayer_id: String,
    /// Bank account / routing codes.
    pub bank_codes: Vec<String>,
}

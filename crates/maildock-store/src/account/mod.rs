//! Account module.
//!
//! Provides the account model, the accounts file layout, and validation.

mod model;
mod validation;

pub use model::{Account, AccountsFile, StoredMessage};
pub use validation::{ValidationError, ValidationResult, validate_account};

//! Request-scoped resolved identity

use graphgate_common::AccountRecord;
use std::ops::Deref;

/// The account established as the caller of the current request.
///
/// Inserted into the request's extensions by the authentication layer and
/// dropped with the request. There is never more than one per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity(AccountRecord);

impl ResolvedIdentity {
    #[must_use]
    pub const fn new(account: AccountRecord) -> Self {
        Self(account)
    }

    /// The caller's account
    #[must_use]
    pub const fn account(&self) -> &AccountRecord {
        &self.0
    }

    #[must_use]
    pub fn into_account(self) -> AccountRecord {
        self.0
    }
}

impl Deref for ResolvedIdentity {
    type Target = AccountRecord;

    fn deref(&self) -> &AccountRecord {
        &self.0
    }
}

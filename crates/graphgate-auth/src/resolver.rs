//! Account resolution
//!
//! Every authentication path ends here: Basic credentials, bearer-token
//! claims and path ids are each turned into exactly one directory account.
//! Directory lookups by filter fetch at most two records, enough to tell
//! "unique" from "ambiguous" without paging through every match.

use graphgate_client::AccountDirectory;
use graphgate_common::{AccountQuery, AccountRecord, Error, Result};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::credentials::Credentials;
use crate::identity::ResolvedIdentity;
use crate::provider::Claims;
use crate::query::{ClaimsQuery, credentials_filter};

/// Page size for lookups that must match exactly one account
const UNIQUE_LOOKUP_PAGE_SIZE: i32 = 2;

/// Resolves callers and path ids to directory accounts
#[derive(Clone)]
pub struct AccountResolver {
    directory: Arc<dyn AccountDirectory>,
    claims_query: ClaimsQuery,
}

impl AccountResolver {
    /// Create a resolver over `directory`
    pub fn new(directory: Arc<dyn AccountDirectory>, claims_query: ClaimsQuery) -> Self {
        Self {
            directory,
            claims_query,
        }
    }

    /// The underlying directory
    #[must_use]
    pub fn directory(&self) -> &Arc<dyn AccountDirectory> {
        &self.directory
    }

    /// Resolve Basic credentials: login name and password must both match
    /// exactly one account.
    ///
    /// # Errors
    /// `AccountNotFound` on zero matches, `AmbiguousIdentity` on more than
    /// one, `Backend` if the directory call fails.
    pub async fn resolve_by_credentials(&self, credentials: &Credentials) -> Result<AccountRecord> {
        let filter = credentials_filter(credentials);
        let accounts = self
            .directory
            .list_accounts(&AccountQuery::filtered(filter, UNIQUE_LOOKUP_PAGE_SIZE))
            .await?
            .accounts;

        // The filter contains the password; identify the lookup by username.
        let subject = format!("login {}", credentials.username);
        let account = expect_single(accounts, &subject)?;
        debug!("Resolved login {} to account {}", credentials.username, account.id);
        Ok(account)
    }

    /// Resolve the caller of a bearer-authenticated request.
    ///
    /// An identity already attached to the request is returned unchanged.
    /// Otherwise the claims are mapped to a directory filter (email when
    /// present, issuer + subject otherwise) that must match exactly one
    /// account.
    ///
    /// # Errors
    /// `AccountNotFound` when there are no claims or nothing matches,
    /// `AmbiguousIdentity` when more than one account matches, `Backend` if
    /// the directory call fails.
    pub async fn resolve_by_context_or_claims(
        &self,
        identity: Option<&ResolvedIdentity>,
        claims: Option<&Claims>,
    ) -> Result<AccountRecord> {
        if let Some(identity) = identity {
            return Ok(identity.account().clone());
        }

        let claims = claims.ok_or_else(|| {
            Error::AccountNotFound("request carries neither an identity nor claims".to_string())
        })?;
        debug!(
            "Resolving claims iss={} sub={} (email present: {})",
            claims.issuer,
            claims.subject,
            !claims.email.is_empty()
        );

        let filter = self.claims_query.filter_for(claims);
        let accounts = self
            .directory
            .list_accounts(&AccountQuery::filtered(filter.clone(), UNIQUE_LOOKUP_PAGE_SIZE))
            .await
            .inspect_err(|e| {
                error!(
                    "Failed to read account for iss={} sub={}: {}",
                    claims.issuer, claims.subject, e
                );
            })?
            .accounts;

        expect_single(accounts, &filter)
    }

    /// Resolve an account by its stable id.
    ///
    /// # Errors
    /// `InvalidRequest` for an empty id, `AccountNotFound` if the directory
    /// does not know it, `Backend` for other directory failures.
    pub async fn resolve_by_id(&self, id: &str) -> Result<AccountRecord> {
        if id.is_empty() {
            return Err(Error::invalid_request("missing user id"));
        }

        self.directory.get_account(id).await.inspect_err(|e| {
            info!("Failed to read user {}: {}", id, e);
        })
    }
}

/// Require exactly one account; two or more is a data-integrity problem in
/// the directory and is reported with both candidates.
fn expect_single(accounts: Vec<AccountRecord>, subject: &str) -> Result<AccountRecord> {
    let mut iter = accounts.into_iter();
    match (iter.next(), iter.next()) {
        (Some(account), None) => Ok(account),
        (None, _) => {
            info!("No account matches {}", subject);
            Err(Error::AccountNotFound(subject.to_string()))
        }
        (Some(first), Some(second)) => {
            error!(
                "More than one account matches {}: {:?}, {:?}",
                subject, first, second
            );
            Err(Error::AmbiguousIdentity {
                query: subject.to_string(),
                first_id: first.id,
                second_id: second.id,
            })
        }
    }
}

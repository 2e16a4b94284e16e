//! Account directory client

use async_trait::async_trait;
use graphgate_common::{AccountPage, AccountQuery, AccountRecord, Error, Result, RpcDomain};
use graphgate_proto::accounts::{
    Account, GetAccountRequest, ListAccountsRequest, accounts_service_client::AccountsServiceClient,
};
use tonic::transport::Channel;
use tracing::debug;

/// Read access to the account directory
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Fetch one account by its stable id.
    ///
    /// # Errors
    /// `Error::AccountNotFound` for unknown ids, `Error::Backend` otherwise.
    async fn get_account(&self, id: &str) -> Result<AccountRecord>;

    /// List accounts matching `query.filter`, in backend order.
    ///
    /// # Errors
    /// `Error::Backend` when the call fails.
    async fn list_accounts(&self, query: &AccountQuery) -> Result<AccountPage>;
}

/// [`AccountDirectory`] backed by the `AccountsService` gRPC API
#[derive(Clone)]
pub struct GrpcAccountDirectory {
    client: AccountsServiceClient<Channel>,
}

impl GrpcAccountDirectory {
    #[must_use]
    pub const fn new(client: AccountsServiceClient<Channel>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AccountDirectory for GrpcAccountDirectory {
    async fn get_account(&self, id: &str) -> Result<AccountRecord> {
        let resp = self
            .client
            .clone()
            .get_account(GetAccountRequest { id: id.to_string() })
            .await
            .map_err(|status| Error::from_grpc(RpcDomain::Directory, &status, id))?;

        account_from_proto(resp.into_inner())
    }

    async fn list_accounts(&self, query: &AccountQuery) -> Result<AccountPage> {
        debug!(
            "Listing accounts (page_size={}, filtered={})",
            query.page_size,
            !query.filter.is_empty()
        );
        let resp = self
            .client
            .clone()
            .list_accounts(ListAccountsRequest {
                page_size: query.page_size,
                page_token: query.page_token.clone(),
                query: query.filter.clone(),
            })
            .await
            .map_err(|status| Error::from_grpc(RpcDomain::Directory, &status, &query.filter))?;

        let inner = resp.into_inner();
        let accounts = inner
            .accounts
            .into_iter()
            .map(account_from_proto)
            .collect::<Result<Vec<_>>>()?;

        Ok(AccountPage {
            accounts,
            next_page_token: inner.next_page_token,
        })
    }
}

/// Convert a wire account, enforcing the non-empty id invariant
fn account_from_proto(account: Account) -> Result<AccountRecord> {
    if account.id.is_empty() {
        return Err(Error::Backend {
            domain: RpcDomain::Directory,
            code: tonic::Code::DataLoss,
            message: "directory returned an account without id".to_string(),
        });
    }

    Ok(AccountRecord {
        id: account.id,
        display_name: account.display_name,
        mail: account.mail,
        given_name: account.given_name,
        surname: account.surname,
        preferred_name: account.preferred_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_from_proto_keeps_absent_fields_absent() {
        let record = account_from_proto(Account {
            id: "4c510ada".to_string(),
            display_name: Some("Marie".to_string()),
            mail: Some(String::new()),
            given_name: None,
            surname: None,
            preferred_name: Some("marie".to_string()),
        })
        .unwrap();

        assert_eq!(record.id, "4c510ada");
        assert_eq!(record.display_name.as_deref(), Some("Marie"));
        // An empty string sent by the backend stays distinguishable from "not sent".
        assert_eq!(record.mail.as_deref(), Some(""));
        assert!(record.given_name.is_none());
    }

    #[test]
    fn test_account_from_proto_rejects_empty_id() {
        let err = account_from_proto(Account::default()).unwrap_err();
        assert!(matches!(err, Error::Backend { domain: RpcDomain::Directory, .. }));
        assert_eq!(err.http_status_code(), 500);
    }
}

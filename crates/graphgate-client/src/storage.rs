//! Storage gateway client
//!
//! The gateway reports failures in-band (`RpcStatus` in every response) in
//! addition to transport-level gRPC statuses. Both are mapped through
//! [`Error::from_rpc`] with the storage domain.

use async_trait::async_trait;
use graphgate_common::{Error, ResourceKind, Result, RpcDomain, StorageItem};
use graphgate_proto::storage::{
    ListContainerRequest, Reference, ResourceInfo, ResourceType, RpcCode, RpcStatus, StatRequest,
    storage_gateway_client::StorageGatewayClient,
};
use tonic::metadata::{AsciiMetadataKey, AsciiMetadataValue};
use tonic::transport::Channel;
use tracing::debug;

/// Metadata access to the storage hierarchy on behalf of a caller
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Stat a single path.
    ///
    /// # Errors
    /// `Error::ResourceNotFound` if the path does not exist,
    /// `Error::Backend` for any other failure.
    async fn stat(&self, access_token: Option<&str>, path: &str) -> Result<StorageItem>;

    /// List the direct children of a container, in backend order.
    ///
    /// # Errors
    /// Same as [`StorageGateway::stat`].
    async fn list_container(&self, access_token: Option<&str>, path: &str)
    -> Result<Vec<StorageItem>>;
}

/// [`StorageGateway`] backed by the `StorageGateway` gRPC API
#[derive(Clone)]
pub struct GrpcStorageGateway {
    client: StorageGatewayClient<Channel>,
    token_key: AsciiMetadataKey,
}

impl GrpcStorageGateway {
    /// Create a client that forwards access tokens under `token_header`
    ///
    /// # Errors
    /// Returns `Error::InvalidRequest` if `token_header` is not a valid
    /// metadata key.
    pub fn new(client: StorageGatewayClient<Channel>, token_header: &str) -> Result<Self> {
        let token_key = AsciiMetadataKey::from_bytes(token_header.as_bytes()).map_err(|e| {
            Error::invalid_request(format!("invalid token header {token_header}: {e}"))
        })?;
        Ok(Self { client, token_key })
    }

    /// Wrap a message, attaching the caller's token as call metadata
    fn request<T>(&self, message: T, access_token: Option<&str>) -> Result<tonic::Request<T>> {
        let mut request = tonic::Request::new(message);
        if let Some(token) = access_token.filter(|t| !t.is_empty()) {
            let value = AsciiMetadataValue::try_from(token)
                .map_err(|_| Error::invalid_request("access token contains invalid characters"))?;
            request.metadata_mut().insert(self.token_key.clone(), value);
        }
        Ok(request)
    }
}

#[async_trait]
impl StorageGateway for GrpcStorageGateway {
    async fn stat(&self, access_token: Option<&str>, path: &str) -> Result<StorageItem> {
        let request = self.request(
            StatRequest {
                reference: Some(Reference {
                    path: path.to_string(),
                }),
            },
            access_token,
        )?;

        let resp = self
            .client
            .clone()
            .stat(request)
            .await
            .map_err(|status| Error::from_grpc(RpcDomain::Storage, &status, path))?
            .into_inner();

        check_status(resp.status, path)?;
        let info = resp.info.ok_or_else(|| Error::Backend {
            domain: RpcDomain::Storage,
            code: tonic::Code::Internal,
            message: format!("stat of {path} returned no resource info"),
        })?;
        Ok(item_from_proto(info))
    }

    async fn list_container(
        &self,
        access_token: Option<&str>,
        path: &str,
    ) -> Result<Vec<StorageItem>> {
        let request = self.request(
            ListContainerRequest {
                reference: Some(Reference {
                    path: path.to_string(),
                }),
            },
            access_token,
        )?;

        let resp = self
            .client
            .clone()
            .list_container(request)
            .await
            .map_err(|status| Error::from_grpc(RpcDomain::Storage, &status, path))?
            .into_inner();

        check_status(resp.status, path)?;
        debug!("Listed {} children of {}", resp.infos.len(), path);
        Ok(resp.infos.into_iter().map(item_from_proto).collect())
    }
}

/// Turn the in-band status into an error unless it is OK
fn check_status(status: Option<RpcStatus>, path: &str) -> Result<()> {
    let Some(status) = status else {
        return Err(Error::Backend {
            domain: RpcDomain::Storage,
            code: tonic::Code::Internal,
            message: "response carried no status".to_string(),
        });
    };

    let code = match RpcCode::try_from(status.code).unwrap_or(RpcCode::Unspecified) {
        RpcCode::Ok => return Ok(()),
        RpcCode::NotFound => tonic::Code::NotFound,
        RpcCode::PermissionDenied => tonic::Code::PermissionDenied,
        RpcCode::Unauthenticated => tonic::Code::Unauthenticated,
        RpcCode::InvalidArgument => tonic::Code::InvalidArgument,
        RpcCode::Unavailable => tonic::Code::Unavailable,
        RpcCode::Internal | RpcCode::Unspecified => tonic::Code::Internal,
    };
    Err(Error::from_rpc(RpcDomain::Storage, code, status.message, path))
}

fn item_from_proto(info: ResourceInfo) -> StorageItem {
    let kind = match ResourceType::try_from(info.r#type) {
        Ok(ResourceType::File) => ResourceKind::File,
        Ok(ResourceType::Container) => ResourceKind::Container,
        _ => ResourceKind::Unrecognized(info.r#type),
    };

    StorageItem {
        id: info.id,
        path: info.path,
        size: info.size,
        kind,
        etag: non_empty(info.etag),
        mime_type: non_empty(info.mime_type),
        mtime: (info.mtime_seconds != 0).then_some(info.mtime_seconds),
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: RpcCode) -> Option<RpcStatus> {
        Some(RpcStatus {
            code: code as i32,
            message: "detail".to_string(),
            trace: String::new(),
        })
    }

    #[test]
    fn test_check_status_ok() {
        assert!(check_status(status(RpcCode::Ok), "/").is_ok());
    }

    #[test]
    fn test_check_status_not_found() {
        let err = check_status(status(RpcCode::NotFound), "/missing").unwrap_err();
        assert!(matches!(err, Error::ResourceNotFound(ref p) if p == "/missing"));
        assert_eq!(err.http_status_code(), 404);
    }

    #[test]
    fn test_check_status_other_codes() {
        for code in [RpcCode::PermissionDenied, RpcCode::Internal, RpcCode::Unavailable] {
            let err = check_status(status(code), "/").unwrap_err();
            assert_eq!(err.http_status_code(), 500, "{code:?}");
        }
        // Missing status and unknown numeric codes are backend failures too.
        assert_eq!(check_status(None, "/").unwrap_err().http_status_code(), 500);
        let unknown = Some(RpcStatus {
            code: 42,
            message: String::new(),
            trace: String::new(),
        });
        assert_eq!(check_status(unknown, "/").unwrap_err().http_status_code(), 500);
    }

    #[test]
    fn test_item_from_proto() {
        let item = item_from_proto(ResourceInfo {
            id: "r1".to_string(),
            path: "/Photos".to_string(),
            size: 4096,
            r#type: ResourceType::Container as i32,
            etag: String::new(),
            mime_type: "httpd/unix-directory".to_string(),
            mtime_seconds: 0,
        });
        assert_eq!(item.kind, ResourceKind::Container);
        assert_eq!(item.size, 4096);
        assert!(item.etag.is_none());
        assert!(item.mtime.is_none());
        assert_eq!(item.mime_type.as_deref(), Some("httpd/unix-directory"));
    }

    #[test]
    fn test_item_from_proto_keeps_unknown_kind() {
        let item = item_from_proto(ResourceInfo {
            path: "/link".to_string(),
            r#type: ResourceType::Symlink as i32,
            ..ResourceInfo::default()
        });
        assert_eq!(item.kind, ResourceKind::Unrecognized(ResourceType::Symlink as i32));
    }
}

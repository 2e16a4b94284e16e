//! Translation from backend records to Graph resources

use chrono::{DateTime, SecondsFormat};
use graphgate_common::{AccountRecord, Error, ResourceKind, Result, StorageItem};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Name given to the item at `/`
const ROOT_NAME: &str = "root";

/// Graph `user` resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_name: Option<String>,
}

/// Graph `driveItem` resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub size: i64,
    #[serde(rename = "eTag", skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileFacet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<FolderFacet>,
}

/// Marker for file items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFacet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Marker for container items, serialized as `{}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderFacet {}

impl DriveItem {
    /// The storage kind the facets stand for, if any facet is set
    #[must_use]
    pub fn kind(&self) -> Option<ResourceKind> {
        match (&self.folder, &self.file) {
            (Some(_), _) => Some(ResourceKind::Container),
            (None, Some(_)) => Some(ResourceKind::File),
            (None, None) => None,
        }
    }
}

/// Graph collection body: `{"value": [...]}`
#[derive(Debug, Serialize)]
pub struct Collection<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink", skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

impl<T> Collection<T> {
    pub const fn new(value: Vec<T>) -> Self {
        Self {
            value,
            next_link: None,
        }
    }
}

impl From<AccountRecord> for User {
    fn from(account: AccountRecord) -> Self {
        Self {
            id: account.id,
            display_name: account.display_name,
            mail: account.mail,
            given_name: account.given_name,
            surname: account.surname,
            preferred_name: account.preferred_name,
        }
    }
}

/// Translate a directory account into a Graph user
#[must_use]
pub fn user_from_account(account: AccountRecord) -> User {
    account.into()
}

/// Last non-empty path segment; `/` is the root
fn item_name(path: &str) -> &str {
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or(ROOT_NAME)
}

/// Translate storage metadata into a Graph drive item.
///
/// # Errors
/// `SizeOverflow` if the size does not fit an `i64`, `TimestampOverflow` if
/// the mtime cannot be represented, `UnrecognizedResourceKind` for kinds
/// with no Graph facet.
pub fn drive_item_from_storage(item: &StorageItem) -> Result<DriveItem> {
    let size = i64::try_from(item.size).map_err(|_| {
        error!("Size {} of {} does not fit the Graph size field", item.size, item.path);
        Error::SizeOverflow {
            path: item.path.clone(),
            size: item.size,
        }
    })?;

    let last_modified_date_time = item
        .mtime
        .map(|seconds| {
            i64::try_from(seconds)
                .ok()
                .and_then(|s| DateTime::from_timestamp(s, 0))
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
                .ok_or_else(|| {
                    error!("Modification time {} of {} is out of range", seconds, item.path);
                    Error::TimestampOverflow {
                        path: item.path.clone(),
                        seconds,
                    }
                })
        })
        .transpose()?;

    let (file, folder) = match item.kind {
        ResourceKind::File => (
            Some(FileFacet {
                mime_type: item.mime_type.clone(),
            }),
            None,
        ),
        ResourceKind::Container => (None, Some(FolderFacet {})),
        ResourceKind::Unrecognized(code) => {
            error!("Resource {} has unrecognized type {}", item.path, code);
            return Err(Error::UnrecognizedResourceKind {
                path: item.path.clone(),
                code,
            });
        }
    };

    Ok(DriveItem {
        id: (!item.id.is_empty()).then(|| item.id.clone()),
        name: item_name(&item.path).to_string(),
        size,
        etag: item.etag.clone(),
        last_modified_date_time,
        file,
        folder,
    })
}

/// Translate a listing, preserving order. Fails on the first bad item.
///
/// # Errors
/// See [`drive_item_from_storage`].
pub fn translate_items(items: &[StorageItem]) -> Result<Vec<DriveItem>> {
    items.iter().map(drive_item_from_storage).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_omits_absent_fields() {
        let user = user_from_account(AccountRecord::with_id("4c510ada").with_mail("a@example.org"));
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "4c510ada", "mail": "a@example.org"})
        );
    }

    #[test]
    fn test_user_field_names() {
        let account = AccountRecord {
            id: "1".into(),
            display_name: Some("Marie Curie".into()),
            mail: None,
            given_name: Some("Marie".into()),
            surname: Some("Curie".into()),
            preferred_name: Some("marie".into()),
        };
        let json = serde_json::to_value(user_from_account(account)).unwrap();
        assert_eq!(json["displayName"], "Marie Curie");
        assert_eq!(json["givenName"], "Marie");
        assert_eq!(json["surname"], "Curie");
        assert_eq!(json["preferredName"], "marie");
        assert!(json.get("mail").is_none());
    }

    #[test]
    fn test_item_names() {
        assert_eq!(item_name("/"), "root");
        assert_eq!(item_name(""), "root");
        assert_eq!(item_name("/Documents"), "Documents");
        assert_eq!(item_name("/Documents/"), "Documents");
        assert_eq!(item_name("/a/b/report.pdf"), "report.pdf");
    }

    #[test]
    fn test_file_item() {
        let mut item = StorageItem::new("/Photos/cat.jpg", ResourceKind::File, 2048);
        item.id = "abc".into();
        item.etag = Some("\"e1\"".into());
        item.mime_type = Some("image/jpeg".into());
        item.mtime = Some(1_600_000_000);

        let drive_item = drive_item_from_storage(&item).unwrap();
        assert_eq!(drive_item.id.as_deref(), Some("abc"));
        assert_eq!(drive_item.name, "cat.jpg");
        assert_eq!(drive_item.size, 2048);
        assert_eq!(
            drive_item.last_modified_date_time.as_deref(),
            Some("2020-09-13T12:26:40Z")
        );
        assert_eq!(drive_item.kind(), Some(ResourceKind::File));

        let json = serde_json::to_value(&drive_item).unwrap();
        assert_eq!(json["eTag"], "\"e1\"");
        assert_eq!(json["file"]["mimeType"], "image/jpeg");
        assert!(json.get("folder").is_none());
    }

    #[test]
    fn test_container_item() {
        let drive_item =
            drive_item_from_storage(&StorageItem::new("/", ResourceKind::Container, 4096)).unwrap();
        assert_eq!(drive_item.name, "root");
        assert_eq!(drive_item.size, 4096);
        assert_eq!(drive_item.id, None);
        assert_eq!(drive_item.kind(), Some(ResourceKind::Container));

        let json = serde_json::to_value(&drive_item).unwrap();
        assert_eq!(json["folder"], serde_json::json!({}));
        assert!(json.get("file").is_none());
    }

    #[test]
    fn test_size_boundary() {
        let max = StorageItem::new("/max", ResourceKind::File, i64::MAX as u64);
        assert_eq!(drive_item_from_storage(&max).unwrap().size, i64::MAX);

        let over = StorageItem::new("/over", ResourceKind::File, i64::MAX as u64 + 1);
        assert!(matches!(
            drive_item_from_storage(&over),
            Err(Error::SizeOverflow { size, .. }) if size == i64::MAX as u64 + 1
        ));
    }

    #[test]
    fn test_unrecognized_kind_fails() {
        let link = StorageItem::new("/link", ResourceKind::Unrecognized(3), 0);
        assert!(matches!(
            drive_item_from_storage(&link),
            Err(Error::UnrecognizedResourceKind { code: 3, .. })
        ));
    }

    #[test]
    fn test_mtime_out_of_range() {
        let mut item = StorageItem::new("/old", ResourceKind::File, 1);
        item.mtime = Some(u64::MAX);
        assert!(matches!(
            drive_item_from_storage(&item),
            Err(Error::TimestampOverflow { .. })
        ));
    }

    #[test]
    fn test_listing_preserves_order_and_fails_whole() {
        let items = vec![
            StorageItem::new("/", ResourceKind::Container, 0),
            StorageItem::new("/b", ResourceKind::File, 1),
            StorageItem::new("/a", ResourceKind::Container, 2),
        ];
        let names: Vec<_> = translate_items(&items)
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, ["root", "b", "a"]);

        let mut bad = items;
        bad.push(StorageItem::new("/big", ResourceKind::File, u64::MAX));
        assert!(translate_items(&bad).is_err());
    }

    #[test]
    fn test_collection_next_link() {
        let body = serde_json::to_value(Collection::<User>::new(Vec::new())).unwrap();
        assert_eq!(body, serde_json::json!({"value": []}));

        let mut page = Collection::new(vec![user_from_account(AccountRecord::with_id("1"))]);
        page.next_link = Some("users?page_token=t".into());
        let body = serde_json::to_value(page).unwrap();
        assert_eq!(body["@odata.nextLink"], "users?page_token=t");
    }
}

//! Filesystem document store for rx-store
//!
//! Lays documents out like a document database, one JSON file per document:
//!
//! ```text
//! {root}/{state collection}/{user id}.json
//! {root}/{action collection}/{yyyyMMddHHmmssSSS}.json
//! ```

use async_trait::async_trait;
use rx_store::{DataApi, Document, SyncError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// User id used when nobody is logged in
pub const DEFAULT_USER: &str = "default_user";

/// `DataApi` storing documents as JSON files below a root directory
///
/// # Example
///
/// ```rust,ignore
/// let api = Arc::new(FsDataApi::new(config.resolved_data_dir()?, config.user_id.clone()));
/// let store = Store::builder(initial).data_api(api).build();
/// ```
#[derive(Debug)]
pub struct FsDataApi {
    root: PathBuf,
    user_id: RwLock<Option<String>>,
}

impl FsDataApi {
    pub fn new(root: impl Into<PathBuf>, user_id: Option<String>) -> Self {
        Self {
            root: root.into(),
            user_id: RwLock::new(user_id),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Switch the logged-in user
    pub fn set_user_id(&self, user_id: Option<String>) {
        *self
            .user_id
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = user_id;
    }

    fn collection_dir(&self, collection: &str) -> Result<PathBuf, SyncError> {
        check_path_segment("collection name", collection)?;
        Ok(self.root.join(collection))
    }

    fn state_path(&self, collection: &str) -> Result<PathBuf, SyncError> {
        let user = self.user_id().unwrap_or_else(|| DEFAULT_USER.to_string());
        check_path_segment("user id", &user)?;
        Ok(self.collection_dir(collection)?.join(format!("{}.json", user)))
    }
}

/// Names used as a single path component must not leave their directory
fn check_path_segment(kind: &str, name: &str) -> Result<(), SyncError> {
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(SyncError::Unavailable(format!("invalid {} '{}'", kind, name)));
    }
    Ok(())
}

/// First free `{id}.json` / `{id}-{n}.json` path in `dir`
async fn free_document_path(dir: &Path, id: &str) -> Result<PathBuf, SyncError> {
    let mut path = dir.join(format!("{}.json", id));
    let mut suffix = 1;
    while tokio::fs::try_exists(&path).await? {
        path = dir.join(format!("{}-{}.json", id, suffix));
        suffix += 1;
    }
    Ok(path)
}

#[async_trait]
impl DataApi for FsDataApi {
    fn user_id(&self) -> Option<String> {
        self.user_id
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn get_state(&self, collection: &str) -> Result<Option<Document>, SyncError> {
        let path = self.state_path(collection)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No state document at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let document: Document = serde_json::from_str(&content)?;
        log::debug!("Loaded state document from {}", path.display());
        Ok(Some(document))
    }

    async fn set_state(&self, collection: &str, document: Document) -> Result<(), SyncError> {
        let path = self.state_path(collection)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(&document)?;
        tokio::fs::write(&path, content).await?;
        log::debug!("Saved state document to {}", path.display());
        Ok(())
    }

    async fn store_action(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), SyncError> {
        let dir = self.collection_dir(collection)?;
        tokio::fs::create_dir_all(&dir).await?;
        let path = free_document_path(&dir, id).await?;
        let content = serde_json::to_string_pretty(&document)?;
        tokio::fs::write(&path, content).await?;
        log::debug!("Saved action document to {}", path.display());
        Ok(())
    }
}

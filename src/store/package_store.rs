//! Directory-backed package store

use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs::{self, File, OpenOptions};
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{}", .0)]
    CreateDir(#[source] io::Error),

    #[error("{}", .0)]
    List(#[source] io::Error),

    #[error("Invalid package name {0:?}")]
    InvalidName(String),

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("{}", .0)]
    Io(#[from] io::Error),
}

/// Packages live as plain files directly under `root`
#[derive(Debug, Clone)]
pub struct PackageStore {
    root: PathBuf,
    extension: String,
}

impl PackageStore {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Catalog-visible package names, in directory iteration order.
    ///
    /// A missing directory is created (hidden where supported) and yields an
    /// empty catalog.
    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        if !self.root_exists().await {
            self.create_root().await?;
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.root).await.map_err(StoreError::List)?;
        let mut packages = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(StoreError::List)? {
            let name = entry.file_name();
            match name.to_str() {
                Some(name) if name.ends_with(&self.extension) => packages.push(name.to_string()),
                Some(_) => {}
                None => debug!("Skipping non UTF-8 entry {:?}", name),
            }
        }

        Ok(packages)
    }

    /// Open (creating if needed) a package for appending uploaded bytes
    pub async fn open_append(&self, name: &str) -> Result<File, StoreError> {
        let path = self.resolve(name)?;
        if !self.root_exists().await {
            self.create_root().await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(file)
    }

    /// Full path of an existing package
    pub async fn package_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        let path = self.resolve(name)?;
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(StoreError::NotFound(name.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Map a client-supplied name to a path inside the store.
    ///
    /// Only a single plain file name is accepted.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, StoreError> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(name)),
            _ => Err(StoreError::InvalidName(name.to_string())),
        }
    }

    /// Unreadable counts as missing; creation then reports the real error
    async fn root_exists(&self) -> bool {
        matches!(fs::try_exists(&self.root).await, Ok(true))
    }

    async fn create_root(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(StoreError::CreateDir)?;
        info!("Created package store at {}", self.root.display());

        if let Err(e) = mark_hidden(&self.root).await {
            warn!("Could not hide {}: {}", self.root.display(), e);
        }
        Ok(())
    }
}

#[cfg(windows)]
async fn mark_hidden(path: &Path) -> io::Result<()> {
    let status = tokio::process::Command::new("attrib")
        .arg("+H")
        .arg(path)
        .status()
        .await?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::new(io::ErrorKind::Other, format!("attrib exited with {}", status)))
    }
}

#[cfg(not(windows))]
async fn mark_hidden(_path: &Path) -> io::Result<()> {
    Ok(())
}

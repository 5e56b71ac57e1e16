//! On-disk client store: one folder per client with a `config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;
use vetmig_model::{ClientConfig, MigrationError, SourceSystem};

pub const CONFIG_FILE: &str = "config.json";

/// Accessor for the clients directory.
#[derive(Debug, Clone)]
pub struct ClientStore {
    root: PathBuf,
}

/// One client folder, with its configuration or the reason it failed
/// to load.
#[derive(Debug)]
pub struct ClientEntry {
    pub slug: String,
    pub config: Option<ClientConfig>,
    pub problem: Option<String>,
}

impl ClientStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn client_dir(&self, slug: &str) -> PathBuf {
        self.root.join(slug)
    }

    pub fn config_path(&self, slug: &str) -> PathBuf {
        self.client_dir(slug).join(CONFIG_FILE)
    }

    /// Lists client folders sorted by slug. Folders with a broken
    /// configuration are reported, not skipped.
    pub fn list(&self) -> Result<Vec<ClientEntry>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.root)
            .with_context(|| format!("reading clients directory {}", self.root.display()))?;
        let mut clients = Vec::new();
        for entry_result in entries {
            let entry = entry_result
                .with_context(|| format!("reading clients directory {}", self.root.display()))?;
            if !entry.path().is_dir() {
                continue;
            }
            let Some(slug) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            match self.load(&slug) {
                Ok(config) => clients.push(ClientEntry {
                    slug,
                    config: Some(config),
                    problem: None,
                }),
                Err(error) => clients.push(ClientEntry {
                    slug,
                    config: None,
                    problem: Some(format!("{error:#}")),
                }),
            }
        }
        clients.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(clients)
    }

    /// Loads one client's configuration.
    pub fn load(&self, slug: &str) -> Result<ClientConfig> {
        let path = self.config_path(slug);
        let body = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: ClientConfig = serde_json::from_str(&body).map_err(|error| {
            MigrationError::Config(format!("parsing {}: {error}", path.display()))
        })?;
        Ok(config)
    }

    /// Creates a client folder with a configuration scaffold and an
    /// empty output directory. Refuses to overwrite an existing client.
    pub fn create(
        &self,
        name: &str,
        system: SourceSystem,
        source_path: &Path,
    ) -> Result<(String, PathBuf)> {
        let slug = slugify(name);
        if slug.is_empty() {
            bail!("client name {name:?} produces an empty folder name");
        }
        let dir = self.client_dir(&slug);
        if dir.exists() {
            bail!("client '{slug}' already exists at {}", dir.display());
        }
        std::fs::create_dir_all(dir.join("output"))
            .with_context(|| format!("creating {}", dir.display()))?;
        let config = ClientConfig::new(name, source_path.to_path_buf(), system);
        let path = self.config_path(&slug);
        let body = serde_json::to_string_pretty(&config).context("serializing configuration")?;
        std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
        info!(client = %slug, path = %path.display(), "client created");
        Ok((slug, path))
    }
}

/// Folder name from a display name: lowercase, non-alphanumeric runs
/// collapsed to single underscores.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_sep = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('_');
            last_was_sep = true;
        }
    }
    slug.trim_end_matches('_').to_string()
}

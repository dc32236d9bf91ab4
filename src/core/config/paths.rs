use std::env;
use std::path::{Path, PathBuf};

const ROOT_ENV: &str = "CATALOG_ADVISOR_ROOT";
const CONFIG_ENV: &str = "CATALOG_ADVISOR_CONFIG_PATH";
const SECRETS_ENV: &str = "CATALOG_ADVISOR_SECRETS_PATH";

/// Files the service reads at startup. Relative paths found in the config
/// (the log directory) are resolved against `project_root`.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub project_root: PathBuf,
    pub config_path: PathBuf,
    pub secrets_path: PathBuf,
}

impl AppPaths {
    /// Locates the project root and lets the environment point the config
    /// and secrets files elsewhere.
    pub fn new() -> Self {
        let mut paths = Self::from_root(discover_project_root());
        if let Some(path) = env_path(CONFIG_ENV) {
            paths.config_path = path;
        }
        if let Some(path) = env_path(SECRETS_ENV) {
            paths.secrets_path = path;
        }
        paths
    }

    /// `config.yml` and `secrets.yaml` directly under `root`.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let project_root = root.into();
        Self {
            config_path: project_root.join("config.yml"),
            secrets_path: project_root.join("secrets.yaml"),
            project_root,
        }
    }

    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

/// `CATALOG_ADVISOR_ROOT`, else the working directory when it holds a
/// `config.yml`, else the crate directory.
fn discover_project_root() -> PathBuf {
    if let Some(root) = env_path(ROOT_ENV) {
        return root;
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    match env::current_dir() {
        Ok(cwd) if cwd.join("config.yml").exists() => cwd,
        _ => manifest_dir,
    }
}

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::pagination::PagingMode;
use crate::resource::ResourceKind;

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub timeout: Option<usize>,
    pub proxy: Option<String>,
    pub token_env: Option<String>,
    #[serde(alias = "limit")]
    pub page_size: Option<u32>,
    pub paging: Option<HashMap<String, String>>,
    pub log_level: Option<String>,
    pub output_format: Option<String>,
    pub no_color: Option<bool>,
}

impl ConfigFile {
    pub fn paging_for(&self, kind: ResourceKind) -> Result<Option<PagingMode>, String> {
        let Some(paging) = self.paging.as_ref() else {
            return Ok(None);
        };
        let configured = paging
            .iter()
            .find(|(k, _)| k.parse::<ResourceKind>().ok() == Some(kind));
        match configured {
            Some((key, value)) => value
                .parse::<PagingMode>()
                .map(Some)
                .map_err(|e| format!("invalid paging for '{key}': {e}")),
            None => Ok(None),
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".listwise").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

pub fn parse_config(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents)
}

fn default_config_yaml() -> String {
    r#"# listwise config
#
# Location (default):
#   ~/.listwise/config.yml

# Record service
base_url: http://localhost:5000/api/
timeout: 10
# proxy: http://127.0.0.1:8080

# Name of the environment variable holding the bearer token (optional)
# token_env: LISTWISE_TOKEN

# Paging
# Allowed page sizes: 5, 10, 25, 50
page_size: 10
# Per-resource paging mode: local (fetch everything, slice here) or
# delegated (the service pages with page/limit)
paging:
  documents: delegated
  books: delegated
  projects: local
  categories: local

# Output
output_format: text
no_color: false

# Logging (error, warn, info, debug, trace); RUST_LOG wins when set
log_level: warn
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    let contents = default_config_yaml();
    std::fs::write(path, contents)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(())
}

use std::path::PathBuf;

use crate::error::CertError;

pub const DEFAULT_DB_PATH: &str = "certifications";
pub const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;

/// Where and how large the certification store is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base path; the LMDB environment lives in `<path>.lmdb/`.
    pub path: PathBuf,

    /// Upper bound of the memory map in bytes.
    pub map_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
            map_size: DEFAULT_MAP_SIZE,
        }
    }
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), ..Self::default() }
    }

    /// Loads configuration from the environment, reading `.env` first.
    ///
    /// Optional environment variables:
    /// - `CERT_DB_PATH`: base path of the store (default: `certifications`)
    /// - `CERT_DB_MAP_SIZE`: memory map size in bytes (default: 10 MiB)
    ///
    /// # Errors
    ///
    /// Returns [`CertError::Config`] if `CERT_DB_MAP_SIZE` is not a positive integer.
    pub fn from_env() -> Result<Self, CertError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CertError> {
        let path = lookup("CERT_DB_PATH")
            .filter(|p| !p.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from);

        let map_size = match lookup("CERT_DB_MAP_SIZE") {
            None => DEFAULT_MAP_SIZE,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(CertError::Config(format!(
                        "CERT_DB_MAP_SIZE must be a positive integer, got '{raw}'"
                    )))
                }
            },
        };

        Ok(Self { path, map_size })
    }

    /// Directory holding the LMDB environment files.
    pub fn lmdb_dir(&self) -> PathBuf {
        let mut dir = self.path.clone().into_os_string();
        dir.push(".lmdb");
        PathBuf::from(dir)
    }
}

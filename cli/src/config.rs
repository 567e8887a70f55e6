use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable that points the tracker at a different database file.
pub const DB_ENV_VAR: &str = "FITTRACK_DB";

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
}

impl Config {
    /// Resolve the data directory and database path.
    ///
    /// `--db` wins over `FITTRACK_DB`, which wins over `<data dir>/fittrack.db`.
    pub fn load(db_override: Option<PathBuf>) -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "fittrack").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_override =
            db_override.or_else(|| std::env::var_os(DB_ENV_VAR).map(PathBuf::from));
        Ok(Self::in_dir(&data_dir, db_override))
    }

    fn in_dir(data_dir: &Path, db_override: Option<PathBuf>) -> Self {
        let db_path = db_override.unwrap_or_else(|| data_dir.join("fittrack.db"));
        Config {
            db_path,
            data_dir: data_dir.to_path_buf(),
        }
    }

    /// Load the API key from disk, or generate a new one.
    ///
    /// Returns `(key, newly_created)`.
    pub fn load_or_create_api_key(&self) -> Result<(String, bool)> {
        use rand::Rng;
        use std::fmt::Write;

        let path = self.data_dir.join("api_key");

        if path.exists() {
            let key = std::fs::read_to_string(&path).context("Failed to read API key file")?;
            let key = key.trim().to_string();
            if !key.is_empty() {
                return Ok((key, false));
            }
        }

        let bytes: [u8; 32] = rand::rng().random();
        let key = bytes
            .iter()
            .fold(String::with_capacity(64), |mut acc: String, b| {
                let _ = write!(acc, "{b:02x}");
                acc
            });
        std::fs::write(&path, &key).context("Failed to write API key file")?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .context("Failed to set API key file permissions")?;
        }
        eprintln!("Generated new API key: {key}");
        eprintln!("Include in requests: Authorization: Bearer {key}");
        Ok((key, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_path_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::in_dir(dir.path(), None);
        assert_eq!(config.db_path, dir.path().join("fittrack.db"));
        assert_eq!(config.data_dir, dir.path());
    }

    #[test]
    fn test_db_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("elsewhere.db");
        let config = Config::in_dir(dir.path(), Some(custom.clone()));
        assert_eq!(config.db_path, custom);
    }

    #[test]
    fn test_api_key_created_then_reused() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::in_dir(dir.path(), None);

        let (key, created) = config.load_or_create_api_key().unwrap();
        assert!(created);
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));

        let (again, created) = config.load_or_create_api_key().unwrap();
        assert!(!created);
        assert_eq!(again, key);
    }

    #[cfg(unix)]
    #[test]
    fn test_api_key_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let config = Config::in_dir(dir.path(), None);
        config.load_or_create_api_key().unwrap();

        let mode = std::fs::metadata(dir.path().join("api_key"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

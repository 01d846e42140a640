use std::path::{Path, PathBuf};

use copicom_bridge::config::Config;
use directories::ProjectDirs;
use tokio::{
    fs::{OpenOptions, create_dir_all, read_to_string},
    io::AsyncWriteExt,
};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that can occur while loading or resolving application configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to determine the user's configuration or data directories. This
    /// usually occurs when required environment variables are missing (e.g.,
    /// `$HOME` on Unix or `%APPDATA%` on Windows).
    #[error("failed to obtain user's directories")]
    DirectoriesNotFound,
    /// An I/O error occurred while reading or writing the configuration file.
    #[error("failed to read config: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid TOML or does not match the expected structure.
    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] toml::de::Error),
    /// Failed to serialize the default configuration to TOML.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

fn build_project_dirs() -> Result<(PathBuf, PathBuf), ConfigError> {
    match ProjectDirs::from("mx", "copicom", "copicom") {
        Some(path) => Ok((
            path.config_dir().to_path_buf(),
            path.data_dir().to_path_buf(),
        )),
        None => Err(ConfigError::DirectoriesNotFound),
    }
}

/// Loads the application configuration from the platform's config directory.
/// Returns the loaded config, as well as the directory for on-device state.
pub async fn load_config() -> Result<(Config, PathBuf), ConfigError> {
    let (config_dir, data_dir) = build_project_dirs()?;
    load_config_from(&config_dir, data_dir).await
}

/// Loads `config.toml` from `config_dir`, writing the default configuration
/// there if the file does not exist yet. The data directory configured under
/// `[storage]` wins over `default_data_dir`.
pub async fn load_config_from(
    config_dir: &Path,
    default_data_dir: PathBuf,
) -> Result<(Config, PathBuf), ConfigError> {
    let config_path = config_dir.join(CONFIG_FILE_NAME);
    log::info!("Loading configuration from {config_path:?}");

    let config = if config_path.exists() {
        let contents = read_to_string(&config_path).await?;
        toml::from_str(&contents)?
    } else {
        let config = Config::default();
        create_dir_all(config_dir).await?;

        let contents = toml::to_string_pretty(&config)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&config_path)
            .await?;
        file.write_all(contents.as_bytes()).await?;
        file.sync_all().await?;
        config
    };

    let data_dir = config
        .storage
        .data_dir
        .clone()
        .unwrap_or(default_data_dir);
    Ok((config, data_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_defaults_on_first_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let fallback = dir.path().join("data");

        let (config, data_dir) = load_config_from(dir.path(), fallback.clone())
            .await
            .expect("first load");
        assert_eq!(config, Config::default());
        assert_eq!(data_dir, fallback);
        assert!(dir.path().join(CONFIG_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn existing_file_wins_over_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut config = Config::default();
        config.api.base_url = "https://example.org/v1".into();
        config.storage.data_dir = Some(dir.path().join("custom"));
        let contents = toml::to_string_pretty(&config).expect("serialize");
        tokio::fs::write(dir.path().join(CONFIG_FILE_NAME), contents)
            .await
            .expect("write");

        let (loaded, data_dir) = load_config_from(dir.path(), dir.path().join("data"))
            .await
            .expect("reload");
        assert_eq!(loaded, config);
        assert_eq!(data_dir, dir.path().join("custom"));
    }

    #[tokio::test]
    async fn partial_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        tokio::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[navigation]\npending_capacity = 2\n",
        )
        .await
        .expect("write");

        let (loaded, _) = load_config_from(dir.path(), dir.path().to_path_buf())
            .await
            .expect("load");
        assert_eq!(loaded.navigation.pending_capacity, 2);
        assert_eq!(loaded.api, Config::default().api);
        assert!(loaded.sync.refresh_on_start);
    }

    #[tokio::test]
    async fn malformed_files_are_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        tokio::fs::write(dir.path().join(CONFIG_FILE_NAME), "api = 3")
            .await
            .expect("write");

        let result = load_config_from(dir.path(), dir.path().to_path_buf()).await;
        assert!(matches!(result, Err(ConfigError::DeserializeError(_))));
    }
}

//! On-device persistence for the notification list and the install marker.
//!
//! State lives in a small key-value store: one file per key inside the data
//! directory. Each value is replaced as a whole; there are no partial
//! updates.

use std::{
    collections::HashSet,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{DateTime, SubsecRound, Utc};
use copicom_bridge::notification::{NotificationRecord, format_instant, parse_instant};
use tokio::{
    fs::{OpenOptions, create_dir_all, read_to_string, rename},
    io::AsyncWriteExt,
};

/// Key holding the JSON-serialized notification list.
pub const NOTIFICATIONS_KEY: &str = "@CopiComTlax_Notifications";
/// Key holding the RFC 3339 first-run timestamp.
pub const INSTALL_TIME_KEY: &str = "install_time";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads the persisted notification list.
    ///
    /// Returns an empty list when nothing is stored or the stored value
    /// cannot be parsed. Records repeating an earlier id are dropped.
    pub async fn load(&self) -> Vec<NotificationRecord> {
        match self.try_load().await {
            Ok(records) => records,
            Err(e) => {
                log::error!("Failed to load stored notifications: {e}");
                Vec::new()
            }
        }
    }

    async fn try_load(&self) -> Result<Vec<NotificationRecord>, StoreError> {
        let Some(json) = self.read_key(NOTIFICATIONS_KEY).await? else {
            return Ok(Vec::new());
        };
        let records: Vec<NotificationRecord> = serde_json::from_str(&json)?;

        let mut seen = HashSet::new();
        let total = records.len();
        let records: Vec<_> = records
            .into_iter()
            .filter(|record| seen.insert(record.id.clone()))
            .collect();
        if records.len() != total {
            log::warn!(
                "Dropped {} stored notifications with repeated ids",
                total - records.len()
            );
        }
        Ok(records)
    }

    /// Overwrites the persisted notification list. Failures are logged.
    pub async fn save(&self, records: &[NotificationRecord]) {
        let result = match serde_json::to_string(records) {
            Ok(json) => self.write_key(NOTIFICATIONS_KEY, &json).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            log::error!("Failed to save notifications: {e}");
        }
    }

    /// Returns the first-run instant, recording `now` if this is the first
    /// call on this device.
    ///
    /// If storage is unusable the instant cannot be remembered and `now` is
    /// returned.
    pub async fn install_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let now = now.trunc_subsecs(3);
        match self.read_or_init_install_time(now).await {
            Ok(instant) => instant,
            Err(e) => {
                log::error!("Failed to read or record install time: {e}");
                now
            }
        }
    }

    async fn read_or_init_install_time(
        &self,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, StoreError> {
        if let Some(text) = self.read_key(INSTALL_TIME_KEY).await? {
            if let Some(instant) = parse_instant(&text) {
                return Ok(instant);
            }
            log::warn!("Stored install time {text:?} is not a valid instant, resetting it");
            self.write_key(INSTALL_TIME_KEY, &format_instant(now)).await?;
            return Ok(now);
        }

        create_dir_all(&self.dir).await?;
        let path = self.key_path(INSTALL_TIME_KEY);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(mut file) => {
                file.write_all(format_instant(now).as_bytes()).await?;
                file.sync_all().await?;
                log::info!("Recorded install time {now}");
                Ok(now)
            }
            // someone else recorded it first
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let text = read_to_string(&path).await?;
                Ok(parse_instant(&text).unwrap_or(now))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '@' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(file_name)
    }

    async fn read_key(&self, key: &str) -> Result<Option<String>, StoreError> {
        match read_to_string(self.key_path(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the value of `key` by writing a sibling file and renaming it
    /// over the old one.
    async fn write_key(&self, key: &str, value: &str) -> Result<(), StoreError> {
        create_dir_all(&self.dir).await?;

        let path = self.key_path(key);
        let tmp_path = path.with_extension("tmp");
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)
            .await?;
        file.write_all(value.as_bytes()).await?;
        file.sync_all().await?;
        rename(&tmp_path, &path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use copicom_bridge::notification::NotificationKind;
    use pretty_assertions::assert_eq;

    fn record(id: &str, at: &str) -> NotificationRecord {
        NotificationRecord::new(id, "title", "body", at, NotificationKind::Alert, None)
    }

    #[tokio::test]
    async fn empty_store_loads_nothing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = LocalStore::new(dir.path().join("missing"));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn saved_list_is_loaded_back_in_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = LocalStore::new(dir.path());
        let mut list = vec![record("2", "2024-03-02"), record("1", "2024-03-01")];
        list[1].mark_read();

        store.save(&list).await;
        assert_eq!(store.load().await, list);

        store.save(&list[..1]).await;
        assert_eq!(store.load().await, list[..1].to_vec());
    }

    #[tokio::test]
    async fn corrupt_json_loads_as_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = LocalStore::new(dir.path());
        tokio::fs::write(store.key_path(NOTIFICATIONS_KEY), "[{\"id\":")
            .await
            .expect("write");
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn repeated_ids_at_rest_keep_the_first() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = LocalStore::new(dir.path());
        let mut second = record("1", "2024-01-02");
        second.title = "duplicate".into();
        store.save(&[record("1", "2024-01-01"), second]).await;

        let loaded = store.load().await;
        assert_eq!(loaded, vec![record("1", "2024-01-01")]);
    }

    #[tokio::test]
    async fn install_time_is_recorded_once() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = LocalStore::new(dir.path());
        let first = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(store.install_time(first).await, first);
        assert_eq!(store.install_time(later).await, first);
        assert_eq!(LocalStore::new(dir.path()).install_time(later).await, first);
    }

    #[tokio::test]
    async fn corrupt_install_time_is_reset() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = LocalStore::new(dir.path());
        tokio::fs::write(store.key_path(INSTALL_TIME_KEY), "not a date")
            .await
            .expect("write");

        let now = Utc.with_ymd_and_hms(2024, 5, 5, 5, 5, 5).unwrap();
        assert_eq!(store.install_time(now).await, now);
        let later = Utc.with_ymd_and_hms(2024, 6, 6, 6, 6, 6).unwrap();
        assert_eq!(store.install_time(later).await, now);
    }
}

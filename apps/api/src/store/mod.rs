//! Record Store — file-backed persistence for the user profile and the
//! job application history.
//!
//! Two independent JSON documents, each rewritten in full on every change.
//! Writes go through [`atomic::write_atomic`] and are serialized per file,
//! so concurrent requests cannot lose each other's updates and a crash can
//! never leave a half-written document behind.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{ApplicationStats, ApplicationStatus, JobApplication, UserProfile};

pub mod atomic;

pub const PROFILE_FILE: &str = "user_profile.json";
pub const APPLICATIONS_FILE: &str = "job_applications.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Stored data at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Application {0} not found")]
    NotFound(Uuid),
}

/// Where the store keeps its documents.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

/// Handle to the two on-disk documents. Cheap to clone; clones share locks.
#[derive(Debug, Clone)]
pub struct RecordStore {
    profile_path: PathBuf,
    applications_path: PathBuf,
    profile_lock: Arc<Mutex<()>>,
    applications_lock: Arc<Mutex<()>>,
}

impl RecordStore {
    /// Opens the store, creating the data directory if needed.
    /// The documents themselves are created lazily on first write.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&config.data_dir).map_err(|source| StoreError::Io {
            path: config.data_dir.clone(),
            source,
        })?;

        info!("Record store opened at {}", config.data_dir.display());

        Ok(Self {
            profile_path: config.data_dir.join(PROFILE_FILE),
            applications_path: config.data_dir.join(APPLICATIONS_FILE),
            profile_lock: Arc::new(Mutex::new(())),
            applications_lock: Arc::new(Mutex::new(())),
        })
    }

    #[cfg(test)]
    pub fn profile_path(&self) -> &Path {
        &self.profile_path
    }

    #[cfg(test)]
    pub fn applications_path(&self) -> &Path {
        &self.applications_path
    }

    // ────────────────────────────────────────────────────────────────────────
    // Profile
    // ────────────────────────────────────────────────────────────────────────

    /// Loads the profile. A missing or empty file yields the default profile;
    /// unparsable content is reported as [`StoreError::Corrupt`].
    pub fn load_profile(&self) -> Result<UserProfile, StoreError> {
        let _guard = lock(&self.profile_lock);

        let Some(bytes) = read_document(&self.profile_path)? else {
            debug!("No profile on disk, using default");
            return Ok(UserProfile::default());
        };

        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            path: self.profile_path.clone(),
            reason: e.to_string(),
        })
    }

    /// Soft-fail variant of [`load_profile`](Self::load_profile): never errors.
    pub fn load_profile_or_default(&self) -> UserProfile {
        self.load_profile().unwrap_or_else(|e| {
            warn!("Falling back to empty profile: {e}");
            UserProfile::default()
        })
    }

    /// Overwrites the profile document in full.
    pub fn save_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let _guard = lock(&self.profile_lock);
        write_document(&self.profile_path, "profile", profile)?;
        info!("Saved profile for {:?}", profile.name);
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────────────
    // Applications
    // ────────────────────────────────────────────────────────────────────────

    /// Loads every recorded application in append order.
    ///
    /// A missing or empty file yields an empty list. A document that is not a
    /// JSON array is corrupt. Objects that do not parse as records (say, a
    /// hand-edited status) are left out of the result but kept on disk.
    pub fn load_applications(&self) -> Result<Vec<JobApplication>, StoreError> {
        let _guard = lock(&self.applications_lock);
        self.read_applications()
    }

    /// Soft-fail variant of [`load_applications`](Self::load_applications).
    pub fn load_applications_or_default(&self) -> Vec<JobApplication> {
        self.load_applications().unwrap_or_else(|e| {
            warn!("Falling back to empty application list: {e}");
            Vec::new()
        })
    }

    /// Appends one record. Load, push and rewrite happen under the file lock.
    pub fn append_application(&self, application: JobApplication) -> Result<(), StoreError> {
        let _guard = lock(&self.applications_lock);

        let mut records = self.read_records()?;
        let record = to_record(&application)?;
        records.push(record);
        write_document(&self.applications_path, "applications", &records)?;

        info!(
            "Recorded application {} ({} total)",
            application.id,
            records.len()
        );
        Ok(())
    }

    /// Sets the status of one application, stamping `updated_at`.
    pub fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<JobApplication, StoreError> {
        let _guard = lock(&self.applications_lock);

        let mut records = self.read_records()?;
        let (idx, mut updated) = records
            .iter()
            .enumerate()
            .find_map(|(idx, record)| {
                serde_json::from_value::<JobApplication>(record.clone())
                    .ok()
                    .filter(|a| a.id == id)
                    .map(|a| (idx, a))
            })
            .ok_or(StoreError::NotFound(id))?;
        updated.status = status;
        updated.updated_at = Some(Utc::now());
        records[idx] = to_record(&updated)?;

        write_document(&self.applications_path, "applications", &records)?;
        info!("Application {id} moved to {status:?}");
        Ok(updated)
    }

    /// Dashboard counts. Soft: a corrupt history reads as zero applications.
    pub fn application_stats(&self) -> ApplicationStats {
        ApplicationStats::from_applications(&self.load_applications_or_default())
    }

    /// Applications whose company or job title contains `term`.
    pub fn search_applications(&self, term: &str) -> Result<Vec<JobApplication>, StoreError> {
        let mut applications = self.load_applications()?;
        applications.retain(|a| a.matches(term));
        Ok(applications)
    }

    /// The `limit` most recently created applications, newest first.
    pub fn recent_applications(&self, limit: usize) -> Result<Vec<JobApplication>, StoreError> {
        let mut applications = self.load_applications()?;
        applications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        applications.truncate(limit);
        Ok(applications)
    }

    /// Caller must hold `applications_lock`.
    fn read_applications(&self) -> Result<Vec<JobApplication>, StoreError> {
        let records = self.read_records()?;
        let total = records.len();

        let applications: Vec<JobApplication> = records
            .into_iter()
            .enumerate()
            .filter_map(|(idx, record)| match serde_json::from_value(record) {
                Ok(app) => Some(app),
                Err(e) => {
                    warn!("Ignoring unreadable application record #{idx}: {e}");
                    None
                }
            })
            .collect();

        if applications.len() != total {
            warn!(
                "{} of {total} application records in {} could not be read",
                total - applications.len(),
                self.applications_path.display()
            );
        }

        Ok(applications)
    }

    /// The raw array elements of the applications document. Only non-object
    /// elements are dropped; objects are returned untouched so rewrites keep
    /// records this version cannot parse.
    ///
    /// Caller must hold `applications_lock`.
    fn read_records(&self) -> Result<Vec<serde_json::Value>, StoreError> {
        let Some(bytes) = read_document(&self.applications_path)? else {
            return Ok(Vec::new());
        };

        let corrupt = |reason: String| StoreError::Corrupt {
            path: self.applications_path.clone(),
            reason,
        };

        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| corrupt(e.to_string()))?;
        let serde_json::Value::Array(items) = value else {
            return Err(corrupt("expected a JSON array of applications".to_string()));
        };

        Ok(items
            .into_iter()
            .enumerate()
            .filter(|(idx, item)| {
                let keep = item.is_object();
                if !keep {
                    warn!("Dropping non-object application entry #{idx}");
                }
                keep
            })
            .map(|(_, item)| item)
            .collect())
    }
}

fn lock(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    // The guarded value is `()`, so a poisoned lock carries no broken state.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reads a document, treating a missing or whitespace-only file as absent.
fn read_document(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match std::fs::read(path) {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(None),
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn to_record(application: &JobApplication) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(application).map_err(|source| StoreError::Serialize {
        what: "application",
        source,
    })
}

fn write_document<T: Serialize + ?Sized>(
    path: &Path,
    what: &'static str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|source| StoreError::Serialize { what, source })?;
    atomic::write_atomic(path, &json).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Wrote {} bytes to {}", json.len(), path.display());
    Ok(())
}

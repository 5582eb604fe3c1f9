//! Blob-storage credential resolution and startup settings.
//!
//! The storage SDK used by the frontend only reads [`CANONICAL_TOKEN_VAR`], while some
//! deployments provision the credential under the project-prefixed [`FALLBACK_TOKEN_VAR`].
//! [`ensure_canonical_env`] bridges the two once, at startup.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;

pub const CANONICAL_TOKEN_VAR: &str = "BLOB_READ_WRITE_TOKEN";
pub const FALLBACK_TOKEN_VAR: &str = "VITRINE_READ_WRITE_TOKEN";

pub const SINGLE_VIDEO_UPLOAD_VAR: &str = "SINGLE_VIDEO_UPLOAD";
pub const DISABLE_CHUNKED_VIDEO_UPLOAD_VAR: &str = "DISABLE_CHUNKED_VIDEO_UPLOAD";

/// Read/write access to a set of environment variables.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        // SAFETY: only called through `ensure_canonical_env`, which runs once from `main`
        // before the async runtime or any other thread is started.
        unsafe { std::env::set_var(key, value) }
    }
}

/// In-memory environment, used by tests and by callers that assemble settings by hand.
#[derive(Debug, Default, Clone)]
pub struct MapEnv(pub HashMap<String, String>);

impl MapEnv {
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }
}

impl EnvSource for MapEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }
}

fn non_empty(env: &impl EnvSource, key: &str) -> Option<String> {
    env.get(key).filter(|v| !v.trim().is_empty())
}

/// Resolve the storage token from the process environment.
pub fn resolve_storage_token() -> Option<String> {
    resolve_storage_token_with(&ProcessEnv)
}

/// Canonical name first, then the project-specific fallback. Empty values count as unset.
pub fn resolve_storage_token_with(env: &impl EnvSource) -> Option<String> {
    non_empty(env, CANONICAL_TOKEN_VAR).or_else(|| non_empty(env, FALLBACK_TOKEN_VAR))
}

/// Result of the canonical-name backfill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Backfill {
    /// The canonical variable was already set and left untouched.
    AlreadySet,
    /// The fallback value was copied into the canonical variable.
    Backfilled,
    /// Neither variable is set; blob storage is unavailable.
    Missing,
}

static PROCESS_BACKFILL: OnceLock<Backfill> = OnceLock::new();

/// Copy the fallback token into the canonical variable of the process environment.
///
/// Runs at most once per process; later calls return the first outcome without touching
/// the environment again. Must be called before other threads are spawned.
pub fn ensure_canonical_env() -> Backfill {
    *PROCESS_BACKFILL.get_or_init(|| {
        let outcome = ensure_canonical_env_with(&mut ProcessEnv);
        tracing::debug!(?outcome, "storage token backfill");
        outcome
    })
}

/// Backfill against an arbitrary environment. Never overwrites a set canonical value,
/// so calling it repeatedly is harmless.
pub fn ensure_canonical_env_with(env: &mut impl EnvSource) -> Backfill {
    if non_empty(env, CANONICAL_TOKEN_VAR).is_some() {
        return Backfill::AlreadySet;
    }
    match non_empty(env, FALLBACK_TOKEN_VAR) {
        Some(token) => {
            env.set(CANONICAL_TOKEN_VAR, &token);
            Backfill::Backfilled
        }
        None => Backfill::Missing,
    }
}

fn flag_enabled(env: &impl EnvSource, key: &str) -> bool {
    env.get(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1"))
        .unwrap_or(false)
}

/// Upload-related settings captured once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageSettings {
    pub token_present: bool,
    pub single_video_upload_only: bool,
}

impl StorageSettings {
    pub fn from_env() -> Self {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(env: &impl EnvSource) -> Self {
        Self {
            token_present: resolve_storage_token_with(env).is_some(),
            single_video_upload_only: flag_enabled(env, SINGLE_VIDEO_UPLOAD_VAR)
                || flag_enabled(env, DISABLE_CHUNKED_VIDEO_UPLOAD_VAR),
        }
    }
}

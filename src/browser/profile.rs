//! Chrome profile directory ownership
//!
//! Every launch gets its own user-data directory so a relaunch after a crash
//! never trips over the previous process's SingletonLock.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Prefix for profile directories created under the system temp dir
pub const PROFILE_PREFIX: &str = "kodegen_storybook_chrome";

/// Where the browser keeps its profile
#[derive(Debug)]
pub enum BrowserProfile {
    /// Unique temp directory owned by this launch, removed on cleanup
    Managed(PathBuf),
    /// Caller-supplied directory, never removed
    Provided(PathBuf),
}

impl BrowserProfile {
    /// Resolve the profile for a launch: the configured directory when given,
    /// otherwise a fresh UUID-named directory under the temp dir.
    pub fn for_launch(configured: Option<&PathBuf>) -> Result<Self> {
        match configured {
            Some(dir) => {
                std::fs::create_dir_all(dir).with_context(|| {
                    format!("Failed to create Chrome data directory: {}", dir.display())
                })?;
                debug!("Using configured Chrome data directory: {}", dir.display());
                Ok(Self::Provided(dir.clone()))
            }
            None => create_unique_profile(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Managed(path) | Self::Provided(path) => path,
        }
    }

    /// Remove a managed directory. Call only after the browser process has
    /// exited, or Chrome may still hold files open.
    pub fn cleanup(&mut self) {
        if let Self::Managed(path) = self {
            if !path.exists() {
                return;
            }
            info!("Removing Chrome profile: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&*path) {
                warn!(
                    "Failed to remove Chrome profile {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

/// Create a unique profile directory named `<PROFILE_PREFIX>_<uuid>`
pub fn create_unique_profile() -> Result<BrowserProfile> {
    let path = std::env::temp_dir().join(format!("{PROFILE_PREFIX}_{}", Uuid::new_v4()));

    // create_dir (not create_dir_all) so a collision fails loudly
    std::fs::create_dir(&path)
        .with_context(|| format!("Failed to create profile directory: {}", path.display()))?;

    debug!("Created Chrome profile directory: {}", path.display());
    Ok(BrowserProfile::Managed(path))
}

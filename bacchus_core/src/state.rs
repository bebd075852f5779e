//! User profile persistence with file locking.
//!
//! This module handles saving and loading the physiological profile
//! with proper file locking to prevent concurrent access issues.

use crate::{Error, Result, UserProfile};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl UserProfile {
    /// Load the profile from a file with shared locking
    ///
    /// Returns the default (not set up) profile if the file doesn't exist.
    /// If the file is corrupted, logs a warning and returns the default.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No profile file found, using default profile");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open profile file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                return Ok(Self::default());
            }
        };

        // Acquire shared lock for reading
        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock profile file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!(
                "Failed to read profile file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<UserProfile>(&contents) {
            Ok(profile) => {
                tracing::debug!("Loaded profile from {:?}", path);
                Ok(profile)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse profile file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save the profile to a file with exclusive locking
    ///
    /// Atomically writes the profile by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Create unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "profile path missing parent")
        })?)?;

        // Acquire exclusive lock on the temp file to serialize concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        // Atomically replace old profile file
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved profile to {:?}", path);
        Ok(())
    }

    /// Load the profile, modify it, and save it back atomically
    ///
    /// This is a convenience method that handles the load-modify-save pattern
    /// with proper error handling.
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut UserProfile) -> Result<()>,
    {
        let mut profile = Self::load(path)?;
        f(&mut profile)?;
        profile.save(path)?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BiologicalSex;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let profile_path = temp_dir.path().join("profile.json");

        let profile = UserProfile {
            weight_kg: 64.5,
            sex: BiologicalSex::Female,
            is_setup: true,
        };

        // Save
        profile.save(&profile_path).unwrap();

        // Load
        let loaded = UserProfile::load(&profile_path).unwrap();

        assert_eq!(loaded.weight_kg, 64.5);
        assert_eq!(loaded.sex, BiologicalSex::Female);
        assert!(loaded.is_complete());
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let profile_path = temp_dir.path().join("nonexistent.json");

        let profile = UserProfile::load(&profile_path).unwrap();
        assert!(!profile.is_setup);
        assert_eq!(profile.weight_kg, 0.0);
    }

    #[test]
    fn test_update_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let profile_path = temp_dir.path().join("profile.json");

        // Initialize empty profile
        UserProfile::default().save(&profile_path).unwrap();

        // Update using the update helper
        UserProfile::update(&profile_path, |profile| {
            profile.weight_kg = 80.0;
            profile.is_setup = true;
            Ok(())
        })
        .unwrap();

        // Verify update persisted
        let loaded = UserProfile::load(&profile_path).unwrap();
        assert_eq!(loaded.weight_kg, 80.0);
        assert!(loaded.is_complete());
    }

    #[test]
    fn test_corrupted_profile_falls_back_to_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let profile_path = temp_dir.path().join("corrupted.json");

        // Write invalid JSON
        std::fs::write(&profile_path, "{ invalid json }").unwrap();

        let result = UserProfile::load(&profile_path);
        assert!(result.is_ok());
        let profile = result.unwrap();
        assert!(!profile.is_setup);
        assert!(!profile.is_complete());
    }

    #[test]
    fn test_atomic_save() {
        let temp_dir = tempfile::tempdir().unwrap();
        let profile_path = temp_dir.path().join("profile.json");

        let profile = UserProfile::default();
        profile.save(&profile_path).unwrap();

        // Verify profile file exists and no stray temp files remain
        assert!(profile_path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "profile.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only profile.json, found extras: {:?}",
            extras
        );
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel configuration
//!
//! Read from `polybrep.toml` when present, then overridden from the
//! environment. The comparison tolerance is process-wide and can only be
//! installed once, before the first geometric comparison.

use crate::error::KernelError;
use crate::triangulate::TriangulationMethod;
use crate::utils::math::{self, DEFAULT_TOLERANCE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Config file looked up by [`KernelConfig::load`]
pub const CONFIG_FILE: &str = "polybrep.toml";

pub const ENV_TOLERANCE: &str = "POLYBREP_TOLERANCE";
pub const ENV_TRIANGULATION: &str = "POLYBREP_TRIANGULATION";

/// Kernel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Absolute tolerance for point and distance comparisons
    pub tolerance: f64,
    /// Triangulator for faces that are not triangles or plain quads
    pub triangulation: TriangulationMethod,
    /// Pack the mesh after triangulating
    pub pack_after_edit: bool,
    /// Surface receiving cap faces created by clip and split
    pub cap_surface: String,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            triangulation: TriangulationMethod::default(),
            pack_after_edit: true,
            cap_surface: "cap".to_string(),
        }
    }
}

impl KernelConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: KernelConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup such as the environment
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup(ENV_TOLERANCE) {
            self.tolerance = value
                .trim()
                .parse()
                .with_context(|| format!("{} is not a number: '{}'", ENV_TOLERANCE, value))?;
        }
        if let Some(value) = lookup(ENV_TRIANGULATION) {
            self.triangulation = value
                .parse()
                .with_context(|| format!("invalid {}", ENV_TRIANGULATION))?;
        }
        self.validate()?;
        Ok(())
    }

    /// Reject values the kernel cannot work with
    pub fn validate(&self) -> std::result::Result<(), KernelError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(KernelError::Config(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        if self.cap_surface.is_empty() {
            return Err(KernelError::Config("cap surface name is empty".to_string()));
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Install the tolerance process-wide; returns whether it took effect
    pub fn install(&self) -> bool {
        let installed = math::set_tolerance(self.tolerance);
        if installed {
            debug!(tolerance = self.tolerance, "installed tolerance");
        } else if math::tolerance() != self.tolerance {
            warn!(
                requested = self.tolerance,
                active = math::tolerance(),
                "tolerance already installed; keeping the active value"
            );
        }
        installed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = KernelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(config.triangulation, TriangulationMethod::ConstrainedDelaunay);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = KernelConfig {
            tolerance: 1e-9,
            triangulation: TriangulationMethod::EarClipping,
            pack_after_edit: false,
            cap_surface: "lid".to_string(),
        };
        config.save(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("triangulation = \"ear-clipping\""));
        assert_eq!(KernelConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "tolerance = 1e-4\n").unwrap();
        let config = KernelConfig::from_file(&path).unwrap();
        assert_eq!(config.tolerance, 1e-4);
        assert!(config.pack_after_edit);
        assert_eq!(config.cap_surface, "cap");
    }

    #[test]
    fn test_bad_tolerance_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "tolerance = -1.0\n").unwrap();
        assert!(KernelConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [(ENV_TOLERANCE, "1e-8"), (ENV_TRIANGULATION, "earcut")].into();
        let mut config = KernelConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.tolerance, 1e-8);
        assert_eq!(config.triangulation, TriangulationMethod::EarClipping);

        let bad: HashMap<&str, &str> = [(ENV_TOLERANCE, "tiny")].into();
        let err = config
            .apply_overrides(|key| bad.get(key).map(|v| v.to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_TOLERANCE));
    }
}

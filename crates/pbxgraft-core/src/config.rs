//! Configuration structures for pbxgraft-core.
//!
//! The core crate itself does not read environment variables or files. All
//! configuration is provided explicitly by the caller (the CLI maps flags onto
//! `ComposerConfig`).

use serde::{Deserialize, Serialize};

use crate::errors::{GraftError, GraftResult};
use crate::ident::DEFAULT_MAX_ATTEMPTS;

/// Settings applied to every target the composer creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComposerConfig {
    /// `IPHONEOS_DEPLOYMENT_TARGET`.
    pub deployment_target: String,
    /// `SWIFT_VERSION`.
    pub swift_version: String,
    /// `TARGETED_DEVICE_FAMILY` (`"1,2"` = iPhone + iPad).
    pub device_family: String,
    pub debug_name: String,
    pub release_name: String,
    /// `defaultConfigurationName` of the new configuration list.
    pub default_configuration: String,
    /// Consecutive identifier collisions tolerated before failing.
    pub id_attempts: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            deployment_target: "15.0".to_string(),
            swift_version: "5.0".to_string(),
            device_family: "1,2".to_string(),
            debug_name: "Debug".to_string(),
            release_name: "Release".to_string(),
            default_configuration: "Release".to_string(),
            id_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &ComposerConfig) -> GraftResult<()> {
    if cfg.debug_name.is_empty() || cfg.release_name.is_empty() {
        return Err(GraftError::invalid_argument(
            "configuration names must not be empty",
        ));
    }

    if cfg.debug_name == cfg.release_name {
        return Err(GraftError::invalid_argument(
            "debug and release configuration names must differ",
        ));
    }

    if cfg.default_configuration != cfg.debug_name && cfg.default_configuration != cfg.release_name {
        return Err(GraftError::invalid_argument(format!(
            "default configuration {:?} is neither {:?} nor {:?}",
            cfg.default_configuration, cfg.debug_name, cfg.release_name
        )));
    }

    if cfg.deployment_target.is_empty() || cfg.swift_version.is_empty() {
        return Err(GraftError::invalid_argument(
            "deployment target and swift version must not be empty",
        ));
    }

    if cfg.id_attempts == 0 {
        return Err(GraftError::invalid_argument(
            "id_attempts must be greater than zero",
        ));
    }

    Ok(())
}

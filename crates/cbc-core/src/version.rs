//! Target Safari version and the schema features it supports.

use std::fmt;

use crate::error::ConfigurationError;

/// Oldest Safari with the content blocker features the converter emits.
pub const MIN_SAFARI_VERSION: f32 = 11.0;

/// Rule cap Safari enforces per content blocker before 15.
pub const RULES_LIMIT_LEGACY: usize = 50_000;
/// Rule cap from Safari 15 on.
pub const RULES_LIMIT: usize = 150_000;

/// Numeric Safari version, e.g. `13`, `15` or `16.4`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SafariVersion(f32);

impl SafariVersion {
    pub const SAFARI_13: Self = Self(13.0);
    pub const SAFARI_14: Self = Self(14.0);
    pub const SAFARI_15: Self = Self(15.0);
    pub const SAFARI_16_4: Self = Self(16.4);

    pub fn new(version: f32) -> Result<Self, ConfigurationError> {
        if !version.is_finite() || version < MIN_SAFARI_VERSION {
            return Err(ConfigurationError::UnsupportedVersion(version.to_string()));
        }
        Ok(Self(version))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Maximum number of entries one content blocker may hold.
    pub fn rules_limit(self) -> usize {
        if self >= Self::SAFARI_15 {
            RULES_LIMIT
        } else {
            RULES_LIMIT_LEGACY
        }
    }

    /// `fetch`, `websocket` and `other` resource types (older versions only know `raw`).
    pub fn supports_fine_grained_raw_types(self) -> bool {
        self >= Self::SAFARI_15
    }

    /// `ping` resource type.
    pub fn supports_ping(self) -> bool {
        self >= Self::SAFARI_14
    }

    /// `:has()` inside `css-display-none` selectors.
    pub fn supports_has_selector(self) -> bool {
        self >= Self::SAFARI_16_4
    }
}

impl Default for SafariVersion {
    fn default() -> Self {
        Self::SAFARI_13
    }
}

impl fmt::Display for SafariVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

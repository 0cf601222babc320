//! Platform feature levels.
//!
//! Two behavioral thresholds matter to the tracker: the level where
//! capability grants became revocable at runtime, and the level where the
//! modern cell-info query appeared. Everything else is level-independent.

/// A platform API level, ordered numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiLevel(pub u32);

impl ApiLevel {
    /// First level where capability grants are made (and revoked) at
    /// runtime. Below this, grants are fixed at install time and the
    /// tracker skips capability prechecks entirely.
    pub const RUNTIME_GRANTS: ApiLevel = ApiLevel(23);

    /// First level carrying the unified cell-info query. Below this the
    /// tracker falls back to the legacy neighboring-cell query.
    pub const MODERN_CELL_INFO: ApiLevel = ApiLevel(17);
}

impl std::fmt::Display for ApiLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The API level the host platform reports, with the level comparisons the
/// receivers gate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformVersion {
    api_level: ApiLevel,
}

impl PlatformVersion {
    pub fn new(api_level: ApiLevel) -> Self {
        Self { api_level }
    }

    pub fn api_level(&self) -> ApiLevel {
        self.api_level
    }

    /// True if `api_level` is at or above the given threshold.
    pub fn is_at_least(&self, level: ApiLevel) -> bool {
        self.api_level >= level
    }

    /// True if capability grants can be revoked at runtime, meaning every
    /// scan must re-check its grants first.
    pub fn requires_runtime_grants(&self) -> bool {
        self.is_at_least(ApiLevel::RUNTIME_GRANTS)
    }

    /// True if the unified cell-info query is available.
    pub fn has_modern_cell_info(&self) -> bool {
        self.is_at_least(ApiLevel::MODERN_CELL_INFO)
    }
}

impl Default for PlatformVersion {
    /// A current platform: runtime grants and modern cell info both present.
    fn default() -> Self {
        Self::new(ApiLevel::RUNTIME_GRANTS)
    }
}

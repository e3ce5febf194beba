use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A published build, as served by the `/latest` endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Release {
    pub version: String,
    pub released: DateTime<Utc>,
    pub build: u64,
    pub prerelease: bool,
    pub platform: String,
    pub architecture: String,
    pub installer: bool,
    pub link: String,
}

impl Release {
    pub fn key(&self) -> ReleaseKey {
        ReleaseKey {
            version: self.version.clone(),
            build: self.build,
            platform: self.platform.clone(),
            architecture: self.architecture.clone(),
        }
    }
}

/// Empty record returned by `/latest` when nothing has been published yet.
/// Clients expect the zero timestamp (year 1), not the unix epoch.
impl Default for Release {
    fn default() -> Self {
        Self {
            version: String::new(),
            released: zero_timestamp(),
            build: 0,
            prerelease: false,
            platform: String::new(),
            architecture: String::new(),
            installer: false,
            link: String::new(),
        }
    }
}

fn zero_timestamp() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

/// Composite key identifying a release: (version, build, platform, architecture)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseKey {
    pub version: String,
    pub build: u64,
    pub platform: String,
    pub architecture: String,
}

impl std::fmt::Display for ReleaseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} build {} ({}/{})",
            self.version, self.build, self.platform, self.architecture
        )
    }
}

/// Release channel a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Stable,
    Prerelease,
}

impl Channel {
    pub fn is_prerelease(self) -> bool {
        matches!(self, Channel::Prerelease)
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Stable => write!(f, "stable"),
            Channel::Prerelease => write!(f, "prerelease"),
        }
    }
}

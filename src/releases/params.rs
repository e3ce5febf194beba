use chrono::DateTime;

use super::error::ApiError;
use crate::models::{Release, ReleaseKey};

/// Decoded query string in request order. Names may repeat.
pub type QueryPairs = Vec<(String, String)>;

/// First value given for `name`; later repeats are ignored
fn first(pairs: &[(String, String)], name: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.clone())
}

/// Query string of `GET /add`
#[derive(Debug)]
pub struct AddParams {
    v: Option<String>,
    r: Option<String>,
    b: Option<String>,
    pr: Option<String>,
    pl: Option<String>,
    a: Option<String>,
    i: Option<String>,
    l: Option<String>,
    key: Option<String>,
}

/// Query string of `GET /remove`
#[derive(Debug)]
pub struct RemoveParams {
    v: Option<String>,
    b: Option<String>,
    pl: Option<String>,
    a: Option<String>,
    key: Option<String>,
}

/// A complete `/add` query whose values have not been parsed yet
pub struct AddRequest {
    pub key: String,
    version: String,
    released: String,
    build: String,
    prerelease: String,
    platform: String,
    architecture: String,
    installer: String,
    link: String,
}

/// A complete `/remove` query whose values have not been parsed yet
pub struct RemoveRequest {
    pub key: String,
    version: String,
    build: String,
    platform: String,
    architecture: String,
}

impl From<QueryPairs> for AddParams {
    fn from(pairs: QueryPairs) -> Self {
        Self {
            v: first(&pairs, "v"),
            r: first(&pairs, "r"),
            b: first(&pairs, "b"),
            pr: first(&pairs, "pr"),
            pl: first(&pairs, "pl"),
            a: first(&pairs, "a"),
            i: first(&pairs, "i"),
            l: first(&pairs, "l"),
            key: first(&pairs, "key"),
        }
    }
}

impl From<QueryPairs> for RemoveParams {
    fn from(pairs: QueryPairs) -> Self {
        Self {
            v: first(&pairs, "v"),
            b: first(&pairs, "b"),
            pl: first(&pairs, "pl"),
            a: first(&pairs, "a"),
            key: first(&pairs, "key"),
        }
    }
}

impl AddParams {
    pub fn require(self) -> Result<AddRequest, ApiError> {
        let (
            Some(version),
            Some(released),
            Some(build),
            Some(prerelease),
            Some(platform),
            Some(architecture),
            Some(installer),
            Some(link),
            Some(key),
        ) = (
            self.v, self.r, self.b, self.pr, self.pl, self.a, self.i, self.l, self.key,
        )
        else {
            return Err(ApiError::MissingParameters);
        };

        Ok(AddRequest {
            key,
            version,
            released,
            build,
            prerelease,
            platform,
            architecture,
            installer,
            link,
        })
    }
}

impl RemoveParams {
    pub fn require(self) -> Result<RemoveRequest, ApiError> {
        let (Some(version), Some(build), Some(platform), Some(architecture), Some(key)) =
            (self.v, self.b, self.pl, self.a, self.key)
        else {
            return Err(ApiError::MissingParameters);
        };

        Ok(RemoveRequest {
            key,
            version,
            build,
            platform,
            architecture,
        })
    }
}

impl AddRequest {
    pub fn into_release(self) -> Result<Release, ApiError> {
        Ok(Release {
            released: parse_timestamp("r", &self.released)?,
            build: parse_build("b", &self.build)?,
            prerelease: parse_flag("pr", &self.prerelease)?,
            installer: parse_flag("i", &self.installer)?,
            version: self.version,
            platform: self.platform,
            architecture: self.architecture,
            link: self.link,
        })
    }
}

impl RemoveRequest {
    pub fn into_key(self) -> Result<ReleaseKey, ApiError> {
        Ok(ReleaseKey {
            build: parse_build("b", &self.build)?,
            version: self.version,
            platform: self.platform,
            architecture: self.architecture,
        })
    }
}

/// Unix seconds
fn parse_timestamp(name: &'static str, value: &str) -> Result<DateTime<chrono::Utc>, ApiError> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or(ApiError::InvalidParameter(name))
}

/// Builds are stored as signed 64-bit integers
fn parse_build(name: &'static str, value: &str) -> Result<u64, ApiError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|build| i64::try_from(*build).is_ok())
        .ok_or(ApiError::InvalidParameter(name))
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ApiError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ApiError::InvalidParameter(name)),
    }
}

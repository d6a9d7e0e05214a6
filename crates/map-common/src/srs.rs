//! Spatial reference system identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MapError;

/// An `authority:code` spatial reference identifier, e.g. `EPSG:4326`.
///
/// Only the identifier lives here; projection parameters are resolved by the
/// projection crate's registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SrsId {
    authority: String,
    code: u32,
}

impl SrsId {
    pub const WGS84: u32 = 4326;
    pub const WEB_MERCATOR: u32 = 3857;

    /// An EPSG identifier.
    pub fn epsg(code: u32) -> Self {
        Self {
            authority: "EPSG".to_string(),
            code,
        }
    }

    /// Create an identifier for any authority. The authority is upper-cased.
    pub fn new(authority: &str, code: u32) -> Self {
        Self {
            authority: authority.to_uppercase(),
            code,
        }
    }

    pub fn wgs84() -> Self {
        Self::epsg(Self::WGS84)
    }

    pub fn web_mercator() -> Self {
        Self::epsg(Self::WEB_MERCATOR)
    }

    /// Parse an SRS string.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326" / "epsg:4326"
    /// - "CRS:84" (same as EPSG:4326)
    /// - "EPSG:900913" (same as EPSG:3857)
    /// - "urn:ogc:def:crs:EPSG::3857"
    /// - "3857" (bare EPSG code)
    pub fn parse(s: &str) -> Result<Self, MapError> {
        let normalized = s.trim().to_uppercase();
        let unsupported = || MapError::UnsupportedProjection(s.to_string());

        if normalized == "CRS:84" || normalized == "URN:OGC:DEF:CRS:OGC:1.3:CRS84" {
            return Ok(Self::wgs84());
        }

        if let Ok(code) = normalized.parse::<u32>() {
            return Ok(Self::epsg(code).canonical());
        }

        let (authority, code) = if let Some(rest) = normalized.strip_prefix("URN:OGC:DEF:CRS:") {
            // urn:ogc:def:crs:{authority}:{version}:{code}, version may be empty
            let mut parts = rest.split(':');
            let authority = parts.next().ok_or_else(unsupported)?;
            let code = parts.last().ok_or_else(unsupported)?;
            (authority.to_string(), code.to_string())
        } else {
            let (authority, code) = normalized.split_once(':').ok_or_else(unsupported)?;
            (authority.to_string(), code.to_string())
        };

        if authority.is_empty() {
            return Err(unsupported());
        }
        let code: u32 = code.parse().map_err(|_| unsupported())?;
        Ok(Self { authority, code }.canonical())
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    fn canonical(self) -> Self {
        match (self.authority.as_str(), self.code) {
            ("EPSG", 900913) => Self::web_mercator(),
            _ => self,
        }
    }
}

impl fmt::Display for SrsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.authority, self.code)
    }
}

impl FromStr for SrsId {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SrsId {
    type Error = MapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SrsId> for String {
    fn from(value: SrsId) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_srs() {
        assert_eq!(SrsId::parse("EPSG:4326").unwrap(), SrsId::wgs84());
        assert_eq!(SrsId::parse("epsg:3857").unwrap(), SrsId::web_mercator());
        assert_eq!(SrsId::parse("CRS:84").unwrap(), SrsId::wgs84());
        assert_eq!(SrsId::parse("EPSG:900913").unwrap(), SrsId::web_mercator());
        assert_eq!(
            SrsId::parse("urn:ogc:def:crs:EPSG::3857").unwrap(),
            SrsId::web_mercator()
        );
        assert_eq!(SrsId::parse("4326").unwrap(), SrsId::wgs84());
    }

    #[test]
    fn test_parse_srs_rejects_garbage() {
        assert!(matches!(
            SrsId::parse("EPSG:abc"),
            Err(MapError::UnsupportedProjection(_))
        ));
        assert!(SrsId::parse("nonsense").is_err());
        assert!(SrsId::parse(":4326").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let id = SrsId::new("esri", 102100);
        assert_eq!(id.to_string(), "ESRI:102100");
        assert_eq!(SrsId::parse(&id.to_string()).unwrap(), id);
    }
}

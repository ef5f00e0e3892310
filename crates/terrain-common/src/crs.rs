//! Coordinate Reference System identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// GeoKey holding the EPSG code of a geographic CRS.
pub const GEOKEY_GEOGRAPHIC_TYPE: u16 = 2048;
/// GeoKey holding the EPSG code of a projected CRS.
pub const GEOKEY_PROJECTED_CS_TYPE: u16 = 3072;

/// Value of `key` in a GeoKeyDirectory, for keys stored inline.
pub fn geokey(directory: &[u16], key: u16) -> Option<u16> {
    directory
        .get(4..)?
        .chunks_exact(4)
        .find(|entry| entry[0] == key && entry[1] == 0)
        .map(|entry| entry[3])
}

/// CRS codes the tile pipeline can transform between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees)
    Epsg4326,
    /// NAD83 Geographic, treated as WGS84 (sub-meter difference)
    Epsg4269,
    /// Web Mercator (meters)
    Epsg3857,
    /// WGS84 / UTM zone, EPSG:326xx (north) or EPSG:327xx (south)
    Utm { zone: u8, north: bool },
    /// Any other EPSG code with a known proj4 definition
    Other(u32),
}

impl CrsCode {
    /// Map a numeric EPSG code onto a supported CRS.
    pub fn from_epsg(code: u32) -> Result<Self, CrsParseError> {
        match code {
            4326 => Ok(CrsCode::Epsg4326),
            4269 => Ok(CrsCode::Epsg4269),
            3857 | 900913 | 3785 => Ok(CrsCode::Epsg3857),
            32601..=32660 => Ok(CrsCode::Utm {
                zone: (code - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Ok(CrsCode::Utm {
                zone: (code - 32700) as u8,
                north: false,
            }),
            _ if proj4_definition(code).is_some() => Ok(CrsCode::Other(code)),
            _ => Err(CrsParseError::UnsupportedCrs(format!("EPSG:{}", code))),
        }
    }

    /// CRS named by a GeoKeyDirectory, as found in GeoTIFF tags and in the
    /// `LASF_Projection` record of LAS files. The projected key wins.
    pub fn from_geokeys(directory: &[u16]) -> Result<Self, CrsParseError> {
        let code = geokey(directory, GEOKEY_PROJECTED_CS_TYPE)
            .or_else(|| geokey(directory, GEOKEY_GEOGRAPHIC_TYPE))
            .ok_or(CrsParseError::NoEpsgGeoKey)?;
        Self::from_epsg(code as u32)
    }

    /// Parse strings like "EPSG:4326", "epsg:32643" or "CRS:84".
    pub fn from_string(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();
        if normalized == "CRS:84" {
            return Ok(CrsCode::Epsg4326);
        }
        let code = normalized
            .strip_prefix("EPSG:")
            .and_then(|c| c.parse::<u32>().ok())
            .ok_or_else(|| CrsParseError::UnsupportedCrs(s.to_string()))?;
        Self::from_epsg(code)
    }

    pub fn epsg(&self) -> u32 {
        match self {
            CrsCode::Epsg4326 => 4326,
            CrsCode::Epsg4269 => 4269,
            CrsCode::Epsg3857 => 3857,
            CrsCode::Utm { zone, north: true } => 32600 + *zone as u32,
            CrsCode::Utm { zone, north: false } => 32700 + *zone as u32,
            CrsCode::Other(code) => *code,
        }
    }

    /// Check if this is a geographic (lon/lat) CRS.
    pub fn is_geographic(&self) -> bool {
        match self {
            CrsCode::Epsg4326 | CrsCode::Epsg4269 => true,
            CrsCode::Other(code) => proj4_definition(*code).is_some_and(|def| def.contains("+proj=longlat")),
            _ => false,
        }
    }

    /// proj4 string for this CRS, from the bundled EPSG registry.
    pub fn proj4(&self) -> Option<&'static str> {
        proj4_definition(self.epsg())
    }
}

fn proj4_definition(code: u32) -> Option<&'static str> {
    let code = u16::try_from(code).ok()?;
    crs_definitions::from_code(code).map(|def| def.proj4)
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
    #[error("GeoKeyDirectory names no EPSG code")]
    NoEpsgGeoKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crs() {
        assert_eq!(CrsCode::from_string("EPSG:4326").unwrap(), CrsCode::Epsg4326);
        assert_eq!(CrsCode::from_string("epsg:3857").unwrap(), CrsCode::Epsg3857);
        assert_eq!(CrsCode::from_string("CRS:84").unwrap(), CrsCode::Epsg4326);
        assert_eq!(
            CrsCode::from_string("EPSG:32643").unwrap(),
            CrsCode::Utm { zone: 43, north: true }
        );
        assert!(CrsCode::from_string("EPSG:99999").is_err());
        assert!(CrsCode::from_string("EPSG:1").is_err());
        assert!(CrsCode::from_string("garbage").is_err());
    }

    #[test]
    fn test_utm_epsg_round_trip() {
        for code in [32601, 32631, 32660, 32701, 32755] {
            assert_eq!(CrsCode::from_epsg(code).unwrap().epsg(), code);
        }
        assert_eq!(CrsCode::Utm { zone: 18, north: false }.to_string(), "EPSG:32718");
    }

    #[test]
    fn test_geokey_lookup() {
        let dir = [1, 1, 0, 3, 1024, 0, 1, 1, 2048, 0, 1, 4326, 3072, 0, 1, 32643];
        assert_eq!(geokey(&dir, 3072), Some(32643));
        assert_eq!(geokey(&dir, 1025), None);
        assert_eq!(CrsCode::from_geokeys(&dir).unwrap(), CrsCode::Utm { zone: 43, north: true });
        assert_eq!(CrsCode::from_geokeys(&[1, 1, 0, 1, 2048, 0, 1, 4326]).unwrap(), CrsCode::Epsg4326);
        // Value stored in another tag, not inline
        assert!(CrsCode::from_geokeys(&[1, 1, 0, 1, 3072, 34737, 1, 0]).is_err());
        assert!(CrsCode::from_geokeys(&[]).is_err());
    }

    #[test]
    fn test_registry_codes() {
        // ETRS89 / LAEA Europe
        let laea = CrsCode::from_epsg(3035).unwrap();
        assert_eq!(laea, CrsCode::Other(3035));
        assert!(!laea.is_geographic());
        assert!(laea.proj4().unwrap().contains("+proj=laea"));
        assert_eq!(laea.to_string(), "EPSG:3035");

        // ETRS89 geographic
        assert!(CrsCode::from_epsg(4258).unwrap().is_geographic());
    }
}

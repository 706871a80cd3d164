use crate::error::{DigitizeError, DigitizeResult};
use crate::geometry::{BoundingBox, Point};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Artwork description produced by the vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Canvas size, only used by the preview renderers.
    #[serde(deserialize_with = "canvas_dimension")]
    pub width: u32,
    #[serde(deserialize_with = "canvas_dimension")]
    pub height: u32,
    pub regions: Vec<Region>,
}

impl Manifest {
    pub fn from_json(raw: &str) -> DigitizeResult<Self> {
        let manifest: Manifest =
            serde_json::from_str(raw).map_err(|err| DigitizeError::Manifest(err.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn from_path(path: impl AsRef<Path>) -> DigitizeResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| DigitizeError::io(path, err))?;
        Self::from_json(&raw)
    }

    /// Every region that will be fill-stitched needs a direction.
    pub fn validate(&self) -> DigitizeResult<()> {
        validate_regions(&self.regions)
    }
}

/// Regions without points are never stitched, so they may omit the angle.
pub fn validate_regions(regions: &[Region]) -> DigitizeResult<()> {
    for (index, region) in regions.iter().enumerate() {
        if region.stitch_style() == StitchStyle::Fill
            && region.angle_deg.is_none()
            && !region.points.is_empty()
        {
            return Err(DigitizeError::MissingAngle { index });
        }
    }
    Ok(())
}

// Vectorizers may emit `256.0`; fractional sizes truncate.
fn canvas_dimension<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 {
        return Err(serde::de::Error::custom(format!(
            "canvas size must be a non-negative number, got {value}"
        )));
    }
    Ok(value as u32)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    #[serde(default)]
    pub id: Value,
    pub color_hex: String,
    pub region_type: RegionKind,
    #[serde(default)]
    pub angle_deg: Option<f64>,
    pub points: Vec<[f64; 2]>,
}

impl Region {
    pub fn polygon(&self) -> Vec<Point> {
        self.points.iter().copied().map(Point::from).collect()
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::of(&self.polygon())
    }

    pub fn stitch_style(&self) -> StitchStyle {
        self.region_type.stitch_style()
    }

    /// Copy of this region stitched in a different thread.
    pub fn recolored(&self, color_hex: &str) -> Self {
        Self {
            color_hex: color_hex.to_string(),
            ..self.clone()
        }
    }
}

/// Artwork role of a region. Unknown names are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegionKind {
    Feature,
    Outline,
    Fill,
    Other(String),
}

impl RegionKind {
    pub fn as_str(&self) -> &str {
        match self {
            RegionKind::Feature => "feature",
            RegionKind::Outline => "outline",
            RegionKind::Fill => "fill",
            RegionKind::Other(name) => name,
        }
    }

    pub fn stitch_style(&self) -> StitchStyle {
        match self {
            RegionKind::Feature | RegionKind::Outline => StitchStyle::Satin,
            RegionKind::Fill | RegionKind::Other(_) => StitchStyle::Fill,
        }
    }

    /// Ranking weight used when needles run out.
    pub fn importance_weight(&self) -> i64 {
        match self {
            RegionKind::Feature => 3,
            RegionKind::Outline => 2,
            RegionKind::Fill | RegionKind::Other(_) => 1,
        }
    }
}

impl From<String> for RegionKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "feature" => RegionKind::Feature,
            "outline" => RegionKind::Outline,
            "fill" => RegionKind::Fill,
            _ => RegionKind::Other(value),
        }
    }
}

impl From<RegionKind> for String {
    fn from(value: RegionKind) -> Self {
        match value {
            RegionKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StitchStyle {
    Fill,
    Satin,
}

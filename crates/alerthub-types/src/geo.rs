//! Coordinates and the subset of GeoJSON the map views consume.
//!
//! GeoJSON positions are `[longitude, latitude]`; everything else in the
//! domain carries latitude first.

use serde::{Deserialize, Serialize};

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both components are finite and within WGS84 bounds.
    pub fn validate(&self) -> Result<(), String> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(format!("latitude {} out of range [-90, 90]", self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(format!(
                "longitude {} out of range [-180, 180]",
                self.longitude
            ));
        }
        Ok(())
    }

    pub fn to_geometry(self) -> Geometry {
        Geometry::Point {
            coordinates: [self.longitude, self.latitude],
        }
    }
}

/// GeoJSON geometry. Only points are produced by this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
}

impl Geometry {
    pub fn coordinates(&self) -> Coordinates {
        match self {
            Geometry::Point { coordinates } => Coordinates::new(coordinates[1], coordinates[0]),
        }
    }
}

/// A GeoJSON feature with typed properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature<P> {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: Geometry,
    pub properties: P,
}

impl<P> Feature<P> {
    pub fn point(at: Coordinates, properties: P) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry: at.to_geometry(),
            properties,
        }
    }
}

/// A GeoJSON feature collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection<P> {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature<P>>,
}

impl<P> FeatureCollection<P> {
    pub fn new(features: Vec<Feature<P>>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }
}

/// Axis-aligned latitude/longitude box, edges inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn contains(&self, point: &Coordinates) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude)
            && (self.min_lon..=self.max_lon).contains(&point.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_geometry_is_lon_lat() {
        let json = serde_json::to_value(Coordinates::new(30.2672, -97.7431).to_geometry()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "Point", "coordinates": [-97.7431, 30.2672]})
        );
    }

    #[test]
    fn test_feature_collection_shape() {
        let fc = FeatureCollection::new(vec![Feature::point(
            Coordinates::new(1.0, 2.0),
            serde_json::json!({"name": "x"}),
        )]);
        let json = serde_json::to_value(&fc).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["type"], "Feature");
        assert_eq!(json["features"][0]["properties"]["name"], "x");
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(Coordinates::new(91.0, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, -181.0).validate().is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).validate().is_err());
        assert!(Coordinates::new(30.26, -97.74).validate().is_ok());
    }

    #[test]
    fn test_bounding_box_edges_inclusive() {
        let bbox = BoundingBox {
            min_lat: 30.0,
            min_lon: -98.0,
            max_lat: 31.0,
            max_lon: -97.0,
        };
        assert!(bbox.contains(&Coordinates::new(30.0, -97.0)));
        assert!(!bbox.contains(&Coordinates::new(29.99, -97.5)));
    }
}

//! Feature builder: trail records to a GeoJSON feature collection
//!
//! The conversion is a pure function: one point feature per record, in
//! record order, with the record's fields carried verbatim as properties.
//! Nothing is filtered, deduplicated or validated; a record with no
//! coordinates simply yields a feature with no geometry.

use crate::data::TrailRecord;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

/// Build the immutable feature collection for the whole dataset.
///
/// Deterministic and idempotent: re-running on the same input yields a
/// structurally identical collection.
pub fn feature_collection(records: &[TrailRecord]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: records.iter().map(feature).collect(),
        foreign_members: None,
    }
}

/// Convert a single record into a point feature.
///
/// Properties are only inserted for fields present in the record, so an
/// absent field becomes an absent property key rather than a null.
fn feature(record: &TrailRecord) -> Feature {
    let mut properties = JsonObject::new();
    insert(&mut properties, "id", record.id);
    insert(&mut properties, "name", record.name.clone());
    insert(&mut properties, "distance", record.distance);
    insert(&mut properties, "elevationGain", record.elevation_gain);
    insert(&mut properties, "difficulty", record.difficulty.clone());
    insert(&mut properties, "rating", record.rating);
    insert(&mut properties, "reviews", record.review_count);
    insert(&mut properties, "url", record.url.clone());
    insert(&mut properties, "image", record.cover_photo.clone());

    let geometry = match (record.longitude, record.latitude) {
        (Some(lon), Some(lat)) => Some(Geometry::new(Value::Point(vec![lon, lat]))),
        _ => None,
    };

    Feature {
        bbox: None,
        geometry,
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn insert<T: Into<JsonValue>>(properties: &mut JsonObject, key: &str, value: Option<T>) {
    if let Some(value) = value {
        properties.insert(key.to_string(), value.into());
    }
}

/// Look up a property value on a feature.
pub fn property<'a>(feature: &'a Feature, key: &str) -> Option<&'a JsonValue> {
    feature.properties.as_ref()?.get(key)
}

pub fn property_str<'a>(feature: &'a Feature, key: &str) -> Option<&'a str> {
    property(feature, key)?.as_str()
}

pub fn property_f64(feature: &Feature, key: &str) -> Option<f64> {
    property(feature, key)?.as_f64()
}

pub fn property_u64(feature: &Feature, key: &str) -> Option<u64> {
    property(feature, key)?.as_u64()
}

/// The `[longitude, latitude]` pair of a point feature, if it has one.
pub fn point_coordinates(feature: &Feature) -> Option<(f64, f64)> {
    match &feature.geometry {
        Some(Geometry {
            value: Value::Point(coords),
            ..
        }) if coords.len() >= 2 => Some((coords[0], coords[1])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, name: &str, lat: f64, lon: f64) -> TrailRecord {
        TrailRecord {
            id: Some(id),
            name: Some(name.to_string()),
            latitude: Some(lat),
            longitude: Some(lon),
            ..TrailRecord::default()
        }
    }

    #[test]
    fn one_feature_per_record_in_order() {
        let records = vec![
            record(1, "Angel's Rest", 45.5723, -122.1560),
            record(2, "Dog Mountain", 45.6988, -121.7084),
            record(3, "Smith Rock", 44.3682, -121.1406),
        ];

        let collection = feature_collection(&records);
        assert_eq!(collection.features.len(), 3);

        for (feature, record) in collection.features.iter().zip(&records) {
            assert_eq!(property_u64(feature, "id"), record.id.map(|id| id as u64));
            assert_eq!(property_str(feature, "name"), record.name.as_deref());
            assert_eq!(
                point_coordinates(feature),
                Some((record.longitude.unwrap(), record.latitude.unwrap()))
            );
        }
    }

    #[test]
    fn properties_are_copied_verbatim() {
        let record = TrailRecord {
            id: Some(7),
            name: Some("Smith Rock".to_string()),
            distance: Some(3.6),
            elevation_gain: Some(600.0),
            difficulty: Some("Moderate".to_string()),
            rating: Some(4.7),
            review_count: Some(1542),
            url: Some("https://example.com/t/7".to_string()),
            cover_photo: Some("https://example.com/p/7.jpg".to_string()),
            latitude: Some(44.3682),
            longitude: Some(-121.1406),
        };

        let collection = feature_collection(std::slice::from_ref(&record));
        let feature = &collection.features[0];
        assert_eq!(property_f64(feature, "distance"), Some(3.6));
        assert_eq!(property_f64(feature, "elevationGain"), Some(600.0));
        assert_eq!(property_str(feature, "difficulty"), Some("Moderate"));
        assert_eq!(property_f64(feature, "rating"), Some(4.7));
        assert_eq!(property_u64(feature, "reviews"), Some(1542));
        assert_eq!(property_str(feature, "url"), Some("https://example.com/t/7"));
        assert_eq!(
            property_str(feature, "image"),
            Some("https://example.com/p/7.jpg")
        );
    }

    #[test]
    fn absent_fields_produce_absent_properties() {
        let record = TrailRecord {
            name: Some("Bald Butte".to_string()),
            ..TrailRecord::default()
        };

        let collection = feature_collection(std::slice::from_ref(&record));
        let feature = &collection.features[0];
        assert_eq!(property_str(feature, "name"), Some("Bald Butte"));
        assert!(property(feature, "distance").is_none());
        assert!(property(feature, "rating").is_none());
        // No coordinates, no geometry; the record still produced a feature.
        assert!(feature.geometry.is_none());
        assert_eq!(collection.features.len(), 1);
    }

    #[test]
    fn building_twice_is_structurally_identical() {
        let records = vec![
            record(1, "Angel's Rest", 45.5723, -122.1560),
            TrailRecord::default(),
            record(3, "Smith Rock", 44.3682, -121.1406),
        ];

        let first = feature_collection(&records);
        let second = feature_collection(&records);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

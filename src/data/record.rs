//! Trail record storage and parsing

use crate::data::Result;
use rayon::prelude::*;
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// A single trail as it appears in the upstream dataset.
///
/// Every field is optional: the dataset is scraped and individual records
/// routinely miss ratings, photos or even coordinates. A field that is
/// absent or carries an unexpected type deserializes to `None` instead of
/// failing the whole file.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TrailRecord {
    #[serde(rename = "Unique_Id", default, deserialize_with = "lenient")]
    pub id: Option<i64>,

    #[serde(rename = "Trail_Name", default, deserialize_with = "lenient")]
    pub name: Option<String>,

    /// Trail length in miles
    #[serde(rename = "Distance", default, deserialize_with = "lenient")]
    pub distance: Option<f64>,

    /// Elevation gain in feet
    #[serde(rename = "Elevation_Gain", default, deserialize_with = "lenient")]
    pub elevation_gain: Option<f64>,

    #[serde(rename = "Difficulty", default, deserialize_with = "lenient")]
    pub difficulty: Option<String>,

    /// Average review rating, 0-5
    #[serde(rename = "Rating", default, deserialize_with = "lenient")]
    pub rating: Option<f64>,

    #[serde(rename = "Review_Count", default, deserialize_with = "lenient")]
    pub review_count: Option<i64>,

    /// Link to the trail detail page
    #[serde(rename = "Url", default, deserialize_with = "lenient")]
    pub url: Option<String>,

    #[serde(rename = "Cover_Photo", default, deserialize_with = "lenient")]
    pub cover_photo: Option<String>,

    #[serde(rename = "Latitude", default, deserialize_with = "lenient")]
    pub latitude: Option<f64>,

    #[serde(rename = "Longitude", default, deserialize_with = "lenient")]
    pub longitude: Option<f64>,
}

/// Deserialize a field to `None` on type mismatch instead of erroring.
///
/// Goes through an owned `serde_json::Value` first so the input stream is
/// always fully consumed even when the target type does not match.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Load an ordered list of trail records from a JSON file.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<TrailRecord>> {
    let file = std::fs::File::open(path.as_ref())?;
    let reader = std::io::BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Load several dataset files in parallel, concatenated in input order.
pub fn load_records_parallel<P: AsRef<Path> + Send + Sync>(
    paths: &[P],
) -> Vec<(&P, Result<Vec<TrailRecord>>)> {
    paths
        .par_iter()
        .map(|path| (path, load_records(path)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_record() {
        let json = r#"[{
            "Unique_Id": 7,
            "Trail_Name": "Smith Rock",
            "Distance": 3.6,
            "Elevation_Gain": 600.0,
            "Difficulty": "Moderate",
            "Rating": 4.7,
            "Review_Count": 1542,
            "Url": "https://example.com/trail/smith-rock",
            "Cover_Photo": "https://example.com/photos/smith-rock.jpg",
            "Latitude": 44.3682,
            "Longitude": -121.1406
        }]"#;

        let records: Vec<TrailRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, Some(7));
        assert_eq!(record.name.as_deref(), Some("Smith Rock"));
        assert_eq!(record.distance, Some(3.6));
        assert_eq!(record.difficulty.as_deref(), Some("Moderate"));
        assert_eq!(record.review_count, Some(1542));
        assert_eq!(record.latitude, Some(44.3682));
        assert_eq!(record.longitude, Some(-121.1406));
    }

    #[test]
    fn missing_fields_become_none() {
        let json = r#"[{"Trail_Name": "Bald Butte"}]"#;
        let records: Vec<TrailRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].name.as_deref(), Some("Bald Butte"));
        assert_eq!(records[0].id, None);
        assert_eq!(records[0].rating, None);
        assert_eq!(records[0].latitude, None);
    }

    #[test]
    fn mistyped_field_becomes_none() {
        // Rating is a string here; the record still loads.
        let json = r#"[{"Trail_Name": "Misery Ridge", "Rating": "great", "Latitude": 44.0}]"#;
        let records: Vec<TrailRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].name.as_deref(), Some("Misery Ridge"));
        assert_eq!(records[0].rating, None);
        assert_eq!(records[0].latitude, Some(44.0));
    }

    #[test]
    fn empty_array_is_ok() {
        let records: Vec<TrailRecord> = serde_json::from_str("[]").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn invalid_json_is_an_error() {
        let result: std::result::Result<Vec<TrailRecord>, _> = serde_json::from_str("not json");
        assert!(result.is_err());
    }
}

//! Data models for extracted app metadata and persisted table rows.
//!
//! [`AppFields`] is the transient result of one full extraction pass over a
//! store page. [`AppRecord`] is the persisted subset: one CSV row keyed by
//! package name, with `None` rendered as an empty field.

use serde::{Deserialize, Serialize};

/// Everything one extraction pass pulls out of an app's detail page.
///
/// Name and category are logged for the operator but not persisted; the
/// table schema only keeps the rating and download fields.
#[derive(Debug, Clone, PartialEq)]
pub struct AppFields {
    /// Aggregate rating value, e.g. `4.5`.
    pub rating_value: f32,
    /// Number of ratings behind the aggregate value.
    pub rating_count: u64,
    /// Download-range label as shown on the page, e.g. `"1,000,000+"`.
    pub downloads: String,
    /// Store category, e.g. `"News & Magazines"`.
    pub category: String,
    /// Display name of the app.
    pub name: String,
}

/// One row of the record table.
///
/// The field order here is the column order of the table; serde field names
/// must match the on-disk header `package,rating_value,rating_count,downloads`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppRecord {
    /// Package identifier, the table's natural key.
    pub package: String,
    pub rating_value: Option<f32>,
    pub rating_count: Option<u64>,
    pub downloads: Option<String>,
}

impl AppRecord {
    /// Row for a successful extraction pass.
    pub fn with_fields(package: &str, fields: &AppFields) -> Self {
        AppRecord {
            package: package.to_string(),
            rating_value: Some(fields.rating_value),
            rating_count: Some(fields.rating_count),
            downloads: Some(fields.downloads.clone()),
        }
    }

    /// Row for a failed extraction pass: key set, all data fields empty.
    pub fn null(package: &str) -> Self {
        AppRecord {
            package: package.to_string(),
            rating_value: None,
            rating_count: None,
            downloads: None,
        }
    }

    /// Whether this row carries extracted data.
    pub fn has_data(&self) -> bool {
        self.rating_value.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> AppFields {
        AppFields {
            rating_value: 4.5,
            rating_count: 1000,
            downloads: "1,000,000+".to_string(),
            category: "News & Magazines".to_string(),
            name: "NewsBlur".to_string(),
        }
    }

    #[test]
    fn test_record_with_fields() {
        let record = AppRecord::with_fields("com.newsblur", &sample_fields());
        assert_eq!(record.package, "com.newsblur");
        assert_eq!(record.rating_value, Some(4.5));
        assert_eq!(record.rating_count, Some(1000));
        assert_eq!(record.downloads.as_deref(), Some("1,000,000+"));
        assert!(record.has_data());
    }

    #[test]
    fn test_null_record() {
        let record = AppRecord::null("com.newsblur");
        assert_eq!(record.package, "com.newsblur");
        assert_eq!(record.rating_value, None);
        assert_eq!(record.rating_count, None);
        assert_eq!(record.downloads, None);
        assert!(!record.has_data());
    }

    #[test]
    fn test_record_csv_row_shape() {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer
            .serialize(AppRecord::with_fields("a.b.c", &sample_fields()))
            .unwrap();
        writer.serialize(AppRecord::null("d.e.f")).unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("package,rating_value,rating_count,downloads")
        );
        assert_eq!(lines.next(), Some("a.b.c,4.5,1000,\"1,000,000+\""));
        assert_eq!(lines.next(), Some("d.e.f,,,"));
    }
}

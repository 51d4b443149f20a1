#[cfg(test)]
pub mod fixtures {
    use crate::normalize::{Field, FieldGroupDocument, QuotedNumbers};
    use crate::scanner::{ScanMetadata, ScanResult, ScanWarning, ScannedDocument};
    use crate::value::{Map, Value};
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;
    use std::time::Duration;

    pub fn create_field(key: &str, label: &str, name: &str, field_type: &str) -> Field {
        Field {
            key: key.to_string(),
            label: Value::from(label),
            name: name.to_string(),
            field_type: field_type.to_string(),
            settings: Map::new(),
            sub_fields: Vec::new(),
            sub_fields_at: None,
            quoted_numbers: QuotedNumbers::default(),
        }
    }

    pub fn create_document(key: &str, title: &str, fields: Vec<Field>) -> FieldGroupDocument {
        FieldGroupDocument {
            key: key.to_string(),
            title: Value::from(title),
            fields,
            settings: Map::new(),
            quoted_numbers: QuotedNumbers::default(),
        }
    }

    pub fn create_scanned(file: &str, offset: usize, document: FieldGroupDocument) -> ScannedDocument {
        ScannedDocument {
            file: PathBuf::from(file),
            offset,
            document,
        }
    }

    pub fn create_test_result(
        documents: Vec<ScannedDocument>,
        warnings: Vec<ScanWarning>,
    ) -> ScanResult {
        ScanResult {
            metadata: ScanMetadata {
                root: PathBuf::from("/srv/www/theme"),
                files_examined: 3,
                files_total: 3,
                elapsed: Duration::from_millis(12),
                scanned_at: Utc.with_ymd_and_hms(2026, 1, 25, 12, 0, 0).unwrap(),
                cancelled: false,
                from_cache: false,
            },
            documents,
            warnings,
        }
    }

    pub fn hero_group() -> ScannedDocument {
        create_scanned(
            "inc/acf.php",
            120,
            create_document(
                "group_hero",
                "Hero",
                vec![
                    create_field("field_heading", "Heading", "heading", "text"),
                    create_field("field_image", "Image", "image", "image"),
                ],
            ),
        )
    }
}

//! Schema registry data types.

use serde::{Deserialize, Serialize};

/// One field of a registered record-type schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub id: i16,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: SchemaFieldType,
}

impl SchemaField {
    pub fn new(id: i16, name: impl Into<String>, field_type: SchemaFieldType) -> Self {
        SchemaField {
            id,
            name: name.into(),
            field_type,
        }
    }
}

/// Type tag carried by a registered schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaFieldType {
    Bool,
    Byte,
    Short,
    Integer,
    Long,
    Double,
    String,
    Bytes,
    Date,
    Ip,
}

impl std::fmt::Display for SchemaFieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SchemaFieldType::Bool => "bool",
            SchemaFieldType::Byte => "byte",
            SchemaFieldType::Short => "short",
            SchemaFieldType::Integer => "integer",
            SchemaFieldType::Long => "long",
            SchemaFieldType::Double => "double",
            SchemaFieldType::String => "string",
            SchemaFieldType::Bytes => "bytes",
            SchemaFieldType::Date => "date",
            SchemaFieldType::Ip => "ip",
        };
        f.write_str(name)
    }
}

/// Remote response for `GET {base}/schema/{typeName}`.
#[derive(Debug, Deserialize)]
pub(crate) struct SchemaDescription {
    #[allow(dead_code)]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<SchemaField>,
}

/// One entry of the remote response for `GET {base}/schemas`.
#[derive(Debug, Deserialize)]
pub(crate) struct TypeListing {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_description_parses_service_payload() {
        let payload = r#"{
            "name": "PageView",
            "fields": [
                {"id": 1, "name": "url", "type": "string"},
                {"id": 2, "name": "elapsed", "type": "long"}
            ]
        }"#;

        let description: SchemaDescription = serde_json::from_str(payload).unwrap();

        assert_eq!(description.name, "PageView");
        assert_eq!(description.fields.len(), 2);
        assert_eq!(description.fields[0].name, "url");
        assert_eq!(description.fields[1].field_type, SchemaFieldType::Long);
    }

    #[test]
    fn type_listing_tolerates_extra_members() {
        let payload = r#"[{"name": "PageView", "owner": "web"}, {"name": "Click"}]"#;

        let listing: Vec<TypeListing> = serde_json::from_str(payload).unwrap();

        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].name, "PageView");
    }
}

//! The fixed shape of a property listing.
//!
//! The schema is plain data: the prompt renders it for the model and the normalizer walks
//! it to decide how each field of the reply is coerced.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Decimal number, e.g. a price or an area.
    Number,
    /// Whole number, e.g. a room count.
    Integer,
    TextList,
}

impl FieldKind {
    /// Type name as shown to the model.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "string",
            FieldKind::Number => "number",
            FieldKind::Integer => "integer",
            FieldKind::TextList => "array<string>",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub hint: &'static str,
}

impl SchemaField {
    const fn new(name: &'static str, kind: FieldKind, hint: &'static str) -> Self {
        Self { name, kind, hint }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySchema {
    fields: Vec<SchemaField>,
}

impl PropertySchema {
    /// The listing schema every import is extracted into.
    pub fn standard() -> Self {
        Self {
            fields: vec![
                SchemaField::new(
                    "address",
                    FieldKind::Text,
                    "Full street address of the property, including suburb or city",
                ),
                SchemaField::new(
                    "price",
                    FieldKind::Number,
                    "Asking price as a bare number without currency symbols or suffixes",
                ),
                SchemaField::new("bedrooms", FieldKind::Integer, "Number of bedrooms"),
                SchemaField::new("bathrooms", FieldKind::Integer, "Number of bathrooms"),
                SchemaField::new(
                    "car_spaces",
                    FieldKind::Integer,
                    "Number of car spaces, garage or carport",
                ),
                SchemaField::new(
                    "land_area_sqm",
                    FieldKind::Number,
                    "Land area in square metres",
                ),
                SchemaField::new(
                    "house_area_sqm",
                    FieldKind::Number,
                    "Internal floor area of the house in square metres",
                ),
                SchemaField::new(
                    "description",
                    FieldKind::Text,
                    "A single paragraph describing the property",
                ),
                SchemaField::new(
                    "features",
                    FieldKind::TextList,
                    "Key selling points or amenities as short phrases, in document order",
                ),
            ],
        }
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Render the `{ "field": "type" }` object in schema order, pretty-printed.
    pub fn to_json_shape(&self) -> String {
        let entries: Vec<String> = self
            .fields
            .iter()
            .map(|f| {
                format!(
                    "  {}: {}",
                    Value::String(f.name.to_string()),
                    Value::String(f.kind.type_name().to_string())
                )
            })
            .collect();

        format!("{{\n{}\n}}", entries.join(",\n"))
    }
}

impl Default for PropertySchema {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_schema_field_order() {
        let schema = PropertySchema::standard();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec![
                "address",
                "price",
                "bedrooms",
                "bathrooms",
                "car_spaces",
                "land_area_sqm",
                "house_area_sqm",
                "description",
                "features",
            ]
        );
    }

    #[test]
    fn test_json_shape_is_valid_json() {
        let shape = PropertySchema::standard().to_json_shape();
        let parsed: Value = serde_json::from_str(&shape).unwrap();

        assert_eq!(parsed["price"], "number");
        assert_eq!(parsed["bedrooms"], "integer");
        assert_eq!(parsed["features"], "array<string>");
        assert!(shape.find("\"address\"").unwrap() < shape.find("\"features\"").unwrap());
    }

    #[test]
    fn test_field_lookup() {
        let schema = PropertySchema::standard();
        assert_eq!(schema.field("car_spaces").unwrap().kind, FieldKind::Integer);
        assert!(schema.field("garage").is_none());
    }
}

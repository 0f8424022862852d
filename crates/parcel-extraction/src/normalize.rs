//! Coercion of raw model replies into [`PropertyData`].
//!
//! The model is asked for bare values but does not always comply, so each field accepts the
//! obvious near-misses (`"$1.25M"` for a price, `"4"` for a room count). Anything that still
//! cannot be read becomes `None` rather than failing the whole extraction.

use parcel_core::models::PropertyData;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::error::ExtractionError;

/// A whole price token: optional leading words ("Offers over", "Price:"), an optional
/// currency code or symbol, a plainly written or comma-grouped number, an optional
/// magnitude suffix, an optional trailing currency code and a trailing `+`.
static AMOUNT_PATTERN: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:[a-z]+:?\s+)*?(?:[a-z]{1,3}\s*)?[$€£¥]?\s*(?P<num>\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?|\.\d+)\s*(?P<suffix>thousand|million|billion|mil|bn|k|m|b)?(?:\s+[a-z]{3})?\s*\+?[\s.!)]*$",
    )
});

static LEADING_NUMBER: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^\s*(?P<num>-?\d[\d,]*(?:\.\d+)?)"));

/// Remove a surrounding markdown code fence, if the reply has one.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let body = trimmed.trim_start_matches('`');
    // Drop the info string ("json") on the opening line.
    let body = match body.find('\n') {
        Some(newline) => &body[newline + 1..],
        None => body,
    };
    body.trim_end().trim_end_matches('`').trim()
}

/// Parse a model reply into listing data.
///
/// Fails only when the reply is not a JSON object. Missing, null and unreadable fields
/// become `None`; unknown keys are ignored.
pub fn parse_property_data(raw: &str) -> Result<PropertyData, ExtractionError> {
    let body = strip_code_fences(raw);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ExtractionError::MalformedOutput(format!("reply is not valid JSON: {}", e)))?;

    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(ExtractionError::MalformedOutput(format!(
                "expected a JSON object, got {}",
                json_type(&other)
            )))
        }
    };

    Ok(PropertyData {
        address: field(&object, "address", text),
        price: field(&object, "price", amount),
        bedrooms: field(&object, "bedrooms", count),
        bathrooms: field(&object, "bathrooms", count),
        car_spaces: field(&object, "car_spaces", count),
        land_area_sqm: field(&object, "land_area_sqm", measure),
        house_area_sqm: field(&object, "house_area_sqm", measure),
        description: field(&object, "description", paragraph),
        features: field(&object, "features", feature_list),
    })
}

fn field<T>(object: &Map<String, Value>, name: &str, parse: fn(&Value) -> Option<T>) -> Option<T> {
    let value = object.get(name)?;
    if value.is_null() {
        return None;
    }

    let parsed = parse(value);
    if parsed.is_none() {
        tracing::warn!(
            field = name,
            value_type = json_type(value),
            "Unrecognized value in model output, storing null"
        );
    }
    parsed
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn text(value: &Value) -> Option<String> {
    let s = value.as_str()?.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn paragraph(value: &Value) -> Option<String> {
    let s = value.as_str()?;
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// A price: a number, or a string with currency symbols, separators and k/m/b suffixes.
fn amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

pub(crate) fn parse_amount(s: &str) -> Option<f64> {
    let pattern = AMOUNT_PATTERN.as_ref().ok()?;
    let captures = pattern.captures(s.trim())?;

    let number: f64 = captures["num"].replace(',', "").parse().ok()?;
    let multiplier = match captures
        .name("suffix")
        .map(|m| m.as_str().to_lowercase())
        .as_deref()
    {
        Some("k") | Some("thousand") => 1e3,
        Some("m") | Some("mil") | Some("million") => 1e6,
        Some("b") | Some("bn") | Some("billion") => 1e9,
        _ => return Some(number),
    };

    // Scaling a decimal like 1.1 picks up float noise; prices are whole cents at most.
    Some((number * multiplier * 100.0).round() / 100.0)
}

/// A measurement such as an area: a number, or a string starting with one ("650 sqm").
fn measure(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s),
        _ => None,
    }
}

/// A whole count. Fractional values are not counts and become `None`.
fn count(value: &Value) -> Option<i32> {
    let n = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => return i32::try_from(i).ok(),
            None => n.as_f64()?,
        },
        Value::String(s) => leading_number(s)?,
        _ => return None,
    };

    if n.fract() != 0.0 || n < i32::MIN as f64 || n > i32::MAX as f64 {
        return None;
    }
    Some(n as i32)
}

fn leading_number(s: &str) -> Option<f64> {
    let pattern = LEADING_NUMBER.as_ref().ok()?;
    let captures = pattern.captures(s)?;
    captures["num"].replace(',', "").parse().ok()
}

fn feature_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| item.as_str())
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        Value::String(s) => {
            let features: Vec<String> = s
                .split(['\n', ';', ',', '•', '|'])
                .map(|item| item.trim().trim_start_matches(['-', '*']).trim())
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect();
            (!features.is_empty()).then_some(features)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> PropertyData {
        PropertyData {
            address: Some("123 Example St, Springfield".to_string()),
            price: Some(950000.0),
            bedrooms: Some(4),
            bathrooms: Some(2),
            car_spaces: Some(2),
            land_area_sqm: Some(650.5),
            house_area_sqm: Some(220.0),
            description: Some("A bright family home close to schools.".to_string()),
            features: Some(vec!["Pool".to_string(), "Solar panels".to_string()]),
        }
    }

    #[test]
    fn test_well_formed_output_is_unchanged() {
        let expected = sample();
        let raw = serde_json::to_string(&expected).unwrap();
        assert_eq!(parse_property_data(&raw).unwrap(), expected);
    }

    #[test]
    fn test_missing_field_becomes_none() {
        let raw = json!({
            "address": "123 Example St",
            "price": 950000,
            "bathrooms": 2
        })
        .to_string();

        let data = parse_property_data(&raw).unwrap();
        assert_eq!(data.bedrooms, None);
        assert_eq!(data.bathrooms, Some(2));
        assert_eq!(data.features, None);
    }

    #[test]
    fn test_price_strings_are_normalized() {
        assert_eq!(parse_amount("$1.25M"), Some(1250000.0));
        assert_eq!(parse_amount("1,250,000"), Some(1250000.0));
        assert_eq!(parse_amount("$950,000"), Some(950000.0));
        assert_eq!(parse_amount("AUD 850k"), Some(850000.0));
        assert_eq!(parse_amount("1.1 million"), Some(1100000.0));
        assert_eq!(parse_amount("$950,000+"), Some(950000.0));
        assert_eq!(parse_amount("$950,000 AUD"), Some(950000.0));
        assert_eq!(parse_amount("Price on application"), None);

        let data = parse_property_data(r#"{"price": "$1.25M"}"#).unwrap();
        assert_eq!(data.price, Some(1250000.0));
    }

    #[test]
    fn test_amount_must_cover_whole_token() {
        assert_eq!(parse_amount("1.250.000"), None);
        assert_eq!(parse_amount("1.25 metres"), None);
        assert_eq!(parse_amount("$1,250,000 - $1,350,000"), None);
        assert_eq!(parse_amount("Auction 12 March"), None);
    }

    #[test]
    fn test_amount_skips_leading_words() {
        assert_eq!(parse_amount("From $950,000"), Some(950000.0));
        assert_eq!(parse_amount("Offers over $1.2m"), Some(1200000.0));
        assert_eq!(parse_amount("Price: $950,000"), Some(950000.0));
    }

    #[test]
    fn test_counts_accept_numeric_strings_only_when_whole() {
        let raw = json!({
            "bedrooms": "4",
            "bathrooms": 2.0,
            "car_spaces": 1.5
        })
        .to_string();

        let data = parse_property_data(&raw).unwrap();
        assert_eq!(data.bedrooms, Some(4));
        assert_eq!(data.bathrooms, Some(2));
        assert_eq!(data.car_spaces, None);
    }

    #[test]
    fn test_unrecognized_types_become_none() {
        let raw = json!({
            "address": 42,
            "price": true,
            "bedrooms": "several",
            "features": { "pool": true }
        })
        .to_string();

        assert_eq!(parse_property_data(&raw).unwrap(), PropertyData::default());
    }

    #[test]
    fn test_description_collapsed_to_one_paragraph() {
        let raw = json!({ "description": "  Renovated kitchen.\n\nNorth facing   yard. " }).to_string();
        let data = parse_property_data(&raw).unwrap();
        assert_eq!(
            data.description.as_deref(),
            Some("Renovated kitchen. North facing yard.")
        );
    }

    #[test]
    fn test_features_from_delimited_string() {
        let raw = json!({ "features": "- Pool\n- Ducted heating; Double garage" }).to_string();
        let data = parse_property_data(&raw).unwrap();
        assert_eq!(
            data.features,
            Some(vec![
                "Pool".to_string(),
                "Ducted heating".to_string(),
                "Double garage".to_string()
            ])
        );
    }

    #[test]
    fn test_code_fences_are_stripped() {
        let raw = "```json\n{\"bedrooms\": 3}\n```";
        assert_eq!(strip_code_fences(raw), "{\"bedrooms\": 3}");
        assert_eq!(parse_property_data(raw).unwrap().bedrooms, Some(3));
    }

    #[test]
    fn test_malformed_output() {
        assert!(matches!(
            parse_property_data("Sorry, I cannot help with that."),
            Err(ExtractionError::MalformedOutput(_))
        ));
        assert!(matches!(
            parse_property_data("[1, 2, 3]"),
            Err(ExtractionError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_empty_object_is_all_none() {
        assert_eq!(parse_property_data("{}").unwrap(), PropertyData::default());
    }
}

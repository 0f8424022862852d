use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::document::ArchivedDocumentRef;

/// Structured listing data extracted from a document.
///
/// Every field is always present; anything the document does not state is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PropertyData {
    pub address: Option<String>,
    /// Bare numeric price without currency symbols or suffixes.
    pub price: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub car_spaces: Option<i32>,
    pub land_area_sqm: Option<f64>,
    pub house_area_sqm: Option<f64>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "property_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    #[default]
    Imported,
    Draft,
    Published,
    Archived,
}

impl FromStr for PropertyStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "imported" => Ok(PropertyStatus::Imported),
            "draft" => Ok(PropertyStatus::Draft),
            "published" => Ok(PropertyStatus::Published),
            "archived" => Ok(PropertyStatus::Archived),
            _ => Err(anyhow::anyhow!("Invalid property status: {}", s)),
        }
    }
}

impl Display for PropertyStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PropertyStatus::Imported => write!(f, "imported"),
            PropertyStatus::Draft => write!(f, "draft"),
            PropertyStatus::Published => write!(f, "published"),
            PropertyStatus::Archived => write!(f, "archived"),
        }
    }
}

/// Documents attached to a property, keyed by role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DocumentUrls {
    pub source_pdf: String,
}

/// A property ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProperty {
    pub data: PropertyData,
    pub status: PropertyStatus,
    pub source_pdf_name: String,
    pub source_pdf_path: String,
    pub document_urls: DocumentUrls,
    pub facade_image_url: Option<String>,
    pub floor_plan_image_url: Option<String>,
    pub image_gallery_urls: Vec<String>,
    pub submitted_at: DateTime<Utc>,
}

impl NewProperty {
    /// Combine extracted data with the provenance of its source document.
    ///
    /// Image fields stay empty: documents are imported for their text only.
    pub fn assemble(
        data: PropertyData,
        archived: &ArchivedDocumentRef,
        source_pdf_name: &str,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            data,
            status: PropertyStatus::Imported,
            source_pdf_name: source_pdf_name.to_string(),
            source_pdf_path: archived.storage_path.clone(),
            document_urls: DocumentUrls {
                source_pdf: archived.public_url.clone(),
            },
            facade_image_url: None,
            floor_plan_image_url: None,
            image_gallery_urls: Vec::new(),
            submitted_at,
        }
    }

    /// Attach the identifiers assigned by the store.
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> PropertyRecord {
        PropertyRecord {
            id,
            data: self.data,
            status: self.status,
            source_pdf_name: self.source_pdf_name,
            source_pdf_path: self.source_pdf_path,
            document_urls: self.document_urls,
            facade_image_url: self.facade_image_url,
            floor_plan_image_url: self.floor_plan_image_url,
            image_gallery_urls: self.image_gallery_urls,
            submitted_at: self.submitted_at,
            created_at,
        }
    }
}

/// A persisted property, as returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PropertyRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub data: PropertyData,
    pub status: PropertyStatus,
    pub source_pdf_name: String,
    pub source_pdf_path: String,
    pub document_urls: DocumentUrls,
    pub facade_image_url: Option<String>,
    pub floor_plan_image_url: Option<String>,
    pub image_gallery_urls: Vec<String>,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archived() -> ArchivedDocumentRef {
        ArchivedDocumentRef {
            storage_path: "documents/20240301_101500_000000001_listing.pdf".to_string(),
            public_url: "http://localhost:3000/files/documents/20240301_101500_000000001_listing.pdf"
                .to_string(),
        }
    }

    #[test]
    fn test_assemble_sets_provenance_and_placeholders() {
        let data = PropertyData {
            address: Some("123 Example St".to_string()),
            price: Some(950000.0),
            ..Default::default()
        };
        let submitted_at = Utc::now();
        let new = NewProperty::assemble(data.clone(), &archived(), "listing.pdf", submitted_at);

        assert_eq!(new.status, PropertyStatus::Imported);
        assert_eq!(new.data, data);
        assert_eq!(new.source_pdf_name, "listing.pdf");
        assert_eq!(new.source_pdf_path, archived().storage_path);
        assert_eq!(new.document_urls.source_pdf, archived().public_url);
        assert!(new.facade_image_url.is_none());
        assert!(new.floor_plan_image_url.is_none());
        assert!(new.image_gallery_urls.is_empty());
        assert_eq!(new.submitted_at, submitted_at);
    }

    #[test]
    fn test_record_serializes_flat_snake_case() {
        let data = PropertyData {
            address: Some("123 Example St".to_string()),
            bedrooms: Some(4),
            ..Default::default()
        };
        let record = NewProperty::assemble(data, &archived(), "listing.pdf", Utc::now())
            .into_record(Uuid::new_v4(), Utc::now());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["address"], "123 Example St");
        assert_eq!(json["bedrooms"], 4);
        assert!(json["price"].is_null());
        assert!(json["car_spaces"].is_null());
        assert_eq!(json["status"], "imported");
        assert_eq!(json["document_urls"]["source_pdf"], archived().public_url);
        assert_eq!(json["image_gallery_urls"], serde_json::json!([]));
    }

    #[test]
    fn test_property_status_from_str() {
        assert_eq!(
            "Imported".parse::<PropertyStatus>().unwrap(),
            PropertyStatus::Imported
        );
        assert!("sold".parse::<PropertyStatus>().is_err());
        assert_eq!(PropertyStatus::Published.to_string(), "published");
    }
}

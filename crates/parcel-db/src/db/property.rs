use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parcel_core::models::{DocumentUrls, NewProperty, PropertyData, PropertyRecord, PropertyStatus};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::error::PersistError;
use super::transaction::TransactionGuard;

/// Storage for imported properties.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Insert one property atomically and return it with its assigned id and timestamp.
    async fn insert(&self, property: NewProperty) -> Result<PropertyRecord, PersistError>;

    async fn get(&self, id: Uuid) -> Result<Option<PropertyRecord>, PersistError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), PersistError>;
}

const PROPERTY_COLUMNS: &str = "id, address, price, bedrooms, bathrooms, car_spaces, \
     land_area_sqm, house_area_sqm, description, features, status, source_pdf_name, \
     source_pdf_path, document_urls, facade_image_url, floor_plan_image_url, \
     image_gallery_urls, submitted_at, created_at";

/// Row type for the properties table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct PropertyRow {
    pub id: Uuid,
    pub address: Option<String>,
    pub price: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub car_spaces: Option<i32>,
    pub land_area_sqm: Option<f64>,
    pub house_area_sqm: Option<f64>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
    pub status: PropertyStatus,
    pub source_pdf_name: String,
    pub source_pdf_path: String,
    pub document_urls: Json<DocumentUrls>,
    pub facade_image_url: Option<String>,
    pub floor_plan_image_url: Option<String>,
    pub image_gallery_urls: Vec<String>,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PropertyRow {
    pub fn to_property_record(self) -> PropertyRecord {
        PropertyRecord {
            id: self.id,
            data: PropertyData {
                address: self.address,
                price: self.price,
                bedrooms: self.bedrooms,
                bathrooms: self.bathrooms,
                car_spaces: self.car_spaces,
                land_area_sqm: self.land_area_sqm,
                house_area_sqm: self.house_area_sqm,
                description: self.description,
                features: self.features,
            },
            status: self.status,
            source_pdf_name: self.source_pdf_name,
            source_pdf_path: self.source_pdf_path,
            document_urls: self.document_urls.0,
            facade_image_url: self.facade_image_url,
            floor_plan_image_url: self.floor_plan_image_url,
            image_gallery_urls: self.image_gallery_urls,
            submitted_at: self.submitted_at,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL repository for the properties table.
#[derive(Clone)]
pub struct PropertyRepository {
    pool: PgPool,
}

impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropertyStore for PropertyRepository {
    #[tracing::instrument(
        skip(self, property),
        fields(db.table = "properties", db.operation = "insert", source_pdf_path = %property.source_pdf_path)
    )]
    async fn insert(&self, property: NewProperty) -> Result<PropertyRecord, PersistError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let query = format!(
            r#"
            INSERT INTO properties (
                address, price, bedrooms, bathrooms, car_spaces, land_area_sqm,
                house_area_sqm, description, features, status, source_pdf_name,
                source_pdf_path, document_urls, facade_image_url, floor_plan_image_url,
                image_gallery_urls, submitted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {PROPERTY_COLUMNS}
            "#
        );

        let data = &property.data;
        let row = sqlx::query_as::<Postgres, PropertyRow>(&query)
            .bind(&data.address)
            .bind(data.price)
            .bind(data.bedrooms)
            .bind(data.bathrooms)
            .bind(data.car_spaces)
            .bind(data.land_area_sqm)
            .bind(data.house_area_sqm)
            .bind(&data.description)
            .bind(&data.features)
            .bind(property.status)
            .bind(&property.source_pdf_name)
            .bind(&property.source_pdf_path)
            .bind(Json(&property.document_urls))
            .bind(&property.facade_image_url)
            .bind(&property.floor_plan_image_url)
            .bind(&property.image_gallery_urls)
            .bind(property.submitted_at)
            .fetch_one(tx.executor()?)
            .await?;

        tx.commit().await?;

        tracing::debug!(property_id = %row.id, "Property inserted");
        Ok(row.to_property_record())
    }

    #[tracing::instrument(skip(self), fields(db.table = "properties", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<PropertyRecord>, PersistError> {
        let query = format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1");

        let row = sqlx::query_as::<Postgres, PropertyRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(PropertyRow::to_property_record))
    }

    async fn ping(&self) -> Result<(), PersistError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

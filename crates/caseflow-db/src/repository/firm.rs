//! SurrealDB implementation of [`FirmRepository`].

use caseflow_core::error::CaseflowResult;
use caseflow_core::models::firm::{CreateFirm, Firm};
use caseflow_core::repository::FirmRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct FirmRow {
    name: String,
    slug: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl FirmRow {
    fn into_firm(self, id: Uuid) -> Firm {
        Firm {
            id,
            name: self.name,
            slug: self.slug,
            metadata: self.metadata,
            created_at: self.created_at,
        }
    }
}

/// SurrealDB implementation of the Firm repository.
#[derive(Clone)]
pub struct SurrealFirmRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealFirmRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> FirmRepository for SurrealFirmRepository<C> {
    async fn create(&self, input: CreateFirm) -> CaseflowResult<Firm> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "CREATE type::record('firm', $id) SET \
                 name = $name, slug = $slug, metadata = $metadata",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("metadata", metadata))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<FirmRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "firm".into(),
            id: id_str,
        })?;

        Ok(row.into_firm(id))
    }

    async fn get_by_id(&self, id: Uuid) -> CaseflowResult<Firm> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('firm', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<FirmRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "firm".into(),
            id: id_str,
        })?;

        Ok(row.into_firm(id))
    }
}

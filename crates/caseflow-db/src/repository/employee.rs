//! SurrealDB implementation of [`EmployeeRepository`].

use caseflow_core::error::CaseflowResult;
use caseflow_core::models::employee::{CreateEmployee, Employee, EmployeeStatus, StaffRole};
use caseflow_core::repository::{EmployeeRepository, PaginatedResult, Pagination};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct EmployeeRow {
    firm_id: String,
    display_name: String,
    email: String,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EmployeeRow {
    fn into_employee(self, id: Uuid) -> Result<Employee, DbError> {
        let firm_id = Uuid::parse_str(&self.firm_id)
            .map_err(|e| DbError::Migration(format!("invalid firm UUID: {e}")))?;
        let role = StaffRole::parse(&self.role)
            .ok_or_else(|| DbError::Migration(format!("invalid staff role: {}", self.role)))?;
        let status = EmployeeStatus::parse(&self.status).ok_or_else(|| {
            DbError::Migration(format!("invalid employee status: {}", self.status))
        })?;
        Ok(Employee {
            id,
            firm_id,
            display_name: self.display_name,
            email: self.email,
            role,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct EmployeeRowWithId {
    record_id: String,
    firm_id: String,
    display_name: String,
    email: String,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EmployeeRowWithId {
    fn try_into_employee(self) -> Result<Employee, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        EmployeeRow {
            firm_id: self.firm_id,
            display_name: self.display_name,
            email: self.email,
            role: self.role,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_employee(id)
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Employee repository.
#[derive(Clone)]
pub struct SurrealEmployeeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEmployeeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> EmployeeRepository for SurrealEmployeeRepository<C> {
    async fn create(&self, input: CreateEmployee) -> CaseflowResult<Employee> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('employee', $id) SET \
                 firm_id = $firm_id, \
                 display_name = $display_name, \
                 email = $email, \
                 role = $role, \
                 status = 'Active'",
            )
            .bind(("id", id_str.clone()))
            .bind(("firm_id", input.firm_id.to_string()))
            .bind(("display_name", input.display_name))
            .bind(("email", input.email))
            .bind(("role", input.role.as_str()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<EmployeeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "employee".into(),
            id: id_str,
        })?;

        Ok(row.into_employee(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> CaseflowResult<Employee> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('employee', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EmployeeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "employee".into(),
            id: id_str,
        })?;

        Ok(row.into_employee(id)?)
    }

    async fn list(
        &self,
        firm_id: Uuid,
        pagination: Pagination,
    ) -> CaseflowResult<PaginatedResult<Employee>> {
        let mut result = self
            .db
            .query(
                "SELECT record::id(id) AS record_id, * FROM employee \
                 WHERE firm_id = $firm_id \
                 ORDER BY display_name \
                 LIMIT $limit START $offset; \
                 SELECT count() AS total FROM employee \
                 WHERE firm_id = $firm_id GROUP ALL",
            )
            .bind(("firm_id", firm_id.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EmployeeRowWithId> = result.take(0).map_err(DbError::from)?;
        let counts: Vec<CountRow> = result.take(1).map_err(DbError::from)?;
        let total = counts.first().map(|c| c.total).unwrap_or(0);

        let items = rows
            .into_iter()
            .map(EmployeeRowWithId::try_into_employee)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

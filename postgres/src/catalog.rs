//! Function and meal type pick lists.

use crate::PostgresBanquetStore;
use crate::error::{database, on_conflict};
use banquet_core::catalog::{CatalogRename, FunctionType, MealType, NewCatalogEntry};
use banquet_core::error::{BanquetError, Result};
use banquet_core::ids::{CompanyId, FunctionId, MealTypeId};
use banquet_core::providers::{FunctionCatalog, MealTypeCatalog};

const FUNCTION_NAME_KEY: &str = "functions_user_id_function_name_key";
const MEAL_TYPE_NAME_KEY: &str = "meal_types_user_name_key";

#[derive(sqlx::FromRow)]
struct FunctionRow {
    id: i64,
    function_name: String,
    user_id: String,
    company_id: i64,
}

impl From<FunctionRow> for FunctionType {
    fn from(row: FunctionRow) -> Self {
        Self {
            id: FunctionId::new(row.id),
            function_name: row.function_name,
            user_id: row.user_id,
            company_id: CompanyId::new(row.company_id),
        }
    }
}

#[derive(sqlx::FromRow)]
struct MealTypeRow {
    id: i64,
    meal_type_name: String,
    user_id: String,
    company_id: i64,
}

impl From<MealTypeRow> for MealType {
    fn from(row: MealTypeRow) -> Self {
        Self {
            id: MealTypeId::new(row.id),
            meal_type_name: row.meal_type_name,
            user_id: row.user_id,
            company_id: CompanyId::new(row.company_id),
        }
    }
}

fn function_exists() -> BanquetError {
    BanquetError::DuplicateEntry("Function name already exists".to_string())
}

impl FunctionCatalog for PostgresBanquetStore {
    async fn add_function(&self, entry: NewCatalogEntry) -> Result<FunctionType> {
        let row: FunctionRow = sqlx::query_as(
            r"
            INSERT INTO functions (function_name, user_id, company_id)
            VALUES ($1, $2, $3)
            RETURNING id, function_name, user_id, company_id
            ",
        )
        .bind(&entry.name)
        .bind(&entry.user_id)
        .bind(entry.company_id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            on_conflict("Failed to add function", &e, &[(FUNCTION_NAME_KEY, function_exists())])
        })?;

        tracing::info!(function_id = row.id, user_id = %row.user_id, "Function added");
        Ok(row.into())
    }

    async fn rename_function(&self, id: FunctionId, rename: CatalogRename) -> Result<FunctionType> {
        let row: Option<FunctionRow> = sqlx::query_as(
            r"
            UPDATE functions SET function_name = $1
            WHERE id = $2
            RETURNING id, function_name, user_id, company_id
            ",
        )
        .bind(&rename.name)
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            on_conflict("Failed to update function", &e, &[(FUNCTION_NAME_KEY, function_exists())])
        })?;

        row.map(FunctionType::from)
            .ok_or(BanquetError::NotFound("Function"))
    }

    async fn delete_function(&self, id: FunctionId) -> Result<()> {
        let result = sqlx::query("DELETE FROM functions WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| database("Failed to delete function", &e))?;

        if result.rows_affected() == 0 {
            return Err(BanquetError::NotFound("Function"));
        }
        Ok(())
    }

    async fn functions_for_user(&self, user_id: &str) -> Result<Vec<FunctionType>> {
        let rows: Vec<FunctionRow> = sqlx::query_as(
            r"
            SELECT id, function_name, user_id, company_id
            FROM functions
            WHERE user_id = $1
            ORDER BY id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database("Failed to list functions", &e))?;

        Ok(rows.into_iter().map(FunctionType::from).collect())
    }
}

impl MealTypeCatalog for PostgresBanquetStore {
    async fn add_meal_type(&self, entry: NewCatalogEntry) -> Result<MealType> {
        let row: MealTypeRow = sqlx::query_as(
            r"
            INSERT INTO meal_types (meal_type_name, user_id, company_id)
            VALUES ($1, $2, $3)
            RETURNING id, meal_type_name, user_id, company_id
            ",
        )
        .bind(&entry.name)
        .bind(&entry.user_id)
        .bind(entry.company_id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            on_conflict(
                "Failed to add meal type",
                &e,
                &[(
                    MEAL_TYPE_NAME_KEY,
                    BanquetError::DuplicateEntry("Meal type already exists for this user".to_string()),
                )],
            )
        })?;

        tracing::info!(meal_type_id = row.id, user_id = %row.user_id, "Meal type added");
        Ok(row.into())
    }

    async fn rename_meal_type(&self, id: MealTypeId, rename: CatalogRename) -> Result<MealType> {
        let row: Option<MealTypeRow> = sqlx::query_as(
            r"
            UPDATE meal_types SET meal_type_name = $1
            WHERE id = $2 AND user_id = $3
            RETURNING id, meal_type_name, user_id, company_id
            ",
        )
        .bind(&rename.name)
        .bind(id.get())
        .bind(rename.user_id.as_deref().unwrap_or_default())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            on_conflict(
                "Failed to update meal type",
                &e,
                &[(
                    MEAL_TYPE_NAME_KEY,
                    BanquetError::DuplicateEntry("Meal type name already exists".to_string()),
                )],
            )
        })?;

        row.map(MealType::from)
            .ok_or(BanquetError::NotFound("Meal type"))
    }

    async fn delete_meal_type(&self, id: MealTypeId, user_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM meal_types WHERE id = $1 AND user_id = $2")
            .bind(id.get())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| database("Failed to delete meal type", &e))?;

        if result.rows_affected() == 0 {
            return Err(BanquetError::NotFound("Meal type"));
        }
        Ok(())
    }

    async fn meal_types_for_user(&self, user_id: &str) -> Result<Vec<MealType>> {
        let rows: Vec<MealTypeRow> = sqlx::query_as(
            r"
            SELECT id, meal_type_name, user_id, company_id
            FROM meal_types
            WHERE user_id = $1
            ORDER BY id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database("Failed to list meal types", &e))?;

        Ok(rows.into_iter().map(MealType::from).collect())
    }
}

//! Per-user pick lists: function (occasion) types and meal types.

use crate::de::{self, Required};
use crate::error::{BanquetError, Result};
use crate::ids::{CompanyId, FunctionId, MealTypeId};
use serde::{Deserialize, Serialize};

/// An occasion kind offered in the booking form (wedding, reception, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionType {
    /// Row id.
    pub id: FunctionId,
    /// Display name; unique per user.
    pub function_name: String,
    /// Owning user.
    pub user_id: String,
    /// Owning company.
    pub company_id: CompanyId,
}

/// A meal option offered in the booking form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealType {
    /// Row id.
    pub id: MealTypeId,
    /// Display name; unique per user ignoring case.
    pub meal_type_name: String,
    /// Owning user.
    pub user_id: String,
    /// Owning company.
    pub company_id: CompanyId,
}

/// Catalog entry payload shared by both lists.
#[derive(Clone, Debug, Default, Deserialize)]
#[allow(missing_docs)]
pub struct CatalogRequest {
    #[serde(default, alias = "meal_type_name", deserialize_with = "de::lenient_string")]
    pub function_name: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_id")]
    pub company_id: Option<i64>,
}

/// A validated new entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCatalogEntry {
    /// Display name.
    pub name: String,
    /// Owning user.
    pub user_id: String,
    /// Owning company.
    pub company_id: CompanyId,
}

impl TryFrom<CatalogRequest> for NewCatalogEntry {
    type Error = BanquetError;

    fn try_from(req: CatalogRequest) -> Result<Self> {
        let mut required = Required::default();
        let user_id = required.text("user_id", req.user_id);
        let company_id = required.take("company_id", req.company_id);
        let name = required.text("name", req.function_name);
        let (Some(user_id), Some(company_id), Some(name)) = (user_id, company_id, name) else {
            return Err(required.into_error());
        };

        Ok(Self {
            name,
            user_id,
            company_id: CompanyId::new(company_id),
        })
    }
}

/// A validated rename.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogRename {
    /// New display name.
    pub name: String,
    /// Owner the entry must belong to, when the list is user scoped.
    pub user_id: Option<String>,
}

impl CatalogRename {
    /// Validate a rename; `scoped` lists also require the owning user.
    ///
    /// # Errors
    ///
    /// Returns [`BanquetError::MissingFields`] for absent name or user.
    pub fn new(req: CatalogRequest, scoped: bool) -> Result<Self> {
        let mut required = Required::default();
        let name = required.text("name", req.function_name);
        let user_id = if scoped {
            required.text("user_id", req.user_id)
        } else {
            req.user_id
        };
        let Some(name) = name else {
            return Err(required.into_error());
        };
        if scoped && user_id.is_none() {
            return Err(required.into_error());
        }

        Ok(Self { name, user_id })
    }
}

/// Folded name used for case-insensitive meal type comparison.
#[must_use]
pub fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn meal_type_name_is_accepted_as_alias() {
        let req: CatalogRequest = serde_json::from_value(serde_json::json!({
            "meal_type_name": "Buffet",
            "user_id": "owner",
            "company_id": "1"
        }))
        .unwrap();

        let entry = NewCatalogEntry::try_from(req).unwrap();
        assert_eq!(entry.name, "Buffet");
        assert_eq!(entry.company_id, CompanyId::new(1));
    }

    #[test]
    fn new_entry_reports_missing_fields() {
        let err = NewCatalogEntry::try_from(CatalogRequest::default()).unwrap_err();
        assert_eq!(
            err,
            BanquetError::MissingFields(vec!["user_id", "company_id", "name"])
        );
    }

    #[test]
    fn scoped_rename_needs_owner() {
        let req = CatalogRequest {
            function_name: Some("Plated".into()),
            ..CatalogRequest::default()
        };
        assert_eq!(
            CatalogRename::new(req.clone(), true).unwrap_err(),
            BanquetError::MissingFields(vec!["user_id"])
        );
        assert_eq!(
            CatalogRename::new(req, false).unwrap(),
            CatalogRename {
                name: "Plated".into(),
                user_id: None
            }
        );
    }

    #[test]
    fn folding_ignores_case() {
        assert_eq!(fold_name("BuFFet"), fold_name("buffet"));
    }
}

//! Customer directory: one entry per named customer, keyed by name and phone.

use crate::de::{self, Required};
use crate::error::{BanquetError, Result};
use crate::ids::{CompanyId, CustomerId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Search results are capped at this many rows.
pub const SEARCH_LIMIT: usize = 5;

/// A directory entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Row id.
    pub customer_id: CustomerId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Customer name; unique within the company.
    pub event_name: String,
    /// Contact number.
    pub phone_number: String,
}

/// Add/update payload as sent by clients.
#[derive(Clone, Debug, Default, Deserialize)]
#[allow(missing_docs)]
pub struct CustomerRequest {
    #[serde(default, deserialize_with = "de::lenient_id")]
    pub customer_id: Option<i64>,
    #[serde(default, deserialize_with = "de::lenient_id")]
    pub company_id: Option<i64>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub event_name: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub phone_number: Option<String>,
}

/// A validated new entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCustomer {
    /// Owning company.
    pub company_id: CompanyId,
    /// Customer name.
    pub event_name: String,
    /// Contact number.
    pub phone_number: String,
}

impl TryFrom<CustomerRequest> for NewCustomer {
    type Error = BanquetError;

    fn try_from(req: CustomerRequest) -> Result<Self> {
        let mut required = Required::default();
        let company_id = required.take("company_id", req.company_id);
        let event_name = required.text("event_name", req.event_name);
        let phone_number = required.text("phone_number", req.phone_number);
        let (Some(company_id), Some(event_name), Some(phone_number)) =
            (company_id, event_name, phone_number)
        else {
            return Err(required.into_error());
        };

        Ok(Self {
            company_id: CompanyId::new(company_id),
            event_name,
            phone_number,
        })
    }
}

/// A validated overwrite of an existing entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomerUpdate {
    /// Entry to overwrite.
    pub customer_id: CustomerId,
    /// Owning company.
    pub company_id: CompanyId,
    /// New name.
    pub event_name: String,
    /// New number.
    pub phone_number: String,
}

impl TryFrom<CustomerRequest> for CustomerUpdate {
    type Error = BanquetError;

    fn try_from(req: CustomerRequest) -> Result<Self> {
        let mut required = Required::default();
        let customer_id = required.take("customer_id", req.customer_id);
        let company_id = required.take("company_id", req.company_id);
        let event_name = required.text("event_name", req.event_name);
        let phone_number = required.text("phone_number", req.phone_number);
        let (Some(customer_id), Some(company_id), Some(event_name), Some(phone_number)) =
            (customer_id, company_id, event_name, phone_number)
        else {
            return Err(required.into_error());
        };

        Ok(Self {
            customer_id: CustomerId::new(customer_id),
            company_id: CompanyId::new(company_id),
            event_name,
            phone_number,
        })
    }
}

/// Pre-submission duplicate check payload.
#[derive(Clone, Debug, Default, Deserialize)]
#[allow(missing_docs)]
pub struct EventDetailsRequest {
    #[serde(default, deserialize_with = "de::lenient_id")]
    pub company_id: Option<i64>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub event_name: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub phone_number: Option<String>,
}

/// A validated duplicate check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventDetailsCheck {
    /// Company to look in.
    pub company_id: CompanyId,
    /// Proposed customer name.
    pub event_name: String,
    /// Proposed phone, checked only when given.
    pub phone_number: Option<String>,
}

impl TryFrom<EventDetailsRequest> for EventDetailsCheck {
    type Error = BanquetError;

    fn try_from(req: EventDetailsRequest) -> Result<Self> {
        let mut required = Required::default();
        let event_name = required.text("event_name", req.event_name);
        let company_id = required.take("company_id", req.company_id);
        let (Some(event_name), Some(company_id)) = (event_name, company_id) else {
            return Err(required.into_error());
        };

        Ok(Self {
            company_id: CompanyId::new(company_id),
            event_name,
            phone_number: req.phone_number,
        })
    }
}

/// Outcome of an advisory duplicate check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventValidation {
    /// Neither name nor phone is taken.
    Valid,
    /// The name is taken; the phone on record is returned.
    NameExists {
        /// Phone stored against the existing name.
        existing_phone: String,
    },
    /// The phone is taken within the company.
    PhoneExists {
        /// Name stored against the existing phone.
        existing_name: String,
    },
}

/// Which column a customer search matches against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchType {
    /// Match on customer name.
    Name,
    /// Match on phone number.
    Phone,
}

impl FromStr for SearchType {
    type Err = BanquetError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(Self::Name),
            "phone" => Ok(Self::Phone),
            other => Err(BanquetError::InvalidInput(format!(
                "Invalid searchType: {other}"
            ))),
        }
    }
}

/// Search query string.
#[derive(Clone, Debug, Default, Deserialize)]
#[allow(missing_docs)]
pub struct CustomerSearchQuery {
    pub company_id: Option<String>,
    pub term: Option<String>,
    #[serde(rename = "searchType")]
    pub search_type: Option<String>,
}

/// A validated prefix search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomerSearch {
    /// Company to search in.
    pub company_id: CompanyId,
    /// Prefix, matched case-insensitively.
    pub term: String,
    /// Column to match.
    pub search_type: SearchType,
}

impl CustomerSearch {
    /// `ILIKE` pattern for the term with `\`, `%` and `_` escaped.
    #[must_use]
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.term.len() + 1);
        for c in self.term.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }

    /// Whether `customer` matches this search.
    #[must_use]
    pub fn matches(&self, customer: &Customer) -> bool {
        if customer.company_id != self.company_id {
            return false;
        }
        let haystack = match self.search_type {
            SearchType::Name => &customer.event_name,
            SearchType::Phone => &customer.phone_number,
        };
        haystack
            .to_lowercase()
            .starts_with(&self.term.to_lowercase())
    }
}

impl TryFrom<CustomerSearchQuery> for CustomerSearch {
    type Error = BanquetError;

    fn try_from(query: CustomerSearchQuery) -> Result<Self> {
        let mut required = Required::default();
        let company_id = required.text("company_id", query.company_id);
        let term = required.text("term", query.term);
        let search_type = required.text("searchType", query.search_type);
        let (Some(company_id), Some(term), Some(search_type)) = (company_id, term, search_type)
        else {
            return Err(required.into_error());
        };

        Ok(Self {
            company_id: CompanyId::new(de::parse_id("company_id", Some(&company_id))?),
            term,
            search_type: search_type.parse()?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn search(term: &str, search_type: SearchType) -> CustomerSearch {
        CustomerSearch {
            company_id: CompanyId::new(1),
            term: term.to_string(),
            search_type,
        }
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(search("Sm", SearchType::Name).like_pattern(), "Sm%");
        assert_eq!(search("50%_off", SearchType::Name).like_pattern(), "50\\%\\_off%");
        assert_eq!(search("a\\b", SearchType::Name).like_pattern(), "a\\\\b%");
    }

    #[test]
    fn matching_is_case_insensitive_prefix_within_company() {
        let customer = Customer {
            customer_id: CustomerId::new(1),
            company_id: CompanyId::new(1),
            event_name: "Smith Wedding".into(),
            phone_number: "5551234".into(),
        };

        assert!(search("smi", SearchType::Name).matches(&customer));
        assert!(!search("wedding", SearchType::Name).matches(&customer));
        assert!(search("555", SearchType::Phone).matches(&customer));

        let mut other_company = search("smi", SearchType::Name);
        other_company.company_id = CompanyId::new(2);
        assert!(!other_company.matches(&customer));
    }

    #[test]
    fn search_query_validation() {
        let err = CustomerSearch::try_from(CustomerSearchQuery {
            company_id: Some("1".into()),
            term: None,
            search_type: Some("email".into()),
        })
        .unwrap_err();
        assert_eq!(err, BanquetError::MissingFields(vec!["term"]));

        let err = CustomerSearch::try_from(CustomerSearchQuery {
            company_id: Some("1".into()),
            term: Some("a".into()),
            search_type: Some("email".into()),
        })
        .unwrap_err();
        assert!(matches!(err, BanquetError::InvalidInput(_)));
    }

    #[test]
    fn update_requires_customer_id_first() {
        let err = CustomerUpdate::try_from(CustomerRequest {
            company_id: Some(1),
            event_name: Some("A".into()),
            ..CustomerRequest::default()
        })
        .unwrap_err();
        assert_eq!(
            err,
            BanquetError::MissingFields(vec!["customer_id", "phone_number"])
        );
    }

    #[test]
    fn validate_request_accepts_missing_phone() {
        let check = EventDetailsCheck::try_from(EventDetailsRequest {
            company_id: Some(1),
            event_name: Some("Smith Wedding".into()),
            phone_number: None,
        })
        .unwrap();
        assert_eq!(check.phone_number, None);
    }
}

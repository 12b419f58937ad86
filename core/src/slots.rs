//! Per-hall time slot catalogs.
//!
//! A company lists, for each of its halls, the time slots it sells (for
//! example `"10:00 AM - 2:00 PM"`). Each user's catalog is replaced as a whole
//! on every update, and no hall may carry more than [`MAX_SLOTS_PER_HALL`]
//! slots.

use crate::de::{self, Required};
use crate::error::{BanquetError, Result};
use crate::ids::CompanyId;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Upper bound on catalogued slots per hall.
pub const MAX_SLOTS_PER_HALL: usize = 4;

/// Slots keyed by hall name.
pub type SlotMap = BTreeMap<String, Vec<String>>;

/// Replacement payload as sent by clients.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReplaceSlotsRequest {
    /// Owning company.
    #[serde(default, deserialize_with = "de::lenient_id")]
    pub company_id: Option<i64>,
    /// User whose catalog is replaced.
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub user_id: Option<String>,
    /// Raw slot lists per hall; `null` entries are ignored.
    #[serde(default)]
    pub banquet_slots: Option<BTreeMap<String, Vec<Option<String>>>>,
}

/// One catalog row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotEntry {
    /// Hall name.
    pub banquet_name: String,
    /// Trimmed slot label.
    pub time_slot: String,
}

/// A validated catalog replacement.
///
/// Construction trims every slot, discards blanks and enforces the per-hall
/// cap, so an instance never violates it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotReplacement {
    company_id: CompanyId,
    user_id: String,
    slots: SlotMap,
}

impl SlotReplacement {
    /// Validate raw per-hall slot lists.
    ///
    /// # Errors
    ///
    /// Returns [`BanquetError::CapacityExceeded`] for the first hall (by name)
    /// whose non-blank slot count exceeds [`MAX_SLOTS_PER_HALL`].
    pub fn new<I, S>(company_id: CompanyId, user_id: impl Into<String>, halls: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<S>)>,
        S: AsRef<str>,
    {
        let mut slots = SlotMap::new();
        for (hall, raw) in halls {
            let cleaned: Vec<String> = raw
                .iter()
                .map(|slot| slot.as_ref().trim())
                .filter(|slot| !slot.is_empty())
                .map(str::to_string)
                .collect();

            if cleaned.len() > MAX_SLOTS_PER_HALL {
                return Err(BanquetError::CapacityExceeded {
                    hall,
                    limit: MAX_SLOTS_PER_HALL,
                });
            }
            slots.entry(hall).or_default().extend(cleaned);
        }

        Ok(Self {
            company_id,
            user_id: user_id.into(),
            slots,
        })
    }

    /// Owning company.
    #[must_use]
    pub const fn company_id(&self) -> CompanyId {
        self.company_id
    }

    /// User whose catalog is replaced.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Cleaned slots per hall, including halls that may not be authorized.
    #[must_use]
    pub const fn slots(&self) -> &SlotMap {
        &self.slots
    }

    /// Rows to insert for halls in `authorized`, plus the names of halls that
    /// were dropped because the company never declared them.
    #[must_use]
    pub fn entries_for(&self, authorized: &[String]) -> (Vec<SlotEntry>, Vec<String>) {
        let mut entries = Vec::new();
        let mut dropped = Vec::new();

        for (hall, slots) in &self.slots {
            if !authorized.iter().any(|name| name == hall) {
                dropped.push(hall.clone());
                continue;
            }
            entries.extend(slots.iter().map(|slot| SlotEntry {
                banquet_name: hall.clone(),
                time_slot: slot.clone(),
            }));
        }

        (entries, dropped)
    }
}

impl TryFrom<ReplaceSlotsRequest> for SlotReplacement {
    type Error = BanquetError;

    fn try_from(req: ReplaceSlotsRequest) -> Result<Self> {
        let mut required = Required::default();
        let company_id = required.take("company_id", req.company_id);
        let user_id = required.text("user_id", req.user_id);
        let banquet_slots = required.take(
            "banquet_slots",
            req.banquet_slots.filter(|slots| !slots.is_empty()),
        );
        let (Some(company_id), Some(user_id), Some(banquet_slots)) =
            (company_id, user_id, banquet_slots)
        else {
            return Err(required.into_error());
        };

        let halls = banquet_slots
            .into_iter()
            .map(|(hall, slots)| (hall, slots.into_iter().flatten().collect::<Vec<String>>()));

        Self::new(CompanyId::new(company_id), user_id.trim(), halls)
    }
}

/// What a catalog replacement wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// Rows inserted after the delete.
    pub inserted: usize,
    /// Halls skipped because the company never declared them.
    pub dropped_halls: Vec<String>,
}

/// Check that `entries`, added to the slots other users of the company
/// already hold, keep every hall within [`MAX_SLOTS_PER_HALL`].
///
/// # Errors
///
/// Returns [`BanquetError::CapacityExceeded`] for the first hall (by name)
/// whose combined count is over the cap.
pub fn check_hall_capacity(
    entries: &[SlotEntry],
    held_by_others: &BTreeMap<String, usize>,
) -> Result<()> {
    let mut totals: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in entries {
        *totals.entry(entry.banquet_name.as_str()).or_default() += 1;
    }

    for (hall, count) in totals {
        let held = held_by_others.get(hall).copied().unwrap_or_default();
        if held + count > MAX_SLOTS_PER_HALL {
            return Err(BanquetError::CapacityExceeded {
                hall: hall.to_string(),
                limit: MAX_SLOTS_PER_HALL,
            });
        }
    }
    Ok(())
}

/// Group `(hall, slot)` rows into a [`SlotMap`], preserving row order.
pub fn group_slots<I>(rows: I) -> SlotMap
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut map = SlotMap::new();
    for (hall, slot) in rows {
        map.entry(hall).or_default().push(slot);
    }
    map
}

//! Slot catalog storage.

use crate::PostgresBanquetStore;
use crate::error::database;
use crate::tenant::lock_company;
use crate::transaction::with_transaction;
use banquet_core::error::Result;
use banquet_core::ids::CompanyId;
use banquet_core::providers::SlotCatalog;
use banquet_core::slots::{
    ReplaceOutcome, SlotMap, SlotReplacement, check_hall_capacity, group_slots,
};
use banquet_core::tenant::hall_names;
use std::collections::BTreeMap;

impl SlotCatalog for PostgresBanquetStore {
    async fn replace_slots(&self, replacement: SlotReplacement) -> Result<ReplaceOutcome> {
        let company_id = replacement.company_id();
        let user_id = replacement.user_id().to_string();

        let outcome = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let company = lock_company(&mut **tx, replacement.company_id()).await?;
                let (entries, dropped_halls) =
                    replacement.entries_for(&hall_names(&company.banquet_halls));

                let held: Vec<(String, i64)> = sqlx::query_as(
                    r"
                    SELECT banquet_name, COUNT(*)
                    FROM banquet_time_slots
                    WHERE company_id = $1 AND user_id <> $2
                    GROUP BY banquet_name
                    ",
                )
                .bind(replacement.company_id().get())
                .bind(replacement.user_id())
                .fetch_all(&mut **tx)
                .await
                .map_err(|e| database("Failed to count time slots", &e))?;
                let held_by_others: BTreeMap<String, usize> = held
                    .into_iter()
                    .map(|(hall, count)| (hall, usize::try_from(count).unwrap_or(usize::MAX)))
                    .collect();
                check_hall_capacity(&entries, &held_by_others)?;

                sqlx::query("DELETE FROM banquet_time_slots WHERE company_id = $1 AND user_id = $2")
                    .bind(replacement.company_id().get())
                    .bind(replacement.user_id())
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| database("Failed to clear time slots", &e))?;

                let (halls, slots): (Vec<String>, Vec<String>) = entries
                    .into_iter()
                    .map(|entry| (entry.banquet_name, entry.time_slot))
                    .unzip();

                if !halls.is_empty() {
                    sqlx::query(
                        r"
                        INSERT INTO banquet_time_slots (company_id, user_id, banquet_name, time_slot)
                        SELECT $1, $2, hall, slot
                        FROM UNNEST($3::text[], $4::text[]) WITH ORDINALITY AS t(hall, slot, n)
                        ORDER BY n
                        ",
                    )
                    .bind(replacement.company_id().get())
                    .bind(replacement.user_id())
                    .bind(&halls)
                    .bind(&slots)
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| database("Failed to insert time slots", &e))?;
                }

                Ok(ReplaceOutcome {
                    inserted: halls.len(),
                    dropped_halls,
                })
            })
        })
        .await?;

        if !outcome.dropped_halls.is_empty() {
            tracing::warn!(
                company_id = %company_id,
                user_id = %user_id,
                halls = ?outcome.dropped_halls,
                "Skipped time slots for undeclared halls"
            );
        }
        tracing::info!(
            company_id = %company_id,
            user_id = %user_id,
            inserted = outcome.inserted,
            "Time slots replaced"
        );
        metrics::counter!("banquet_slot_replacements_total").increment(1);

        Ok(outcome)
    }

    async fn get_slots(&self, company_id: CompanyId) -> Result<SlotMap> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r"
            SELECT banquet_name, time_slot
            FROM banquet_time_slots
            WHERE company_id = $1
            ORDER BY banquet_name, time_slot
            ",
        )
        .bind(company_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database("Failed to load time slots", &e))?;

        Ok(group_slots(rows))
    }
}

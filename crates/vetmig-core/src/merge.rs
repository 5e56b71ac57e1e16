//! Catalog join: attaches reference-sheet fields to primary records.

use std::collections::BTreeMap;

use tracing::debug;
use vetmig_ingest::SheetTable;
use vetmig_model::{
    MatchStatus, MergedRecord, MigrationError, Record, Result, TieBreakPolicy,
};

/// A catalog sheet indexed by join key.
///
/// Within one sheet the first row per key wins; duplicate keys inside a
/// catalog are a data-quality artifact, not an error.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub name: String,
    entries: BTreeMap<String, Record>,
}

impl Catalog {
    /// Indexes a catalog sheet by its join key column.
    pub fn from_sheet(table: &SheetTable, join_key: &str) -> Result<Self> {
        if table.column_index(join_key).is_none() {
            return Err(MigrationError::SchemaMismatch {
                sheet: table.name.clone(),
                column: join_key.to_string(),
            });
        }
        let mut entries = BTreeMap::new();
        for record in table.records() {
            let Some(key) = record.get(join_key) else {
                continue;
            };
            entries.entry(key.to_string()).or_insert(record);
        }
        Ok(Self {
            name: table.name.clone(),
            entries,
        })
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Joins primary records against the catalogs.
///
/// Every primary record survives: matched records carry the catalog's
/// fields, unmatched records pass through flagged `Unmatched`. When the
/// same key appears in several catalogs the tie-break policy picks the
/// winner. On column collisions the primary's non-empty value wins.
pub fn merge(
    primary: &SheetTable,
    catalogs: &[Catalog],
    join_key: &str,
    policy: TieBreakPolicy,
) -> Result<Vec<MergedRecord>> {
    if primary.column_index(join_key).is_none() {
        return Err(MigrationError::SchemaMismatch {
            sheet: primary.name.clone(),
            column: join_key.to_string(),
        });
    }

    let mut merged = Vec::with_capacity(primary.rows.len());
    let mut matched = 0usize;
    for record in primary.records() {
        let hit = record
            .get(join_key)
            .and_then(|key| resolve(catalogs, key, policy));
        match hit {
            Some((catalog_name, entry)) => {
                matched += 1;
                let mut combined = record;
                for (column, value) in &entry.fields {
                    let taken = combined.get(column).is_none();
                    if taken && !value.trim().is_empty() {
                        combined.set(column.clone(), value.clone());
                    }
                }
                merged.push(MergedRecord {
                    record: combined,
                    status: MatchStatus::Matched,
                    catalog: Some(catalog_name.to_string()),
                });
            }
            None => merged.push(MergedRecord {
                record,
                status: MatchStatus::Unmatched,
                catalog: None,
            }),
        }
    }

    debug!(
        sheet = %primary.name,
        total = merged.len(),
        matched,
        unmatched = merged.len() - matched,
        "catalog join complete"
    );
    Ok(merged)
}

fn resolve<'a>(
    catalogs: &'a [Catalog],
    key: &str,
    policy: TieBreakPolicy,
) -> Option<(&'a str, &'a Record)> {
    let mut hits = catalogs
        .iter()
        .filter_map(|catalog| catalog.get(key).map(|entry| (catalog.name.as_str(), entry)));
    match policy {
        TieBreakPolicy::FirstCatalog => hits.next(),
        TieBreakPolicy::LastCatalog => hits.last(),
    }
}

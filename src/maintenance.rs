// File: ./src/maintenance.rs
// Batch jobs run against a whole collection.
use crate::config::Config;
use crate::source::{RecordSource, RecordUpdate};
use anyhow::{Result, bail};
use std::collections::HashSet;

/// Deletes `field` from every record of `collection` that has it.
///
/// Records are read `batch_size` at a time, each page starting after the last
/// record of the previous one. Returns the number of records updated.
///
/// Cursor paging needs unique ids; a page that repeats an id already visited
/// aborts the job instead of paging forever.
pub fn remove_field<S>(source: &mut S, collection: &str, field: &str, batch_size: usize) -> Result<usize>
where
    S: RecordSource + ?Sized,
{
    if batch_size == 0 {
        bail!("Batch size must be positive");
    }

    let update = RecordUpdate::new().delete(field);
    let mut cursor: Option<String> = None;
    let mut seen: HashSet<String> = HashSet::new();
    let mut updated = 0;

    loop {
        let page = source.fetch_page(collection, cursor.as_deref(), batch_size)?;
        let Some(last) = page.last() else { break };
        cursor = Some(last.id.clone());

        for record in &page {
            if !seen.insert(record.id.clone()) {
                bail!(
                    "Duplicate record id '{}' in '{}'; cannot page past it",
                    record.id,
                    collection
                );
            }
        }

        for record in page.iter().filter(|r| r.fields.contains_key(field)) {
            source.update_record(collection, &record.id, &update)?;
            log::debug!("Removed '{}' from record {}", field, record.id);
            updated += 1;
        }
    }

    log::info!("Removed '{}' from {} records in '{}'", field, updated, collection);
    Ok(updated)
}

/// `remove_field` over the configured catalog collection, paged by `config.batch_size`.
pub fn remove_catalog_field<S>(source: &mut S, config: &Config, field: &str) -> Result<usize>
where
    S: RecordSource + ?Sized,
{
    remove_field(source, &config.catalog_collection, field, config.batch_size)
}

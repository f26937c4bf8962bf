// File: ./src/source.rs
//! Capabilities the core consumes from the data-access layer.
//!
//! The remote document store itself is out of scope; anything that can stream
//! the records of a collection, hand out a user's reminder specifications and
//! apply field updates can back the index and the scheduler.

use crate::model::{Payload, ReminderSpec, SourceRecord};
use anyhow::{Result, anyhow, bail};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Change applied to a single field of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Set(Value),
    Delete,
}

/// Field-level update of one record. Untouched fields are preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordUpdate {
    changes: BTreeMap<String, FieldChange>,
}

impl RecordUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: &str, value: Value) -> Self {
        self.changes
            .insert(field.to_string(), FieldChange::Set(value));
        self
    }

    pub fn delete(mut self, field: &str) -> Self {
        self.changes.insert(field.to_string(), FieldChange::Delete);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn apply_to(&self, fields: &mut Payload) {
        for (field, change) in &self.changes {
            match change {
                FieldChange::Set(value) => {
                    fields.insert(field.clone(), value.clone());
                }
                FieldChange::Delete => {
                    fields.remove(field);
                }
            }
        }
    }
}

pub trait RecordSource {
    /// Every record of `collection`, in the store's stream order.
    fn fetch_all_records(&self, collection: &str) -> Result<Vec<SourceRecord>>;

    /// Up to `limit` records following the record with id `after` (from the start when `None`).
    fn fetch_page(
        &self,
        collection: &str,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SourceRecord>> {
        let all = self.fetch_all_records(collection)?;
        let start = match after {
            None => 0,
            Some(id) => {
                all.iter()
                    .position(|r| r.id == id)
                    .ok_or_else(|| anyhow!("Cursor record '{}' not found in '{}'", id, collection))?
                    + 1
            }
        };
        Ok(all.into_iter().skip(start).take(limit).collect())
    }

    fn fetch_reminder_specs(&self, user: &str) -> Result<Vec<ReminderSpec>>;

    /// Applies `update` to an existing record. Unknown ids are an error.
    fn update_record(&mut self, collection: &str, id: &str, update: &RecordUpdate) -> Result<()>;

    fn add_reminder_spec(&mut self, user: &str, spec: ReminderSpec) -> Result<()>;
}

/// In-memory source; keeps records in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    collections: HashMap<String, Vec<SourceRecord>>,
    reminders: HashMap<String, Vec<ReminderSpec>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_record(&mut self, collection: &str, record: SourceRecord) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }

    pub fn with_records<I>(mut self, collection: &str, records: I) -> Self
    where
        I: IntoIterator<Item = SourceRecord>,
    {
        for record in records {
            self.push_record(collection, record);
        }
        self
    }

    pub fn with_reminders(mut self, user: &str, specs: Vec<ReminderSpec>) -> Self {
        self.reminders.insert(user.to_string(), specs);
        self
    }

    pub fn record(&self, collection: &str, id: &str) -> Option<&SourceRecord> {
        self.collections.get(collection)?.iter().find(|r| r.id == id)
    }
}

impl RecordSource for MemorySource {
    fn fetch_all_records(&self, collection: &str) -> Result<Vec<SourceRecord>> {
        Ok(self.collections.get(collection).cloned().unwrap_or_default())
    }

    fn fetch_reminder_specs(&self, user: &str) -> Result<Vec<ReminderSpec>> {
        Ok(self.reminders.get(user).cloned().unwrap_or_default())
    }

    fn update_record(&mut self, collection: &str, id: &str, update: &RecordUpdate) -> Result<()> {
        let Some(record) = self
            .collections
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
        else {
            bail!("Record '{}' not found in '{}'", id, collection);
        };
        update.apply_to(&mut record.fields);
        Ok(())
    }

    fn add_reminder_spec(&mut self, user: &str, spec: ReminderSpec) -> Result<()> {
        self.reminders.entry(user.to_string()).or_default().push(spec);
        Ok(())
    }
}

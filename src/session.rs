// File: src/session.rs
//! Query facade over the catalog index and the reminder queue.
//! Callers go through here: it normalizes product names before lookups and
//! reads the clock before loading reminders. Pricing and stock changes do not
//! belong here.
use crate::catalog_index::{BuildReport, CatalogIndex};
use crate::config::Config;
use crate::model::{Payload, ReminderEvent, ReminderSpec, normalize_key};
use crate::reminder_queue::ReminderQueue;
use crate::source::RecordSource;
use anyhow::Result;
use chrono::{Local, NaiveDateTime};

/// One user's session. Owns both structures; nothing is shared between sessions.
#[derive(Debug, Default)]
pub struct GrocerySession {
    config: Config,
    catalog: CatalogIndex,
    reminders: ReminderQueue,
}

impl GrocerySession {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            catalog: CatalogIndex::new(),
            reminders: ReminderQueue::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }

    pub fn reminders(&self) -> &ReminderQueue {
        &self.reminders
    }

    /// Rebuilds the catalog index from the configured collection.
    ///
    /// Records are inserted in the order the source streams them. Records whose
    /// name field is missing or not a string are skipped.
    pub fn build_catalog<S>(&mut self, source: &S) -> Result<BuildReport>
    where
        S: RecordSource + ?Sized,
    {
        let collection = &self.config.catalog_collection;
        let name_field = &self.config.name_field;
        let records = source.fetch_all_records(collection)?;

        let mut skipped = 0;
        let catalog_records = records
            .iter()
            .filter_map(|record| {
                let catalog = record.to_catalog_record(name_field);
                if catalog.is_none() {
                    log::warn!(
                        "Skipping record {} in '{}': no string field '{}'",
                        record.id,
                        collection,
                        name_field
                    );
                    skipped += 1;
                }
                catalog
            })
            .collect::<Vec<_>>();

        let (index, mut report) = CatalogIndex::from_records(catalog_records);
        report.skipped = skipped;
        self.catalog = index;

        log::info!(
            "Catalog '{}' indexed: {} products, {} duplicates, {} skipped",
            collection,
            report.inserted,
            report.duplicates,
            report.skipped
        );
        Ok(report)
    }

    /// Exact lookup by product name; case and surrounding whitespace are ignored.
    pub fn lookup_product(&self, name: &str) -> Option<&Payload> {
        self.catalog.search(&normalize_key(name))
    }

    /// Reloads the configured user's reminders against the current local time.
    pub fn refresh_reminders<S>(&mut self, source: &S) -> Result<usize>
    where
        S: RecordSource + ?Sized,
    {
        self.refresh_reminders_at(source, Local::now().naive_local())
    }

    pub fn refresh_reminders_at<S>(&mut self, source: &S, now: NaiveDateTime) -> Result<usize>
    where
        S: RecordSource + ?Sized,
    {
        let specs = source.fetch_reminder_specs(&self.config.user_id)?;
        let added = self
            .reminders
            .reload(&specs, now, self.config.reload_policy)?
            .len();
        log::info!(
            "Reminders for '{}' reloaded ({}): {} queued",
            self.config.user_id,
            self.config.reload_policy,
            self.reminders.len()
        );
        Ok(added)
    }

    /// Stores a new reminder spec for the configured user, then reloads.
    /// The spec is validated before anything is written.
    pub fn add_reminder<S>(&mut self, source: &mut S, spec: ReminderSpec) -> Result<usize>
    where
        S: RecordSource + ?Sized,
    {
        self.add_reminder_at(source, spec, Local::now().naive_local())
    }

    pub fn add_reminder_at<S>(
        &mut self,
        source: &mut S,
        spec: ReminderSpec,
        now: NaiveDateTime,
    ) -> Result<usize>
    where
        S: RecordSource + ?Sized,
    {
        spec.parse_times()?;
        log::info!("Adding reminder '{}' for '{}'", spec.name, self.config.user_id);
        source.add_reminder_spec(&self.config.user_id, spec)?;
        self.refresh_reminders_at(source, now)
    }

    /// Upcoming reminders, earliest first. Does not consume anything.
    pub fn list_upcoming_reminders(&self) -> Vec<ReminderEvent> {
        self.reminders.peek_all()
    }

    /// Removes and returns the earliest reminder, `None` when nothing is queued.
    pub fn take_next_reminder(&mut self) -> Option<ReminderEvent> {
        let next = self.reminders.pop_next();
        match &next {
            Some(event) => log::debug!("Next reminder: {}", event),
            None => log::debug!("No reminders queued"),
        }
        next
    }
}

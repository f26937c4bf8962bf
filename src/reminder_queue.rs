// File: ./src/reminder_queue.rs
// Time-ordered queue of upcoming medicine reminders.
//
// Events are derived from reminder specifications: every listed time-of-day is
// resolved to its next future occurrence and pushed onto a binary min-heap keyed
// by due time. Popping removes the earliest event; popped events are never
// re-inserted here, the next occurrence appears on a later reload.
use crate::model::{ReminderEvent, ReminderSpec, TimeSpecError, resolve_due};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use strum::{Display, EnumIter};

/// What a reload does with events already queued.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReloadPolicy {
    /// Discard queued events, then load.
    #[default]
    Replace,
    /// Keep queued events; reloading the same specs queues duplicates.
    Accumulate,
}

#[derive(Debug, Clone)]
struct QueuedEvent {
    due_at: NaiveDateTime,
    // Insertion counter; breaks ties between identical due times.
    seq: u64,
    label: String,
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due_at
            .cmp(&other.due_at)
            .then(self.seq.cmp(&other.seq))
    }
}

impl From<QueuedEvent> for ReminderEvent {
    fn from(q: QueuedEvent) -> Self {
        ReminderEvent::new(q.due_at, q.label)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReminderQueue {
    heap: BinaryHeap<Reverse<QueuedEvent>>,
    next_seq: u64,
}

impl ReminderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one event. O(log n).
    pub fn schedule(&mut self, event: ReminderEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(QueuedEvent {
            due_at: event.due_at,
            seq,
            label: event.label,
        }));
    }

    /// Resolves every time-of-day of every spec against `now` and queues the result.
    ///
    /// Existing events are kept. All specs are validated before anything is queued,
    /// so a malformed time leaves the queue unchanged. Returns the events added, in
    /// the order they were queued.
    pub fn load(
        &mut self,
        specs: &[ReminderSpec],
        now: NaiveDateTime,
    ) -> Result<Vec<ReminderEvent>, TimeSpecError> {
        let parsed = specs
            .iter()
            .map(|spec| spec.parse_times().map(|times| (spec, times)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut added = Vec::new();
        for (spec, times) in parsed {
            for time in times {
                let event = ReminderEvent::new(resolve_due(time, now), spec.name.clone());
                self.schedule(event.clone());
                added.push(event);
            }
        }
        log::debug!("reminder queue: loaded {} events from {} specs", added.len(), specs.len());
        Ok(added)
    }

    /// `load` preceded by whatever `policy` says to do with the current contents.
    pub fn reload(
        &mut self,
        specs: &[ReminderSpec],
        now: NaiveDateTime,
        policy: ReloadPolicy,
    ) -> Result<Vec<ReminderEvent>, TimeSpecError> {
        // Validate first so a bad spec does not wipe the queue under Replace.
        for spec in specs {
            spec.parse_times()?;
        }
        if policy == ReloadPolicy::Replace {
            self.clear();
        }
        self.load(specs, now)
    }

    /// Removes and returns the earliest event, or `None` when the queue is empty.
    pub fn pop_next(&mut self) -> Option<ReminderEvent> {
        self.heap.pop().map(|Reverse(q)| q.into())
    }

    pub fn peek_next(&self) -> Option<ReminderEvent> {
        self.heap.peek().map(|Reverse(q)| q.clone().into())
    }

    /// All queued events ascending by due time (ties in insertion order).
    /// Sorts a snapshot; the heap itself is not modified.
    pub fn peek_all(&self) -> Vec<ReminderEvent> {
        let mut snapshot: Vec<QueuedEvent> = self.heap.iter().map(|Reverse(q)| q.clone()).collect();
        snapshot.sort();
        snapshot.into_iter().map(ReminderEvent::from).collect()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

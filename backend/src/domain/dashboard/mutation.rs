//! Bounded log of optimistic mutations and their outcomes.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::records::Collection;

/// Number of mutation records retained.
pub const MUTATION_LOG_CAPACITY: usize = 100;

/// Whether a mutation inserted or modified an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationKind {
    Create,
    Update,
}

/// Lifecycle of one mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationState {
    /// Applied locally; the CRM write is in flight.
    Pending,
    /// The CRM accepted the write.
    Committed,
    /// The CRM write failed and the local change was rolled back.
    Failed,
}

/// One tracked mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationRecord {
    pub sequence: u64,
    pub collection: Collection,
    pub kind: MutationKind,
    /// Entity id at staging time; a local id for creates.
    pub entity_id: String,
    /// Id assigned by the CRM once a create commits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crm_id: Option<String>,
    pub state: MutationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub staged_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<DateTime<Utc>>,
}

/// Ring buffer of the most recent mutations, newest last.
#[derive(Debug, Default)]
pub(super) struct MutationLog {
    next_sequence: u64,
    records: VecDeque<MutationRecord>,
}

impl MutationLog {
    pub(super) fn stage(
        &mut self,
        collection: Collection,
        kind: MutationKind,
        entity_id: &str,
        now: DateTime<Utc>,
    ) -> u64 {
        self.next_sequence += 1;
        let sequence = self.next_sequence;
        if self.records.len() == MUTATION_LOG_CAPACITY {
            self.records.pop_front();
        }
        self.records.push_back(MutationRecord {
            sequence,
            collection,
            kind,
            entity_id: entity_id.to_owned(),
            crm_id: None,
            state: MutationState::Pending,
            error: None,
            staged_at: now,
            settled_at: None,
        });
        sequence
    }

    pub(super) fn commit(&mut self, sequence: u64, crm_id: Option<String>, now: DateTime<Utc>) {
        if let Some(record) = self.find_mut(sequence) {
            record.state = MutationState::Committed;
            record.crm_id = crm_id;
            record.settled_at = Some(now);
        }
    }

    pub(super) fn fail(&mut self, sequence: u64, error: String, now: DateTime<Utc>) {
        if let Some(record) = self.find_mut(sequence) {
            record.state = MutationState::Failed;
            record.error = Some(error);
            record.settled_at = Some(now);
        }
    }

    /// Newest first.
    pub(super) fn recent(&self) -> Vec<MutationRecord> {
        self.records.iter().rev().cloned().collect()
    }

    fn find_mut(&mut self, sequence: u64) -> Option<&mut MutationRecord> {
        self.records
            .iter_mut()
            .rev()
            .find(|record| record.sequence == sequence)
    }
}

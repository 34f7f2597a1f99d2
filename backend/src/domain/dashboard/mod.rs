//! Dashboard aggregation over the CRM.
//!
//! [`DashboardService`] owns the last known state of every record collection.
//! A refresh fetches all seven collections concurrently; each fetch has its
//! own failure boundary, so a failed collection keeps its previous contents
//! while the others update. Mutations are applied to the local snapshot
//! before the CRM write starts, tracked in a bounded mutation log, and rolled
//! back when the write fails.
//!
//! Locks are `std::sync` and are never held across an `.await`. A poll that
//! resolves after an optimistic write overwrites it; the next reconcile
//! brings both back in line.

mod mutation;
mod summary;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

pub use mutation::{MUTATION_LOG_CAPACITY, MutationKind, MutationRecord, MutationState};
pub use summary::DashboardSummary;

use self::mutation::MutationLog;
use super::ports::{CrmError, CrmGateway};
use super::records::{
    AlertPatch, AlertStatus, AudioLog, Collection, CrmEntity, CrmWritable, FaceLog, Guest,
    GuestPatch, GuestStatus, LinenPatch, LinenStatus, LinenStock, NewAlert, NewGuest, NewLinen,
    Room, RoomPatch, SecurityAlert, Staff, map_records,
};
use super::{Error, ObjectName, RecordId};

/// Whether the last refresh reached the CRM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    /// The CRM answered at least one fetch of the last refresh.
    pub connected: bool,
    /// First failure of the last refresh, if any.
    pub last_error: Option<String>,
    /// Completion time of the last refresh that fetched anything.
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Everything the dashboard pages render.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub guests: Vec<Guest>,
    pub staff: Vec<Staff>,
    pub rooms: Vec<Room>,
    pub face_logs: Vec<FaceLog>,
    pub alerts: Vec<SecurityAlert>,
    pub audio_logs: Vec<AudioLog>,
    pub linen: Vec<LinenStock>,
    pub connection: ConnectionStatus,
}

/// Result of one collection fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum RefreshOutcome {
    /// The collection was replaced with `count` records.
    Refreshed { count: usize },
    /// The fetch failed; the previous contents were kept.
    Failed { reason: String },
}

/// Per-collection entry of a [`RefreshReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRefresh {
    pub collection: Collection,
    #[serde(flatten)]
    pub outcome: RefreshOutcome,
}

/// Outcome of [`DashboardService::refresh_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub finished_at: DateTime<Utc>,
    pub collections: Vec<CollectionRefresh>,
}

impl RefreshReport {
    /// Number of collections that failed.
    pub fn failed(&self) -> usize {
        self.collections
            .iter()
            .filter(|entry| matches!(entry.outcome, RefreshOutcome::Failed { .. }))
            .count()
    }

    /// Whether every collection failed, i.e. the CRM was unreachable.
    pub fn all_failed(&self) -> bool {
        self.failed() == self.collections.len()
    }
}

/// An entity the dashboard mutates optimistically.
trait Tracked: CrmWritable + Clone {
    const COLLECTION: Collection;
    /// Singular noun used in error messages.
    const NOUN: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn slot(snapshot: &mut DashboardSnapshot) -> &mut Vec<Self>;
}

macro_rules! tracked {
    ($entity:ty, $collection:ident, $noun:literal, $field:ident) => {
        impl Tracked for $entity {
            const COLLECTION: Collection = Collection::$collection;
            const NOUN: &'static str = $noun;

            fn id(&self) -> &str {
                self.id.as_str()
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }

            fn slot(snapshot: &mut DashboardSnapshot) -> &mut Vec<Self> {
                &mut snapshot.$field
            }
        }
    };
}

tracked!(Guest, Guests, "guest", guests);
tracked!(SecurityAlert, Alerts, "alert", alerts);
tracked!(Room, Rooms, "room", rooms);
tracked!(LinenStock, Linen, "linen item", linen);

/// Aggregates CRM collections and applies optimistic mutations.
pub struct DashboardService {
    crm: Arc<dyn CrmGateway>,
    clock: Arc<dyn Clock>,
    snapshot: RwLock<DashboardSnapshot>,
    mutations: Mutex<MutationLog>,
    reconcile: Notify,
}

impl DashboardService {
    /// Build a service with an empty, disconnected snapshot.
    pub fn new(crm: Arc<dyn CrmGateway>, clock: Arc<dyn Clock>) -> Self {
        Self {
            crm,
            clock,
            snapshot: RwLock::new(DashboardSnapshot::default()),
            mutations: Mutex::new(MutationLog::default()),
            reconcile: Notify::new(),
        }
    }

    /// Clone of the current snapshot.
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.read_snapshot().clone()
    }

    /// Project part of the snapshot without cloning the rest.
    pub fn read<R>(&self, project: impl FnOnce(&DashboardSnapshot) -> R) -> R {
        project(&self.read_snapshot())
    }

    /// Owner-overview counters.
    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary::compute(&self.read_snapshot(), self.clock.utc())
    }

    /// Most recent mutation records, newest first.
    pub fn mutations(&self) -> Vec<MutationRecord> {
        self.lock_mutations().recent()
    }

    /// Ask the poller for a full re-fetch.
    pub fn request_reconcile(&self) {
        self.reconcile.notify_one();
    }

    /// Resolve once a reconcile has been requested.
    pub async fn reconcile_requested(&self) {
        self.reconcile.notified().await;
    }

    /// Fetch every collection and merge the results into the snapshot.
    pub async fn refresh_all(&self) -> RefreshReport {
        let (guests, staff, rooms, face_logs, alerts, audio_logs, linen) = tokio::join!(
            self.fetch::<Guest>(),
            self.fetch::<Staff>(),
            self.fetch::<Room>(),
            self.fetch::<FaceLog>(),
            self.fetch::<SecurityAlert>(),
            self.fetch::<AudioLog>(),
            self.fetch::<LinenStock>(),
        );

        let finished_at = self.clock.utc();
        let mut collections = Vec::with_capacity(Collection::ALL.len());
        let mut first_error = None;
        let mut unreachable = 0;
        {
            let mut snapshot = self.write_snapshot();
            let mut merge = |collection: Collection, outcome: Result<usize, CrmError>| {
                let outcome = match outcome {
                    Ok(count) => RefreshOutcome::Refreshed { count },
                    Err(error) => {
                        warn!(%collection, %error, "collection refresh failed; keeping previous state");
                        if error.is_unreachable() {
                            unreachable += 1;
                        }
                        let reason = error.to_string();
                        first_error.get_or_insert_with(|| reason.clone());
                        RefreshOutcome::Failed { reason }
                    }
                };
                collections.push(CollectionRefresh {
                    collection,
                    outcome,
                });
            };
            merge(Collection::Guests, replace(&mut snapshot.guests, guests));
            merge(Collection::Staff, replace(&mut snapshot.staff, staff));
            merge(Collection::Rooms, replace(&mut snapshot.rooms, rooms));
            merge(Collection::FaceLogs, replace(&mut snapshot.face_logs, face_logs));
            merge(Collection::Alerts, replace(&mut snapshot.alerts, alerts));
            merge(Collection::AudioLogs, replace(&mut snapshot.audio_logs, audio_logs));
            merge(Collection::Linen, replace(&mut snapshot.linen, linen));

            let report = RefreshReport {
                finished_at,
                collections,
            };
            // Rejections still prove the org answered; only a cycle lost
            // entirely to transport or auth failures means disconnected.
            let connected = unreachable < Collection::ALL.len();
            snapshot.connection.connected = connected;
            snapshot.connection.last_error = first_error;
            if !report.all_failed() {
                snapshot.connection.last_synced_at = Some(finished_at);
            }
            info!(
                failed = report.failed(),
                connected, "dashboard refresh finished"
            );
            report
        }
    }

    /// Check in a new guest.
    ///
    /// # Errors
    /// Returns the mapped CRM error after rolling the insert back.
    pub async fn add_guest(&self, draft: NewGuest) -> Result<Guest, Error> {
        let now = self.clock.utc();
        self.create("G", |id| {
            let mut guest = Guest {
                id,
                name: draft.name,
                room_number: draft.room_number,
                check_in: None,
                check_out: None,
                status: GuestStatus::NotArrived,
            };
            guest.set_status(draft.status.unwrap_or(GuestStatus::CheckedIn), now);
            guest
        })
        .await
    }

    /// Patch a guest; status changes stamp check-in/out times.
    ///
    /// # Errors
    /// `not_found` for unknown ids, `invalid_request` for records not yet
    /// saved, or the mapped CRM error after rolling back.
    pub async fn update_guest(&self, id: &str, patch: GuestPatch) -> Result<Guest, Error> {
        self.update(id, |guest: &mut Guest, now| {
            if let Some(name) = patch.name {
                guest.name = name;
            }
            if let Some(room_number) = patch.room_number {
                guest.room_number = Some(room_number);
            }
            if let Some(status) = patch.status {
                guest.set_status(status, now);
            }
        })
        .await
    }

    /// Raise an alert; new alerts start open.
    ///
    /// # Errors
    /// Returns the mapped CRM error after rolling the insert back.
    pub async fn add_alert(&self, draft: NewAlert) -> Result<SecurityAlert, Error> {
        let now = self.clock.utc();
        self.create("A", |id| SecurityAlert {
            id,
            alert_type: draft.alert_type,
            status: AlertStatus::Open,
            assigned_to: draft.assigned_to,
            comments: draft.comments,
            room_id: draft.room_id,
            raised_at: Some(now),
        })
        .await
    }

    /// Patch an alert. Any status may follow any other.
    ///
    /// # Errors
    /// See [`DashboardService::update_guest`].
    pub async fn update_alert(&self, id: &str, patch: AlertPatch) -> Result<SecurityAlert, Error> {
        self.update(id, |alert: &mut SecurityAlert, _| {
            if let Some(status) = patch.status {
                alert.status = status;
            }
            if let Some(assigned_to) = patch.assigned_to {
                alert.assigned_to = Some(assigned_to);
            }
            if let Some(comments) = patch.comments {
                alert.comments = Some(comments);
            }
        })
        .await
    }

    /// Patch a room's status or guest reference.
    ///
    /// # Errors
    /// See [`DashboardService::update_guest`].
    pub async fn update_room(&self, id: &str, patch: RoomPatch) -> Result<Room, Error> {
        self.update(id, |room: &mut Room, _| {
            if let Some(status) = patch.status {
                room.status = status;
            }
            if let Some(guest_id) = patch.guest_id {
                room.guest_id = Some(guest_id).filter(|value| !value.is_empty());
            }
        })
        .await
    }

    /// Issue a linen item; the issue date defaults to today.
    ///
    /// # Errors
    /// Returns the mapped CRM error after rolling the insert back.
    pub async fn add_linen(&self, draft: NewLinen) -> Result<LinenStock, Error> {
        let today = self.clock.utc().date_naive();
        self.create("L", |id| LinenStock {
            id,
            linen_type: draft.linen_type,
            room_id: draft.room_id,
            status: draft.status.unwrap_or(LinenStatus::Issued),
            issued_on: Some(draft.issued_on.unwrap_or(today)),
            returned_on: None,
        })
        .await
    }

    /// Patch a linen item; marking it returned stamps today's date.
    ///
    /// # Errors
    /// See [`DashboardService::update_guest`].
    pub async fn update_linen(&self, id: &str, patch: LinenPatch) -> Result<LinenStock, Error> {
        self.update(id, |item: &mut LinenStock, now| {
            if let Some(room_id) = patch.room_id {
                item.room_id = Some(room_id);
            }
            if let Some(returned_on) = patch.returned_on {
                item.returned_on = Some(returned_on);
            }
            if let Some(status) = patch.status {
                item.status = status;
                if status == LinenStatus::Returned && item.returned_on.is_none() {
                    item.returned_on = Some(now.date_naive());
                }
            }
        })
        .await
    }

    async fn fetch<T: CrmEntity>(&self) -> Result<Vec<T>, CrmError> {
        match self.crm.query(&T::soql()).await {
            Ok(records) => Ok(map_records(&records)),
            Err(error) if error.is_missing_object() => {
                debug!(object = T::OBJECT, %error, "CRM object not provisioned; treating as empty");
                Ok(Vec::new())
            }
            Err(error) => Err(error),
        }
    }

    async fn create<T: Tracked>(
        &self,
        prefix: &str,
        build: impl FnOnce(String) -> T,
    ) -> Result<T, Error> {
        let object = ObjectName::new(T::OBJECT)?;
        let now = self.clock.utc();
        let entity = {
            let mut snapshot = self.write_snapshot();
            let slot = T::slot(&mut snapshot);
            let entity = build(local_id(prefix, now, slot));
            slot.insert(0, entity.clone());
            entity
        };
        let local_id = entity.id().to_owned();
        let sequence = self
            .lock_mutations()
            .stage(T::COLLECTION, MutationKind::Create, &local_id, now);
        debug!(collection = %T::COLLECTION, id = %local_id, "optimistic insert staged");

        match self.crm.create(&object, &entity.to_fields()).await {
            Ok(record_id) => {
                let crm_id = record_id.into_inner();
                let mut committed = entity;
                committed.set_id(crm_id.clone());
                if let Some(slot_entry) = T::slot(&mut self.write_snapshot())
                    .iter_mut()
                    .find(|candidate| candidate.id() == local_id)
                {
                    slot_entry.set_id(crm_id.clone());
                }
                self.lock_mutations()
                    .commit(sequence, Some(crm_id.clone()), self.clock.utc());
                info!(collection = %T::COLLECTION, %local_id, %crm_id, "CRM create committed");
                self.request_reconcile();
                Ok(committed)
            }
            Err(error) => {
                T::slot(&mut self.write_snapshot()).retain(|candidate| candidate.id() != local_id);
                self.lock_mutations()
                    .fail(sequence, error.to_string(), self.clock.utc());
                warn!(collection = %T::COLLECTION, %local_id, %error, "CRM create failed; insert rolled back");
                Err(error.into())
            }
        }
    }

    async fn update<T: Tracked>(
        &self,
        id: &str,
        apply: impl FnOnce(&mut T, DateTime<Utc>),
    ) -> Result<T, Error> {
        let object = ObjectName::new(T::OBJECT)?;
        let now = self.clock.utc();
        let (record_id, previous, updated) = {
            let mut snapshot = self.write_snapshot();
            let Some(entity) = T::slot(&mut snapshot)
                .iter_mut()
                .find(|candidate| candidate.id() == id)
            else {
                return Err(Error::not_found(format!("{} {id} not found", T::NOUN)));
            };
            let record_id = RecordId::new(id).map_err(|_| {
                Error::invalid_request(format!("{} {id} is not yet saved to the CRM", T::NOUN))
            })?;
            let previous = entity.clone();
            apply(entity, now);
            (record_id, previous, entity.clone())
        };
        let sequence = self
            .lock_mutations()
            .stage(T::COLLECTION, MutationKind::Update, id, now);
        debug!(collection = %T::COLLECTION, id, "optimistic update staged");

        match self.crm.update(&object, &record_id, &updated.to_fields()).await {
            Ok(()) => {
                self.lock_mutations().commit(sequence, None, self.clock.utc());
                info!(collection = %T::COLLECTION, id, "CRM update committed");
                self.request_reconcile();
                Ok(updated)
            }
            Err(error) => {
                if let Some(entity) = T::slot(&mut self.write_snapshot())
                    .iter_mut()
                    .find(|candidate| candidate.id() == id)
                {
                    *entity = previous;
                }
                self.lock_mutations()
                    .fail(sequence, error.to_string(), self.clock.utc());
                warn!(collection = %T::COLLECTION, id, %error, "CRM update failed; change rolled back");
                Err(error.into())
            }
        }
    }

    fn read_snapshot(&self) -> RwLockReadGuard<'_, DashboardSnapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_snapshot(&self) -> RwLockWriteGuard<'_, DashboardSnapshot> {
        self.snapshot.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_mutations(&self) -> MutexGuard<'_, MutationLog> {
        self.mutations.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn replace<T>(slot: &mut Vec<T>, fetched: Result<Vec<T>, CrmError>) -> Result<usize, CrmError> {
    let fetched = fetched?;
    let count = fetched.len();
    *slot = fetched;
    Ok(count)
}

/// `{prefix}{millis}`, bumped until unique within the collection.
fn local_id<T: Tracked>(prefix: &str, now: DateTime<Utc>, existing: &[T]) -> String {
    let mut millis = now.timestamp_millis();
    loop {
        let candidate = format!("{prefix}{millis}");
        if existing.iter().all(|entity| entity.id() != candidate) {
            return candidate;
        }
        millis += 1;
    }
}

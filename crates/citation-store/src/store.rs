//! In-memory violation and citation records

use crate::document::CitationDocument;
use crate::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info};
use traffic_model::{ObjectClass, ViolationGeometry, ViolationKind};
use violation_engine::ViolationEvent;

/// Lifecycle status of a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationStatus {
    Open,
    Cited,
}

/// A recorded rule infraction pending citation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub id: u64,
    pub kind: ViolationKind,
    pub vehicle_class: Option<ObjectClass>,
    pub confidence: f32,
    pub geometry: ViolationGeometry,
    pub details: String,
    pub timestamp: DateTime<Utc>,
    pub status: ViolationStatus,
}

/// A finalized, priced record issued against exactly one violation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub id: u64,
    pub violation_id: u64,
    pub kind: ViolationKind,
    /// Fixed at issue time from the rate table
    pub amount: u32,
    pub vehicle_info: String,
    pub details: String,
    pub issued_at: DateTime<Utc>,
}

/// Monetary amount per violation kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    pub rates: HashMap<ViolationKind, u32>,
}

impl RateTable {
    /// Every built-in kind must have a rate; checked at startup so
    /// [`StoreError::MissingRate`] cannot occur at runtime
    pub fn validate(&self) -> Result<(), StoreError> {
        for kind in ViolationKind::ALL {
            if !self.rates.contains_key(&kind) {
                return Err(StoreError::MissingRate(kind));
            }
        }
        Ok(())
    }

    pub fn amount_for(&self, kind: ViolationKind) -> Result<u32, StoreError> {
        self.rates
            .get(&kind)
            .copied()
            .ok_or(StoreError::MissingRate(kind))
    }
}

impl Default for RateTable {
    fn default() -> Self {
        let mut rates = HashMap::new();
        rates.insert(ViolationKind::LaneTermination, 500);
        rates.insert(ViolationKind::NoHelmet, 1000);
        // Informational; any fine is set separately
        rates.insert(ViolationKind::AccidentOverlap, 0);
        Self { rates }
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    violations: Vec<ViolationRecord>,
    citations: Vec<Citation>,
    next_violation_id: u64,
    next_citation_id: u64,
}

/// Canonical violation + citation store.
///
/// Interior mutex: safe to share behind an `Arc` between frame producers
/// and API readers. Records are never deleted within the process lifetime.
pub struct CitationStore {
    inner: Mutex<StoreInner>,
    rates: RateTable,
}

impl CitationStore {
    pub fn new(rates: RateTable) -> Result<Self, StoreError> {
        rates.validate()?;
        info!("Creating in-memory citation store");
        Ok(Self {
            inner: Mutex::new(StoreInner {
                next_violation_id: 1,
                next_citation_id: 1,
                ..Default::default()
            }),
            rates,
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreInner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Append one violation, assigning the next monotonic id
    pub fn append_violation(&self, event: ViolationEvent) -> Result<u64, StoreError> {
        let mut inner = self.lock()?;
        let id = inner.next_violation_id;
        inner.next_violation_id += 1;

        inner.violations.push(ViolationRecord {
            id,
            kind: event.kind,
            vehicle_class: event.vehicle_class,
            confidence: event.confidence,
            geometry: event.geometry,
            details: event.details,
            timestamp: event.timestamp,
            status: ViolationStatus::Open,
        });

        debug!(id, kind = %event.kind, "Recorded violation");
        Ok(id)
    }

    /// Append a batch of events under one lock, preserving their order
    pub fn append_events(
        &self,
        events: impl IntoIterator<Item = ViolationEvent>,
    ) -> Result<Vec<u64>, StoreError> {
        let mut inner = self.lock()?;
        let mut ids = Vec::new();
        for event in events {
            let id = inner.next_violation_id;
            inner.next_violation_id += 1;
            inner.violations.push(ViolationRecord {
                id,
                kind: event.kind,
                vehicle_class: event.vehicle_class,
                confidence: event.confidence,
                geometry: event.geometry,
                details: event.details,
                timestamp: event.timestamp,
                status: ViolationStatus::Open,
            });
            ids.push(id);
        }
        Ok(ids)
    }

    /// Recent violations, most recent first; `None` returns all
    pub fn list_violations(&self, limit: Option<usize>) -> Result<Vec<ViolationRecord>, StoreError> {
        let inner = self.lock()?;
        let iter = inner.violations.iter().rev().cloned();
        Ok(match limit {
            Some(n) => iter.take(n).collect(),
            None => iter.collect(),
        })
    }

    pub fn violation_count(&self) -> usize {
        self.inner.lock().map(|i| i.violations.len()).unwrap_or(0)
    }

    /// Issue a citation for an open violation.
    ///
    /// Fails with `NotFound` for unknown ids and `AlreadyCited` on a double
    /// issue; neither failure changes any state.
    pub fn issue_citation(&self, violation_id: u64) -> Result<Citation, StoreError> {
        let mut inner = self.lock()?;

        let violation = inner
            .violations
            .iter_mut()
            .find(|v| v.id == violation_id)
            .ok_or(StoreError::NotFound(violation_id))?;

        if violation.status == ViolationStatus::Cited {
            return Err(StoreError::AlreadyCited(violation_id));
        }

        let amount = self.rates.amount_for(violation.kind)?;
        violation.status = ViolationStatus::Cited;

        let vehicle_info = violation
            .vehicle_class
            .map(|c| c.label().to_string())
            .unwrap_or_else(|| "multiple vehicles".to_string());
        let kind = violation.kind;
        let details = violation.details.clone();

        let id = inner.next_citation_id;
        inner.next_citation_id += 1;

        let citation = Citation {
            id,
            violation_id,
            kind,
            amount,
            vehicle_info,
            details,
            issued_at: Utc::now(),
        };
        inner.citations.push(citation.clone());

        info!(citation = id, violation = violation_id, amount, "Issued citation");
        Ok(citation)
    }

    /// Issued citations, most recent first
    pub fn list_citations(&self) -> Result<Vec<Citation>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.citations.iter().rev().cloned().collect())
    }

    pub fn citation_count(&self) -> usize {
        self.inner.lock().map(|i| i.citations.len()).unwrap_or(0)
    }

    /// True iff any open accident-overlap violation is newer than `cutoff`
    pub fn has_open_accident_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.inner
            .lock()
            .map(|inner| {
                inner.violations.iter().any(|v| {
                    v.kind == ViolationKind::AccidentOverlap
                        && v.status == ViolationStatus::Open
                        && v.timestamp >= cutoff
                })
            })
            .unwrap_or(false)
    }

    /// Assemble the document payload for a citation.
    ///
    /// Returns a private copy so the caller can render outside any store
    /// lock; rendering itself is the renderer's concern.
    pub fn document_payload(&self, citation_id: u64) -> Result<CitationDocument, StoreError> {
        let inner = self.lock()?;
        let citation = inner
            .citations
            .iter()
            .find(|c| c.id == citation_id)
            .ok_or(StoreError::NotFound(citation_id))?;

        let geometry = inner
            .violations
            .iter()
            .find(|v| v.id == citation.violation_id)
            .map(|v| v.geometry);

        Ok(CitationDocument {
            citation_id: citation.id,
            violation_id: citation.violation_id,
            kind: citation.kind,
            amount: citation.amount,
            vehicle_info: citation.vehicle_info.clone(),
            details: citation.details.clone(),
            issued_at: citation.issued_at,
            geometry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use traffic_model::BoundingBox;

    fn event(kind: ViolationKind) -> ViolationEvent {
        ViolationEvent {
            kind,
            geometry: ViolationGeometry::Single {
                bbox: BoundingBox::new(0.4, 0.1, 0.6, 0.2),
            },
            vehicle_class: Some(ObjectClass::Car),
            confidence: 0.9,
            details: "test violation".to_string(),
            timestamp: Utc::now(),
        }
    }

    fn store() -> CitationStore {
        CitationStore::new(RateTable::default()).unwrap()
    }

    #[test]
    fn test_ids_are_monotonic() {
        let store = store();
        let a = store.append_violation(event(ViolationKind::LaneTermination)).unwrap();
        let b = store.append_violation(event(ViolationKind::NoHelmet)).unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[test]
    fn test_list_most_recent_first_with_limit() {
        let store = store();
        for _ in 0..5 {
            store
                .append_violation(event(ViolationKind::LaneTermination))
                .unwrap();
        }

        let limited = store.list_violations(Some(2)).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].id, 5);
        assert_eq!(limited[1].id, 4);

        let all = store.list_violations(None).unwrap();
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_batch_append_preserves_order() {
        let store = store();
        let ids = store
            .append_events(vec![
                event(ViolationKind::LaneTermination),
                event(ViolationKind::AccidentOverlap),
                event(ViolationKind::NoHelmet),
            ])
            .unwrap();
        assert_eq!(ids, vec![1, 2, 3]);

        let all = store.list_violations(None).unwrap();
        assert_eq!(all[0].kind, ViolationKind::NoHelmet);
        assert_eq!(all[2].kind, ViolationKind::LaneTermination);
    }

    #[test]
    fn test_citation_amount_from_rate_table() {
        let store = store();
        let id = store
            .append_violation(event(ViolationKind::LaneTermination))
            .unwrap();

        let citation = store.issue_citation(id).unwrap();
        assert_eq!(citation.amount, 500);
        assert_eq!(citation.violation_id, id);

        let violations = store.list_violations(None).unwrap();
        assert_eq!(violations[0].status, ViolationStatus::Cited);
    }

    #[test]
    fn test_double_issue_fails_without_corruption() {
        let store = store();
        let id = store
            .append_violation(event(ViolationKind::NoHelmet))
            .unwrap();
        store.issue_citation(id).unwrap();

        match store.issue_citation(id) {
            Err(StoreError::AlreadyCited(v)) => assert_eq!(v, id),
            other => panic!("expected AlreadyCited, got {other:?}"),
        }

        // Status stays cited; exactly one citation exists
        assert_eq!(
            store.list_violations(None).unwrap()[0].status,
            ViolationStatus::Cited
        );
        assert_eq!(store.citation_count(), 1);
    }

    #[test]
    fn test_unknown_violation_is_not_found() {
        let store = store();
        assert!(matches!(
            store.issue_citation(99),
            Err(StoreError::NotFound(99))
        ));
    }

    #[test]
    fn test_missing_rate_rejected_at_construction() {
        let mut rates = RateTable::default();
        rates.rates.remove(&ViolationKind::NoHelmet);
        assert!(matches!(
            CitationStore::new(rates),
            Err(StoreError::MissingRate(ViolationKind::NoHelmet))
        ));
    }

    #[test]
    fn test_accident_alert_recency() {
        let store = store();
        assert!(!store.has_open_accident_since(Utc::now() - Duration::seconds(30)));

        let mut accident = event(ViolationKind::AccidentOverlap);
        accident.vehicle_class = None;
        let id = store.append_violation(accident).unwrap();

        let cutoff = Utc::now() - Duration::seconds(30);
        assert!(store.has_open_accident_since(cutoff));
        // Old cutoff in the future excludes it
        assert!(!store.has_open_accident_since(Utc::now() + Duration::seconds(5)));

        // Citing it clears the open-accident condition
        store.issue_citation(id).unwrap();
        assert!(!store.has_open_accident_since(cutoff));
    }

    #[test]
    fn test_document_payload_copies_citation_fields() {
        let store = store();
        let id = store
            .append_violation(event(ViolationKind::LaneTermination))
            .unwrap();
        let citation = store.issue_citation(id).unwrap();

        let doc = store.document_payload(citation.id).unwrap();
        assert_eq!(doc.citation_id, citation.id);
        assert_eq!(doc.violation_id, id);
        assert_eq!(doc.amount, 500);
        assert!(doc.geometry.is_some());

        assert!(matches!(
            store.document_payload(999),
            Err(StoreError::NotFound(999))
        ));
    }
}

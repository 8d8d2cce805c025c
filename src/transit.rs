use crate::models::{Record, TransitEntry, TransitStatus, DRONE_ID, STATUS_IN};

const NO_DRONE_ID: &str = "N/A";

/// Shipment manifest. Entries copy what they need from the source record, so
/// removing or editing the record later does not touch the ledger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitLedger {
    entries: Vec<TransitEntry>,
    last_id: i64,
}

impl TransitLedger {
    pub fn from_entries(entries: Vec<TransitEntry>) -> Self {
        let last_id = entries.iter().map(|e| e.id).max().unwrap_or(0);
        Self { entries, last_id }
    }

    pub fn entries(&self) -> &[TransitEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&TransitEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains_qr(&self, qr: &str) -> bool {
        !qr.is_empty() && self.entries.iter().any(|e| e.drone_qr_code == qr)
    }

    fn next_id(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_id = now.max(self.last_id + 1);
        self.last_id
    }

    /// Append an `In Transit` entry. Declines when there is no source, the
    /// source has no QR code, or any of the text fields is blank.
    pub fn add_entry(
        &mut self,
        source: Option<&Record>,
        from: &str,
        to: &str,
        shipping_date_time: &str,
        eta: &str,
    ) -> Option<TransitEntry> {
        let source = source?;
        if [from, to, shipping_date_time, eta]
            .iter()
            .any(|s| s.trim().is_empty())
        {
            return None;
        }
        let qr = source.qr_code();
        if qr.trim().is_empty() {
            return None;
        }
        let drone_id = match source.display(DRONE_ID) {
            id if id.trim().is_empty() => NO_DRONE_ID.to_string(),
            id => id,
        };
        let entry = TransitEntry {
            id: self.next_id(),
            drone_id,
            drone_qr_code: qr,
            from: from.to_string(),
            to: to.to_string(),
            shipping_date_time: shipping_date_time.to_string(),
            eta: eta.to_string(),
            status: TransitStatus::InTransit,
        };
        tracing::debug!(id = entry.id, qr = %entry.drone_qr_code, "transit entry added");
        self.entries.push(entry.clone());
        Some(entry)
    }

    pub fn remove_entry(&mut self, id: i64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Overwrite the status; any status may follow any other.
    pub fn set_status(&mut self, id: i64, status: TransitStatus) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.status = status;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Records that may be shipped: stocked in and in good condition.
pub fn available(records: &[Record]) -> Vec<&Record> {
    records
        .iter()
        .filter(|r| r.stock_status() == STATUS_IN && r.condition() == "Good")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::{normalize, RawRow};
    use serde_json::json;

    fn fleet() -> Vec<Record> {
        let rows: Vec<RawRow> = json!([
            {"Drone QR Code ID": "QR-1", "Drone ID": "D-1", "In/Out": "In"},
            {"Drone QR Code ID": "QR-2", "Drone ID": "D-2", "In/Out": "Out"},
            {"Drone QR Code ID": "QR-3", "Broken code": "Broken"},
            {"Drone QR Code ID": "QR-4"},
            {"Drone ID": "D-5"},
        ])
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r.as_object().unwrap().clone())
        .collect();
        normalize(&rows)
    }

    #[test]
    fn test_available_is_in_and_good() {
        let records = fleet();
        let qrs: Vec<String> = available(&records).iter().map(|r| r.qr_code()).collect();
        assert_eq!(qrs, vec!["QR-1", "QR-4", ""]);
    }

    #[test]
    fn test_lifecycle() {
        let records = fleet();
        let mut ledger = TransitLedger::default();
        let entry = ledger
            .add_entry(Some(&records[0]), "Hangar A", "Site B", "2024-05-01 09:00", "2024-05-02")
            .unwrap();
        assert_eq!(entry.status, TransitStatus::InTransit);
        assert_eq!(entry.drone_id, "D-1");
        assert_eq!(ledger.len(), 1);
        assert!(ledger.contains_qr("QR-1"));

        assert!(ledger.set_status(entry.id, TransitStatus::Delayed));
        assert_eq!(ledger.get(entry.id).unwrap().status, TransitStatus::Delayed);
        assert!(ledger.set_status(entry.id, TransitStatus::InTransit));
        assert!(ledger.set_status(entry.id, TransitStatus::Delivered));
        assert_eq!(ledger.get(entry.id).unwrap().status, TransitStatus::Delivered);

        assert!(ledger.remove_entry(entry.id));
        assert!(ledger.is_empty());
        assert!(!ledger.remove_entry(entry.id));
        assert!(!ledger.set_status(entry.id, TransitStatus::Delayed));
    }

    #[test]
    fn test_remove_after_add_restores_entries() {
        let records = fleet();
        let mut ledger = TransitLedger::default();
        let kept = ledger
            .add_entry(Some(&records[3]), "Hangar A", "Site C", "09:00", "11:00")
            .unwrap();
        assert!(ledger.set_status(kept.id, TransitStatus::Delayed));
        let before: Vec<TransitEntry> = ledger.entries().to_vec();

        let added = ledger
            .add_entry(Some(&records[0]), "Hangar A", "Site B", "10:00", "12:00")
            .unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.remove_entry(added.id));
        assert_eq!(ledger.entries(), before.as_slice());
    }

    #[test]
    fn test_add_declines_on_missing_input() {
        let records = fleet();
        let mut ledger = TransitLedger::default();
        assert!(ledger.add_entry(None, "A", "B", "now", "later").is_none());
        assert!(ledger.add_entry(Some(&records[0]), " ", "B", "now", "later").is_none());
        assert!(ledger.add_entry(Some(&records[0]), "A", "B", "now", "").is_none());
        assert!(ledger.add_entry(Some(&records[4]), "A", "B", "now", "later").is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_drone_id_falls_back() {
        let records = fleet();
        let mut ledger = TransitLedger::default();
        let entry = ledger.add_entry(Some(&records[3]), "A", "B", "now", "later").unwrap();
        assert_eq!(entry.drone_id, "N/A");
    }

    #[test]
    fn test_ids_strictly_increase() {
        let records = fleet();
        let mut ledger = TransitLedger::default();
        let ids: Vec<i64> = (0..5)
            .map(|_| ledger.add_entry(Some(&records[0]), "A", "B", "now", "later").unwrap().id)
            .collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_from_entries_continues_ids() {
        let records = fleet();
        let mut ledger = TransitLedger::default();
        ledger.add_entry(Some(&records[0]), "A", "B", "now", "later");
        let future = ledger.entries()[0].id + 1_000_000_000;
        let mut seeded = ledger.entries().to_vec();
        seeded[0].id = future;
        let mut restored = TransitLedger::from_entries(seeded);
        let next = restored.add_entry(Some(&records[3]), "A", "B", "now", "later").unwrap();
        assert!(next.id > future);
    }

    #[test]
    fn test_removal_does_not_touch_source() {
        let records = fleet();
        let before = records.clone();
        let mut ledger = TransitLedger::default();
        let entry = ledger.add_entry(Some(&records[0]), "A", "B", "now", "later").unwrap();
        ledger.remove_entry(entry.id);
        assert_eq!(records, before);
    }
}

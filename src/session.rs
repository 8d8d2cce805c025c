//! The dashboard session: one dataset, its view state, and the transit ledger.
//!
//! Every view is recomputed from scratch on request. Mutations that change the
//! filtered set (new dataset, new filter, new sort) put the table back on page 1.

use crate::aggregator::{self, StatusScope, StatusSummary};
use crate::classifier::{classify, Classification, NumericRule};
use crate::filter::{self, FilterOptions, FilterSpec};
use crate::models::{Record, TransitEntry, TransitStatus, Value, STATUS_IN_TRANSIT};
use crate::normalizer::{column_set, normalize, with_asset_headers, RawRow};
use crate::reports::{self, ChartSet, ColumnProfile, DatasetOverview};
use crate::table::{self, SortState, DEFAULT_PAGE_SIZE};
use crate::transit::{self, TransitLedger};

/// One page of the table view.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePage {
    pub rows: Vec<Record>,
    pub total_count: usize,
    pub page_count: usize,
    pub page: usize,
}

/// Cards and tallies over the filtered records.
#[derive(Debug, Clone, PartialEq)]
pub struct Analytics {
    pub filtered_count: usize,
    pub status: StatusSummary,
    pub in_transit: usize,
    pub categories: Vec<(String, usize)>,
    pub locations: Vec<(String, usize)>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    records: Vec<Record>,
    columns: Vec<String>,
    filter: FilterSpec,
    sort: SortState,
    page: usize,
    page_size: usize,
    ledger: TransitLedger,
    numeric_rule: NumericRule,
    status_scope: StatusScope,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            columns: Vec::new(),
            filter: FilterSpec::default(),
            sort: SortState::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            ledger: TransitLedger::default(),
            numeric_rule: NumericRule::default(),
            status_scope: StatusScope::default(),
        }
    }
}

impl Dashboard {
    pub fn new(page_size: usize, numeric_rule: NumericRule, status_scope: StatusScope) -> Self {
        Self {
            page_size: page_size.max(1),
            numeric_rule,
            status_scope,
            ..Self::default()
        }
    }

    // -- dataset ------------------------------------------------------------

    /// Replace the dataset. `columns` of `None` derives them from the rows;
    /// explicit columns gain any asset header they are missing.
    pub fn load_dataset(&mut self, rows: &[RawRow], columns: Option<Vec<String>>) {
        self.columns = match columns {
            Some(columns) => with_asset_headers(columns),
            None => column_set(rows),
        };
        self.records = normalize(rows);
        self.page = 1;
        tracing::debug!(
            rows = self.records.len(),
            columns = self.columns.len(),
            "dataset loaded"
        );
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn classification(&self) -> Classification {
        classify(&self.records, &self.columns, self.numeric_rule)
    }

    /// Overwrite `field` on every record with this QR code and return how
    /// many changed. Unknown columns and derived fields change nothing.
    pub fn set_field(&mut self, qr: &str, field: &str, value: Value) -> usize {
        if qr.trim().is_empty() || !self.has_column(field) {
            return 0;
        }
        let changed = self
            .records
            .iter_mut()
            .filter(|r| r.qr_code() == qr)
            .map(|r| r.set_field(field, value.clone()))
            .filter(|changed| *changed)
            .count();
        tracing::debug!(qr, field, changed, "field updated");
        changed
    }

    // -- view state ---------------------------------------------------------

    pub fn filter_spec(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn set_filter(&mut self, spec: FilterSpec) {
        self.filter = spec;
        self.page = 1;
    }

    pub fn set_search(&mut self, term: &str) {
        self.filter.free_text = Some(term.to_string());
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
        self.page = 1;
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn toggle_sort(&mut self, column: &str) {
        self.sort.toggle(column);
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
        self.page = 1;
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Pages past the end are allowed and render empty.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self) {
        let last = table::page_count(self.filtered().len(), self.page_size);
        self.page = (self.page + 1).min(last);
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    // -- derived views ------------------------------------------------------

    pub fn filtered(&self) -> Vec<Record> {
        filter::filter(&self.records, &self.filter)
    }

    pub fn filter_options(&self) -> FilterOptions {
        filter::filter_options(&self.records)
    }

    /// Filtered, sorted and paged rows.
    pub fn table_page(&self) -> TablePage {
        let mut rows = self.filtered();
        self.sort.apply(&mut rows);
        let total_count = rows.len();
        TablePage {
            rows: table::paginate(&rows, self.page_size, self.page).to_vec(),
            total_count,
            page_count: table::page_count(total_count, self.page_size),
            page: self.page,
        }
    }

    pub fn analytics(&self) -> Analytics {
        let rows = self.filtered();
        Analytics {
            filtered_count: rows.len(),
            status: aggregator::status_summary(&rows, self.status_scope),
            in_transit: self.ledger.len(),
            categories: aggregator::by_category(&rows),
            locations: aggregator::by_location(&rows),
        }
    }

    pub fn overview(&self) -> DatasetOverview {
        reports::dataset_overview(&self.records, &self.columns, &self.classification())
    }

    pub fn column_profiles(&self) -> Vec<ColumnProfile> {
        reports::column_profiles(&self.records, &self.columns, &self.classification())
    }

    pub fn charts(&self) -> ChartSet {
        let rows = self.filtered();
        let summary = aggregator::status_summary(&rows, self.status_scope);
        reports::chart_set(&rows, &self.classification(), &summary, self.ledger.len())
    }

    /// Stock status as shown to the user: ledger membership wins.
    pub fn effective_status(&self, record: &Record) -> String {
        if self.ledger.contains_qr(&record.qr_code()) {
            STATUS_IN_TRANSIT.to_string()
        } else {
            record.stock_status()
        }
    }

    // -- transit ------------------------------------------------------------

    pub fn ledger(&self) -> &TransitLedger {
        &self.ledger
    }

    pub fn set_ledger(&mut self, ledger: TransitLedger) {
        self.ledger = ledger;
    }

    pub fn transit_entries(&self) -> &[TransitEntry] {
        self.ledger.entries()
    }

    /// Records eligible for shipment, drawn from the full dataset.
    pub fn available_for_transit(&self) -> Vec<&Record> {
        transit::available(&self.records)
    }

    /// Ship the available record with this QR code.
    pub fn add_transit(
        &mut self,
        qr: &str,
        from: &str,
        to: &str,
        shipping_date_time: &str,
        eta: &str,
    ) -> Option<TransitEntry> {
        let source = transit::available(&self.records)
            .into_iter()
            .find(|r| r.qr_code() == qr);
        self.ledger.add_entry(source, from, to, shipping_date_time, eta)
    }

    pub fn remove_transit(&mut self, id: i64) -> bool {
        self.ledger.remove_entry(id)
    }

    pub fn set_transit_status(&mut self, id: i64, status: TransitStatus) -> bool {
        self.ledger.set_status(id, status)
    }

    pub fn clear_transit(&mut self) {
        self.ledger.clear();
    }
}

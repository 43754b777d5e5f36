use crate::client::{DashboardError, DashboardSource};
use crate::dashboard::aggregate::{aggregate, table_rows, to_chart_series, ChartSeries, HistoryRow};
use crate::domain::prediction::HistoryRecord;
use crate::domain::statistics::{DashboardStatistics, ServiceStatistics};

/// Both halves of one dashboard load.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub statistics: ServiceStatistics,
    pub history: Vec<HistoryRecord>,
}

/// Fetch statistics and history concurrently. Either failure fails the load.
pub async fn load<S>(source: &S, limit: usize) -> Result<DashboardData, DashboardError>
where
    S: DashboardSource + ?Sized,
{
    let (statistics, history) =
        tokio::try_join!(source.fetch_statistics(), source.fetch_history(limit))?;
    Ok(DashboardData {
        statistics,
        history,
    })
}

/// Everything the dashboard renders, derived from one successful load.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub generation: u64,
    /// Store-wide figures as reported by the history service.
    pub overall: ServiceStatistics,
    /// Figures over the fetched history page only.
    pub recent: DashboardStatistics,
    pub charts: ChartSeries,
    pub rows: Vec<HistoryRow>,
    pub history: Vec<HistoryRecord>,
}

impl DashboardSnapshot {
    fn derive(generation: u64, data: DashboardData, limit: usize) -> Self {
        let recent = aggregate(&data.history);
        let charts = to_chart_series(&data.statistics.overall);
        let rows = table_rows(&data.history, limit);
        Self {
            generation,
            overall: data.statistics,
            recent,
            charts,
            rows,
            history: data.history,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
    limit: usize,
}

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Applied,
    /// A load started later has already resolved; this result was dropped.
    Stale,
    /// The load failed; the previous snapshot is kept.
    Failed(DashboardError),
}

/// Owns the dashboard snapshot and replaces it wholesale.
///
/// Every refresh takes a ticket carrying the next generation number. A result
/// is applied only if its generation is newer than every load resolved so far,
/// so a slow early load can never overwrite a later one. Failed loads count as
/// resolved too.
#[derive(Debug, Clone)]
pub struct DashboardView {
    limit: usize,
    issued: u64,
    resolved: u64,
    snapshot: Option<DashboardSnapshot>,
}

impl DashboardView {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            issued: 0,
            resolved: 0,
            snapshot: None,
        }
    }

    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket {
            generation: self.issued,
            limit: self.limit,
        }
    }

    pub fn apply(
        &mut self,
        ticket: RefreshTicket,
        result: Result<DashboardData, DashboardError>,
    ) -> RefreshOutcome {
        if ticket.generation <= self.resolved {
            tracing::debug!(
                generation = ticket.generation,
                resolved = self.resolved,
                "discarding stale dashboard load"
            );
            return RefreshOutcome::Stale;
        }
        self.resolved = ticket.generation;

        match result {
            Ok(data) => {
                let snapshot = DashboardSnapshot::derive(ticket.generation, data, ticket.limit);
                tracing::info!(
                    generation = ticket.generation,
                    total_predictions = snapshot.overall.overall.total_predictions,
                    rows = snapshot.rows.len(),
                    "dashboard refreshed"
                );
                self.snapshot = Some(snapshot);
                RefreshOutcome::Applied
            }
            Err(err) => {
                tracing::warn!(generation = ticket.generation, error = %err, "dashboard load failed");
                RefreshOutcome::Failed(err)
            }
        }
    }

    pub async fn refresh<S>(&mut self, source: &S) -> RefreshOutcome
    where
        S: DashboardSource + ?Sized,
    {
        let ticket = self.begin_refresh();
        let result = load(source, ticket.limit).await;
        self.apply(ticket, result)
    }
}

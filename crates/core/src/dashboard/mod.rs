pub mod aggregate;
pub mod view;

pub use aggregate::{aggregate, table_rows, to_chart_series, BarPoint, ChartSeries, HistoryRow, PieSlice};
pub use view::{load, DashboardData, DashboardSnapshot, DashboardView, RefreshOutcome, RefreshTicket};

use crate::engine::{process_dashboard, DashboardInput, DashboardSnapshot};
use crate::error::{DashboardError, Result};
use crate::schema::{DashboardRequest, DashboardSettings, FilterOptions, RawBusinessRecord};
use crate::store::BusinessDataSource;
use crate::trend::{build_trend, TrendPoint};
use log::{debug, info, warn};
use serde::Serialize;

/// Everything a dashboard screen renders for one request.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub request: DashboardRequest,
    pub snapshot: DashboardSnapshot,
    pub trend: Vec<TrendPoint>,
}

pub struct DashboardService<S: BusinessDataSource> {
    source: S,
    settings: DashboardSettings,
}

impl<S: BusinessDataSource> DashboardService<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            settings: DashboardSettings::default(),
        }
    }

    pub fn with_settings(source: S, settings: DashboardSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { source, settings })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    /// Filter options, or empty options when the store cannot be read.
    pub fn filter_options(&self) -> FilterOptions {
        self.source.fetch_filter_options().unwrap_or_else(|e| {
            warn!("Failed to fetch filter options: {}", e);
            FilterOptions::default()
        })
    }

    /// Fills the blanks of a request: newest period as current, second newest
    /// as compare, every business line when none is selected.
    ///
    /// Fails when an explicitly requested period does not exist.
    pub fn resolve_request(&self, request: &DashboardRequest) -> Result<DashboardRequest> {
        resolve_against(request, &self.filter_options())
    }

    /// Fetches the periods a request needs and derives the dashboard.
    pub fn load(&self, request: &DashboardRequest) -> Result<DashboardView> {
        let options = self.filter_options();
        let request = resolve_against(request, &options)?;

        info!(
            "Loading dashboard for period '{}' ({} mode, {} business lines)",
            request.current_period,
            request.mode,
            request.selected_business_types.len()
        );

        let earlier = options.periods_before(&request.current_period);
        let previous_id = earlier.first().copied().unwrap_or_default();
        let before_previous_id = earlier.get(1).copied().unwrap_or_default();
        debug!(
            "Previous periods resolved to '{}' and '{}'",
            previous_id, before_previous_id
        );

        let input = DashboardInput {
            current_period: self.period_records(&request.current_period),
            compare_period: self.period_records(&request.compare_period),
            previous_period: self.period_records(previous_id),
            period_before_previous: self.period_records(before_previous_id),
            selected_business_types: request.selected_business_types.clone(),
            mode: request.mode,
        };

        let snapshot = process_dashboard(&input);
        let trend = self.trend(&request.current_period, &request.selected_business_types);

        Ok(DashboardView {
            request,
            snapshot,
            trend,
        })
    }

    /// Trailing trend ending at `end_period_id`.
    pub fn trend(&self, end_period_id: &str, selected_business_types: &[String]) -> Vec<TrendPoint> {
        if end_period_id.is_empty() {
            return Vec::new();
        }
        let window = self
            .source
            .fetch_trend_window(end_period_id, self.settings.trend_points)
            .unwrap_or_else(|e| {
                warn!("Failed to fetch trend window ending {}: {}", end_period_id, e);
                Vec::new()
            });
        build_trend(&window, selected_business_types)
    }

    fn period_records(&self, period_id: &str) -> Vec<RawBusinessRecord> {
        if period_id.is_empty() {
            return Vec::new();
        }
        self.source.fetch_period_records(period_id).unwrap_or_else(|e| {
            warn!("Failed to fetch data for period {}: {}", period_id, e);
            Vec::new()
        })
    }
}

fn resolve_against(request: &DashboardRequest, options: &FilterOptions) -> Result<DashboardRequest> {
    let mut resolved = request.clone();

    if resolved.current_period.is_empty() {
        resolved.current_period = options.periods.first().map(|p| p.id.clone()).unwrap_or_default();
    }
    if resolved.compare_period.is_empty() {
        resolved.compare_period = options.periods.get(1).map(|p| p.id.clone()).unwrap_or_default();
    }
    if resolved.selected_business_types.is_empty() {
        resolved.selected_business_types = options.business_types.clone();
    }

    for period in [&resolved.current_period, &resolved.compare_period] {
        if !period.is_empty() && options.period_label(period).is_none() {
            return Err(DashboardError::UnknownPeriod(period.clone()));
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AnalysisMode, TrendWindowEntry};
    use crate::store::InMemoryStore;
    use std::cell::Cell;

    fn record(period: &str, business_type: &str, premium: f64) -> RawBusinessRecord {
        RawBusinessRecord {
            premium_written: premium,
            premium_earned: premium * 0.7,
            total_loss_amount: premium * 0.4,
            expense_amount_raw: premium * 0.2,
            claim_count: premium / 8.0,
            avg_premium_per_policy: 1800.0,
            ..RawBusinessRecord::zeroed(period, period, business_type)
        }
    }

    fn store() -> InMemoryStore {
        let mut rows = Vec::new();
        for week in 1..=4 {
            let period = format!("2024-W{:02}", week);
            rows.push(record(&period, "交强险", 100.0 * week as f64));
            rows.push(record(&period, "车损险", 300.0 * week as f64));
        }
        InMemoryStore::from_records(rows).unwrap()
    }

    struct FailingSource;

    impl BusinessDataSource for FailingSource {
        fn fetch_filter_options(&self) -> Result<FilterOptions> {
            Err(DashboardError::DataSource("connection refused".to_string()))
        }

        fn fetch_period_records(&self, _period_id: &str) -> Result<Vec<RawBusinessRecord>> {
            Err(DashboardError::DataSource("connection refused".to_string()))
        }

        fn fetch_trend_window(&self, _end: &str, _count: usize) -> Result<Vec<TrendWindowEntry>> {
            Err(DashboardError::DataSource("connection refused".to_string()))
        }
    }

    struct CountingSource {
        inner: InMemoryStore,
        option_fetches: Cell<usize>,
    }

    impl BusinessDataSource for CountingSource {
        fn fetch_filter_options(&self) -> Result<FilterOptions> {
            self.option_fetches.set(self.option_fetches.get() + 1);
            self.inner.fetch_filter_options()
        }

        fn fetch_period_records(&self, period_id: &str) -> Result<Vec<RawBusinessRecord>> {
            self.inner.fetch_period_records(period_id)
        }

        fn fetch_trend_window(&self, end: &str, count: usize) -> Result<Vec<TrendWindowEntry>> {
            self.inner.fetch_trend_window(end, count)
        }
    }

    #[test]
    fn test_request_defaults() {
        let service = DashboardService::new(store());
        let resolved = service.resolve_request(&DashboardRequest::default()).unwrap();
        assert_eq!(resolved.current_period, "2024-W04");
        assert_eq!(resolved.compare_period, "2024-W03");
        assert_eq!(resolved.mode, AnalysisMode::Ytd);
        assert_eq!(resolved.selected_business_types, vec!["交强险", "车损险"]);
    }

    #[test]
    fn test_unknown_period_is_rejected() {
        let service = DashboardService::new(store());
        let request = DashboardRequest {
            current_period: "2019-W01".to_string(),
            ..DashboardRequest::default()
        };
        assert!(matches!(
            service.resolve_request(&request),
            Err(DashboardError::UnknownPeriod(_))
        ));
    }

    #[test]
    fn test_load_reads_filter_options_once() {
        let service = DashboardService::new(CountingSource {
            inner: store(),
            option_fetches: Cell::new(0),
        });

        let view = service.load(&DashboardRequest::default()).unwrap();
        assert_eq!(view.request.current_period, "2024-W04");
        assert_eq!(service.source().option_fetches.get(), 1);

        service.load(&DashboardRequest::default()).unwrap();
        assert_eq!(service.source().option_fetches.get(), 2);
    }

    #[test]
    fn test_load_pop_view() {
        let service = DashboardService::new(store());
        let view = service
            .load(&DashboardRequest {
                mode: AnalysisMode::Pop,
                ..DashboardRequest::default()
            })
            .unwrap();

        assert_eq!(view.snapshot.by_business_type.len(), 2);
        // W04 - W03 for both lines
        assert!((view.snapshot.summary.current.kpis.premium_written - 400.0).abs() < 1e-9);
        // W03 - W02
        assert!((view.snapshot.summary.compare.kpis.premium_written - 400.0).abs() < 1e-9);
        assert_eq!(view.trend.len(), 3);
        assert_eq!(view.trend.last().unwrap().period_id, "2024-W04");
    }

    #[test]
    fn test_load_comparison_view() {
        let service = DashboardService::new(store());
        let view = service
            .load(&DashboardRequest {
                current_period: "2024-W04".to_string(),
                compare_period: "2024-W01".to_string(),
                mode: AnalysisMode::Comparison,
                selected_business_types: vec!["车损险".to_string()],
            })
            .unwrap();

        assert!((view.snapshot.summary.current.kpis.premium_written - 1200.0).abs() < 1e-9);
        assert!((view.snapshot.summary.compare.kpis.premium_written - 300.0).abs() < 1e-9);
        assert!((view.snapshot.by_business_type[0].kpis.premium_share - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_respects_settings() {
        let settings = DashboardSettings { trend_points: 2 };
        let service = DashboardService::with_settings(store(), settings).unwrap();
        let view = service.load(&DashboardRequest::default()).unwrap();
        assert_eq!(view.trend.len(), 2);

        assert!(DashboardService::with_settings(store(), DashboardSettings { trend_points: 0 }).is_err());
    }

    #[test]
    fn test_failing_source_degrades_to_empty() {
        let service = DashboardService::new(FailingSource);
        let view = service.load(&DashboardRequest::default()).unwrap();
        assert!(view.snapshot.by_business_type.is_empty());
        assert_eq!(view.snapshot.summary.current.kpis.premium_written, 0.0);
        assert!(view.trend.is_empty());
    }
}

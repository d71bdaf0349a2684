use crate::config::{EngineConfig, ReportOptions};
use crate::engine::{MarketMetrics, MetricsEngine};
use crate::error::Result;
use crate::ingestion::missing_dates;
use crate::normalization::VatTreatment;
use crate::period::{resolve_period, Period, PeriodKind};
use crate::schema::DailyRecord;
use crate::weighting::{aggregate_weighted, WeightedTotals};
use crate::yoy::YoyChange;
use chrono::NaiveDate;
use log::{debug, info};
use rayon::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportRequest {
    pub kind: PeriodKind,

    #[schemars(description = "Anchor date in YYYY-MM-DD format, usually today in the local calendar")]
    pub anchor: NaiveDate,

    #[serde(default)]
    #[schemars(description = "How far back from the anchor to go: days, weeks or months depending on kind")]
    pub offset: u32,

    #[serde(default)]
    #[schemars(description = "Overrides the configured default report options")]
    pub options: Option<ReportOptions>,
}

impl ReportRequest {
    pub fn new(kind: PeriodKind, anchor: NaiveDate) -> Self {
        Self {
            kind,
            anchor,
            offset: 0,
            options: None,
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_options(mut self, options: ReportOptions) -> Self {
        self.options = Some(options);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MarketRow {
    #[serde(flatten)]
    pub metrics: MarketMetrics,
    pub yoy: YoyChange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Report {
    pub period: Period,
    pub reporting_currency: String,
    pub vat: VatTreatment,
    /// Markets with spend in the period.
    pub markets: Vec<MarketRow>,
    /// Selected markets left out for having no spend in the period.
    pub inactive_markets: Vec<String>,
    pub totals: WeightedTotals,
    pub totals_yoy: YoyChange,
}

impl Report {
    pub fn market(&self, code: &str) -> Option<&MarketRow> {
        self.markets.iter().find(|row| row.metrics.market == code)
    }
}

pub struct ReportProcessor<'a> {
    config: &'a EngineConfig,
}

impl<'a> ReportProcessor<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn process(
        &self,
        request: &ReportRequest,
        data: &BTreeMap<String, Vec<DailyRecord>>,
    ) -> Result<Report> {
        let options = request
            .options
            .clone()
            .unwrap_or_else(|| self.config.default_options.clone());
        let period = resolve_period(request.kind, request.anchor, request.offset);

        info!(
            "Building {} report '{}' for {} ({}, YoY {})",
            period.kind,
            period.label,
            self.config.reporting_currency,
            period.range(),
            period.yoy_range()
        );

        for market in self.config.selected_markets(&options)? {
            if let Some(records) = data.get(&market.code) {
                let gaps = missing_days(records, &period);
                if gaps > 0 {
                    debug!(
                        "Market {} has no records for {} day(s) in {} and {}",
                        market.code,
                        gaps,
                        period.range(),
                        period.yoy_range()
                    );
                }
            }
        }

        let all = MetricsEngine::new(self.config).all_markets(&period, data, &options)?;
        let (active, inactive): (Vec<MarketMetrics>, Vec<MarketMetrics>) =
            all.into_iter().partition(|m| m.has_spend());

        // Every active market must be complete before weighting.
        let totals = aggregate_weighted(&active);
        let totals_yoy = totals.yoy_change();

        debug!(
            "{} active market(s), {} without spend; total revenue {:.2}, spend {:.2}",
            active.len(),
            inactive.len(),
            totals.revenue,
            totals.spend
        );

        Ok(Report {
            period,
            reporting_currency: self.config.reporting_currency.clone(),
            vat: options.vat,
            markets: active
                .into_iter()
                .map(|metrics| MarketRow {
                    yoy: metrics.yoy_change(),
                    metrics,
                })
                .collect(),
            inactive_markets: inactive.into_iter().map(|m| m.market).collect(),
            totals,
            totals_yoy,
        })
    }
}

/// Days without a record in the current and year-over-year windows of `period`.
fn missing_days(records: &[DailyRecord], period: &Period) -> usize {
    missing_dates(records, period.range()).len() + missing_dates(records, period.yoy_range()).len()
}

pub fn build_report(
    config: &EngineConfig,
    request: &ReportRequest,
    data: &BTreeMap<String, Vec<DailyRecord>>,
) -> Result<Report> {
    ReportProcessor::new(config).process(request, data)
}

/// Builds several independent reports in parallel over the same read-only inputs.
pub fn build_reports(
    config: &EngineConfig,
    requests: &[ReportRequest],
    data: &BTreeMap<String, Vec<DailyRecord>>,
) -> Result<Vec<Report>> {
    requests
        .par_iter()
        .map(|request| build_report(config, request, data))
        .collect()
}

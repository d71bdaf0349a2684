//! # Marketing Period Metrics
//!
//! A library for turning per-day marketing performance records from several country
//! markets into period-level, currency-normalized, revenue-weighted metrics.
//!
//! ## Core Concepts
//!
//! - **Periods**: single day, ISO week, calendar month, week-to-date and month-to-date
//!   windows, each with a calendar-correct year-over-year window
//! - **Normalization**: VAT removal and conversion into one reporting currency, applied
//!   once per market before anything is summed
//! - **Market metrics**: period totals, MER / ROAS, new-customer share, AOV and one row per
//!   channel with spend
//! - **Weighted totals**: an "all markets" row where ratios are weighted by revenue share
//! - **YoY comparison**: a signed percentage change with explicit "new", "no data" and
//!   "anomalous" outcomes
//!
//! Undefined ratios are `None`, never a silent zero. The exception is the top-level ROAS of
//! a market, which is always rendered and falls back to 0 without spend.
//!
//! ## Example
//!
//! ```rust,ignore
//! use marketing_period_metrics::*;
//! use chrono::NaiveDate;
//!
//! let config = EngineConfig::from_json_str(r#"{
//!     "reporting_currency": "EUR",
//!     "markets": [
//!         { "code": "SE", "name": "Sweden", "currency_multiplier": 0.087, "vat_rate": 0.25 }
//!     ]
//! }"#).unwrap();
//!
//! let records = parse_records_json(&std::fs::read_to_string("records.json").unwrap()).unwrap();
//! let data = group_by_market(records);
//!
//! let anchor = NaiveDate::from_ymd_opt(2025, 10, 16).unwrap();
//! let report = build_report(&config, &ReportRequest::new(PeriodKind::Week, anchor), &data).unwrap();
//!
//! for row in &report.markets {
//!     println!("{}: {:.0} ({})", row.metrics.name, row.metrics.revenue, row.yoy);
//! }
//! println!("Total ROAS {:.2}", report.totals.roas);
//! ```

pub mod aggregation;
pub mod channels;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod normalization;
pub mod period;
pub mod report;
pub mod schema;
pub mod utils;
pub mod weighting;
pub mod yoy;

pub use aggregation::{aggregate_period, PeriodTotals};
pub use channels::{channel_metrics, channel_ratio, ChannelMetrics, ChannelTotals};
pub use config::{EngineConfig, ReportOptions};
pub use engine::{build_market_metrics, MarketMetrics, MetricsEngine};
pub use error::{MetricsError, Result};
pub use ingestion::*;
pub use normalization::{normalize_records, NormalizedSeries, Normalizer, VatTreatment};
pub use period::*;
pub use report::{build_report, build_reports, MarketRow, Report, ReportProcessor, ReportRequest};
pub use schema::*;
pub use utils::*;
pub use weighting::{aggregate_weighted, revenue_weights, WeightedTotals};
pub use yoy::{compare_yoy, YoyChange};

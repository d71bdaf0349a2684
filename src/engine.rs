use crate::aggregation::aggregate_period;
use crate::channels::{channel_metrics, ChannelMetrics};
use crate::config::{EngineConfig, ReportOptions};
use crate::error::Result;
use crate::normalization::{NormalizedSeries, Normalizer};
use crate::period::Period;
use crate::schema::{DailyRecord, MarketConfig};
use crate::yoy::{compare_yoy, YoyChange};
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fully derived metrics for one market over one period, in reporting currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MarketMetrics {
    pub market: String,
    pub name: String,
    pub revenue: f64,
    pub new_customer_revenue: f64,
    pub spend: f64,
    pub orders: u64,
    pub new_customer_orders: u64,
    /// Revenue over spend (MER); 0 when there was no spend.
    pub roas: f64,
    /// New-customer revenue over spend; 0 when there was no spend.
    pub new_customer_roas: f64,
    pub new_customer_pct: Option<f64>,
    pub aov: Option<f64>,
    /// Revenue of the year-over-year period, present only when positive.
    pub yoy_revenue: Option<f64>,
    pub channels: Vec<ChannelMetrics>,
}

impl MarketMetrics {
    pub fn has_spend(&self) -> bool {
        self.spend > 0.0
    }

    pub fn yoy_change(&self) -> YoyChange {
        compare_yoy(self.revenue, self.yoy_revenue)
    }
}

pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Builds one market's metrics from its normalized current and year-over-year records.
///
/// Both series are expected to be sliced to their period already.
pub fn build_market_metrics(
    market: &MarketConfig,
    current: &NormalizedSeries,
    yoy: &NormalizedSeries,
    include_channel_order_counts: bool,
) -> MarketMetrics {
    let totals = aggregate_period(current.records());
    let prior = aggregate_period(yoy.records());

    MarketMetrics {
        market: market.code.clone(),
        name: market.name.clone(),
        revenue: totals.revenue,
        new_customer_revenue: totals.new_customer_revenue,
        spend: totals.spend,
        orders: totals.orders,
        new_customer_orders: totals.new_customer_orders,
        roas: ratio_or_zero(totals.revenue, totals.spend),
        new_customer_roas: ratio_or_zero(totals.new_customer_revenue, totals.spend),
        new_customer_pct: totals.new_customer_pct(),
        aov: totals.aov(),
        yoy_revenue: (prior.revenue > 0.0).then_some(prior.revenue),
        channels: channel_metrics(&totals.channels, include_channel_order_counts),
    }
}

pub struct MetricsEngine<'a> {
    config: &'a EngineConfig,
}

impl<'a> MetricsEngine<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Normalizes a market's raw records once and builds its metrics for `period`.
    pub fn market_metrics(
        &self,
        market: &MarketConfig,
        records: &[DailyRecord],
        period: &Period,
        options: &ReportOptions,
    ) -> MarketMetrics {
        let normalized = Normalizer::new(market, options.vat).normalize(records);
        let current = normalized.slice(period.range());
        let yoy = normalized.slice(period.yoy_range());

        debug!(
            "Market {}: {} current records in {}, {} YoY records in {}",
            market.code,
            current.len(),
            period.range(),
            yoy.len(),
            period.yoy_range()
        );

        build_market_metrics(market, &current, &yoy, options.include_channel_order_counts)
    }

    /// Metrics for every market selected by `options`, in selection order.
    ///
    /// A market without records yields all-zero metrics.
    pub fn all_markets(
        &self,
        period: &Period,
        data: &BTreeMap<String, Vec<DailyRecord>>,
        options: &ReportOptions,
    ) -> Result<Vec<MarketMetrics>> {
        let markets = self.config.selected_markets(options)?;
        let mut metrics = Vec::with_capacity(markets.len());

        for market in markets {
            let records: &[DailyRecord] = match data.get(&market.code) {
                Some(records) => records.as_slice(),
                None => {
                    warn!("No records supplied for market {}", market.code);
                    &[]
                }
            };
            metrics.push(self.market_metrics(market, records, period, options));
        }

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalization::{normalize_records, VatTreatment};
    use crate::period::{iso_week, DateRange};
    use crate::schema::{Channel, ChannelDay};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn market() -> MarketConfig {
        MarketConfig {
            code: "SE".to_string(),
            name: "Sweden".to_string(),
            currency: Some("SEK".to_string()),
            currency_multiplier: 1.0,
            vat_rate: 0.25,
        }
    }

    fn record(date: NaiveDate, revenue: f64, spend: f64, orders: u64) -> DailyRecord {
        DailyRecord {
            date,
            market: "SE".to_string(),
            revenue,
            spend,
            orders,
            ..Default::default()
        }
    }

    #[test]
    fn test_three_day_scenario() {
        let raw = vec![
            record(d(2025, 6, 1), 1000.0, 100.0, 5),
            record(d(2025, 6, 2), 0.0, 50.0, 0),
            record(d(2025, 6, 3), 500.0, 0.0, 3),
        ];
        let current = normalize_records(&market(), &raw, VatTreatment::Remove);
        let metrics =
            build_market_metrics(&market(), &current, &NormalizedSeries::empty("SE"), false);

        assert!((metrics.revenue - 1200.0).abs() < 1e-9);
        assert_eq!(metrics.spend, 150.0);
        assert!((metrics.roas - 8.0).abs() < 1e-9);
        assert_eq!(metrics.orders, 8);
        assert_eq!(metrics.aov, Some(150.0));
        assert_eq!(metrics.yoy_revenue, None);
        assert_eq!(metrics.yoy_change(), YoyChange::NoData);
    }

    #[test]
    fn test_zero_spend_defaults_ratios_to_zero() {
        let raw = vec![record(d(2025, 6, 1), 500.0, 0.0, 2)];
        let current = normalize_records(&market(), &raw, VatTreatment::Keep);
        let metrics =
            build_market_metrics(&market(), &current, &NormalizedSeries::empty("SE"), false);

        assert_eq!(metrics.roas, 0.0);
        assert_eq!(metrics.new_customer_roas, 0.0);
        assert!(!metrics.has_spend());
        assert!(metrics.channels.is_empty());
    }

    #[test]
    fn test_no_records_yields_zero_metrics() {
        let empty = NormalizedSeries::empty("SE");
        let metrics = build_market_metrics(&market(), &empty, &empty, true);
        assert_eq!(metrics.revenue, 0.0);
        assert_eq!(metrics.orders, 0);
        assert_eq!(metrics.aov, None);
        assert_eq!(metrics.new_customer_pct, None);
        assert_eq!(metrics.roas, 0.0);
    }

    #[test]
    fn test_yoy_baseline_only_when_positive() {
        let current = normalize_records(
            &market(),
            &[record(d(2025, 6, 1), 250.0, 10.0, 1)],
            VatTreatment::Keep,
        );

        let positive = normalize_records(
            &market(),
            &[record(d(2024, 6, 1), 200.0, 10.0, 1)],
            VatTreatment::Keep,
        );
        let metrics = build_market_metrics(&market(), &current, &positive, false);
        assert_eq!(metrics.yoy_revenue, Some(200.0));
        assert_eq!(metrics.yoy_change(), YoyChange::Percent(25.0));

        let negative = normalize_records(
            &market(),
            &[record(d(2024, 6, 1), -40.0, 10.0, 1)],
            VatTreatment::Keep,
        );
        let metrics = build_market_metrics(&market(), &current, &negative, false);
        assert_eq!(metrics.yoy_revenue, None);
    }

    #[test]
    fn test_new_customer_ratios_and_channels() {
        let mut raw = record(d(2025, 6, 1), 1250.0, 100.0, 10);
        raw.new_customer_revenue = 500.0;
        raw.new_customer_orders = 4;
        raw.channels.insert(
            Channel::Meta,
            ChannelDay {
                spend: 100.0,
                pixel_revenue: 625.0,
                platform_revenue: 750.0,
                pixel_new_customer_revenue: 250.0,
                new_customer_orders: Some(3),
            },
        );
        raw.channels.insert(
            Channel::Google,
            ChannelDay {
                pixel_revenue: 125.0,
                ..Default::default()
            },
        );

        let current = normalize_records(&market(), &[raw], VatTreatment::Remove);
        let metrics =
            build_market_metrics(&market(), &current, &NormalizedSeries::empty("SE"), true);

        assert!((metrics.roas - 10.0).abs() < 1e-9);
        assert!((metrics.new_customer_roas - 4.0).abs() < 1e-9);
        assert_eq!(metrics.new_customer_pct, Some(40.0));
        assert_eq!(metrics.channels.len(), 1);

        let meta = &metrics.channels[0];
        assert_eq!(meta.channel, Channel::Meta);
        assert_eq!(meta.pixel_roas, Some(5.0));
        assert_eq!(meta.platform_roas, Some(6.0));
        assert_eq!(meta.new_customer_roas, Some(2.0));
        assert_eq!(meta.new_customer_orders, Some(3));
    }

    #[test]
    fn test_engine_slices_current_and_yoy_windows() {
        let config = EngineConfig::new("SEK", vec![market()]).unwrap();
        let engine = MetricsEngine::new(&config);
        let period = iso_week(d(2025, 10, 16), 0);

        let records = vec![
            record(d(2025, 10, 13), 125.0, 10.0, 1),
            record(d(2025, 10, 19), 125.0, 10.0, 1),
            record(d(2025, 10, 20), 9999.0, 10.0, 1),
            record(d(2024, 10, 14), 62.5, 5.0, 1),
            record(d(2024, 10, 13), 9999.0, 5.0, 1),
        ];

        let metrics =
            engine.market_metrics(&market(), &records, &period, &ReportOptions::default());
        assert!((metrics.revenue - 200.0).abs() < 1e-9);
        assert_eq!(metrics.spend, 20.0);
        assert_eq!(metrics.yoy_revenue, Some(50.0));
        assert_eq!(period.yoy_range(), DateRange::new(d(2024, 10, 14), d(2024, 10, 20)));
    }

    #[test]
    fn test_all_markets_handles_missing_data() {
        let config = EngineConfig::new("SEK", vec![market()]).unwrap();
        let engine = MetricsEngine::new(&config);
        let period = iso_week(d(2025, 10, 16), 0);

        let metrics = engine
            .all_markets(&period, &BTreeMap::new(), &ReportOptions::default())
            .unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].revenue, 0.0);

        let options = ReportOptions {
            markets: Some(vec!["XX".to_string()]),
            ..Default::default()
        };
        assert!(engine.all_markets(&period, &BTreeMap::new(), &options).is_err());
    }
}

//! Currency and VAT normalization.
//!
//! Raw records carry local-currency amounts with VAT-inclusive revenue. The
//! [`Normalizer`] produces a [`NormalizedSeries`], the only input the metrics engine
//! accepts, so a series cannot be normalized twice.

use crate::ingestion::filter_records;
use crate::period::DateRange;
use crate::schema::{ChannelDay, DailyRecord, MarketConfig};
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VatTreatment {
    #[default]
    #[schemars(description = "Divide revenue fields by (1 + VAT rate) before reporting")]
    Remove,

    #[schemars(description = "Report revenue as recorded, VAT included")]
    Keep,
}

pub fn remove_vat(amount: f64, vat_rate: f64) -> f64 {
    amount / (1.0 + vat_rate)
}

pub fn convert_currency(amount: f64, multiplier: f64) -> f64 {
    amount * multiplier
}

/// Daily records of one market in reporting currency, with VAT treatment applied.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    market: String,
    records: Vec<DailyRecord>,
}

impl NormalizedSeries {
    pub fn empty(market: impl Into<String>) -> Self {
        Self {
            market: market.into(),
            records: Vec::new(),
        }
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The records inside `range`, still normalized.
    pub fn slice(&self, range: DateRange) -> NormalizedSeries {
        NormalizedSeries {
            market: self.market.clone(),
            records: filter_records(&self.records, range),
        }
    }
}

pub struct Normalizer<'a> {
    market: &'a MarketConfig,
    vat: VatTreatment,
}

impl<'a> Normalizer<'a> {
    pub fn new(market: &'a MarketConfig, vat: VatTreatment) -> Self {
        Self { market, vat }
    }

    fn revenue(&self, amount: f64) -> f64 {
        let local = match self.vat {
            VatTreatment::Remove => remove_vat(amount, self.market.vat_rate),
            VatTreatment::Keep => amount,
        };
        convert_currency(local, self.market.currency_multiplier)
    }

    // Spend is a pre-tax cost and is only converted.
    fn spend(&self, amount: f64) -> f64 {
        convert_currency(amount, self.market.currency_multiplier)
    }

    pub fn normalize_record(&self, record: &DailyRecord) -> DailyRecord {
        let channels = record
            .channels
            .iter()
            .map(|(channel, day)| {
                (
                    *channel,
                    ChannelDay {
                        spend: self.spend(day.spend),
                        pixel_revenue: self.revenue(day.pixel_revenue),
                        platform_revenue: self.revenue(day.platform_revenue),
                        pixel_new_customer_revenue: self.revenue(day.pixel_new_customer_revenue),
                        new_customer_orders: day.new_customer_orders,
                    },
                )
            })
            .collect();

        DailyRecord {
            date: record.date,
            market: record.market.clone(),
            revenue: self.revenue(record.revenue),
            new_customer_revenue: self.revenue(record.new_customer_revenue),
            spend: self.spend(record.spend),
            orders: record.orders,
            new_customer_orders: record.new_customer_orders,
            channels,
        }
    }

    pub fn normalize(&self, records: &[DailyRecord]) -> NormalizedSeries {
        let mut normalized = Vec::with_capacity(records.len());
        for record in records {
            if record.market != self.market.code {
                warn!(
                    "Skipping record for market '{}' dated {} while normalizing market '{}'",
                    record.market, record.date, self.market.code
                );
                continue;
            }
            normalized.push(self.normalize_record(record));
        }
        normalized.sort_by_key(|r| r.date);

        debug!(
            "Normalized {} records for {} (multiplier {}, VAT {:?} at {})",
            normalized.len(),
            self.market.code,
            self.market.currency_multiplier,
            self.vat,
            self.market.vat_rate
        );

        NormalizedSeries {
            market: self.market.code.clone(),
            records: normalized,
        }
    }
}

pub fn normalize_records(
    market: &MarketConfig,
    records: &[DailyRecord],
    vat: VatTreatment,
) -> NormalizedSeries {
    Normalizer::new(market, vat).normalize(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Channel;
    use chrono::NaiveDate;

    fn market(multiplier: f64, vat_rate: f64) -> MarketConfig {
        MarketConfig {
            code: "NO".to_string(),
            name: "Norway".to_string(),
            currency: Some("NOK".to_string()),
            currency_multiplier: multiplier,
            vat_rate,
        }
    }

    fn raw_record() -> DailyRecord {
        let mut record = DailyRecord {
            date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            market: "NO".to_string(),
            revenue: 125.0,
            new_customer_revenue: 50.0,
            spend: 40.0,
            orders: 3,
            new_customer_orders: 1,
            ..Default::default()
        };
        record.channels.insert(
            Channel::Meta,
            ChannelDay {
                spend: 20.0,
                pixel_revenue: 62.5,
                platform_revenue: 75.0,
                pixel_new_customer_revenue: 25.0,
                new_customer_orders: Some(1),
            },
        );
        record
    }

    #[test]
    fn test_vat_removal() {
        let series = normalize_records(&market(1.0, 0.25), &[raw_record()], VatTreatment::Remove);
        let record = &series.records()[0];

        assert_eq!(record.revenue, 100.0);
        assert_eq!(record.new_customer_revenue, 40.0);
        assert_eq!(record.spend, 40.0);

        let meta = record.channel(Channel::Meta).unwrap();
        assert_eq!(meta.pixel_revenue, 50.0);
        assert_eq!(meta.platform_revenue, 60.0);
        assert_eq!(meta.pixel_new_customer_revenue, 20.0);
        assert_eq!(meta.spend, 20.0);
        assert_eq!(meta.new_customer_orders, Some(1));
    }

    #[test]
    fn test_currency_conversion_applies_to_spend_and_revenue() {
        let series = normalize_records(&market(0.1, 0.25), &[raw_record()], VatTreatment::Keep);
        let record = &series.records()[0];

        assert!((record.revenue - 12.5).abs() < 1e-9);
        assert!((record.spend - 4.0).abs() < 1e-9);
        let meta = record.channel(Channel::Meta).unwrap();
        assert!((meta.spend - 2.0).abs() < 1e-9);
        assert!((meta.platform_revenue - 7.5).abs() < 1e-9);
        assert_eq!(record.orders, 3);
    }

    #[test]
    fn test_conversion_and_vat_removal_commute() {
        let amounts = [125.0, 0.0, 3.33, 98_765.43];
        for amount in amounts {
            let convert_first = remove_vat(convert_currency(amount, 0.094), 0.25);
            let vat_first = convert_currency(remove_vat(amount, 0.25), 0.094);
            assert!((convert_first - vat_first).abs() < 1e-9);
        }
    }

    #[test]
    fn test_normalize_does_not_touch_input() {
        let raw = vec![raw_record()];
        let _ = normalize_records(&market(0.5, 0.25), &raw, VatTreatment::Remove);
        assert_eq!(raw[0].revenue, 125.0);
    }

    #[test]
    fn test_foreign_market_records_are_skipped() {
        let mut foreign = raw_record();
        foreign.market = "SE".to_string();
        let series = normalize_records(
            &market(1.0, 0.25),
            &[raw_record(), foreign],
            VatTreatment::Remove,
        );
        assert_eq!(series.len(), 1);
        assert_eq!(series.market(), "NO");
    }

    #[test]
    fn test_slice_keeps_inclusive_range() {
        let mut later = raw_record();
        later.date = NaiveDate::from_ymd_opt(2025, 5, 3).unwrap();
        let series =
            normalize_records(&market(1.0, 0.0), &[later, raw_record()], VatTreatment::Remove);

        let start = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let sliced = series.slice(DateRange::new(start, start));
        assert_eq!(sliced.len(), 1);
        assert_eq!(sliced.records()[0].date, start);
        assert!(series.slice(DateRange::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
        ))
        .is_empty());
    }
}

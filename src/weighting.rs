//! Combination of per-market metrics into one "all markets" row.
//!
//! Additive fields are summed. Ratio fields are averaged with each market weighted
//! by its share of total revenue, so a small market with an extreme ratio moves the
//! headline number only in proportion to its size.

use crate::channels::{ChannelMetrics, ChannelTotals};
use crate::engine::MarketMetrics;
use crate::schema::Channel;
use crate::yoy::{compare_yoy, YoyChange};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeightedTotals {
    pub markets: usize,
    pub revenue: f64,
    pub new_customer_revenue: f64,
    pub spend: f64,
    pub orders: u64,
    pub new_customer_orders: u64,
    pub roas: f64,
    pub new_customer_roas: f64,
    pub new_customer_pct: f64,
    pub aov: f64,
    /// Sum of the markets' year-over-year baselines, when any market has one.
    pub yoy_revenue: Option<f64>,
    /// Current revenue of the markets that contributed to `yoy_revenue`.
    pub yoy_comparable_revenue: f64,
    pub channels: Vec<ChannelMetrics>,
}

impl WeightedTotals {
    pub fn yoy_change(&self) -> YoyChange {
        compare_yoy(self.yoy_comparable_revenue, self.yoy_revenue)
    }
}

/// Each market's share of the combined revenue; all zero when there is no revenue.
pub fn revenue_weights(metrics: &[MarketMetrics]) -> Vec<f64> {
    let total: f64 = metrics.iter().map(|m| m.revenue).sum();
    metrics
        .iter()
        .map(|m| if total != 0.0 { m.revenue / total } else { 0.0 })
        .collect()
}

fn weighted(
    metrics: &[MarketMetrics],
    weights: &[f64],
    value: impl Fn(&MarketMetrics) -> f64,
) -> f64 {
    metrics
        .iter()
        .zip(weights)
        .map(|(m, w)| value(m) * w)
        .sum()
}

impl From<&ChannelMetrics> for ChannelTotals {
    fn from(row: &ChannelMetrics) -> Self {
        Self {
            channel: row.channel,
            spend: row.spend,
            pixel_revenue: row.pixel_revenue,
            platform_revenue: row.platform_revenue,
            pixel_new_customer_revenue: row.pixel_new_customer_revenue,
            new_customer_orders: row.new_customer_orders,
        }
    }
}

/// Combines the metrics of every contributing market.
///
/// Needs the complete list: the weights depend on the revenue of all markets.
pub fn aggregate_weighted(metrics: &[MarketMetrics]) -> WeightedTotals {
    let weights = revenue_weights(metrics);

    let mut channels: Vec<ChannelTotals> =
        Channel::ALL.iter().map(|c| ChannelTotals::new(*c)).collect();
    for row in metrics.iter().flat_map(|m| m.channels.iter()) {
        if let Some(totals) = channels.iter_mut().find(|t| t.channel == row.channel) {
            totals.merge(&ChannelTotals::from(row));
        }
    }

    let (comparable, baselines): (Vec<f64>, Vec<f64>) = metrics
        .iter()
        .filter_map(|m| m.yoy_revenue.map(|baseline| (m.revenue, baseline)))
        .unzip();

    WeightedTotals {
        markets: metrics.len(),
        revenue: metrics.iter().map(|m| m.revenue).sum(),
        new_customer_revenue: metrics.iter().map(|m| m.new_customer_revenue).sum(),
        spend: metrics.iter().map(|m| m.spend).sum(),
        orders: metrics.iter().map(|m| m.orders).sum(),
        new_customer_orders: metrics.iter().map(|m| m.new_customer_orders).sum(),
        roas: weighted(metrics, &weights, |m| m.roas),
        new_customer_roas: weighted(metrics, &weights, |m| m.new_customer_roas),
        new_customer_pct: weighted(metrics, &weights, |m| m.new_customer_pct.unwrap_or(0.0)),
        aov: weighted(metrics, &weights, |m| m.aov.unwrap_or(0.0)),
        yoy_revenue: if baselines.is_empty() {
            None
        } else {
            Some(baselines.iter().sum())
        },
        yoy_comparable_revenue: comparable.iter().sum(),
        channels: channels.iter().filter_map(|t| t.to_metrics(true)).collect(),
    }
}

use crate::schema::{Channel, ChannelDay};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Return on spend for one channel, undefined unless spend is positive.
pub fn channel_ratio(revenue: f64, spend: f64) -> Option<f64> {
    if spend > 0.0 {
        Some(revenue / spend)
    } else {
        None
    }
}

/// Raw per-channel sums over a period, before any ratio is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelTotals {
    pub channel: Channel,
    pub spend: f64,
    pub pixel_revenue: f64,
    pub platform_revenue: f64,
    pub pixel_new_customer_revenue: f64,
    pub new_customer_orders: Option<u64>,
}

impl ChannelTotals {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            spend: 0.0,
            pixel_revenue: 0.0,
            platform_revenue: 0.0,
            pixel_new_customer_revenue: 0.0,
            new_customer_orders: None,
        }
    }

    pub fn add_day(&mut self, day: &ChannelDay) {
        self.spend += day.spend;
        self.pixel_revenue += day.pixel_revenue;
        self.platform_revenue += day.platform_revenue;
        self.pixel_new_customer_revenue += day.pixel_new_customer_revenue;
        if let Some(orders) = day.new_customer_orders {
            *self.new_customer_orders.get_or_insert(0) += orders;
        }
    }

    pub fn merge(&mut self, other: &ChannelTotals) {
        self.spend += other.spend;
        self.pixel_revenue += other.pixel_revenue;
        self.platform_revenue += other.platform_revenue;
        self.pixel_new_customer_revenue += other.pixel_new_customer_revenue;
        if let Some(orders) = other.new_customer_orders {
            *self.new_customer_orders.get_or_insert(0) += orders;
        }
    }

    /// Derives the channel row, or `None` when the channel had no spend in the period.
    pub fn to_metrics(&self, include_order_counts: bool) -> Option<ChannelMetrics> {
        if self.spend <= 0.0 {
            return None;
        }

        Some(ChannelMetrics {
            channel: self.channel,
            spend: self.spend,
            pixel_revenue: self.pixel_revenue,
            platform_revenue: self.platform_revenue,
            pixel_new_customer_revenue: self.pixel_new_customer_revenue,
            pixel_roas: channel_ratio(self.pixel_revenue, self.spend),
            platform_roas: channel_ratio(self.platform_revenue, self.spend),
            new_customer_roas: channel_ratio(self.pixel_new_customer_revenue, self.spend),
            new_customer_orders: if include_order_counts {
                self.new_customer_orders
            } else {
                None
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChannelMetrics {
    pub channel: Channel,
    pub spend: f64,
    pub pixel_revenue: f64,
    pub platform_revenue: f64,
    pub pixel_new_customer_revenue: f64,
    pub pixel_roas: Option<f64>,
    pub platform_roas: Option<f64>,
    pub new_customer_roas: Option<f64>,
    pub new_customer_orders: Option<u64>,
}

/// Channel rows for every channel with positive spend, in channel order.
pub fn channel_metrics(
    totals: &[ChannelTotals],
    include_order_counts: bool,
) -> Vec<ChannelMetrics> {
    totals
        .iter()
        .filter_map(|t| t.to_metrics(include_order_counts))
        .collect()
}

use crate::channels::ChannelTotals;
use crate::schema::{Channel, DailyRecord};
use serde::{Deserialize, Serialize};

/// Sums of one market's normalized records over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub days: usize,
    pub revenue: f64,
    pub new_customer_revenue: f64,
    pub spend: f64,
    pub orders: u64,
    pub new_customer_orders: u64,
    /// One entry per channel, including channels without spend.
    pub channels: Vec<ChannelTotals>,
}

impl PeriodTotals {
    pub fn empty() -> Self {
        Self {
            days: 0,
            revenue: 0.0,
            new_customer_revenue: 0.0,
            spend: 0.0,
            orders: 0,
            new_customer_orders: 0,
            channels: Channel::ALL.iter().map(|c| ChannelTotals::new(*c)).collect(),
        }
    }

    /// Average order value; undefined for a period without orders.
    pub fn aov(&self) -> Option<f64> {
        if self.orders == 0 {
            return None;
        }
        Some(self.revenue / self.orders as f64)
    }

    /// Share of orders placed by new customers, in percent.
    pub fn new_customer_pct(&self) -> Option<f64> {
        if self.orders == 0 {
            return None;
        }
        Some(self.new_customer_orders as f64 / self.orders as f64 * 100.0)
    }

    pub fn channel(&self, channel: Channel) -> Option<&ChannelTotals> {
        self.channels.iter().find(|t| t.channel == channel)
    }
}

/// Reduces normalized daily records into period totals in a single pass.
pub fn aggregate_period(records: &[DailyRecord]) -> PeriodTotals {
    let mut totals = PeriodTotals::empty();

    for record in records {
        totals.days += 1;
        totals.revenue += record.revenue;
        totals.new_customer_revenue += record.new_customer_revenue;
        totals.spend += record.spend;
        totals.orders += record.orders;
        totals.new_customer_orders += record.new_customer_orders;

        for channel_totals in totals.channels.iter_mut() {
            if let Some(day) = record.channel(channel_totals.channel) {
                channel_totals.add_day(day);
            }
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ChannelDay;
    use chrono::NaiveDate;

    fn record(day: u32, revenue: f64, spend: f64, orders: u64, nc_orders: u64) -> DailyRecord {
        DailyRecord {
            date: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
            market: "SE".to_string(),
            revenue,
            spend,
            orders,
            new_customer_orders: nc_orders,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_period_has_undefined_ratios() {
        let totals = aggregate_period(&[]);
        assert_eq!(totals.revenue, 0.0);
        assert_eq!(totals.spend, 0.0);
        assert_eq!(totals.orders, 0);
        assert_eq!(totals.aov(), None);
        assert_eq!(totals.new_customer_pct(), None);
        assert_eq!(totals.channels.len(), 3);
    }

    #[test]
    fn test_sums_and_ratios() {
        let totals = aggregate_period(&[
            record(1, 1000.0, 100.0, 8, 2),
            record(2, 0.0, 50.0, 0, 0),
            record(3, 500.0, 0.0, 2, 3),
        ]);

        assert_eq!(totals.days, 3);
        assert_eq!(totals.revenue, 1500.0);
        assert_eq!(totals.spend, 150.0);
        assert_eq!(totals.orders, 10);
        assert_eq!(totals.new_customer_orders, 5);
        assert_eq!(totals.aov(), Some(150.0));
        assert_eq!(totals.new_customer_pct(), Some(50.0));
    }

    #[test]
    fn test_zero_orders_with_revenue_keeps_aov_undefined() {
        let totals = aggregate_period(&[record(1, 250.0, 10.0, 0, 0)]);
        assert_eq!(totals.aov(), None);
        assert_eq!(totals.new_customer_pct(), None);
    }

    #[test]
    fn test_channel_subtotals() {
        let mut first = record(1, 100.0, 30.0, 1, 0);
        first.channels.insert(
            Channel::Meta,
            ChannelDay {
                spend: 30.0,
                pixel_revenue: 90.0,
                ..Default::default()
            },
        );
        let mut second = record(2, 100.0, 20.0, 1, 0);
        second.channels.insert(
            Channel::Meta,
            ChannelDay {
                spend: 20.0,
                pixel_revenue: 60.0,
                ..Default::default()
            },
        );
        second.channels.insert(
            Channel::TikTok,
            ChannelDay {
                pixel_revenue: 15.0,
                ..Default::default()
            },
        );

        let totals = aggregate_period(&[first, second]);
        let meta = totals.channel(Channel::Meta).unwrap();
        assert_eq!(meta.spend, 50.0);
        assert_eq!(meta.pixel_revenue, 150.0);

        let tiktok = totals.channel(Channel::TikTok).unwrap();
        assert_eq!(tiktok.spend, 0.0);
        assert_eq!(tiktok.pixel_revenue, 15.0);

        assert_eq!(totals.channel(Channel::Google).unwrap().spend, 0.0);
    }
}

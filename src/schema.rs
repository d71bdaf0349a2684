use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    #[schemars(description = "Meta (Facebook / Instagram) paid social")]
    Meta,

    #[schemars(description = "Google Ads (search, shopping, performance max)")]
    Google,

    #[serde(rename = "tiktok")]
    #[schemars(description = "TikTok paid social")]
    TikTok,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Meta, Channel::Google, Channel::TikTok];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Meta => "meta",
            Channel::Google => "google",
            Channel::TikTok => "tiktok",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One channel's activity on one day, in the market's local currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChannelDay {
    #[serde(default)]
    pub spend: f64,

    #[serde(default)]
    #[schemars(description = "Revenue credited via first-party pixel tracking (VAT-inclusive)")]
    pub pixel_revenue: f64,

    #[serde(default)]
    #[schemars(description = "Revenue as self-reported by the ad platform (VAT-inclusive)")]
    pub platform_revenue: f64,

    #[serde(default)]
    #[schemars(description = "Pixel-attributed revenue from first-time customers (VAT-inclusive)")]
    pub pixel_new_customer_revenue: f64,

    #[serde(default)]
    pub new_customer_orders: Option<u64>,
}

/// One market's activity for one calendar date.
///
/// Monetary fields are in local currency; revenue fields include VAT.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DailyRecord {
    #[schemars(description = "Calendar date in YYYY-MM-DD format")]
    pub date: NaiveDate,

    #[schemars(description = "Market code this record belongs to (e.g. 'SE')")]
    pub market: String,

    #[serde(default)]
    pub revenue: f64,

    #[serde(default)]
    pub new_customer_revenue: f64,

    #[serde(default)]
    pub spend: f64,

    #[serde(default)]
    pub orders: u64,

    #[serde(default)]
    pub new_customer_orders: u64,

    #[serde(default)]
    pub channels: BTreeMap<Channel, ChannelDay>,
}

impl DailyRecord {
    pub fn channel(&self, channel: Channel) -> Option<&ChannelDay> {
        self.channels.get(&channel)
    }
}

/// Static description of one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MarketConfig {
    #[schemars(description = "Short market code used to key daily records (e.g. 'SE', 'NO')")]
    pub code: String,

    #[schemars(description = "Display name of the market")]
    pub name: String,

    #[serde(default)]
    #[schemars(description = "ISO currency code of the local currency (informational)")]
    pub currency: Option<String>,

    #[schemars(
        description = "Multiplier converting one unit of local currency into the reporting currency"
    )]
    pub currency_multiplier: f64,

    #[schemars(description = "VAT rate as a fraction (0.25 for 25%)")]
    pub vat_rate: f64,
}

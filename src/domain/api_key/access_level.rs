//! Access levels, quotas and the static pricing table

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Sentinel for an unlimited quota dimension
pub const UNLIMITED: i64 = -1;

/// Tier an API key is issued at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    Basic,
    Professional,
    Enterprise,
    Unlimited,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Professional => "professional",
            Self::Enterprise => "enterprise",
            Self::Unlimited => "unlimited",
        }
    }

    pub fn all() -> [AccessLevel; 4] {
        [
            Self::Basic,
            Self::Professional,
            Self::Enterprise,
            Self::Unlimited,
        ]
    }

    /// Lenient parse: anything unrecognised is `Basic`
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    pub fn usage_limits(&self) -> UsageLimits {
        match self {
            Self::Basic => UsageLimits::new(1_000, 50, 5, 2_000),
            Self::Professional => UsageLimits::new(10_000, 500, 20, 4_000),
            Self::Enterprise => UsageLimits::new(100_000, 5_000, 100, 8_000),
            Self::Unlimited => UsageLimits::new(UNLIMITED, UNLIMITED, 500, 16_000),
        }
    }

    pub fn includes_support(&self) -> bool {
        !matches!(self, Self::Basic)
    }

    fn price_index(&self) -> usize {
        match self {
            Self::Basic => 0,
            Self::Professional => 1,
            Self::Enterprise => 2,
            Self::Unlimited => 3,
        }
    }
}

impl FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "professional" => Ok(Self::Professional),
            "enterprise" => Ok(Self::Enterprise),
            "unlimited" => Ok(Self::Unlimited),
            other => Err(format!("Unknown access level: {}", other)),
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quotas attached to a key. `-1` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageLimits {
    pub monthly_limit: i64,
    pub daily_limit: i64,
    pub concurrent_requests: u32,
    pub max_tokens_per_request: u32,
}

impl UsageLimits {
    pub fn new(
        monthly_limit: i64,
        daily_limit: i64,
        concurrent_requests: u32,
        max_tokens_per_request: u32,
    ) -> Self {
        Self {
            monthly_limit,
            daily_limit,
            concurrent_requests,
            max_tokens_per_request,
        }
    }

    pub fn is_monthly_unlimited(&self) -> bool {
        self.monthly_limit == UNLIMITED
    }

    pub fn is_daily_unlimited(&self) -> bool {
        self.daily_limit == UNLIMITED
    }

    /// Requests left this month, `None` when unlimited
    pub fn remaining_monthly(&self, used: i64) -> Option<i64> {
        if self.is_monthly_unlimited() {
            None
        } else {
            Some((self.monthly_limit - used).max(0))
        }
    }
}

/// Monthly prices per category, indexed by access level
const CATEGORY_PRICES: &[(&str, [u32; 4])] = &[
    ("project_managers", [99, 299, 999, 2999]),
    ("consultants", [199, 599, 1999, 5999]),
    ("industry_specialists", [149, 449, 1499, 4499]),
    ("creative_professionals", [79, 199, 699, 1999]),
    ("technical_specialists", [299, 899, 2999, 8999]),
    ("researchers", [199, 599, 1999, 5999]),
    ("service_providers", [49, 149, 499, 1499]),
];

const UNCATALOGUED_PRICE: u32 = 99;

/// Reported price of a key. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTier {
    pub monthly_price: u32,
    pub currency: String,
    pub billing_cycle: String,
    pub includes_support: bool,
}

impl PricingTier {
    /// Price for a category at a level; unknown categories get the flat fallback
    pub fn for_category(category: Option<&str>, level: AccessLevel) -> Self {
        let known = category.and_then(|c| {
            CATEGORY_PRICES
                .iter()
                .find(|(name, _)| *name == c)
                .map(|(_, prices)| prices[level.price_index()])
        });

        match known {
            Some(price) => Self::monthly(price, level.includes_support()),
            None => Self::monthly(UNCATALOGUED_PRICE, false),
        }
    }

    fn monthly(monthly_price: u32, includes_support: bool) -> Self {
        Self {
            monthly_price,
            currency: "USD".to_string(),
            billing_cycle: "monthly".to_string(),
            includes_support,
        }
    }
}

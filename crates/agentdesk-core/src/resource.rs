//! Resource kinds served by the dashboard.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A backend resource shown as a dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Bookings,
    Vouchers,
    ForexOrders,
}

impl ResourceKind {
    /// All resources, in tab order.
    pub const ALL: [ResourceKind; 3] = [Self::Bookings, Self::Vouchers, Self::ForexOrders];

    /// URL/file-safe name, e.g. `forex-orders`.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Bookings => "bookings",
            Self::Vouchers => "vouchers",
            Self::ForexOrders => "forex-orders",
        }
    }

    /// Human-readable tab label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Bookings => "Bookings & Earnings",
            Self::Vouchers => "Voucher",
            Self::ForexOrders => "Forex Order",
        }
    }

    /// Download name for an exported report.
    pub fn report_file_name(self) -> String {
        format!("{}-report.csv", self.slug())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown resource '{}'", s))
    }
}

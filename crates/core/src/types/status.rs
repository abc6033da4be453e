//! Payment status of a customer purchase and the roster filter built on it.

use serde::{Deserialize, Serialize};

/// Payment status of a customer purchase record.
///
/// The remote API only ever sends `pending`, `paid`, `cancelled` or
/// `refunded`. Anything else is kept as [`CustomerStatus::Unknown`] rather than
/// rejected, so a single odd record never breaks the whole roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CustomerStatus {
    Pending,
    Paid,
    Cancelled,
    Refunded,
    Unknown,
}

impl CustomerStatus {
    /// Statuses the remote API accepts on a status update.
    pub const KNOWN: [Self; 4] = [Self::Pending, Self::Paid, Self::Cancelled, Self::Refunded];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Unknown => "unknown",
        }
    }

    /// Operator-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::Paid => "Pago",
            Self::Cancelled => "Cancelado",
            Self::Refunded => "Reembolsado",
            Self::Unknown => "Desconhecido",
        }
    }

    /// Whether the send action is finished for this record.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Refunded)
    }
}

impl From<&str> for CustomerStatus {
    fn from(value: &str) -> Self {
        match value {
            "pending" => Self::Pending,
            "paid" => Self::Paid,
            "cancelled" => Self::Cancelled,
            "refunded" => Self::Refunded,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for CustomerStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<CustomerStatus> for String {
    fn from(status: CustomerStatus) -> Self {
        status.as_str().to_owned()
    }
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter applied to the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    /// Keep every record.
    #[default]
    All,
    /// Keep records whose status matches exactly.
    Only(CustomerStatus),
}

impl StatusFilter {
    /// Every filter the panel offers, in display order.
    pub const OPTIONS: [Self; 5] = [
        Self::All,
        Self::Only(CustomerStatus::Pending),
        Self::Only(CustomerStatus::Paid),
        Self::Only(CustomerStatus::Cancelled),
        Self::Only(CustomerStatus::Refunded),
    ];

    /// Returns `true` if a record with `status` passes this filter.
    #[must_use]
    pub fn matches(self, status: CustomerStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }

    /// Operator-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "Todos os Status",
            Self::Only(status) => status.label(),
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => write!(f, "{status}"),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Self::All);
        }
        match CustomerStatus::from(s) {
            CustomerStatus::Unknown => Err(format!(
                "invalid status filter: {s} (expected all, pending, paid, cancelled or refunded)"
            )),
            status => Ok(Self::Only(status)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_is_not_rejected() {
        let status: CustomerStatus = serde_json::from_str("\"chargeback\"").unwrap();
        assert_eq!(status, CustomerStatus::Unknown);
        assert_eq!(status.label(), "Desconhecido");
        assert_eq!(status.to_string(), "unknown");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&CustomerStatus::Refunded).unwrap();
        assert_eq!(json, "\"refunded\"");
    }

    #[test]
    fn test_only_refunded_is_terminal() {
        for status in CustomerStatus::KNOWN {
            assert_eq!(status.is_terminal(), status == CustomerStatus::Refunded);
        }
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "paid".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(CustomerStatus::Paid)
        );
        assert!("unknown".parse::<StatusFilter>().is_err());
        assert!("PAID".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_filter_matches() {
        assert!(StatusFilter::All.matches(CustomerStatus::Unknown));
        let paid = StatusFilter::Only(CustomerStatus::Paid);
        assert!(paid.matches(CustomerStatus::Paid));
        assert!(!paid.matches(CustomerStatus::Pending));
    }

    #[test]
    fn test_filter_display_round_trips() {
        for filter in StatusFilter::OPTIONS {
            assert_eq!(filter.to_string().parse::<StatusFilter>().unwrap(), filter);
        }
    }
}

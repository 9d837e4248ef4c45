//! Account-number prefix classification.
//!
//! The chart of accounts follows a fixed numbering convention:
//!
//! | Prefix        | Type        |
//! |---------------|-------------|
//! | `1`           | Asset       |
//! | `20`          | Equity      |
//! | `2` (not `20`)| Liability   |
//! | `3`           | Revenue     |
//! | `4`..=`7`     | Expense     |
//! | anything else | Other       |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Report bucket an account number falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Assets (prefix `1`).
    Asset,
    /// Liabilities (prefix `2`, except `20`).
    Liability,
    /// Equity (prefix `20`).
    Equity,
    /// Revenue (prefix `3`).
    Revenue,
    /// Expenses (prefixes `4` to `7`).
    Expense,
    /// Everything else; excluded from P&L and balance sheet.
    Other,
}

impl AccountType {
    /// The five reportable types, in report order.
    pub const REPORTABLE: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// Classifies an account number by its prefix.
    #[must_use]
    pub fn classify(account_number: &str) -> Self {
        let mut chars = account_number.chars();
        match (chars.next(), chars.next()) {
            (Some('1'), _) => Self::Asset,
            (Some('2'), Some('0')) => Self::Equity,
            (Some('2'), _) => Self::Liability,
            (Some('3'), _) => Self::Revenue,
            (Some('4'..='7'), _) => Self::Expense,
            _ => Self::Other,
        }
    }

    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "ASSET",
            Self::Liability => "LIABILITY",
            Self::Equity => "EQUITY",
            Self::Revenue => "REVENUE",
            Self::Expense => "EXPENSE",
            Self::Other => "OTHER",
        }
    }

    /// Returns true for types shown on the profit and loss statement.
    #[must_use]
    pub fn is_profit_and_loss(&self) -> bool {
        matches!(self, Self::Revenue | Self::Expense)
    }

    /// Returns true for types shown on the balance sheet.
    #[must_use]
    pub fn is_balance_sheet(&self) -> bool {
        matches!(self, Self::Asset | Self::Liability | Self::Equity)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1500", AccountType::Asset)]
    #[case("1", AccountType::Asset)]
    #[case("2000", AccountType::Equity)]
    #[case("2050", AccountType::Equity)]
    #[case("2100", AccountType::Liability)]
    #[case("2", AccountType::Liability)]
    #[case("3000", AccountType::Revenue)]
    #[case("4000", AccountType::Expense)]
    #[case("5000", AccountType::Expense)]
    #[case("6300", AccountType::Expense)]
    #[case("7790", AccountType::Expense)]
    #[case("8050", AccountType::Other)]
    #[case("9999", AccountType::Other)]
    #[case("0100", AccountType::Other)]
    #[case("", AccountType::Other)]
    #[case("A100", AccountType::Other)]
    fn test_classify(#[case] account: &str, #[case] expected: AccountType) {
        assert_eq!(AccountType::classify(account), expected);
    }

    #[test]
    fn test_report_membership() {
        assert!(AccountType::Revenue.is_profit_and_loss());
        assert!(AccountType::Expense.is_profit_and_loss());
        assert!(!AccountType::Asset.is_profit_and_loss());
        assert!(AccountType::Equity.is_balance_sheet());
        assert!(!AccountType::Other.is_balance_sheet());
        assert!(!AccountType::Other.is_profit_and_loss());
    }
}

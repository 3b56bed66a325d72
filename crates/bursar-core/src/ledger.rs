//! # Ledger Module
//!
//! Balance calculations over fees and payments.
//!
//! ## Two Views of a Student's Account
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ANNUAL                                                                 │
//! │    due  = "Annual Fee" of the student's class   (None → 0)             │
//! │    paid = Σ payments against "Annual Fee" fees  (None → 0)             │
//! │    balance = due − paid          → "2000.00"                            │
//! │                                                                         │
//! │  MONTHLY (oldest month first)                                           │
//! │    ┌────┬────┬────┬────┬─────┬────┐                                     │
//! │    │ M1 │ M2 │ M3 │ M4 │ ... │M12 │   each due = "Monthly Fee" amount   │
//! │    └────┴────┴────┴────┴─────┴────┘                                     │
//! │      ▲                                                                  │
//! │      └── payments, sorted by date, fill M1 before M2 ...               │
//! │          anything left after M12 is the unapplied remainder             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is pure: the repositories fetch the rows, these
//! functions shape them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::MONTHS_PER_YEAR;

// =============================================================================
// Annual Balance
// =============================================================================

/// Annual fee position of one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct AnnualBalance {
    #[serde(rename = "total_due_cents")]
    pub total_due: Money,
    #[serde(rename = "total_paid_cents")]
    pub total_paid: Money,
    #[serde(rename = "balance_cents")]
    pub balance: Money,
    /// `balance` with two decimals, e.g. "2000.00".
    #[serde(rename = "balance")]
    balance_text: String,
}

impl AnnualBalance {
    /// Two-decimal rendering of the balance.
    pub fn balance_display(&self) -> &str {
        &self.balance_text
    }
}

/// Computes the annual balance.
///
/// A class without an "Annual Fee" row and a student without payments both
/// arrive as `None` and count as zero.
///
/// ## Example
/// ```rust
/// use bursar_core::ledger::annual_balance;
/// use bursar_core::money::Money;
///
/// let balance = annual_balance(None, Some(Money::from_cents(1500)));
/// assert_eq!(balance.balance.cents(), -1500);
/// assert_eq!(balance.balance_display(), "-15.00");
/// ```
pub fn annual_balance(total_due: Option<Money>, total_paid: Option<Money>) -> AnnualBalance {
    let total_due = Money::or_zero(total_due);
    let total_paid = Money::or_zero(total_paid);
    let balance = total_due - total_paid;

    AnnualBalance {
        total_due,
        total_paid,
        balance,
        balance_text: balance.to_string(),
    }
}

// =============================================================================
// Monthly Breakdown
// =============================================================================

/// What happens to money left over once all twelve months are settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum OverflowPolicy {
    /// Report the remainder as `unapplied_cents`.
    #[default]
    Surface,
    /// Drop the remainder; `unapplied_cents` is always zero.
    Discard,
}

/// A Monthly-Fee payment as the allocator sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LedgerPayment {
    pub payment_id: i64,
    pub payment_date: NaiveDate,
    pub amount_paid_cents: i64,
}

impl LedgerPayment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }
}

/// One month of the fee year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct MonthBucket {
    /// 1 through 12.
    pub month: u8,
    #[serde(rename = "due_cents")]
    pub due: Money,
    #[serde(rename = "paid_cents")]
    pub paid: Money,
    #[serde(rename = "balance_cents")]
    pub balance: Money,
}

/// Twelve month buckets plus whatever did not fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct MonthlyBreakdown {
    pub months: Vec<MonthBucket>,
    #[serde(rename = "unapplied_cents")]
    pub unapplied: Money,
}

impl MonthlyBreakdown {
    /// Sum of `paid` over all months.
    pub fn total_paid(&self) -> Money {
        self.months.iter().map(|m| m.paid).sum()
    }
}

/// Allocates Monthly-Fee payments to months 1..=12, oldest payment first.
///
/// ## Algorithm
/// ```text
/// for payment in payments (by date, then id):
///     remaining = payment.amount
///     for month in 1..=12 while remaining > 0:
///         if month.balance > 0:
///             applied = min(remaining, month.balance)
///             month.paid += applied; month.balance -= applied
///             remaining -= applied
///     unapplied += remaining
/// ```
///
/// ## Example
/// ```rust
/// use bursar_core::ledger::{allocate_monthly, OverflowPolicy};
/// use bursar_core::money::Money;
///
/// let breakdown = allocate_monthly(Some(Money::from_cents(500)), &[], OverflowPolicy::Surface);
/// assert_eq!(breakdown.months.len(), 12);
/// assert_eq!(breakdown.months[0].balance.cents(), 500);
/// ```
pub fn allocate_monthly(
    monthly_due: Option<Money>,
    payments: &[LedgerPayment],
    policy: OverflowPolicy,
) -> MonthlyBreakdown {
    let due = Money::or_zero(monthly_due);

    let mut months: Vec<MonthBucket> = (1..=MONTHS_PER_YEAR as u8)
        .map(|month| MonthBucket {
            month,
            due,
            paid: Money::zero(),
            balance: due,
        })
        .collect();

    let mut ordered = payments.to_vec();
    ordered.sort_by_key(|p| (p.payment_date, p.payment_id));

    let mut unapplied = Money::zero();
    for payment in &ordered {
        let mut remaining = payment.amount();

        for bucket in months.iter_mut() {
            if !remaining.is_positive() {
                break;
            }
            if !bucket.balance.is_positive() {
                continue;
            }
            let applied = remaining.min(bucket.balance);
            bucket.paid += applied;
            bucket.balance -= applied;
            remaining -= applied;
        }

        if remaining.is_positive() {
            unapplied = unapplied.saturating_add(remaining);
        }
    }

    if policy == OverflowPolicy::Discard {
        unapplied = Money::zero();
    }

    MonthlyBreakdown { months, unapplied }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn payment(id: i64, day: u32, cents: i64) -> LedgerPayment {
        LedgerPayment {
            payment_id: id,
            payment_date: date(2024, 4, day),
            amount_paid_cents: cents,
        }
    }

    #[test]
    fn test_annual_balance() {
        let balance = annual_balance(
            Some(Money::from_major_minor(5000, 0)),
            Some(Money::from_major_minor(2000, 0) + Money::from_major_minor(1000, 0)),
        );
        assert_eq!(balance.total_due.cents(), 500_000);
        assert_eq!(balance.total_paid.cents(), 300_000);
        assert_eq!(balance.balance_display(), "2000.00");
    }

    #[test]
    fn test_annual_balance_absent_values() {
        let balance = annual_balance(None, None);
        assert!(balance.balance.is_zero());
        assert_eq!(balance.balance_display(), "0.00");
    }

    #[test]
    fn test_annual_balance_json_shape() {
        let balance = annual_balance(Some(Money::from_cents(1000)), Some(Money::from_cents(250)));
        let json = serde_json::to_value(&balance).unwrap();
        assert_eq!(json["total_due_cents"], 1000);
        assert_eq!(json["total_paid_cents"], 250);
        assert_eq!(json["balance_cents"], 750);
        assert_eq!(json["balance"], "7.50");
    }

    #[test]
    fn test_monthly_payment_spans_months() {
        let due = Money::from_major_minor(500, 0);
        let payments = [
            payment(1, 1, Money::from_major_minor(300, 0).cents()),
            payment(2, 2, Money::from_major_minor(300, 0).cents()),
            payment(3, 3, Money::from_major_minor(500, 0).cents()),
        ];

        let breakdown = allocate_monthly(Some(due), &payments, OverflowPolicy::Surface);

        assert_eq!(breakdown.months[0].paid, due);
        assert!(breakdown.months[0].balance.is_zero());
        assert_eq!(breakdown.months[1].paid, due);
        assert_eq!(breakdown.months[2].paid, Money::from_major_minor(100, 0));
        assert_eq!(breakdown.months[2].balance, Money::from_major_minor(400, 0));
        assert!(breakdown.unapplied.is_zero());
    }

    #[test]
    fn test_monthly_allocation_follows_date_order() {
        let due = Money::from_major_minor(500, 0);
        // Inserted out of order: the later payment must not be applied first.
        let payments = [
            LedgerPayment {
                payment_id: 9,
                payment_date: date(2024, 5, 1),
                amount_paid_cents: 30_000,
            },
            LedgerPayment {
                payment_id: 4,
                payment_date: date(2024, 4, 1),
                amount_paid_cents: 30_000,
            },
        ];

        let breakdown = allocate_monthly(Some(due), &payments, OverflowPolicy::Surface);

        assert_eq!(breakdown.months[0].paid.cents(), 50_000);
        assert!(breakdown.months[0].balance.is_zero());
        assert_eq!(breakdown.months[1].paid.cents(), 10_000);
        assert_eq!(breakdown.months[1].balance.cents(), 40_000);
        for bucket in &breakdown.months[2..] {
            assert!(bucket.paid.is_zero());
            assert_eq!(bucket.balance, due);
        }
    }

    #[test]
    fn test_monthly_overflow_policies() {
        let due = Money::from_cents(100);
        let payments = [payment(1, 1, 1_250)];

        let surfaced = allocate_monthly(Some(due), &payments, OverflowPolicy::Surface);
        assert_eq!(surfaced.total_paid().cents(), 1_200);
        assert_eq!(surfaced.unapplied.cents(), 50);

        let discarded = allocate_monthly(Some(due), &payments, OverflowPolicy::Discard);
        assert_eq!(discarded.total_paid().cents(), 1_200);
        assert!(discarded.unapplied.is_zero());
    }

    #[test]
    fn test_monthly_zero_due() {
        let payments = [payment(1, 1, 700), payment(2, 2, 300)];

        let breakdown = allocate_monthly(None, &payments, OverflowPolicy::Surface);

        assert_eq!(breakdown.months.len(), MONTHS_PER_YEAR);
        for bucket in &breakdown.months {
            assert!(bucket.due.is_zero());
            assert!(bucket.paid.is_zero());
            assert!(bucket.balance.is_zero());
        }
        assert_eq!(breakdown.unapplied.cents(), 1_000);
    }

    #[test]
    fn test_monthly_allocation_conserves_money() {
        let dues = [0, 1, 250, 500, 10_000];
        let amount_sets: [&[i64]; 5] = [
            &[],
            &[1],
            &[300, 300],
            &[499, 1, 7_000, 12],
            &[60_000, 60_000, 5],
        ];

        for due_cents in dues {
            for amounts in amount_sets {
                let payments: Vec<LedgerPayment> = amounts
                    .iter()
                    .enumerate()
                    .map(|(i, cents)| payment(i as i64 + 1, i as u32 + 1, *cents))
                    .collect();
                let due = Money::from_cents(due_cents);
                let total: Money = payments.iter().map(LedgerPayment::amount).sum();

                let breakdown = allocate_monthly(Some(due), &payments, OverflowPolicy::Surface);

                assert_eq!(breakdown.total_paid(), total.min(due * MONTHS_PER_YEAR as i64));
                assert_eq!(breakdown.total_paid() + breakdown.unapplied, total);
                assert!(breakdown.months.iter().all(|m| m.paid <= due));
                assert!(breakdown
                    .months
                    .iter()
                    .all(|m| m.paid + m.balance == m.due));
            }
        }
    }

    #[test]
    fn test_monthly_unapplied_does_not_overflow() {
        let payments = [payment(1, 1, i64::MAX), payment(2, 2, 1)];

        let breakdown = allocate_monthly(None, &payments, OverflowPolicy::Surface);

        assert!(breakdown.total_paid().is_zero());
        assert_eq!(breakdown.unapplied.cents(), i64::MAX);
    }

    #[test]
    fn test_month_bucket_json_shape() {
        let breakdown = allocate_monthly(Some(Money::from_cents(10)), &[], OverflowPolicy::Surface);
        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json["months"][0]["month"], 1);
        assert_eq!(json["months"][11]["month"], 12);
        assert_eq!(json["months"][0]["due_cents"], 10);
        assert_eq!(json["unapplied_cents"], 0);
    }

    #[test]
    fn test_overflow_policy_parses_lowercase() {
        let policy: OverflowPolicy = serde_json::from_str("\"discard\"").unwrap();
        assert_eq!(policy, OverflowPolicy::Discard);
        assert_eq!(OverflowPolicy::default(), OverflowPolicy::Surface);
    }
}

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::decimal::Money;
use crate::reporting::balance::{BalanceSnapshot, PeriodActivity};
use crate::types::{Account, Side};

/// one side of a balanced posting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub account: Account,
    pub side: Side,
    /// always positive
    pub amount: Money,
    pub memo: String,
}

impl JournalEntry {
    /// debit-positive amount
    pub fn signed_amount(&self) -> Money {
        match self.side {
            Side::Debit => self.amount,
            Side::Credit => -self.amount,
        }
    }
}

#[derive(Debug, Default)]
struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    /// post a debit/credit pair; zero is skipped, negative reverses the sides
    fn post(&mut self, debit: Account, credit: Account, amount: Money, memo: &str) {
        if amount.is_zero() {
            return;
        }
        let side = if amount.is_negative() { Side::Credit } else { Side::Debit };
        let amount = amount.abs();
        self.entries.push(JournalEntry {
            account: debit,
            side,
            amount,
            memo: memo.to_string(),
        });
        self.entries.push(JournalEntry {
            account: credit,
            side: side.opposite(),
            amount,
            memo: memo.to_string(),
        });
    }
}

/// entries moving the books from `opening` to `closing` given the window's activity
pub fn generate_journal(
    opening: &BalanceSnapshot,
    closing: &BalanceSnapshot,
    activity: &PeriodActivity,
) -> Vec<JournalEntry> {
    let mut journal = Journal::default();

    if let Some(recognition) = &activity.recognition {
        journal.post(
            Account::RouAsset,
            Account::LeaseLiabilityNonCurrent,
            recognition.lease_liability,
            "initial recognition of lease liability",
        );
        journal.post(
            Account::RouAsset,
            Account::Cash,
            recognition.initial_direct_costs,
            "initial direct costs",
        );
        journal.post(Account::Cash, Account::RouAsset, recognition.lease_incentives, "lease incentives received");
        journal.post(
            Account::RouAsset,
            Account::Cash,
            recognition.prepaid_payments,
            "payments made before commencement",
        );
    }

    journal.post(
        Account::InterestCost,
        Account::LeaseLiabilityNonCurrent,
        activity.interest,
        "interest on lease liability",
    );
    journal.post(
        Account::LeaseLiabilityNonCurrent,
        Account::RentPaid,
        activity.rent_paid,
        "lease payments",
    );
    journal.post(Account::Depreciation, Account::RouAsset, activity.depreciation, "depreciation");
    journal.post(Account::Impairment, Account::RouAsset, activity.impairment, "impairment");

    journal.post(
        Account::RouAsset,
        Account::AroProvision,
        activity.aro_additions,
        "asset retirement obligation recognised",
    );
    journal.post(
        Account::AroInterest,
        Account::AroProvision,
        activity.aro_interest,
        "unwinding of retirement obligation",
    );
    journal.post(
        Account::SecurityDeposit,
        Account::Cash,
        activity.deposit_additions + activity.deposit_discounts,
        "security deposit paid",
    );
    journal.post(
        Account::RouAsset,
        Account::SecurityDeposit,
        activity.deposit_discounts,
        "security deposit discount",
    );
    journal.post(
        Account::SecurityDeposit,
        Account::SecurityDepositInterest,
        activity.deposit_interest,
        "interest on security deposit",
    );

    if let Some(derecognition) = &activity.derecognition {
        journal.post(
            Account::LeaseLiabilityNonCurrent,
            Account::GainLoss,
            derecognition.lease_liability,
            "derecognition of lease liability",
        );
        journal.post(
            Account::GainLoss,
            Account::RouAsset,
            derecognition.rou_asset,
            "derecognition of right-of-use asset",
        );
        journal.post(Account::GainLoss, Account::Cash, derecognition.penalty, "termination penalty");
    }

    journal.post(
        Account::LeaseLiabilityNonCurrent,
        Account::LeaseLiabilityCurrent,
        closing.current_liability - opening.current_liability,
        "current portion reclassification",
    );

    let entries = journal.entries;
    if !is_balanced(&entries) {
        warn!(
            from = %opening.balance_date,
            to = %closing.balance_date,
            "journal does not balance"
        );
    }
    debug!(
        from = %opening.balance_date,
        to = %closing.balance_date,
        lines = entries.len(),
        "generated journal"
    );
    entries
}

/// total debits and total credits
pub fn totals(entries: &[JournalEntry]) -> (Money, Money) {
    entries.iter().fold((Money::ZERO, Money::ZERO), |(debits, credits), e| match e.side {
        Side::Debit => (debits + e.amount, credits),
        Side::Credit => (debits, credits + e.amount),
    })
}

pub fn is_balanced(entries: &[JournalEntry]) -> bool {
    let (debits, credits) = totals(entries);
    debits.approx_eq(credits, Money::CENT)
}

/// net debit-positive movement on one account
pub fn account_balance(entries: &[JournalEntry], account: Account) -> Money {
    entries
        .iter()
        .filter(|e| e.account == account)
        .map(JournalEntry::signed_amount)
        .sum()
}

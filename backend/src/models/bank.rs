//! Bank, account and cheque engine
//!
//! Money moves only through cheques:
//! - `issue_cheque` debits the drawer immediately (pessimistic reservation),
//!   so the same funds cannot back two cheques;
//! - `deposit` credits the payee and consumes the cheque, so it cannot be
//!   deposited twice;
//! - `borrow` is the only operation that creates money, `repay` the only one
//!   that destroys it.
//!
//! # Critical Invariants
//!
//! 1. **Per bank**: Σ balances + outstanding cheques = lent − repaid + clearing
//! 2. **System**: Σ clearing over all banks = 0, hence
//!    Σ balances + outstanding cheques = Σ lent − Σ repaid
//!
//! CRITICAL: All money values are i64 (integral currency units)

use crate::agents::AgentId;
use crate::core::params::{ConfigError, Parameters};
use crate::models::amount::{Amount, AmountError};
use crate::models::dataset::{keys, AgentDataset};
use crate::models::goods::AccountingError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during bank operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BankError {
    #[error("Insufficient funds on {account}: required {required}, available {available}")]
    InsufficientFunds {
        account: AccountId,
        required: i64,
        available: i64,
    },

    #[error("Amount must be positive, got {amount}")]
    InvalidAmount { amount: i64 },

    #[error("{holder} already has an account at {bank}")]
    DuplicateAccount { holder: AgentId, bank: AgentId },

    #[error("Unknown account {account}")]
    UnknownAccount { account: AccountId },

    #[error("Cheque payable to {payee} deposited on account of {holder}")]
    WrongPayee { payee: AgentId, holder: AgentId },

    #[error("Borrowing is disabled: {account} needs {amount}")]
    BorrowingDisabled { account: AccountId, amount: i64 },

    #[error("Repayment {amount} exceeds debt {debt} on {account}")]
    RepaymentExceedsDebt {
        account: AccountId,
        amount: i64,
        debt: i64,
    },

    #[error("Amount error: {0}")]
    Amount(#[from] AmountError),
}

/// Account identifier: bank index and slot within that bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId {
    pub bank: usize,
    pub slot: usize,
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account_{}_{}", self.bank, self.slot)
    }
}

/// A single-use transfer instruction
///
/// Deliberately not `Clone`: depositing moves the cheque into the bank.
#[derive(Debug, PartialEq)]
pub struct Cheque {
    serial: u64,
    drawer: AccountId,
    drawer_holder: AgentId,
    payee: AgentId,
    amount: i64,
    issued_period: usize,
}

impl Cheque {
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn drawer(&self) -> AccountId {
        self.drawer
    }

    pub fn drawer_holder(&self) -> AgentId {
        self.drawer_holder
    }

    pub fn payee(&self) -> AgentId {
        self.payee
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn issued_period(&self) -> usize {
        self.issued_period
    }
}

/// An outstanding loan
///
/// Interest and amortization schedules are not computed here; `term` is
/// recorded for an external amortization process that calls `Banks::repay`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub principal: i64,
    pub outstanding: i64,
    pub term: usize,
    pub collateralized: bool,
    pub issued_period: usize,
}

/// A deposit account, owned by exactly one holder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    holder: AgentId,
    balance: Amount,
    debt: Amount,
    loans: Vec<Loan>,
}

impl Account {
    fn new(id: AccountId, holder: AgentId) -> Self {
        Self {
            id,
            holder,
            balance: Amount::zero(),
            debt: Amount::zero(),
            loans: Vec::new(),
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn holder(&self) -> AgentId {
        self.holder
    }

    pub fn balance(&self) -> i64 {
        self.balance.value()
    }

    pub fn debt(&self) -> i64 {
        self.debt.value()
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    fn debit(&mut self, amount: i64) -> Result<(), BankError> {
        if amount > self.balance.value() {
            return Err(BankError::InsufficientFunds {
                account: self.id,
                required: amount,
                available: self.balance.value(),
            });
        }
        self.balance.minus(amount)?;
        Ok(())
    }
}

/// A bank: sole creator and keeper of its accounts
///
/// # Example
/// ```
/// use macro_simulator_core_rs::{AgentId, Bank, Banks};
///
/// let mut banks = Banks::new(vec![Bank::new(0, true)]);
/// let firm = banks.open_account(0, AgentId::firm(0)).unwrap();
/// let worker = banks.open_account(0, AgentId::worker(0)).unwrap();
///
/// banks.borrow(firm, 100, 12, false, 1).unwrap();
/// let cheque = banks.issue_cheque(firm, AgentId::worker(0), 30, 1).unwrap();
/// assert_eq!(banks.balance(firm).unwrap(), 70);
///
/// banks.deposit(worker, cheque).unwrap();
/// assert_eq!(banks.balance(worker).unwrap(), 30);
/// assert_eq!(banks.total_money(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct Bank {
    id: AgentId,
    accounts: Vec<Account>,
    holders: BTreeMap<AgentId, usize>,
    lending_enabled: bool,

    /// Serial of the next cheque drawn on this bank
    next_serial: u64,

    /// Money created by lending
    lent: i64,

    /// Money destroyed by repayment
    repaid: i64,

    /// Net interbank position from cross-bank deposits
    clearing: i64,

    /// Total of issued, not yet deposited cheques drawn on this bank
    outstanding: i64,

    dataset: AgentDataset,
}

impl Bank {
    pub fn new(index: usize, lending_enabled: bool) -> Self {
        Self {
            id: AgentId::bank(index),
            accounts: Vec::new(),
            holders: BTreeMap::new(),
            lending_enabled,
            next_serial: 1,
            lent: 0,
            repaid: 0,
            clearing: 0,
            outstanding: 0,
            dataset: AgentDataset::new(),
        }
    }

    /// Reads `lending.enabled` (default true)
    pub fn from_params(index: usize, params: &Parameters) -> Result<Self, ConfigError> {
        Ok(Self::new(index, params.get_bool_or("lending.enabled", true)?))
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn lending_enabled(&self) -> bool {
        self.lending_enabled
    }

    pub fn total_deposits(&self) -> i64 {
        self.accounts.iter().map(Account::balance).sum()
    }

    pub fn total_debt(&self) -> i64 {
        self.accounts.iter().map(Account::debt).sum()
    }

    pub fn total_lent(&self) -> i64 {
        self.lent
    }

    pub fn total_repaid(&self) -> i64 {
        self.repaid
    }

    pub fn clearing(&self) -> i64 {
        self.clearing
    }

    pub fn outstanding_cheques(&self) -> i64 {
        self.outstanding
    }

    /// Open a zero-balance account; one account per holder
    pub fn open_account(&mut self, holder: AgentId) -> Result<AccountId, BankError> {
        if self.holders.contains_key(&holder) {
            return Err(BankError::DuplicateAccount {
                holder,
                bank: self.id,
            });
        }
        let id = AccountId {
            bank: self.id.index,
            slot: self.accounts.len(),
        };
        self.accounts.push(Account::new(id, holder));
        self.holders.insert(holder, id.slot);
        Ok(id)
    }

    /// Account held by `holder` at this bank
    pub fn account_of(&self, holder: AgentId) -> Option<&Account> {
        self.holders.get(&holder).map(|&slot| &self.accounts[slot])
    }

    fn account_mut(&mut self, id: AccountId) -> Result<&mut Account, BankError> {
        self.accounts
            .get_mut(id.slot)
            .filter(|account| account.id == id)
            .ok_or(BankError::UnknownAccount { account: id })
    }

    /// Verify Σ balances + outstanding = lent − repaid + clearing
    pub fn check_conservation(&self) -> Result<(), AccountingError> {
        let actual = self.total_deposits() + self.outstanding;
        let expected = self.lent - self.repaid + self.clearing;
        if actual != expected {
            return Err(AccountingError::MoneyNotConserved { expected, actual });
        }
        Ok(())
    }

    pub fn open(&mut self, period: usize) {
        self.dataset.open(period);
    }

    pub fn close(&mut self) {
        self.dataset.put(keys::COUNT, 1.0);
        self.dataset.put(keys::ACCOUNTS, self.accounts.len() as f64);
        self.dataset.put(keys::DEPOSITS, self.total_deposits() as f64);
        self.dataset.put(keys::LOANS, self.total_debt() as f64);
        self.dataset.put(keys::CLEARING, self.clearing as f64);
        self.dataset.close();
    }

    pub fn dataset(&self) -> &AgentDataset {
        &self.dataset
    }

    /// Bank balance sheet total: loans outstanding plus interbank claims
    pub fn asset_total_value(&self) -> i64 {
        self.total_debt() + self.clearing.max(0)
    }
}

/// All banks of the economy, routing operations by `AccountId::bank`
#[derive(Debug, Clone, Default)]
pub struct Banks {
    banks: Vec<Bank>,
}

impl Banks {
    pub fn new(banks: Vec<Bank>) -> Self {
        Self { banks }
    }

    /// Add a bank; its index must equal its position
    pub fn push(&mut self, bank: Bank) -> usize {
        assert_eq!(bank.id().index, self.banks.len(), "bank index out of order");
        self.banks.push(bank);
        self.banks.len() - 1
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bank> {
        self.banks.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Bank> {
        self.banks.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bank> {
        self.banks.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Bank> {
        self.banks.iter_mut()
    }

    pub fn open_account(&mut self, bank: usize, holder: AgentId) -> Result<AccountId, BankError> {
        let target = self.banks.get_mut(bank).ok_or(BankError::UnknownAccount {
            account: AccountId { bank, slot: 0 },
        })?;
        target.open_account(holder)
    }

    pub fn account(&self, id: AccountId) -> Result<&Account, BankError> {
        self.banks
            .get(id.bank)
            .and_then(|bank| bank.accounts.get(id.slot))
            .ok_or(BankError::UnknownAccount { account: id })
    }

    fn account_mut(&mut self, id: AccountId) -> Result<&mut Account, BankError> {
        self.banks
            .get_mut(id.bank)
            .ok_or(BankError::UnknownAccount { account: id })?
            .account_mut(id)
    }

    pub fn balance(&self, id: AccountId) -> Result<i64, BankError> {
        Ok(self.account(id)?.balance())
    }

    pub fn debt(&self, id: AccountId) -> Result<i64, BankError> {
        Ok(self.account(id)?.debt())
    }

    /// Draw a cheque, debiting the drawer immediately
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount <= 0`
    /// - `InsufficientFunds` if `amount` exceeds the balance (no state change)
    pub fn issue_cheque(
        &mut self,
        drawer: AccountId,
        payee: AgentId,
        amount: i64,
        period: usize,
    ) -> Result<Cheque, BankError> {
        if amount <= 0 {
            return Err(BankError::InvalidAmount { amount });
        }
        let account = self.account_mut(drawer)?;
        account.debit(amount)?;
        let drawer_holder = account.holder;

        let bank = &mut self.banks[drawer.bank];
        bank.outstanding += amount;
        let serial = bank.next_serial;
        bank.next_serial += 1;

        log::trace!(
            "cheque {} drawn on {} by {} to {}: {}",
            serial,
            drawer,
            drawer_holder,
            payee,
            amount
        );

        Ok(Cheque {
            serial,
            drawer,
            drawer_holder,
            payee,
            amount,
            issued_period: period,
        })
    }

    /// Credit `account` with a cheque, consuming it
    ///
    /// Returns the credited amount.
    pub fn deposit(&mut self, account: AccountId, cheque: Cheque) -> Result<i64, BankError> {
        let holder = self.account(account)?.holder();
        if holder != cheque.payee {
            return Err(BankError::WrongPayee {
                payee: cheque.payee,
                holder,
            });
        }
        if self.banks.get(cheque.drawer.bank).is_none() {
            return Err(BankError::UnknownAccount {
                account: cheque.drawer,
            });
        }

        let amount = cheque.amount;
        self.account_mut(account)?.balance.plus(amount);

        let drawer_bank = &mut self.banks[cheque.drawer.bank];
        drawer_bank.outstanding -= amount;
        if cheque.drawer.bank != account.bank {
            drawer_bank.clearing -= amount;
            self.banks[account.bank].clearing += amount;
        }
        Ok(amount)
    }

    /// Lend `amount` to `account`: balance and debt increase together
    pub fn borrow(
        &mut self,
        account: AccountId,
        amount: i64,
        term: usize,
        collateralized: bool,
        period: usize,
    ) -> Result<(), BankError> {
        if amount <= 0 {
            return Err(BankError::InvalidAmount { amount });
        }
        let bank = self
            .banks
            .get(account.bank)
            .ok_or(BankError::UnknownAccount { account })?;
        if !bank.lending_enabled {
            return Err(BankError::BorrowingDisabled { account, amount });
        }

        let target = self.account_mut(account)?;
        target.balance.plus(amount);
        target.debt.plus(amount);
        target.loans.push(Loan {
            principal: amount,
            outstanding: amount,
            term,
            collateralized,
            issued_period: period,
        });
        self.banks[account.bank].lent += amount;
        Ok(())
    }

    /// Amortization hook: repay `amount`, destroying that money
    ///
    /// Oldest loans are repaid first.
    pub fn repay(&mut self, account: AccountId, amount: i64) -> Result<(), BankError> {
        if amount <= 0 {
            return Err(BankError::InvalidAmount { amount });
        }
        let target = self.account_mut(account)?;
        if amount > target.debt.value() {
            return Err(BankError::RepaymentExceedsDebt {
                account,
                amount,
                debt: target.debt.value(),
            });
        }
        target.debit(amount)?;
        target.debt.minus(amount)?;

        let mut left = amount;
        for loan in target.loans.iter_mut() {
            let part = left.min(loan.outstanding);
            loan.outstanding -= part;
            left -= part;
            if left == 0 {
                break;
            }
        }
        target.loans.retain(|loan| loan.outstanding > 0);

        self.banks[account.bank].repaid += amount;
        Ok(())
    }

    /// Σ balances + outstanding cheques over all banks
    pub fn total_money(&self) -> i64 {
        self.banks
            .iter()
            .map(|bank| bank.total_deposits() + bank.outstanding)
            .sum()
    }

    pub fn total_debt(&self) -> i64 {
        self.banks.iter().map(Bank::total_debt).sum()
    }

    /// Check every bank's invariant and the system-wide one
    pub fn check_conservation(&self) -> Result<(), AccountingError> {
        for bank in &self.banks {
            bank.check_conservation()?;
        }
        let created: i64 = self.banks.iter().map(|b| b.lent - b.repaid).sum();
        let total = self.total_money();
        if total != created {
            return Err(AccountingError::MoneyNotConserved {
                expected: created,
                actual: total,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_accounts() -> (Banks, AccountId, AccountId) {
        let mut banks = Banks::new(vec![Bank::new(0, true)]);
        let a = banks.open_account(0, AgentId::firm(0)).unwrap();
        let b = banks.open_account(0, AgentId::shareholder(0)).unwrap();
        (banks, a, b)
    }

    #[test]
    fn test_duplicate_account_rejected() {
        let mut bank = Bank::new(0, true);
        bank.open_account(AgentId::firm(1)).unwrap();
        assert_eq!(
            bank.open_account(AgentId::firm(1)),
            Err(BankError::DuplicateAccount {
                holder: AgentId::firm(1),
                bank: AgentId::bank(0)
            })
        );
    }

    #[test]
    fn test_issue_without_funds_leaves_state_unchanged() {
        let (mut banks, a, _) = two_accounts();
        banks.borrow(a, 10, 12, false, 1).unwrap();
        let result = banks.issue_cheque(a, AgentId::shareholder(0), 11, 1);
        assert!(matches!(result, Err(BankError::InsufficientFunds { .. })));
        assert_eq!(banks.balance(a).unwrap(), 10);
        assert_eq!(banks.get(0).unwrap().outstanding_cheques(), 0);
    }

    #[test]
    fn test_outstanding_cheque_counts_as_money() {
        let (mut banks, a, b) = two_accounts();
        banks.borrow(a, 50, 12, false, 1).unwrap();
        let cheque = banks.issue_cheque(a, AgentId::shareholder(0), 20, 1).unwrap();
        assert_eq!(banks.total_money(), 50);
        banks.check_conservation().unwrap();

        banks.deposit(b, cheque).unwrap();
        assert_eq!(banks.get(0).unwrap().outstanding_cheques(), 0);
        banks.check_conservation().unwrap();
    }

    #[test]
    fn test_wrong_payee_rejected() {
        let (mut banks, a, _) = two_accounts();
        banks.borrow(a, 50, 12, false, 1).unwrap();
        let cheque = banks.issue_cheque(a, AgentId::worker(9), 20, 1).unwrap();
        let own = banks.open_account(0, AgentId::worker(3)).unwrap();
        assert!(matches!(
            banks.deposit(own, cheque),
            Err(BankError::WrongPayee { .. })
        ));
    }

    #[test]
    fn test_borrowing_disabled() {
        let mut banks = Banks::new(vec![Bank::new(0, false)]);
        let a = banks.open_account(0, AgentId::firm(0)).unwrap();
        assert_eq!(
            banks.borrow(a, 5, 12, false, 1),
            Err(BankError::BorrowingDisabled {
                account: a,
                amount: 5
            })
        );
    }

    #[test]
    fn test_repay_destroys_money_oldest_loan_first() {
        let (mut banks, a, _) = two_accounts();
        banks.borrow(a, 30, 12, false, 1).unwrap();
        banks.borrow(a, 20, 6, true, 2).unwrap();
        banks.repay(a, 35).unwrap();

        let account = banks.account(a).unwrap();
        assert_eq!(account.balance(), 15);
        assert_eq!(account.debt(), 15);
        assert_eq!(account.loans().len(), 1);
        assert_eq!(account.loans()[0].outstanding, 15);
        assert!(account.loans()[0].collateralized);
        assert_eq!(banks.total_money(), 15);
        banks.check_conservation().unwrap();
    }

    #[test]
    fn test_cross_bank_deposit_moves_clearing() {
        let mut banks = Banks::new(vec![Bank::new(0, true), Bank::new(1, true)]);
        let a = banks.open_account(0, AgentId::firm(0)).unwrap();
        let b = banks.open_account(1, AgentId::worker(0)).unwrap();
        banks.borrow(a, 40, 12, false, 1).unwrap();
        let cheque = banks.issue_cheque(a, AgentId::worker(0), 40, 1).unwrap();
        banks.deposit(b, cheque).unwrap();

        assert_eq!(banks.get(0).unwrap().clearing(), -40);
        assert_eq!(banks.get(1).unwrap().clearing(), 40);
        banks.check_conservation().unwrap();
    }
}

//! CSV format handling for account and transfer files
//!
//! This module centralizes all CSV format concerns, providing:
//! - Record structures for deserialization
//! - Conversion from CSV records to domain types
//! - Account output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{Account, NewAccount};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// A domain value that can be read from one CSV row
pub trait CsvRow: Sized {
    /// Raw row layout as deserialized by `csv`
    type Raw: DeserializeOwned;

    /// Convert a raw row, describing what is wrong on failure
    fn from_raw(raw: Self::Raw) -> Result<Self, String>;
}

/// Opening account row: `account_number,owner_name,balance`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccountCsvRecord {
    pub account_number: String,
    pub owner_name: String,
    pub balance: String,
}

/// Transfer row: `from,to,amount`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TransferCsvRecord {
    pub from: String,
    pub to: String,
    pub amount: String,
}

/// A transfer read from CSV, not yet validated by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRow {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
}

fn parse_amount(field: &str, value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|_| format!("Invalid {} '{}'", field, value))
}

/// Convert an AccountCsvRecord to a NewAccount
///
/// Fails if the balance is not a decimal, is negative, or the account number
/// is blank.
pub fn convert_account_record(record: AccountCsvRecord) -> Result<NewAccount, String> {
    let balance = parse_amount("balance", &record.balance)?;
    let account = NewAccount::new(
        record.account_number.trim(),
        record.owner_name.trim(),
        balance,
    );
    account.validate().map_err(|e| e.to_string())?;
    Ok(account)
}

/// Convert a TransferCsvRecord to a TransferRow
///
/// Only the amount syntax is checked here; business validation (positive
/// amount, distinct accounts) is the engine's job so that such rows are
/// reported as rejected transfers.
pub fn convert_transfer_record(record: TransferCsvRecord) -> Result<TransferRow, String> {
    let amount = parse_amount("amount", &record.amount)?;
    Ok(TransferRow {
        from: record.from.trim().to_string(),
        to: record.to.trim().to_string(),
        amount,
    })
}

impl CsvRow for NewAccount {
    type Raw = AccountCsvRecord;

    fn from_raw(raw: Self::Raw) -> Result<Self, String> {
        convert_account_record(raw)
    }
}

impl CsvRow for TransferRow {
    type Raw = TransferCsvRecord;

    fn from_raw(raw: Self::Raw) -> Result<Self, String> {
        convert_transfer_record(raw)
    }
}

/// Write account states to CSV format
///
/// Writes accounts with columns: id, account_number, owner_name, balance, version.
/// Accounts are sorted by account number for deterministic output; balances
/// keep their full decimal precision.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["id", "account_number", "owner_name", "balance", "version"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by(|a, b| a.account_number.cmp(&b.account_number));

    for account in sorted_accounts {
        writer
            .write_record(&[
                account.id.to_string(),
                account.account_number,
                account.owner_name,
                account.balance.to_string(),
                account.version.to_string(),
            ])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

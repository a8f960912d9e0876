//! Transaction ledger types

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of stock movement recorded in the transaction ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Withdraw,
    Return,
    Consumed,
    Register,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Withdraw => "withdraw",
            TransactionType::Return => "return",
            TransactionType::Consumed => "consumed",
            TransactionType::Register => "register",
        }
    }
}

impl FromStr for TransactionType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "withdraw" => Ok(TransactionType::Withdraw),
            "return" => Ok(TransactionType::Return),
            "consumed" => Ok(TransactionType::Consumed),
            "register" => Ok(TransactionType::Register),
            _ => Err("unknown transaction type"),
        }
    }
}

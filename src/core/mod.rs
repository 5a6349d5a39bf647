pub mod counterparty;
pub mod ledger;
pub mod transaction;

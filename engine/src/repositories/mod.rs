pub mod ledger;

pub use ledger::{BalanceLedgerTrait, InMemoryLedger};
#[cfg(test)]
pub use ledger::MockBalanceLedgerTrait;

//! # furrow-host: Contract host over a RocksDB ledger.
//!
//! Wires the farming engine to a persistent ledger:
//! - [`records`] - fixed-layout method arguments, state records and keys
//! - [`storage::RocksKvStore`] - persistent contract records backed by RocksDB
//! - [`contract::DaoContract`] - loads, runs and commits one invocation
//! - [`config::HostConfig`] - host configuration

pub mod config;
pub mod contract;
pub mod records;
pub mod storage;

pub use config::HostConfig;
pub use contract::{DaoContract, FundsMove, Receipt};
pub use records::{ContractState, Method, UpdatePositionArgs};
pub use storage::RocksKvStore;

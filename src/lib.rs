//! Simple to use cli for keeping track of a newborn's day. Feedings and
//! diaper changes land in timestamped logs, a checkmark remembers the daily
//! vitamin, and everything is stored as plain json files so nothing is lost
//! between invocations.
//!

pub mod cli;
pub mod storage;
pub mod tracker;
pub mod utils;

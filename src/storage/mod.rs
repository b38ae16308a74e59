//!  Storage is organized through [slot_storage::SlotStorageImpl].
//!  The basic idea is:
//!   - There is a directory with one json file per persisted slot.
//!   - The feeding and diaper logs are arrays of id plus instant objects.
//!   - The vitamin checkmarks are a date to bool map, the feeding interval is
//!     a bare integer.
//!   - Loading never fails on bad content, a slot that cannot be read as its
//!     expected shape falls back to that slot's default.

pub mod entities;
pub mod slot_storage;

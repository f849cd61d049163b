// RKSOK — Store Module
//
// Phonebook storage behind the `PhonebookStore` capability trait. Backends:
// SQLite, a directory of text files, and an in-memory map.

mod db;
mod error;
mod files;
mod memory;
mod repository;

pub use db::Database;
pub use error::StoreError;
pub use files::FilePhonebookStore;
pub use memory::MemoryPhonebookStore;
pub use repository::{Capability, PhonebookStore, ReadOnlyStore, SqlitePhonebookStore};

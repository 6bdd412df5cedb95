//! Blood bank data management.
//!
//! Banks, donors and blood requests are kept as whole JSON documents in a
//! key-value store. On top of that sit an append-only audit trail per bank,
//! inventory reconciliation, a small ring of backups taken before every
//! merge, and a merge-import that unions exported data into an existing
//! store.
//!
//! ```
//! use bloodbank::{Store, domain::{BloodGroup, Inventory, NewBank}};
//!
//! let mut store = Store::in_memory();
//! let bank = store
//!     .add_bank(NewBank {
//!         name: "City Blood Bank".to_string(),
//!         city: Some("New Delhi".to_string()),
//!         inventory: Some(Inventory::default().with(BloodGroup::OPositive, 8)),
//!     })
//!     .unwrap();
//!
//! let drawn = store.fulfill_from_bank(&bank.id, BloodGroup::OPositive, 5).unwrap();
//! assert_eq!(drawn.remaining(), 3);
//! ```

pub mod domain;
pub use domain::{BloodGroup, Config, Id};

/// Key-value persistence for the record stores.
pub mod storage;

mod error;
pub use error::{Error, Result};

mod store;
pub use store::{Fulfillment, MergeReport, Stats, Store};

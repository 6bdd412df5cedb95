//! Domain models for blood bank management.
//!
//! This module contains the record types (banks, donors, requests), the
//! audit and backup structures, and configuration.

mod audit;
pub use audit::{AuditAction, AuditEntry, AuditLog};

mod bank;
pub use bank::{Bank, NewBank};

/// Blood groups and fixed-domain per-group stock.
pub mod blood_group;
pub use blood_group::{BloodGroup, GroupTotals, Inventory, UnknownBloodGroup};

mod config;
pub use config::Config;

mod dataset;
pub use dataset::{BackupEntry, BackupRing, Dataset, MAX_BACKUPS, Meta};

mod donor;
pub use donor::{Availability, Donor, NewDonor};

mod id;
pub use id::{Id, IdKind};

mod lenient;
pub use lenient::coerce_units;

mod request;
pub use request::{NewRequest, Request, RequestStatus};

/// Required-field validation for new records.
pub mod validation;
pub use validation::{FieldError, ValidationErrors};

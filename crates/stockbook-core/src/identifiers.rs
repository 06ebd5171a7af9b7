//! Core identifier types used across the Stockbook platform
//!
//! Every persisted entity is keyed by an auto-increment integer id assigned
//! by the storage layer. The newtypes below keep the id spaces apart at the
//! type level so a certificate id can never be passed where a shareholder
//! id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw storage id
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw id value
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// Company identifier
    ///
    /// Identifies an issuer profile. Owns shareholders, share classes,
    /// transactions, and depository requests.
    CompanyId,
    "company"
);

entity_id!(
    /// Shareholder identifier
    ShareholderId,
    "shareholder"
);

entity_id!(
    /// Share class identifier (common, preferred, etc.)
    ShareClassId,
    "class"
);

entity_id!(
    /// Holding identifier for a book-entry position
    HoldingId,
    "holding"
);

entity_id!(
    /// Certificate identifier for a physical-record share block
    CertificateId,
    "certificate"
);

entity_id!(
    /// Transaction identifier
    TransactionId,
    "transaction"
);

entity_id!(
    /// DTC/DWAC request identifier
    DtcRequestId,
    "dtc"
);

entity_id!(
    /// Invitation identifier
    ///
    /// The id is distinct from the opaque acceptance token; the token
    /// rotates on resend, the id never changes.
    InvitationId,
    "invitation"
);

entity_id!(
    /// User account identifier
    UserId,
    "user"
);

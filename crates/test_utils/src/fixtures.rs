//! Test Data Fixtures
//!
//! Pre-built values for the entities the identity tests work with. Fixtures
//! keep the individual tests focused on the behaviour under test instead of
//! setup noise.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use core_kernel::{DistrictId, RoleId, UserId, VillageId};

/// Temporal anchors shared by the test suite
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The instant every deterministic test clock starts at
    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    /// A later instant for revision scenarios
    pub fn later() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap()
    }
}

/// Common string values
pub struct StringFixtures;

impl StringFixtures {
    pub fn login_name() -> &'static str {
        "jdoe"
    }

    pub fn officer_code() -> &'static str {
        "EO0042"
    }

    pub fn claim_admin_code() -> &'static str {
        "CA0007"
    }

    pub fn email() -> &'static str {
        "jdoe@example.org"
    }

    pub fn password_hash() -> &'static str {
        "$argon2id$v=19$m=65536,t=3,p=4$c2FsdA$aGFzaA"
    }
}

/// Identifier pools
///
/// `nth_*` variants derive stable identifiers from an index, which keeps
/// property-based tests deterministic across runs.
pub struct IdFixtures;

impl IdFixtures {
    pub fn audit_user() -> UserId {
        UserId::from_uuid(Uuid::from_u128(0xAAAA_0000_0000_0001))
    }

    pub fn nth_role(n: u8) -> RoleId {
        RoleId::from_uuid(Uuid::from_u128(0x0A00_0000_0000_0000 + n as u128))
    }

    pub fn nth_district(n: u8) -> DistrictId {
        DistrictId::from_uuid(Uuid::from_u128(0x0B00_0000_0000_0000 + n as u128))
    }

    pub fn nth_village(n: u8) -> VillageId {
        VillageId::from_uuid(Uuid::from_u128(0x0C00_0000_0000_0000 + n as u128))
    }
}

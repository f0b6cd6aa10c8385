//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. These builders allow tests to specify only the relevant fields
//! while using defaults for everything else.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use core_kernel::{Clock, FixedClock, KindRegistry, RoleId, VillageId};
use domain_identity::ports::mock::MemoryIdentityStore;
use domain_identity::{FieldData, IdentityStore, UserService};

use crate::fixtures::{IdFixtures, StringFixtures, TemporalFixtures};

/// Builder for interactive-user upsert field data
pub struct InteractiveUserDataBuilder {
    login_name: String,
    roles: Option<Vec<RoleId>>,
    phone: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

impl Default for InteractiveUserDataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractiveUserDataBuilder {
    /// Creates a builder with default values
    pub fn new() -> Self {
        Self {
            login_name: StringFixtures::login_name().to_string(),
            roles: Some(vec![IdFixtures::nth_role(0)]),
            phone: Some("555-0001".to_string()),
            email: Some(StringFixtures::email().to_string()),
            password: None,
        }
    }

    /// Sets the login name
    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login_name = login.into();
        self
    }

    /// Sets the role list
    pub fn with_roles(mut self, roles: Vec<RoleId>) -> Self {
        self.roles = Some(roles);
        self
    }

    /// Omits the role list entirely (contract-violation scenarios)
    pub fn without_roles(mut self) -> Self {
        self.roles = None;
        self
    }

    /// Sets the phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Supplies an already-hashed password
    pub fn with_password(mut self, hash: impl Into<String>) -> Self {
        self.password = Some(hash.into());
        self
    }

    /// Builds the field data
    pub fn build(self) -> FieldData {
        let mut data = FieldData::new();
        data.insert("username", json!(self.login_name));
        data.insert("other_names", json!("Jane"));
        data.insert("last_name", json!("Doe"));
        if let Some(phone) = self.phone {
            data.insert("phone_number", json!(phone));
        }
        if let Some(email) = self.email {
            data.insert("email", json!(email));
        }
        if let Some(roles) = self.roles {
            data.insert("roles", json!(id_strings(&roles)));
        }
        if let Some(password) = self.password {
            data.insert("password", json!(password));
        }
        data
    }
}

/// Builder for officer upsert field data
pub struct OfficerDataBuilder {
    code: String,
    phone: Option<String>,
    villages: Option<Vec<VillageId>>,
}

impl Default for OfficerDataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OfficerDataBuilder {
    /// Creates a builder with default values
    pub fn new() -> Self {
        Self {
            code: StringFixtures::officer_code().to_string(),
            phone: Some("555-0002".to_string()),
            villages: None,
        }
    }

    /// Sets the officer code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the village list
    pub fn with_villages(mut self, villages: Vec<VillageId>) -> Self {
        self.villages = Some(villages);
        self
    }

    /// Builds the field data
    pub fn build(self) -> FieldData {
        let mut data = FieldData::new();
        data.insert("username", json!(self.code));
        data.insert("other_names", json!("Olive"));
        data.insert("last_name", json!("Field"));
        data.insert("birth_date", json!("1988-03-09"));
        data.insert("address", json!("12 Market Road"));
        if let Some(phone) = self.phone {
            data.insert("phone_number", json!(phone));
        }
        if let Some(villages) = self.villages {
            data.insert("village_ids", json!(id_strings(&villages)));
        }
        data
    }
}

/// Builder for claim-admin upsert field data
pub struct ClaimAdminDataBuilder {
    code: String,
    email: Option<String>,
}

impl Default for ClaimAdminDataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimAdminDataBuilder {
    /// Creates a builder with default values
    pub fn new() -> Self {
        Self {
            code: StringFixtures::claim_admin_code().to_string(),
            email: Some("ca@example.org".to_string()),
        }
    }

    /// Sets the claim-admin code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Builds the field data
    pub fn build(self) -> FieldData {
        let mut data = FieldData::new();
        data.insert("username", json!(self.code));
        data.insert("other_names", json!("Carl"));
        data.insert("last_name", json!("Adjudicator"));
        if let Some(email) = self.email {
            data.insert("email", json!(email));
        }
        data
    }
}

fn id_strings<T: Copy + Into<uuid::Uuid>>(ids: &[T]) -> Vec<Value> {
    ids.iter()
        .map(|&id| {
            let uuid: uuid::Uuid = id.into();
            json!(uuid.to_string())
        })
        .collect()
}

/// A fully wired identity service over the in-memory store
pub struct TestServiceHarness {
    pub service: UserService,
    pub store: Arc<MemoryIdentityStore>,
    pub clock: Arc<FixedClock>,
    pub kinds: Arc<KindRegistry>,
}

/// Builder for [`TestServiceHarness`]
pub struct TestServiceBuilder {
    claim_module: bool,
    start: DateTime<Utc>,
}

impl Default for TestServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestServiceBuilder {
    /// Creates a builder for a deployment with every module loaded
    pub fn new() -> Self {
        Self {
            claim_module: true,
            start: TemporalFixtures::epoch(),
        }
    }

    /// Simulates a deployment without the claim module
    pub fn without_claim_module(mut self) -> Self {
        self.claim_module = false;
        self
    }

    /// Pins the test clock at the given instant
    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    /// Builds the harness
    pub fn build(self) -> TestServiceHarness {
        crate::init_tracing();

        let store = Arc::new(MemoryIdentityStore::new());
        let kinds = Arc::new(KindRegistry::with_core_kinds());
        if self.claim_module {
            kinds.register("claim", "claim_admin");
        }
        let clock = Arc::new(FixedClock::at(self.start));

        let service = UserService::new(
            Arc::clone(&store) as Arc<dyn IdentityStore>,
            Arc::clone(&kinds),
            Arc::clone(&clock) as Arc<dyn Clock>,
        )
        .expect("standard field catalog must validate");

        TestServiceHarness {
            service,
            store,
            clock,
            kinds,
        }
    }
}

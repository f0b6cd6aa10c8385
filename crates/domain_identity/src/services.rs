//! Identity domain services
//!
//! This module contains the service orchestrating identity writes: the
//! upsert of versioned profiles, the reconciliation of their many-valued
//! assignments, and the linking of resolved profiles to accounts.
//!
//! Each call runs to completion within one caller request against the
//! store; there is no cross-request coordination. Failures propagate
//! synchronously and nothing is retried. The expire-then-reinsert sequence
//! of an assignment sync is not atomic on its own; callers needing
//! atomicity wrap the call in a store-level transaction boundary.

use std::sync::Arc;

use tracing::{debug, instrument, warn};
use validator::Validate;

use core_kernel::{Clock, KindRegistry, RoleId, UserId, VillageId};

use crate::account::{Account, ProfileLinks};
use crate::assignment::{Assignment, AssignmentKind, AssignmentOwner, AssignmentTarget};
use crate::error::IdentityError;
use crate::fields::{FieldCatalog, FieldData, PASSWORD_KEY, ROLES_KEY, VILLAGES_KEY};
use crate::ports::IdentityStore;
use crate::profile::{ClaimAdmin, InteractiveUser, Officer, ProfileKind, Versioned};

/// Service for identity record writes
///
/// Holds the store port, the kind registry of the running deployment, the
/// injected clock and the validated field catalog.
pub struct UserService {
    store: Arc<dyn IdentityStore>,
    kinds: Arc<KindRegistry>,
    clock: Arc<dyn Clock>,
    fields: FieldCatalog,
}

impl UserService {
    /// Creates a service with the standard field catalog
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the standard catalog fails validation;
    /// construction happens at process start so mapping mistakes surface
    /// before any upsert runs.
    pub fn new(
        store: Arc<dyn IdentityStore>,
        kinds: Arc<KindRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, IdentityError> {
        Ok(Self::with_catalog(store, kinds, clock, FieldCatalog::standard()?))
    }

    /// Creates a service with an explicit field catalog
    pub fn with_catalog(
        store: Arc<dyn IdentityStore>,
        kinds: Arc<KindRegistry>,
        clock: Arc<dyn Clock>,
        fields: FieldCatalog,
    ) -> Self {
        Self {
            store,
            kinds,
            clock,
            fields,
        }
    }

    // ========================================================================
    // Upsert engine
    // ========================================================================

    /// Creates or revises the interactive user owned by an account
    ///
    /// When `account_id` resolves to a currently-valid profile, its state is
    /// archived (copy-on-close) and the same logical entity continues with
    /// the mapped field values. Otherwise a new profile is created; a login
    /// name already held by a current row is rejected.
    ///
    /// The raw data must carry a non-empty `roles` list; the role
    /// assignments are synchronised on every call and the first role is
    /// denormalised onto the profile. A `password` value is stored verbatim
    /// (the hash is produced upstream); creation without one locks the
    /// login.
    ///
    /// # Returns
    ///
    /// The persisted profile and whether it was created
    #[instrument(skip(self, data))]
    pub async fn upsert_interactive_user(
        &self,
        account_id: Option<UserId>,
        data: &FieldData,
        audit_user_id: UserId,
        connected: bool,
    ) -> Result<(InteractiveUser, bool), IdentityError> {
        let roles: Vec<RoleId> = data
            .get_id_list(ROLES_KEY)?
            .filter(|roles| !roles.is_empty())
            .ok_or_else(|| {
                IdentityError::invalid_input(
                    "interactive-user upsert requires a non-empty role list",
                )
            })?;
        let subset = data.translate(self.fields.for_kind(ProfileKind::InteractiveUser));
        let now = self.clock.now();

        let existing = match account_id {
            Some(id) => self.store.find_current_interactive_user(id).await?,
            None => None,
        };

        let (mut user, created, snapshot) = match existing {
            Some(mut user) => {
                let snapshot = user.close_version(now)?;
                (user, false, Some(snapshot))
            }
            None => {
                let login = subset
                    .get_str("login_name")?
                    .ok_or_else(|| IdentityError::invalid_input("username is required"))?;
                if self.store.interactive_login_taken(login).await? {
                    return Err(IdentityError::duplicate(ProfileKind::InteractiveUser, login));
                }
                (
                    InteractiveUser::new(login, roles[0], audit_user_id, now),
                    true,
                    None,
                )
            }
        };

        apply_interactive_fields(&mut user, &subset)?;
        user.role_id = roles[0];
        user.is_associated = connected;
        user.audit_user_id = audit_user_id;
        if let Some(hash) = data.get_str(PASSWORD_KEY)? {
            user.set_password_hash(hash);
        }
        user.validate()
            .map_err(|e| IdentityError::invalid_input(e.to_string()))?;

        if let Some(snapshot) = snapshot {
            self.store.archive_interactive_user(snapshot).await?;
        }
        self.store.save_interactive_user(&user).await?;
        self.sync_user_roles(&user, &roles).await?;

        debug!(login_name = %user.login_name, created, "interactive user upserted");
        Ok((user, created))
    }

    /// Creates or revises the officer owned by an account
    ///
    /// Same resolution and versioning rules as the interactive-user upsert,
    /// keyed on the officer code. A non-empty `village_ids` list in the raw
    /// data additionally synchronises the officer's village assignments.
    #[instrument(skip(self, data))]
    pub async fn upsert_officer(
        &self,
        account_id: Option<UserId>,
        data: &FieldData,
        audit_user_id: UserId,
        connected: bool,
    ) -> Result<(Officer, bool), IdentityError> {
        let subset = data.translate(self.fields.for_kind(ProfileKind::Officer));
        let now = self.clock.now();

        let existing = match account_id {
            Some(id) => self.store.find_current_officer(id).await?,
            None => None,
        };

        let (mut officer, created, snapshot) = match existing {
            Some(mut officer) => {
                let snapshot = officer.close_version(now)?;
                (officer, false, Some(snapshot))
            }
            None => {
                let code = subset
                    .get_str("code")?
                    .ok_or_else(|| IdentityError::invalid_input("username is required"))?;
                if self.store.officer_code_taken(code).await? {
                    return Err(IdentityError::duplicate(ProfileKind::Officer, code));
                }
                (Officer::new(code, audit_user_id, now), true, None)
            }
        };

        apply_officer_fields(&mut officer, &subset)?;
        officer.has_login = connected;
        officer.audit_user_id = audit_user_id;
        officer
            .validate()
            .map_err(|e| IdentityError::invalid_input(e.to_string()))?;

        if let Some(snapshot) = snapshot {
            self.store.archive_officer(snapshot).await?;
        }
        self.store.save_officer(&officer).await?;

        if let Some(villages) = data.get_id_list::<VillageId>(VILLAGES_KEY)? {
            if !villages.is_empty() {
                self.sync_officer_villages(&officer, &villages).await?;
            }
        }

        debug!(code = %officer.code, created, "officer upserted");
        Ok((officer, created))
    }

    /// Creates or revises the claim admin owned by an account
    ///
    /// Claim admins belong to the claim module; if the kind is not in the
    /// deployment's registry the call fails with `UnsupportedKind` before
    /// touching the store.
    #[instrument(skip(self, data))]
    pub async fn upsert_claim_admin(
        &self,
        account_id: Option<UserId>,
        data: &FieldData,
        audit_user_id: UserId,
        connected: bool,
    ) -> Result<(ClaimAdmin, bool), IdentityError> {
        let kind_name = ProfileKind::ClaimAdmin.kind_name();
        if self.kinds.resolve(kind_name).is_none() {
            return Err(IdentityError::UnsupportedKind(kind_name.to_string()));
        }

        let subset = data.translate(self.fields.for_kind(ProfileKind::ClaimAdmin));
        let now = self.clock.now();

        let existing = match account_id {
            Some(id) => self.store.find_current_claim_admin(id).await?,
            None => None,
        };

        let (mut claim_admin, created, snapshot) = match existing {
            Some(mut claim_admin) => {
                let snapshot = claim_admin.close_version(now)?;
                (claim_admin, false, Some(snapshot))
            }
            None => {
                let code = subset
                    .get_str("code")?
                    .ok_or_else(|| IdentityError::invalid_input("username is required"))?;
                if self.store.claim_admin_code_taken(code).await? {
                    return Err(IdentityError::duplicate(ProfileKind::ClaimAdmin, code));
                }
                (ClaimAdmin::new(code, audit_user_id, now), true, None)
            }
        };

        apply_claim_admin_fields(&mut claim_admin, &subset)?;
        claim_admin.has_login = connected;
        claim_admin.audit_user_id = audit_user_id;
        claim_admin
            .validate()
            .map_err(|e| IdentityError::invalid_input(e.to_string()))?;

        if let Some(snapshot) = snapshot {
            self.store.archive_claim_admin(snapshot).await?;
        }
        self.store.save_claim_admin(&claim_admin).await?;

        debug!(code = %claim_admin.code, created, "claim admin upserted");
        Ok((claim_admin, created))
    }

    // ========================================================================
    // Assignment synchronizer
    // ========================================================================

    /// Reconciles the currently-valid assignment set of (owner, kind)
    ///
    /// Every current assignment is expired, then each requested target is
    /// upserted: an existing (owner, target) row is reactivated keeping its
    /// original validity start, a new target gets a fresh row. The final
    /// current set equals the deduplicated request; replaced targets stay in
    /// history as expired rows.
    #[instrument(skip(self, targets), fields(requested = targets.len()))]
    pub async fn sync_assignments(
        &self,
        owner: AssignmentOwner,
        kind: AssignmentKind,
        targets: &[AssignmentTarget],
    ) -> Result<(), IdentityError> {
        if !owner.supports(kind) {
            return Err(IdentityError::invalid_input(format!(
                "owner {owner} cannot hold {kind} assignments"
            )));
        }
        if let Some(bad) = targets.iter().find(|t| t.kind() != kind) {
            return Err(IdentityError::invalid_input(format!(
                "target {bad} does not belong to {kind} assignments"
            )));
        }

        let now = self.clock.now();
        let expired = self
            .store
            .expire_current_assignments(owner, kind, now)
            .await?;

        let mut seen = Vec::with_capacity(targets.len());
        for &target in targets {
            if seen.contains(&target) {
                continue;
            }
            seen.push(target);
            match self.store.find_assignment(owner, target).await? {
                Some(mut assignment) => {
                    assignment.reactivate();
                    self.store.save_assignment(assignment).await?;
                }
                None => {
                    self.store
                        .save_assignment(Assignment::new(owner, target, now))
                        .await?;
                }
            }
        }

        debug!(%owner, %kind, expired, kept = seen.len(), "assignments synchronized");
        Ok(())
    }

    /// Makes the user's currently-valid roles exactly `role_ids`
    pub async fn sync_user_roles(
        &self,
        user: &InteractiveUser,
        role_ids: &[RoleId],
    ) -> Result<(), IdentityError> {
        let targets: Vec<_> = role_ids.iter().copied().map(AssignmentTarget::Role).collect();
        self.sync_assignments(
            AssignmentOwner::InteractiveUser(user.id),
            AssignmentKind::UserRole,
            &targets,
        )
        .await
    }

    /// Makes the user's currently-valid districts exactly `district_ids`
    pub async fn sync_user_districts(
        &self,
        user: &InteractiveUser,
        district_ids: &[core_kernel::DistrictId],
    ) -> Result<(), IdentityError> {
        let targets: Vec<_> = district_ids
            .iter()
            .copied()
            .map(AssignmentTarget::District)
            .collect();
        self.sync_assignments(
            AssignmentOwner::InteractiveUser(user.id),
            AssignmentKind::UserDistrict,
            &targets,
        )
        .await
    }

    /// Makes the officer's currently-valid villages exactly `village_ids`
    pub async fn sync_officer_villages(
        &self,
        officer: &Officer,
        village_ids: &[VillageId],
    ) -> Result<(), IdentityError> {
        let targets: Vec<_> = village_ids
            .iter()
            .copied()
            .map(AssignmentTarget::Village)
            .collect();
        self.sync_assignments(
            AssignmentOwner::Officer(officer.id),
            AssignmentKind::OfficerVillage,
            &targets,
        )
        .await
    }

    // ========================================================================
    // Account linker
    // ========================================================================

    /// Creates an account or attaches profiles to an existing one
    ///
    /// With an explicit `account_id` the account must exist; the call
    /// intentionally fails otherwise, so clients cannot mint identifiers. A
    /// username differing from the stored one is reported and ignored;
    /// usernames are immutable once persisted.
    #[instrument(skip(self, links))]
    pub async fn link_account(
        &self,
        account_id: Option<UserId>,
        username: &str,
        links: ProfileLinks,
    ) -> Result<(Account, bool), IdentityError> {
        let (mut account, created) = match account_id {
            Some(id) => {
                let account = self
                    .store
                    .get_account(id)
                    .await?
                    .ok_or_else(|| IdentityError::not_found("Account", id))?;
                if account.username != username {
                    warn!(
                        account_id = %id,
                        stored = %account.username,
                        requested = %username,
                        "ignored attempt to change an account username; usernames are immutable"
                    );
                }
                (account, false)
            }
            None => (Account::new(username, self.clock.now()), true),
        };

        account.attach(&links);
        self.store.save_account(&account).await?;

        debug!(username = %account.username, created, "account linked");
        Ok((account, created))
    }
}

fn apply_interactive_fields(
    user: &mut InteractiveUser,
    fields: &FieldData,
) -> Result<(), IdentityError> {
    user.login_name = fields
        .get_string("login_name")?
        .ok_or_else(|| IdentityError::invalid_input("username is required"))?;
    user.other_names = fields.get_string("other_names")?;
    user.last_name = fields.get_string("last_name")?;
    user.phone = fields.get_string("phone")?;
    user.email = fields.get_string("email")?;
    user.language_id = fields.get_id("language_id")?;
    user.health_facility_id = fields.get_id("health_facility_id")?;
    Ok(())
}

fn apply_officer_fields(officer: &mut Officer, fields: &FieldData) -> Result<(), IdentityError> {
    officer.code = fields
        .get_string("code")?
        .ok_or_else(|| IdentityError::invalid_input("username is required"))?;
    officer.other_names = fields.get_string("other_names")?;
    officer.last_name = fields.get_string("last_name")?;
    officer.phone = fields.get_string("phone")?;
    officer.email = fields.get_string("email")?;
    officer.dob = fields.get_date("dob")?;
    officer.address = fields.get_string("address")?;
    officer.works_to = fields.get_datetime("works_to")?;
    officer.location_id = fields.get_id("location")?;
    officer.substitution_officer_id = fields.get_id("substitution_officer_id")?;
    Ok(())
}

fn apply_claim_admin_fields(
    claim_admin: &mut ClaimAdmin,
    fields: &FieldData,
) -> Result<(), IdentityError> {
    claim_admin.code = fields
        .get_string("code")?
        .ok_or_else(|| IdentityError::invalid_input("username is required"))?;
    claim_admin.other_names = fields.get_string("other_names")?;
    claim_admin.last_name = fields.get_string("last_name")?;
    claim_admin.phone = fields.get_string("phone")?;
    claim_admin.email_id = fields.get_string("email_id")?;
    claim_admin.dob = fields.get_date("dob")?;
    claim_admin.health_facility_id = fields.get_id("health_facility_id")?;
    Ok(())
}

//! Loosely-typed field data and per-kind field mapping
//!
//! Upsert callers (the request layer, bulk imports) supply record fields as
//! a loose name/value map. Each profile kind owns a fixed translation table
//! from the external field names of that surface to the kind's canonical
//! attribute names. Unknown external keys are ignored; missing keys are
//! treated as absent.
//!
//! The tables are explicit [`FieldMap`] values collected in a
//! [`FieldCatalog`] and validated once at process start, instead of ad hoc
//! dictionaries scattered through the upsert code.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::IdentityError;
use crate::profile::ProfileKind;

/// Raw key carrying the mandatory role list of an interactive-user upsert
pub const ROLES_KEY: &str = "roles";
/// Raw key carrying the optional village list of an officer upsert
pub const VILLAGES_KEY: &str = "village_ids";
/// Raw key carrying an already-hashed password for an interactive user
pub const PASSWORD_KEY: &str = "password";

/// A loose name/value field set
///
/// Wraps a JSON object; typed accessors convert values on demand and report
/// malformed ones as [`IdentityError::InvalidInput`]. JSON `null` and a
/// missing key are equivalent.
#[derive(Debug, Clone, Default)]
pub struct FieldData {
    values: Map<String, Value>,
}

impl FieldData {
    /// Creates an empty field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON object
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the value is not an object
    pub fn from_value(value: Value) -> Result<Self, IdentityError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(IdentityError::invalid_input(format!(
                "field data must be an object, got {other}"
            ))),
        }
    }

    /// Inserts a value under an external field name
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Returns true if the key is present with a non-null value
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(v) if !v.is_null())
    }

    /// Returns the raw value for a key, treating JSON null as absent
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    /// Returns a string value
    pub fn get_str(&self, key: &str) -> Result<Option<&str>, IdentityError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(IdentityError::invalid_input(format!(
                "field '{key}' must be a string, got {other}"
            ))),
        }
    }

    /// Returns an owned string value
    pub fn get_string(&self, key: &str) -> Result<Option<String>, IdentityError> {
        Ok(self.get_str(key)?.map(str::to_owned))
    }

    /// Returns an identifier value parsed from its string form
    pub fn get_id<T: From<Uuid>>(&self, key: &str) -> Result<Option<T>, IdentityError> {
        match self.get_str(key)? {
            None => Ok(None),
            Some(s) => {
                let uuid = Uuid::parse_str(s).map_err(|_| {
                    IdentityError::invalid_input(format!("field '{key}' is not a valid id: {s}"))
                })?;
                Ok(Some(T::from(uuid)))
            }
        }
    }

    /// Returns a list of identifiers
    pub fn get_id_list<T: From<Uuid>>(&self, key: &str) -> Result<Option<Vec<T>>, IdentityError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Array(items)) => {
                let mut ids = Vec::with_capacity(items.len());
                for item in items {
                    let s = item.as_str().ok_or_else(|| {
                        IdentityError::invalid_input(format!(
                            "field '{key}' must be a list of id strings"
                        ))
                    })?;
                    let uuid = Uuid::parse_str(s).map_err(|_| {
                        IdentityError::invalid_input(format!(
                            "field '{key}' contains an invalid id: {s}"
                        ))
                    })?;
                    ids.push(T::from(uuid));
                }
                Ok(Some(ids))
            }
            Some(other) => Err(IdentityError::invalid_input(format!(
                "field '{key}' must be a list, got {other}"
            ))),
        }
    }

    /// Returns a calendar date value (`YYYY-MM-DD`)
    pub fn get_date(&self, key: &str) -> Result<Option<NaiveDate>, IdentityError> {
        match self.get_str(key)? {
            None => Ok(None),
            Some(s) => s
                .parse()
                .map(Some)
                .map_err(|_| IdentityError::invalid_input(format!("field '{key}' is not a date: {s}"))),
        }
    }

    /// Returns a timestamp value (RFC 3339)
    pub fn get_datetime(&self, key: &str) -> Result<Option<DateTime<Utc>>, IdentityError> {
        match self.get_str(key)? {
            None => Ok(None),
            Some(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|_| {
                    IdentityError::invalid_input(format!("field '{key}' is not a timestamp: {s}"))
                }),
        }
    }

    /// Translates external field names to canonical attribute names
    ///
    /// Only mapped keys survive; unknown keys are dropped.
    pub fn translate(&self, map: &FieldMap) -> FieldData {
        let mut subset = Map::new();
        for mapping in map.entries() {
            if let Some(value) = self.get(mapping.external) {
                subset.insert(mapping.canonical.to_string(), value.clone());
            }
        }
        FieldData { values: subset }
    }
}

/// One external-name → canonical-attribute entry of a [`FieldMap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub external: &'static str,
    pub canonical: &'static str,
}

/// The translation table of one profile kind
#[derive(Debug, Clone)]
pub struct FieldMap {
    kind: ProfileKind,
    entries: Vec<FieldMapping>,
}

impl FieldMap {
    /// Builds a map, rejecting duplicate external or canonical names
    pub fn new(
        kind: ProfileKind,
        entries: &[(&'static str, &'static str)],
    ) -> Result<Self, IdentityError> {
        let mut seen_external: Vec<&'static str> = Vec::new();
        let mut seen_canonical: Vec<&'static str> = Vec::new();
        for &(external, canonical) in entries {
            if seen_external.contains(&external) {
                return Err(IdentityError::invalid_input(format!(
                    "duplicate external field '{external}' in {kind} field map"
                )));
            }
            if seen_canonical.contains(&canonical) {
                return Err(IdentityError::invalid_input(format!(
                    "duplicate canonical field '{canonical}' in {kind} field map"
                )));
            }
            seen_external.push(external);
            seen_canonical.push(canonical);
        }
        Ok(Self {
            kind,
            entries: entries
                .iter()
                .map(|&(external, canonical)| FieldMapping { external, canonical })
                .collect(),
        })
    }

    /// The profile kind this map belongs to
    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    /// The mapping entries
    pub fn entries(&self) -> &[FieldMapping] {
        &self.entries
    }
}

/// The validated field maps of all profile kinds
///
/// Constructed once at process start; construction fails on an invalid
/// table rather than surfacing mapping bugs during an upsert.
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    interactive_user: FieldMap,
    officer: FieldMap,
    claim_admin: FieldMap,
}

impl FieldCatalog {
    /// Builds the standard catalog
    pub fn standard() -> Result<Self, IdentityError> {
        Ok(Self {
            interactive_user: FieldMap::new(
                ProfileKind::InteractiveUser,
                &[
                    ("username", "login_name"),
                    ("other_names", "other_names"),
                    ("last_name", "last_name"),
                    ("phone_number", "phone"),
                    ("email", "email"),
                    ("language", "language_id"),
                    ("health_facility_id", "health_facility_id"),
                ],
            )?,
            officer: FieldMap::new(
                ProfileKind::Officer,
                &[
                    ("username", "code"),
                    ("other_names", "other_names"),
                    ("last_name", "last_name"),
                    ("phone_number", "phone"),
                    ("email", "email"),
                    ("birth_date", "dob"),
                    ("address", "address"),
                    ("works_to", "works_to"),
                    ("health_facility_id", "location"),
                    ("substitution_officer_id", "substitution_officer_id"),
                ],
            )?,
            claim_admin: FieldMap::new(
                ProfileKind::ClaimAdmin,
                &[
                    ("username", "code"),
                    ("other_names", "other_names"),
                    ("last_name", "last_name"),
                    ("phone_number", "phone"),
                    ("email", "email_id"),
                    ("birth_date", "dob"),
                    ("health_facility_id", "health_facility_id"),
                ],
            )?,
        })
    }

    /// The map for the given kind
    pub fn for_kind(&self, kind: ProfileKind) -> &FieldMap {
        match kind {
            ProfileKind::InteractiveUser => &self.interactive_user,
            ProfileKind::Officer => &self.officer,
            ProfileKind::ClaimAdmin => &self.claim_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use core_kernel::RoleId;

    #[test]
    fn test_standard_catalog_validates() {
        let catalog = FieldCatalog::standard().expect("standard catalog must validate");
        assert_eq!(
            catalog.for_kind(ProfileKind::Officer).kind(),
            ProfileKind::Officer
        );
    }

    #[test]
    fn test_duplicate_external_rejected() {
        let result = FieldMap::new(
            ProfileKind::Officer,
            &[("username", "code"), ("username", "login_name")],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_canonical_rejected() {
        let result = FieldMap::new(
            ProfileKind::Officer,
            &[("username", "code"), ("officer_code", "code")],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_translate_drops_unknown_keys() {
        let catalog = FieldCatalog::standard().unwrap();
        let data = FieldData::from_value(json!({
            "username": "alice",
            "phone_number": "555-0001",
            "shoe_size": 38,
        }))
        .unwrap();

        let subset = data.translate(catalog.for_kind(ProfileKind::InteractiveUser));
        assert_eq!(subset.get_str("login_name").unwrap(), Some("alice"));
        assert_eq!(subset.get_str("phone").unwrap(), Some("555-0001"));
        assert!(subset.get("shoe_size").is_none());
        assert!(subset.get("username").is_none());
    }

    #[test]
    fn test_null_is_absent() {
        let data = FieldData::from_value(json!({"email": null})).unwrap();
        assert!(!data.contains("email"));
        assert_eq!(data.get_str("email").unwrap(), None);
    }

    #[test]
    fn test_get_id_list() {
        let a = RoleId::new();
        let b = RoleId::new();
        let data = FieldData::from_value(json!({
            "roles": [a.as_uuid().to_string(), b.as_uuid().to_string()],
        }))
        .unwrap();

        let roles: Vec<RoleId> = data.get_id_list(ROLES_KEY).unwrap().unwrap();
        assert_eq!(roles, vec![a, b]);
    }

    #[test]
    fn test_get_id_list_rejects_malformed() {
        let data = FieldData::from_value(json!({"roles": ["not-a-uuid"]})).unwrap();
        let result: Result<Option<Vec<RoleId>>, _> = data.get_id_list(ROLES_KEY);
        assert!(result.is_err());
    }

    #[test]
    fn test_get_date() {
        let data = FieldData::from_value(json!({"birth_date": "1985-06-15"})).unwrap();
        let dob = data.get_date("birth_date").unwrap().unwrap();
        assert_eq!(dob.to_string(), "1985-06-15");
    }

    #[test]
    fn test_wrong_type_reported() {
        let data = FieldData::from_value(json!({"username": 42})).unwrap();
        assert!(data.get_str("username").is_err());
    }
}

//! Profile-Kind Registry
//!
//! This module provides a runtime registry of the record kinds available in
//! a deployment. Some profile kinds are defined by optional modules (the
//! claim module contributes the claim-admin kind), so the core cannot take a
//! compile-time dependency on them; instead each module registers its kinds
//! at process start and the core resolves them by name.
//!
//! Absence of a kind in the registry is a normal, checked condition
//! (the deployment does not ship the module) and is distinguishable
//! from the absence of a specific record.
//!
//! # Usage
//!
//! ```rust
//! use core_kernel::registry::KindRegistry;
//!
//! let registry = KindRegistry::new();
//! registry.register("claim", "claim_admin");
//!
//! assert!(registry.resolve("claim_admin").is_some());
//! assert!(registry.resolve("imaging_tech").is_none());
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

/// Registration entry for a record kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindRegistration {
    /// The module that contributed the kind
    pub module: String,
    /// The kind name used for resolution
    pub kind: String,
}

/// Runtime registry of record kinds, keyed by kind name
///
/// Populated once at process start by the modules present in the running
/// deployment; read-mostly afterwards.
#[derive(Debug, Default)]
pub struct KindRegistry {
    kinds: RwLock<HashMap<String, KindRegistration>>,
}

impl KindRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the kinds every deployment
    /// carries (the core module's own kinds)
    pub fn with_core_kinds() -> Self {
        let registry = Self::new();
        registry.register("core", "interactive_user");
        registry.register("core", "officer");
        registry
    }

    /// Registers a kind contributed by a module
    ///
    /// Re-registering the same kind name replaces the previous entry; the
    /// latest module to register wins.
    pub fn register(&self, module: impl Into<String>, kind: impl Into<String>) {
        let registration = KindRegistration {
            module: module.into(),
            kind: kind.into(),
        };
        let mut kinds = self.kinds.write().expect("registry lock poisoned");
        kinds.insert(registration.kind.clone(), registration);
    }

    /// Resolves a kind by name
    ///
    /// # Returns
    ///
    /// The registration if the kind is available in this deployment
    pub fn resolve(&self, kind: &str) -> Option<KindRegistration> {
        let kinds = self.kinds.read().expect("registry lock poisoned");
        kinds.get(kind).cloned()
    }

    /// Returns true if the kind is available in this deployment
    pub fn is_registered(&self, kind: &str) -> bool {
        let kinds = self.kinds.read().expect("registry lock poisoned");
        kinds.contains_key(kind)
    }

    /// Returns all registered kinds, sorted by name
    pub fn registrations(&self) -> Vec<KindRegistration> {
        let kinds = self.kinds.read().expect("registry lock poisoned");
        let mut all: Vec<_> = kinds.values().cloned().collect();
        all.sort_by(|a, b| a.kind.cmp(&b.kind));
        all
    }
}

#![forbid(unsafe_code)]

//! Role-based authorization around a persistence backend.
//!
//! The store performs no authorization itself. [`SecuredBackend`] sits
//! beneath it, checks the principal signed into a [`SecurityContext`] against
//! an [`AccessPolicy`] before every backend call, and raises
//! `AccessDenied`, which the store passes on unchanged. A removal that
//! re-links children needs both the remove and the merge role and is checked
//! in full before anything changes.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Category;
use crate::storage::{BackendError, BackendResult, CategoryBackend};
use crate::types::{CategoryKey, Operation};

/// Roles a principal can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular user: may browse and edit.
    User,
    /// Elevated role: may also delete. Implies `User`.
    Admin,
}

impl Role {
    /// Whether holding `self` grants `required`.
    pub fn implies(self, required: Role) -> bool {
        self == required || (self == Role::Admin && required == Role::User)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Admin => f.write_str("admin"),
        }
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    name: String,
    roles: Vec<Role>,
}

impl Principal {
    /// Creates a principal holding `roles`.
    pub fn new(name: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            name: name.into(),
            roles: roles.into_iter().collect(),
        }
    }

    /// A principal holding only [`Role::User`].
    pub fn user(name: impl Into<String>) -> Self {
        Self::new(name, [Role::User])
    }

    /// A principal holding [`Role::Admin`].
    pub fn admin(name: impl Into<String>) -> Self {
        Self::new(name, [Role::Admin])
    }

    /// Principal name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether any held role grants `required`.
    pub fn has_role(&self, required: Role) -> bool {
        self.roles.iter().any(|role| role.implies(required))
    }
}

/// Shared holder of the currently signed-in principal.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    current: Arc<RwLock<Option<Principal>>>,
}

impl SecurityContext {
    /// A context with nobody signed in.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current principal.
    pub fn sign_in(&self, principal: Principal) {
        *self.current.write() = Some(principal);
    }

    /// Clears the current principal.
    pub fn sign_out(&self) {
        *self.current.write() = None;
    }

    /// A copy of the current principal.
    pub fn current(&self) -> Option<Principal> {
        self.current.read().clone()
    }
}

/// Maps store operations onto the role they require.
pub trait AccessPolicy {
    /// Role needed for `operation`, `None` if it is unrestricted.
    fn required_role(&self, operation: Operation) -> Option<Role>;
}

/// Default policy: everything needs `User`, removal needs `Admin`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl AccessPolicy for RolePolicy {
    fn required_role(&self, operation: Operation) -> Option<Role> {
        match operation {
            Operation::Read | Operation::Persist | Operation::Merge => Some(Role::User),
            Operation::Remove => Some(Role::Admin),
        }
    }
}

/// Backend wrapper that authorizes every call before delegating.
#[derive(Debug)]
pub struct SecuredBackend<B, P = RolePolicy> {
    inner: B,
    context: SecurityContext,
    policy: P,
}

impl<B> SecuredBackend<B, RolePolicy> {
    /// Wraps `inner` with the default [`RolePolicy`].
    pub fn new(inner: B, context: SecurityContext) -> Self {
        Self::with_policy(inner, context, RolePolicy)
    }
}

impl<B, P: AccessPolicy> SecuredBackend<B, P> {
    /// Wraps `inner` with a custom policy.
    pub fn with_policy(inner: B, context: SecurityContext, policy: P) -> Self {
        Self {
            inner,
            context,
            policy,
        }
    }

    /// The wrapped backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// The security context consulted on every call.
    pub fn context(&self) -> &SecurityContext {
        &self.context
    }

    fn authorize(&self, operation: Operation) -> BackendResult<()> {
        let Some(required) = self.policy.required_role(operation) else {
            return Ok(());
        };
        match self.context.current() {
            Some(principal) if principal.has_role(required) => Ok(()),
            current => {
                let principal = current
                    .map(|p| p.name)
                    .unwrap_or_else(|| "anonymous".to_string());
                debug!(%operation, %principal, %required, "access denied");
                Err(BackendError::AccessDenied {
                    operation,
                    principal,
                })
            }
        }
    }
}

impl<B: CategoryBackend, P: AccessPolicy> CategoryBackend for SecuredBackend<B, P> {
    fn find_by_key(&self, key: CategoryKey) -> BackendResult<Option<Category>> {
        self.authorize(Operation::Read)?;
        self.inner.find_by_key(key)
    }

    fn find_by_parent(&self, parent: CategoryKey) -> BackendResult<Vec<Category>> {
        self.authorize(Operation::Read)?;
        self.inner.find_by_parent(parent)
    }

    fn find_roots(&self) -> BackendResult<Vec<Category>> {
        self.authorize(Operation::Read)?;
        self.inner.find_roots()
    }

    fn persist(&mut self, category: Category) -> BackendResult<Category> {
        self.authorize(Operation::Persist)?;
        self.inner.persist(category)
    }

    fn merge(&mut self, category: Category) -> BackendResult<Category> {
        self.authorize(Operation::Merge)?;
        self.inner.merge(category)
    }

    fn remove(&mut self, category: &Category) -> BackendResult<Vec<Category>> {
        self.authorize(Operation::Remove)?;
        // adopting children rewrites them
        if !self.inner.find_by_parent(category.key())?.is_empty() {
            self.authorize(Operation::Merge)?;
        }
        self.inner.remove(category)
    }

    fn count(&self) -> BackendResult<usize> {
        self.authorize(Operation::Read)?;
        self.inner.count()
    }
}

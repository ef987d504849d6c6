//! Lock operation outcomes
//!
//! Each operation returns a closed set of variants carrying only the fields
//! that outcome needs. Store failures travel separately as
//! [`crate::LockError`].

use serde::Serialize;

/// Result of an acquire attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AcquireOutcome {
    /// The lock was available and now belongs to `owner`
    Granted { lock_name: String, owner: String },
    /// The caller already holds the lock
    AlreadyHeldBySelf { lock_name: String, age: String },
    /// Somebody else holds the lock
    AlreadyHeldByOther {
        lock_name: String,
        owner: String,
        age: String,
    },
}

impl AcquireOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            AcquireOutcome::Granted { .. } => "granted",
            AcquireOutcome::AlreadyHeldBySelf { .. } => "already_held_by_self",
            AcquireOutcome::AlreadyHeldByOther { .. } => "already_held_by_other",
        }
    }
}

/// Result of a release attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReleaseOutcome {
    /// The lock was deleted
    Released { lock_name: String },
    /// Nothing to release
    NotHeld { lock_name: String },
    /// The lock belongs to `owner`, not to the caller
    Forbidden { lock_name: String, owner: String },
    /// Another release of the same lock is in flight
    ConcurrentReleaseInProgress { lock_name: String },
}

impl ReleaseOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ReleaseOutcome::Released { .. } => "released",
            ReleaseOutcome::NotHeld { .. } => "not_held",
            ReleaseOutcome::Forbidden { .. } => "forbidden",
            ReleaseOutcome::ConcurrentReleaseInProgress { .. } => "concurrent_release",
        }
    }
}

/// Result of inspecting a single lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum InspectOutcome {
    Held {
        lock_name: String,
        owner: String,
        age: String,
    },
    NotHeld { lock_name: String },
}

impl InspectOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            InspectOutcome::Held { .. } => "held",
            InspectOutcome::NotHeld { .. } => "not_held",
        }
    }
}

/// One held lock in an enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockEntry {
    pub lock_name: String,
    pub owner: String,
    pub age: String,
}

impl LockEntry {
    /// `"<lockName> locked by <owner> (<age>)"`
    pub fn line(&self) -> String {
        format!("{} locked by {} ({})", self.lock_name, self.owner, self.age)
    }
}

/// Result of enumerating held locks, in store enumeration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnumerateResult {
    pub entries: Vec<LockEntry>,
}

impl EnumerateResult {
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(LockEntry::line).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

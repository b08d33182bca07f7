//! Architectural roles.
//!
//! Roles are tags, not a hierarchy: a node may be a controller and a
//! repository at once. The only precedence rule is that a test node
//! carries no other role.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A classification tag attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Test class, matched by name.
    Test,

    /// Web entry point (annotation ending in `Controller`).
    Controller,

    /// Configuration class (annotation ending in `Configuration`).
    Config,

    /// Persistence layer, by annotation or repository interface.
    Repository,

    /// Supertype discovered because a component implements it.
    InterfaceImpl,

    /// The entity is an interface type.
    Interface,

    /// Messaging participant or inbound messaging handler.
    PubSub,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Controller => "controller",
            Self::Config => "config",
            Self::Repository => "repository",
            Self::InterfaceImpl => "interface_impl",
            Self::Interface => "interface",
            Self::PubSub => "pubsub",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered set of roles.
pub type RoleSet = BTreeSet<Role>;

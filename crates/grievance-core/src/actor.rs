//! Who performed a mutation.
//!
//! Actors are opaque identifiers handed to the engines by the identity
//! collaborator (for staff) or taken from configuration (for automated
//! paths). They are written verbatim into `addedBy` / `escalatedBy`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker used for automated writes when nothing else is configured.
pub const DEFAULT_SYSTEM_ACTOR: &str = "system";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }
}

impl Default for Actor {
  fn default() -> Self { Self::new(DEFAULT_SYSTEM_ACTOR) }
}

impl fmt::Display for Actor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

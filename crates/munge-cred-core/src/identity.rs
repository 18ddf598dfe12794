//! Process identity asserted by the authority.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The uid/gid pair of the process that encoded a credential.
///
/// Only an authority produces a meaningful identity. Requests carry
/// [`Identity::UNSET`], and encoding never reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Effective user id.
    pub uid: u32,
    /// Effective group id.
    pub gid: u32,
}

impl Identity {
    /// The zero-valued identity carried by credential requests.
    pub const UNSET: Self = Self { uid: 0, gid: 0 };

    /// Create an identity from raw ids.
    pub const fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.uid, self.gid)
    }
}

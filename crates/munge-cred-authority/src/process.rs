//! Identity of the calling process.

use munge_cred_core::Identity;
use nix::unistd::{getegid, geteuid};

/// The effective uid/gid of the current process.
pub fn current_identity() -> Identity {
    Identity::new(geteuid().as_raw(), getegid().as_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_identity_matches_nix() {
        let identity = current_identity();
        assert_eq!(identity.uid, nix::unistd::Uid::effective().as_raw());
        assert_eq!(identity.gid, nix::unistd::Gid::effective().as_raw());
    }
}

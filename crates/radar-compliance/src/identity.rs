//! Operator identity and the admin capability check.

use std::collections::HashSet;

use thiserror::Error;

/// Failure to evaluate a capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The identity provider could not answer.
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// The operator the monitor runs on behalf of.
pub trait Identity: Send + Sync {
    /// Subject id, compared against a directive's issuer.
    fn subject(&self) -> &str;

    /// Whether the operator holds the admin capability.
    fn is_admin(&self) -> Result<bool, AuthError>;

    /// Whether this operator may see violations of a directive issued by
    /// `issuer`. Any failure of the admin check denies.
    fn may_see_violations_of(&self, issuer: &str) -> bool {
        if self.subject() == issuer {
            return true;
        }
        match self.is_admin() {
            Ok(admin) => admin,
            Err(e) => {
                tracing::warn!(subject = %self.subject(), error = %e, "Admin check failed, denying");
                false
            }
        }
    }
}

/// Identity resolved once at startup from a subject and its granted roles.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    subject: String,
    roles: HashSet<String>,
    admin_role: Option<String>,
}

impl StaticIdentity {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            roles: HashSet::new(),
            admin_role: None,
        }
    }

    /// Grant a role to this identity.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Name the role that confers the admin capability.
    pub fn with_admin_role(mut self, role: impl Into<String>) -> Self {
        self.admin_role = Some(role.into());
        self
    }
}

impl Identity for StaticIdentity {
    fn subject(&self) -> &str {
        &self.subject
    }

    /// Without a configured admin role nobody is admin.
    fn is_admin(&self) -> Result<bool, AuthError> {
        Ok(self
            .admin_role
            .as_ref()
            .is_some_and(|role| self.roles.contains(role)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issuer_always_sees_own_violations() {
        let identity = StaticIdentity::new("atc-1");
        assert!(identity.may_see_violations_of("atc-1"));
    }

    #[test]
    fn admin_sees_others() {
        let identity = StaticIdentity::new("atc-1")
            .with_admin_role("admin")
            .with_role("admin");
        assert_eq!(identity.is_admin(), Ok(true));
        assert!(identity.may_see_violations_of("atc-2"));
    }

    #[test]
    fn non_admin_denied() {
        let identity = StaticIdentity::new("atc-1")
            .with_admin_role("admin")
            .with_role("controller");
        assert!(!identity.may_see_violations_of("atc-2"));
    }

    #[test]
    fn unconfigured_admin_role_is_not_admin() {
        let identity = StaticIdentity::new("atc-1").with_role("admin");
        assert_eq!(identity.is_admin(), Ok(false));
        assert!(!identity.may_see_violations_of("atc-2"));
    }

    struct UnreachableDirectory;

    impl Identity for UnreachableDirectory {
        fn subject(&self) -> &str {
            "atc-1"
        }

        fn is_admin(&self) -> Result<bool, AuthError> {
            Err(AuthError::ProviderUnavailable("directory timeout".into()))
        }
    }

    #[test]
    fn provider_failure_denies() {
        let identity = UnreachableDirectory;
        assert!(identity.may_see_violations_of("atc-1"));
        assert!(!identity.may_see_violations_of("atc-2"));
    }
}

//! Host permission boundary.
//!
//! Notification permission is granted or denied by the host environment;
//! the prompt UI itself lives outside this engine.

use async_trait::async_trait;

/// Result of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Asks the host environment for notification permission.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Requests permission, suspending until the host answers.
    async fn request_permission(&self) -> Permission;
}

/// A provider returning a preset answer. `granted()` suits hosts that
/// manage the prompt outside this engine.
pub struct FixedPermission {
    permission: Permission,
}

impl FixedPermission {
    /// Always grants.
    pub fn granted() -> Self {
        Self {
            permission: Permission::Granted,
        }
    }

    /// Always denies.
    pub fn denied() -> Self {
        Self {
            permission: Permission::Denied,
        }
    }
}

#[async_trait]
impl PermissionProvider for FixedPermission {
    async fn request_permission(&self) -> Permission {
        self.permission
    }
}

/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Logical actions a resource handler can perform.
/// Used by both the viewset router and the authorization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    List,
    Create,
    Retrieve,
    Update,
    PartialUpdate,
    Destroy,
}

impl Action {
    /// Read actions never change state (GET/HEAD/OPTIONS).
    pub fn is_read(self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }

    pub fn is_write(self) -> bool {
        !self.is_read()
    }

    /// HTTP method name this action is routed from.
    pub fn http_method(self) -> &'static str {
        match self {
            Action::List | Action::Retrieve => "GET",
            Action::Create => "POST",
            Action::Update => "PUT",
            Action::PartialUpdate => "PATCH",
            Action::Destroy => "DELETE",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Action::List => "list",
            Action::Create => "create",
            Action::Retrieve => "retrieve",
            Action::Update => "update",
            Action::PartialUpdate => "partial_update",
            Action::Destroy => "destroy",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_writes_partition_actions() {
        assert!(Action::List.is_read());
        assert!(Action::Retrieve.is_read());
        for action in [Action::Create, Action::Update, Action::PartialUpdate, Action::Destroy] {
            assert!(action.is_write(), "{action} should be a write");
        }
    }

    #[test]
    fn maps_actions_to_http_methods() {
        assert_eq!(Action::PartialUpdate.http_method(), "PATCH");
        assert_eq!(Action::Destroy.http_method(), "DELETE");
        assert_eq!(Action::Retrieve.http_method(), "GET");
    }
}

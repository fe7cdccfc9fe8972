//! Capability bitmasks.
//!
//! Each capability occupies one fixed bit of a 64-bit mask. The bit table is
//! part of the storage format: bits are only ever appended, never renumbered.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use todo_core::AppError;

/// Capabilities a user holds independently of any account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceAdminPermission {
    /// Allows rotating the cookie signing secrets.
    CycleCookieSecrets,
    /// Allows banning users.
    BanUsers,
    /// Allows terminating accounts.
    TerminateAccounts,
    /// Allows acting as another user.
    ImpersonateAccounts,
    /// Allows creating and editing subscription plans.
    ManageSubscriptionPlans,
    /// Allows reading the service-wide audit log.
    ReadAuditLog,
}

impl ServiceAdminPermission {
    /// Returns the bit position of this capability.
    #[must_use]
    pub fn bit(self) -> u32 {
        match self {
            Self::CycleCookieSecrets => 0,
            Self::BanUsers => 1,
            Self::TerminateAccounts => 2,
            Self::ImpersonateAccounts => 3,
            Self::ManageSubscriptionPlans => 4,
            Self::ReadAuditLog => 5,
        }
    }

    /// Returns a stable name for this capability.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CycleCookieSecrets => "cycle_cookie_secrets",
            Self::BanUsers => "ban_users",
            Self::TerminateAccounts => "terminate_accounts",
            Self::ImpersonateAccounts => "impersonate_accounts",
            Self::ManageSubscriptionPlans => "manage_subscription_plans",
            Self::ReadAuditLog => "read_audit_log",
        }
    }

    /// Returns all known capabilities in bit order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ServiceAdminPermission] = &[
            ServiceAdminPermission::CycleCookieSecrets,
            ServiceAdminPermission::BanUsers,
            ServiceAdminPermission::TerminateAccounts,
            ServiceAdminPermission::ImpersonateAccounts,
            ServiceAdminPermission::ManageSubscriptionPlans,
            ServiceAdminPermission::ReadAuditLog,
        ];

        ALL
    }
}

impl FromStr for ServiceAdminPermission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
            .ok_or_else(|| {
                AppError::Validation(format!("unknown service admin permission '{value}'"))
            })
    }
}

/// Capabilities a user holds within one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountUserPermission {
    /// Allows creating items.
    CreateItems,
    /// Allows updating items.
    UpdateItems,
    /// Allows archiving items.
    ArchiveItems,
    /// Allows creating, updating and archiving webhooks.
    ManageWebhooks,
    /// Allows creating and archiving API clients.
    ManageApiClients,
    /// Allows updating account details.
    UpdateAccount,
    /// Allows archiving the account.
    ArchiveAccount,
    /// Allows adding members.
    AddMembers,
    /// Allows removing members.
    RemoveMembers,
    /// Allows changing member permissions.
    ModifyMemberPermissions,
    /// Allows handing the account to another user.
    TransferAccountOwnership,
    /// Allows reading audit entries for account resources.
    ReadAuditLog,
}

impl AccountUserPermission {
    /// Returns the bit position of this capability.
    #[must_use]
    pub fn bit(self) -> u32 {
        match self {
            Self::CreateItems => 0,
            Self::UpdateItems => 1,
            Self::ArchiveItems => 2,
            Self::ManageWebhooks => 3,
            Self::ManageApiClients => 4,
            Self::UpdateAccount => 5,
            Self::ArchiveAccount => 6,
            Self::AddMembers => 7,
            Self::RemoveMembers => 8,
            Self::ModifyMemberPermissions => 9,
            Self::TransferAccountOwnership => 10,
            Self::ReadAuditLog => 11,
        }
    }

    /// Returns a stable name for this capability.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateItems => "create_items",
            Self::UpdateItems => "update_items",
            Self::ArchiveItems => "archive_items",
            Self::ManageWebhooks => "manage_webhooks",
            Self::ManageApiClients => "manage_api_clients",
            Self::UpdateAccount => "update_account",
            Self::ArchiveAccount => "archive_account",
            Self::AddMembers => "add_members",
            Self::RemoveMembers => "remove_members",
            Self::ModifyMemberPermissions => "modify_member_permissions",
            Self::TransferAccountOwnership => "transfer_account_ownership",
            Self::ReadAuditLog => "read_audit_log",
        }
    }

    /// Returns all known capabilities in bit order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AccountUserPermission] = &[
            AccountUserPermission::CreateItems,
            AccountUserPermission::UpdateItems,
            AccountUserPermission::ArchiveItems,
            AccountUserPermission::ManageWebhooks,
            AccountUserPermission::ManageApiClients,
            AccountUserPermission::UpdateAccount,
            AccountUserPermission::ArchiveAccount,
            AccountUserPermission::AddMembers,
            AccountUserPermission::RemoveMembers,
            AccountUserPermission::ModifyMemberPermissions,
            AccountUserPermission::TransferAccountOwnership,
            AccountUserPermission::ReadAuditLog,
        ];

        ALL
    }
}

impl FromStr for AccountUserPermission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
            .ok_or_else(|| {
                AppError::Validation(format!("unknown account user permission '{value}'"))
            })
    }
}

macro_rules! capability_mask {
    ($(#[$meta:meta])* $name:ident, $capability:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw mask. Unknown bits are preserved.
            #[must_use]
            pub const fn from_bits(bits: u64) -> Self {
                Self(bits)
            }

            /// Returns a mask without any capability.
            #[must_use]
            pub const fn none() -> Self {
                Self(0)
            }

            /// Returns the all-ones superuser mask.
            ///
            /// Only bootstrap and fixture code hands this out.
            #[must_use]
            pub const fn all() -> Self {
                Self(u64::MAX)
            }

            /// Returns the raw mask.
            #[must_use]
            pub const fn bits(self) -> u64 {
                self.0
            }

            /// Reinterprets a stored `BIGINT` as a mask.
            #[must_use]
            pub const fn from_database(value: i64) -> Self {
                Self(u64::from_ne_bytes(value.to_ne_bytes()))
            }

            /// Reinterprets the mask for a `BIGINT` column.
            #[must_use]
            pub const fn as_database(self) -> i64 {
                i64::from_ne_bytes(self.0.to_ne_bytes())
            }

            /// Returns true when `capability` is granted.
            #[must_use]
            pub fn has(self, capability: $capability) -> bool {
                self.0 & (1_u64 << capability.bit()) != 0
            }

            /// Returns a copy of this mask with `capability` granted.
            #[must_use]
            pub fn grant(self, capability: $capability) -> Self {
                Self(self.0 | (1_u64 << capability.bit()))
            }

            /// Returns a copy of this mask with `capability` removed.
            #[must_use]
            pub fn revoke(self, capability: $capability) -> Self {
                Self(self.0 & !(1_u64 << capability.bit()))
            }

            /// Returns the union of both masks.
            #[must_use]
            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            /// Returns true when every bit of `other` is also set here.
            #[must_use]
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Returns true for the superuser sentinel.
            #[must_use]
            pub const fn is_superuser(self) -> bool {
                self.0 == u64::MAX
            }

            /// Builds a mask from a list of capabilities.
            #[must_use]
            pub fn from_capabilities(capabilities: &[$capability]) -> Self {
                capabilities
                    .iter()
                    .fold(Self::none(), |mask, capability| mask.grant(*capability))
            }

            /// Returns `{ "can_<capability>": bool }` for every known capability.
            #[must_use]
            pub fn summarize(self) -> BTreeMap<String, bool> {
                <$capability>::all()
                    .iter()
                    .map(|capability| (format!("can_{}", capability.as_str()), self.has(*capability)))
                    .collect()
            }
        }

        impl From<$capability> for $name {
            fn from(capability: $capability) -> Self {
                Self::none().grant(capability)
            }
        }
    };
}

capability_mask!(
    /// Service-wide capability mask stored on the user row.
    ServiceAdminPermissions,
    ServiceAdminPermission
);

capability_mask!(
    /// Per-account capability mask stored on the membership row.
    AccountUserPermissions,
    AccountUserPermission
);

impl AccountUserPermissions {
    /// Capabilities granted to members added without explicit permissions.
    #[must_use]
    pub fn member_defaults() -> Self {
        Self::from_capabilities(&[
            AccountUserPermission::CreateItems,
            AccountUserPermission::UpdateItems,
            AccountUserPermission::ArchiveItems,
        ])
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::{
        AccountUserPermission, AccountUserPermissions, ServiceAdminPermission,
        ServiceAdminPermissions,
    };

    #[test]
    fn bit_table_is_stable() {
        assert_eq!(ServiceAdminPermission::CycleCookieSecrets.bit(), 0);
        assert_eq!(ServiceAdminPermission::ReadAuditLog.bit(), 5);
        assert_eq!(AccountUserPermission::CreateItems.bit(), 0);
        assert_eq!(AccountUserPermission::TransferAccountOwnership.bit(), 10);
        assert_eq!(AccountUserPermission::ReadAuditLog.bit(), 11);
    }

    #[test]
    fn bits_are_unique() {
        let mut seen = 0_u64;
        for permission in AccountUserPermission::all() {
            let bit = 1_u64 << permission.bit();
            assert_eq!(seen & bit, 0, "{} reuses a bit", permission.as_str());
            seen |= bit;
        }
    }

    #[test]
    fn grant_then_has() {
        let mask = AccountUserPermissions::none().grant(AccountUserPermission::ArchiveItems);

        assert!(mask.has(AccountUserPermission::ArchiveItems));
        assert!(!mask.has(AccountUserPermission::CreateItems));
        assert_eq!(mask.bits(), 0b100);
    }

    #[test]
    fn superuser_survives_database_roundtrip() {
        let stored = ServiceAdminPermissions::all().as_database();
        assert_eq!(stored, -1);
        assert!(ServiceAdminPermissions::from_database(stored).is_superuser());
    }

    #[test]
    fn summary_lists_every_capability() {
        let summary = ServiceAdminPermissions::from(ServiceAdminPermission::BanUsers).summarize();

        assert_eq!(summary.len(), ServiceAdminPermission::all().len());
        assert_eq!(summary.get("can_ban_users"), Some(&true));
        assert_eq!(summary.get("can_terminate_accounts"), Some(&false));
    }

    #[test]
    fn capability_names_parse_back() {
        for permission in AccountUserPermission::all() {
            let parsed = AccountUserPermission::from_str(permission.as_str());
            assert!(parsed.is_ok());
            assert_eq!(
                parsed.unwrap_or(AccountUserPermission::CreateItems),
                *permission
            );
        }
        assert!(ServiceAdminPermission::from_str("launch_rockets").is_err());
    }

    proptest! {
        #[test]
        fn union_contains_both_operands(left in any::<u64>(), right in any::<u64>()) {
            let left = AccountUserPermissions::from_bits(left);
            let right = AccountUserPermissions::from_bits(right);
            let union = left.union(right);

            prop_assert!(union.contains(left));
            prop_assert!(union.contains(right));
        }

        #[test]
        fn grant_is_idempotent_and_revoke_undoes_it(bits in any::<u64>(), index in 0_usize..12) {
            let capability = AccountUserPermission::all()[index];
            let granted = AccountUserPermissions::from_bits(bits).grant(capability);

            prop_assert!(granted.has(capability));
            prop_assert_eq!(granted.grant(capability), granted);
            prop_assert!(!granted.revoke(capability).has(capability));
        }

        #[test]
        fn storage_roundtrip_preserves_bits(bits in any::<u64>()) {
            let mask = ServiceAdminPermissions::from_bits(bits);
            prop_assert_eq!(ServiceAdminPermissions::from_database(mask.as_database()), mask);
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates a validated identifier.
            ///
            /// Zero and values outside the `BIGINT` range are rejected.
            pub fn new(value: u64) -> AppResult<Self> {
                if value == 0 {
                    return Err(AppError::Validation(format!(
                        "{} must be non-zero",
                        $label
                    )));
                }

                if i64::try_from(value).is_err() {
                    return Err(AppError::Validation(format!(
                        "{} {value} exceeds the storage range",
                        $label
                    )));
                }

                Ok(Self(value))
            }

            /// Creates an identifier from a stored `BIGINT` column value.
            pub fn from_database(value: i64) -> AppResult<Self> {
                let value = u64::try_from(value).map_err(|_| {
                    AppError::Internal(format!("stored {} {value} is negative", $label))
                })?;

                Self::new(value)
            }

            /// Returns the raw value.
            #[must_use]
            pub fn get(self) -> u64 {
                self.0
            }

            /// Returns the value as bound to `BIGINT` parameters.
            #[must_use]
            pub fn as_database(self) -> i64 {
                // `new` keeps the value within i64 range.
                i64::try_from(self.0).unwrap_or(i64::MAX)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl TryFrom<u64> for $name {
            type Error = AppError;

            fn try_from(value: u64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

row_id!(
    /// Identifier of an account row.
    AccountId,
    "account id"
);
row_id!(
    /// Identifier of a user row.
    UserId,
    "user id"
);
row_id!(
    /// Identifier of an item row.
    ItemId,
    "item id"
);
row_id!(
    /// Identifier of a webhook row.
    WebhookId,
    "webhook id"
);
row_id!(
    /// Identifier of an API client row.
    ApiClientId,
    "api client id"
);
row_id!(
    /// Identifier of an account subscription plan row.
    AccountSubscriptionPlanId,
    "account subscription plan id"
);
row_id!(
    /// Identifier of an account user membership row.
    MembershipId,
    "membership id"
);
row_id!(
    /// Identifier of an audit log entry row.
    AuditLogEntryId,
    "audit log entry id"
);

#[cfg(test)]
mod tests {
    use super::{ItemId, UserId};

    #[test]
    fn zero_is_rejected() {
        assert!(ItemId::new(0).is_err());
    }

    #[test]
    fn values_beyond_bigint_are_rejected() {
        assert!(ItemId::new(u64::MAX).is_err());
        assert!(ItemId::new(i64::MAX as u64).is_ok());
    }

    #[test]
    fn negative_stored_values_are_rejected() {
        assert!(UserId::from_database(-4).is_err());
        assert_eq!(
            UserId::from_database(42).map(UserId::get).unwrap_or_default(),
            42
        );
    }

    #[test]
    fn serializes_as_plain_number() {
        let id = ItemId::new(789).unwrap_or_else(|_| unreachable!());
        let encoded = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(encoded, "789");
    }
}

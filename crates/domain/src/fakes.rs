//! Structurally valid sample inputs for tests.

use std::sync::atomic::{AtomicU64, Ordering};

use fake::Fake;
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::{SafeEmail, Username};
use fake::faker::lorem::en::{Sentence, Word};
use todo_core::{AccountId, UserId};

use crate::account::{
    AccountCreationInput, AccountSubscriptionPlanCreationInput, AddUserToAccountInput,
};
use crate::api_client::{API_CLIENT_SECRET_MIN_LENGTH, ApiClientCreationInput};
use crate::item::ItemCreationInput;
use crate::permissions::AccountUserPermissions;
use crate::user::UserRegistrationInput;
use crate::webhook::WebhookCreationInput;

static SEQUENCE: AtomicU64 = AtomicU64::new(1);

// Appended to columns with unique constraints.
fn unique_suffix() -> u64 {
    SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// Returns a registration payload with a unique username.
#[must_use]
pub fn fake_user_registration_input() -> UserRegistrationInput {
    let username: String = Username().fake();

    UserRegistrationInput {
        username: format!("{username}_{}", unique_suffix()),
        hashed_password: format!("$argon2id$v=19${}", Word().fake::<String>()),
        two_factor_secret: Word().fake(),
    }
}

/// Returns an account payload owned by `owner`.
#[must_use]
pub fn fake_account_creation_input(owner: UserId) -> AccountCreationInput {
    AccountCreationInput {
        name: CompanyName().fake(),
        contact_email: SafeEmail().fake(),
        contact_phone: format!("+1555{:07}", unique_suffix() % 10_000_000),
        subscription_plan_id: None,
        default_user_permissions: AccountUserPermissions::member_defaults(),
        belongs_to_user: owner,
    }
}

/// Returns a subscription plan payload.
#[must_use]
pub fn fake_account_subscription_plan_creation_input() -> AccountSubscriptionPlanCreationInput {
    AccountSubscriptionPlanCreationInput {
        name: format!("{} plan", Word().fake::<String>()),
        description: Sentence(3..8).fake(),
        price: (100_u32..10_000).fake(),
        period_days: 30,
    }
}

/// Returns a membership payload with the default member mask.
#[must_use]
pub fn fake_add_user_to_account_input(
    user_id: UserId,
    account_id: AccountId,
) -> AddUserToAccountInput {
    AddUserToAccountInput {
        user_id,
        account_id,
        account_permissions: AccountUserPermissions::member_defaults(),
        reason: Sentence(2..5).fake(),
    }
}

/// Returns an API client payload with a unique client id.
#[must_use]
pub fn fake_api_client_creation_input(owner: UserId) -> ApiClientCreationInput {
    ApiClientCreationInput {
        name: Word().fake(),
        client_id: format!("client_{}_{}", Word().fake::<String>(), unique_suffix()),
        secret_key: (0..API_CLIENT_SECRET_MIN_LENGTH)
            .map(|_| (0_u8..=255).fake::<u8>())
            .collect(),
        belongs_to_user: owner,
    }
}

/// Returns a webhook payload owned by `account_id`.
#[must_use]
pub fn fake_webhook_creation_input(account_id: AccountId) -> WebhookCreationInput {
    WebhookCreationInput {
        name: Word().fake(),
        content_type: "application/json".to_owned(),
        url: format!("https://hooks.example.com/{}", Word().fake::<String>()),
        method: "POST".to_owned(),
        events: vec![Word().fake()],
        data_types: vec![Word().fake()],
        topics: vec![Word().fake()],
        belongs_to_account: account_id,
    }
}

/// Returns an item payload owned by `account_id`.
#[must_use]
pub fn fake_item_creation_input(account_id: AccountId) -> ItemCreationInput {
    ItemCreationInput {
        name: Word().fake(),
        details: Sentence(2..6).fake(),
        belongs_to_account: account_id,
    }
}

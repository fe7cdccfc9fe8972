//! Storage ports, one per entity.
//!
//! Write methods take the acting user so the implementation can attribute
//! the audit entry written in the same transaction as the mutation. Update
//! and archive return the number of rows affected; zero means the row was
//! missing, archived, or owned by someone else.

mod accounts;
mod api_clients;
mod audit_log;
mod items;
mod memberships;
mod plans;
mod users;
mod webhooks;

pub use accounts::AccountDataManager;
pub use api_clients::ApiClientDataManager;
pub use audit_log::AuditLogEntryDataManager;
pub use items::ItemDataManager;
pub use memberships::AccountUserMembershipDataManager;
pub use plans::AccountSubscriptionPlanDataManager;
pub use users::UserDataManager;
pub use webhooks::WebhookDataManager;

/// Receives full-table batches from the streaming `get_all_*` methods.
///
/// The channel closes once every batch task has finished. Batches arrive in
/// no particular order.
pub type BatchSender<T> = tokio::sync::mpsc::Sender<Vec<T>>;

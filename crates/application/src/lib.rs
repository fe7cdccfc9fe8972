//! Application services and storage ports.

#![forbid(unsafe_code)]

mod account_service;
mod actor;
mod admin_service;
mod api_client_service;
mod audit_log_service;
/// Storage ports implemented by the infrastructure crate.
pub mod data_manager_ports;
mod item_service;
mod membership_service;
mod user_service;
mod webhook_service;

#[cfg(test)]
mod test_support;

pub use account_service::AccountService;
pub use actor::{Actor, ActorResolver};
pub use admin_service::{AdminDataManagers, AdminService};
pub use api_client_service::ApiClientService;
pub use audit_log_service::AuditLogService;
pub use data_manager_ports::{
    AccountDataManager, AccountSubscriptionPlanDataManager, AccountUserMembershipDataManager,
    ApiClientDataManager, AuditLogEntryDataManager, BatchSender, ItemDataManager,
    UserDataManager, WebhookDataManager,
};
pub use item_service::ItemService;
pub use membership_service::MembershipService;
pub use user_service::{USERNAME_SEARCH_MIN_LENGTH, UserService};
pub use webhook_service::WebhookService;

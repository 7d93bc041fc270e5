pub mod admission;
pub mod auth;
pub mod authz;
pub mod availability;
pub mod policy;
pub mod recurrence;
pub mod settings;
pub mod webhooks;

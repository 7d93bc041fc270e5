pub mod cache;
pub mod events;
pub mod factory;
pub mod gateway;
pub mod http;
pub mod repositories;

pub mod booking_client;
pub mod resource_client;
pub mod tenant_client;
pub mod user_client;
pub mod webhook_sender;

pub use booking_client::HttpBookingClient;
pub use resource_client::HttpResourceClient;
pub use tenant_client::HttpTenantClient;
pub use user_client::HttpUserClient;
pub use webhook_sender::HttpWebhookSender;

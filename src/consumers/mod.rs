pub mod booking;
pub mod resource;
pub mod tenant;
pub mod user;

pub mod groups {
    pub const TENANT_SERVICE: &str = "tenant-service";
    pub const USER_SERVICE: &str = "user-service";
    pub const RESOURCE_SERVICE: &str = "resource-service";
    pub const BOOKING_SERVICE: &str = "booking-service";
}

pub mod destination;
pub mod flight;
pub mod oauth;
pub mod sms;

pub mod auth_controller;
pub mod flight_search_client;
pub mod notification_client;
pub mod price_watch_controller;
pub mod sheet_client;

pub mod api_client;
pub mod auth_service;
pub mod polling_service;
pub mod request_service;

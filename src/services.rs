pub mod analytics;
pub mod loyalty;

pub mod auth;
pub mod barber_service;
pub mod booking_service;
pub mod catalog_service;
pub mod client_service;
pub mod loyalty_service;
pub mod report_service;
pub mod settings_service;
pub mod whatsapp_service;

pub mod auth;
pub mod barbers;
pub mod bookings;
pub mod catalog;
pub mod clients;
pub mod loyalty;
pub mod reports;
pub mod settings;
pub mod whatsapp;

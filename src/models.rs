pub mod auth;
pub mod barber;
pub mod booking;
pub mod catalog;
pub mod client;
pub mod loyalty;
pub mod reports;
pub mod settings;
pub mod whatsapp;

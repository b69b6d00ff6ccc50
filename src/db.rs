pub mod user_repo;
pub use user_repo::UserRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod barber_repo;
pub use barber_repo::BarberRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod booking_repo;
pub use booking_repo::BookingRepository;
pub mod loyalty_repo;
pub use loyalty_repo::LoyaltyRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;

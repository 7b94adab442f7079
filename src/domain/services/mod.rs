pub mod auth_service;
pub mod availability;
pub mod calendar;
pub mod notifications;

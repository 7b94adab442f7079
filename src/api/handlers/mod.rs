pub mod health;
pub mod auth;
pub mod user;
pub mod service;
pub mod schedule;
pub mod availability;
pub mod appointment;
pub mod unban;

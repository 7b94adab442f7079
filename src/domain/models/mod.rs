pub mod appointment;
pub mod auth;
pub mod availability;
pub mod job;
pub mod schedule;
pub mod service;
pub mod unban_request;
pub mod user;

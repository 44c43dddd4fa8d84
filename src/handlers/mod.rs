pub mod admin;
pub mod booking;
pub mod customers;
pub mod health;

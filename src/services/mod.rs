pub mod booking_link;
pub mod customers;
pub mod images;
pub mod lifecycle;
pub mod notification;
pub mod projections;

pub mod booking;
pub mod booking_log;
pub mod ferry;
pub mod route;
pub mod sailing_date;
pub mod schedule;
pub mod ticket;
pub mod vehicle;

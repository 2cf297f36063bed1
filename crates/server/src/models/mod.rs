//! Domain types returned by the repositories and serialized to clients.

pub mod analytics;
pub mod customer;
pub mod order;

pub use analytics::{HourOrderCount, TopCustomer, ZipOrderCount};
pub use customer::{Address, Customer, CustomerHistory};
pub use order::Order;

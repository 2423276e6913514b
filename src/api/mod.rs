pub mod account;
pub mod employee;

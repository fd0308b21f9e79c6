pub mod accounts;
pub mod auth;
pub mod licenses;
pub mod two_factor;

//! Utility modules for the TenAuth API.
//!
//! This module contains shared utilities used throughout the application:
//!
//! - [`email`]: Email sending utilities using SMTP
//! - [`errors`]: Application error types and handling
//! - [`jwt`]: JWT token creation and verification
//! - [`password`]: Password and one-time code hashing

pub mod email;
pub mod errors;
pub mod jwt;
pub mod password;

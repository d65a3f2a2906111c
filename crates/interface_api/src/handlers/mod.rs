//! Request handlers

pub mod codes;
pub mod coverage;
pub mod details;
pub mod health;
pub mod parties;
pub mod premium;

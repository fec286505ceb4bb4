#![deny(warnings)]

pub mod capture;
pub mod classify;
pub mod config;
pub mod doorbell;
pub mod mood;
pub mod presentation;
pub mod util;

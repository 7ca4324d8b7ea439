//! Prospector bridge - connects a CRM record store with the Prospector
//! lead-prospecting service.
//!
//! This library provides the core functionality of the bridge.
//! It exposes all modules for testing purposes.

pub mod client;
pub mod converter;
pub mod describe;
pub mod entities;
pub mod errors;
pub mod prospect;
pub mod quality;
pub mod settings;
pub mod storage;
pub mod web;

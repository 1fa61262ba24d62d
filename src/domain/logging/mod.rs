//! Logging status controllers

pub mod service;

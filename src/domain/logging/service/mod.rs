pub mod logging_register_service;
pub mod logging_status_service;

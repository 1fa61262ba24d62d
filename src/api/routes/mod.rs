//! API route declarations (e.g., /v3/*)

pub mod management_routes;

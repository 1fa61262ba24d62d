//! Controllers: connect routes to the listers

pub mod management;

pub mod tracing_util;

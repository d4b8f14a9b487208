pub mod noop;
pub mod prometheus;

// Re-export the factory functions for easy access
pub use self::noop::create as create_noop_metrics;
pub use self::prometheus::create as create_prom_metrics;
pub use self::prometheus::EXPOSITION_CONTENT_TYPE;

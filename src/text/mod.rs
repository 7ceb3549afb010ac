pub mod layout;
pub mod metrics;
pub mod source;
pub mod unit;

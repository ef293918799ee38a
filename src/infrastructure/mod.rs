pub mod core;
pub mod hackerone;
pub mod mock;
pub mod observability;

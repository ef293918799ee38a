// Bug-bounty platform entities
pub mod types;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;

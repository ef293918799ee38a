// Pull endpoint (index, health, metrics)
pub mod http;

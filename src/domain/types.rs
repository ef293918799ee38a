use serde::{Deserialize, Serialize};

/// Label value used when the platform omits a lifecycle state.
pub const UNKNOWN_STATE: &str = "unknown";

/// A bug-bounty program the credentials can see. Unit of fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub handle: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitedHacker {
    pub id: String,
    pub state: String,
}

/// A weakness category (CWE-like) attached to a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weakness {
    pub id: String,
    pub name: String,
}

/// Normalizes an optional platform state into a metric label value.
pub fn state_label(state: Option<&str>) -> String {
    match state.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => UNKNOWN_STATE.to_string(),
    }
}

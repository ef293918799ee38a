use crate::domain::types::{Asset, InvitedHacker, Program, Report, Weakness, state_label};
use serde::Deserialize;

// ===== Envelope =====

/// JSON:API collection page: `{ "data": [...], "links": {...} }`
#[derive(Debug, Deserialize)]
pub struct Page<A> {
    pub data: Vec<Resource<A>>,
    #[serde(default)]
    pub links: Links,
}

#[derive(Debug, Default, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub next: Option<String>,
}

impl Links {
    pub fn next_page(&self) -> Option<&str> {
        self.next.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct Resource<A> {
    pub id: String,
    pub attributes: Option<A>,
}

// ===== Attributes =====

#[derive(Debug, Deserialize)]
pub struct ProgramAttributes {
    pub handle: Option<String>,
}

/// Shared by assets, reports and hacker invitations
#[derive(Debug, Deserialize)]
pub struct StateAttributes {
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeaknessAttributes {
    pub name: Option<String>,
}

// ===== Mapping =====

impl From<Resource<ProgramAttributes>> for Program {
    fn from(r: Resource<ProgramAttributes>) -> Self {
        // A program without a handle still needs a stable label
        let handle = r
            .attributes
            .and_then(|a| a.handle)
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| r.id.clone());
        Program { id: r.id, handle }
    }
}

fn state_of(attributes: Option<StateAttributes>) -> String {
    state_label(attributes.and_then(|a| a.state).as_deref())
}

impl From<Resource<StateAttributes>> for Asset {
    fn from(r: Resource<StateAttributes>) -> Self {
        Asset {
            state: state_of(r.attributes),
            id: r.id,
        }
    }
}

impl From<Resource<StateAttributes>> for Report {
    fn from(r: Resource<StateAttributes>) -> Self {
        Report {
            state: state_of(r.attributes),
            id: r.id,
        }
    }
}

impl From<Resource<StateAttributes>> for InvitedHacker {
    fn from(r: Resource<StateAttributes>) -> Self {
        InvitedHacker {
            state: state_of(r.attributes),
            id: r.id,
        }
    }
}

impl From<Resource<WeaknessAttributes>> for Weakness {
    fn from(r: Resource<WeaknessAttributes>) -> Self {
        Weakness {
            name: r.attributes.and_then(|a| a.name).unwrap_or_default(),
            id: r.id,
        }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Roles recognised by the placement workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Student,
    Recruiter,
    Tpo,
    Admin,
}

impl ActorRole {
    pub const fn ordered() -> [Self; 4] {
        [Self::Student, Self::Recruiter, Self::Tpo, Self::Admin]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Recruiter => "recruiter",
            Self::Tpo => "tpo",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Self::Student),
            "recruiter" => Some(Self::Recruiter),
            "tpo" | "placement_officer" => Some(Self::Tpo),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifier of a platform user (student, recruiter, or staff).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier of a recruiting organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrganizationId(pub String);

/// Identifier of a workflow instance (an application or an approval record).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The requesting party, as supplied by the identity collaborator. Treated as trusted input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: ActorRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<OrganizationId>,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: ActorRole) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            role,
            organization_id: None,
        }
    }

    pub fn in_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(OrganizationId(organization_id.into()));
        self
    }
}

/// Owning entity reference checked by transition guards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<OrganizationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant_id: Option<UserId>,
}

impl Ownership {
    pub fn organization(organization_id: OrganizationId) -> Self {
        Self {
            organization_id: Some(organization_id),
            applicant_id: None,
        }
    }

    pub fn application(organization_id: OrganizationId, applicant_id: UserId) -> Self {
        Self {
            organization_id: Some(organization_id),
            applicant_id: Some(applicant_id),
        }
    }
}

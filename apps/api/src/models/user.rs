use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::company::Company;
use crate::store::query::{FieldDef, FieldKind, Schema};
use crate::store::Entity;

/// Role-specific profile payload, discriminated by the `role` wire field.
///
/// Modeling the role as a sum type means a student value can never carry
/// `shareProfile` and an alumni value can never carry `school`; the invalid
/// field combinations of a single optional-field schema are unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    Student(StudentProfile),
    Alumni(AlumniProfile),
}

impl RoleProfile {
    pub fn role_name(&self) -> &'static str {
        match self {
            RoleProfile::Student(_) => "student",
            RoleProfile::Alumni(_) => "alumni",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub school: String,
    pub major: String,
    #[serde(default)]
    pub grad_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlumniProfile {
    #[serde(default)]
    pub company_id: Option<Uuid>,
    #[serde(default)]
    pub position: Option<String>,
    /// Whether this profile appears in the shared alumni directory.
    #[serde(default)]
    pub share_profile: bool,
}

/// A platform member. The tagged profile is flattened, so the wire shape is
/// a single flat object: `{"_id": ..., "name": ..., "role": "student",
/// "school": ..., ...}`, the original document shape statically split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_key: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    #[serde(flatten)]
    pub profile: RoleProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn as_student(&self) -> Option<&StudentProfile> {
        match &self.profile {
            RoleProfile::Student(p) => Some(p),
            RoleProfile::Alumni(_) => None,
        }
    }

    pub fn as_alumni(&self) -> Option<&AlumniProfile> {
        match &self.profile {
            RoleProfile::Alumni(p) => Some(p),
            RoleProfile::Student(_) => None,
        }
    }
}

static SCHEMA: Schema = Schema {
    filterable: &[
        FieldDef {
            name: "_id",
            kind: FieldKind::Id,
        },
        FieldDef {
            name: "email",
            kind: FieldKind::Text,
        },
        FieldDef {
            name: "role",
            kind: FieldKind::Text,
        },
        FieldDef {
            name: "companyId",
            kind: FieldKind::Id,
        },
        FieldDef {
            name: "position",
            kind: FieldKind::Text,
        },
        FieldDef {
            name: "shareProfile",
            kind: FieldKind::Bool,
        },
    ],
    sortable: &[FieldDef {
        name: "name",
        kind: FieldKind::Text,
    }],
    searchable: &["name", "email"],
};

impl Entity for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Uuid {
        self.id
    }

    fn schema() -> &'static Schema {
        &SCHEMA
    }
}

/// Response shape for users: same flat object, with the alumni company
/// reference expanded to the full record (or `null` when it dangles).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_key: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    #[serde(flatten)]
    pub profile: RoleProfileView,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfileView {
    Student(StudentProfile),
    Alumni(AlumniProfileView),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlumniProfileView {
    pub company: Option<Company>,
    pub position: Option<String>,
    pub share_profile: bool,
}

impl UserView {
    /// Expands the company reference; pass `None` for students or when the
    /// referenced company no longer exists.
    pub fn from_user(user: User, company: Option<Company>) -> Self {
        let profile = match user.profile {
            RoleProfile::Student(p) => RoleProfileView::Student(p),
            RoleProfile::Alumni(p) => RoleProfileView::Alumni(AlumniProfileView {
                company,
                position: p.position,
                share_profile: p.share_profile,
            }),
        };
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_key: user.avatar_key,
            location: user.location,
            bio: user.bio,
            skills: user.skills,
            interests: user.interests,
            profile,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

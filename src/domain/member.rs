use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Filter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub name: String,
    pub student_type: StudentType,
    pub birth_date: NaiveDate,
    pub grade: String,
    pub role: MemberRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            grade: self.grade.clone(),
            role: self.role,
        }
    }

    pub fn profile(&self) -> MemberProfile {
        MemberProfile {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            student_type: self.student_type,
            birth_date: self.birth_date,
            grade: self.grade.clone(),
            role: self.role,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

/// Member as shown on the roster, without credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub student_type: StudentType,
    pub birth_date: NaiveDate,
    pub grade: String,
    pub role: MemberRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentType {
    /// 재학생
    Current,
    /// 졸업생
    Graduate,
}

/// Identity of the signed-in visitor, kept in the session key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub grade: String,
    pub role: MemberRole,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }

    /// Authorship as recorded on posts and comments: display name plus cohort.
    pub fn wrote(&self, author: &str, grade: &str) -> bool {
        self.name == author && self.grade == grade
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(must_match(other = "password"))]
    pub password_confirm: String,
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    pub student_type: StudentType,
    pub birth_date: NaiveDate,
    #[validate(length(min = 1, max = 20))]
    pub grade: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberFilter {
    pub search: String,
    pub student_type: Filter<StudentType>,
    pub role: Filter<MemberRole>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberStats {
    pub total: usize,
    pub graduates: usize,
    pub current_students: usize,
    pub inactive: usize,
}

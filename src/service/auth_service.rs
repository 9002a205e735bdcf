use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use validator::Validate;

use crate::{
    domain::{Member, MemberRole, SignupRequest, StudentType, User},
    error::{AppError, Result},
    id::IdGenerator,
    repository::MemberRepository,
    storage::{keys, JsonStorage},
};

use super::credentials;

/// Built-in account created on first start: (id, email, password, name, grade, role).
const DEFAULT_ACCOUNTS: [(i64, &str, &str, &str, &str, MemberRole); 2] = [
    (1, "admin@goonsan.com", "admin123", "관리자", "관리자", MemberRole::Admin),
    (2, "user@goonsan.com", "user123", "김동문", "85학번", MemberRole::User),
];

pub struct AuthService {
    repo: Arc<dyn MemberRepository>,
    storage: JsonStorage,
    ids: Arc<IdGenerator>,
}

impl AuthService {
    pub fn new(repo: Arc<dyn MemberRepository>, storage: JsonStorage, ids: Arc<IdGenerator>) -> Self {
        Self { repo, storage, ids }
    }

    pub async fn signup(&self, mut request: SignupRequest) -> Result<Member> {
        request.email = request.email.trim().to_string();
        request.name = request.name.trim().to_string();
        request.grade = request.grade.trim().to_string();
        request.validate()?;

        if self.repo.find_by_email(&request.email).await.is_some() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let member = Member {
            id: self.ids.next()?,
            email: request.email,
            password_hash: credentials::hash_blocking(&request.password).await?,
            name: request.name,
            student_type: request.student_type,
            birth_date: request.birth_date,
            grade: request.grade,
            role: MemberRole::User,
            is_active: true,
            created_at: Utc::now(),
        };

        self.repo.add(member.clone()).await?;
        self.ids.persist(&self.storage).await?;

        tracing::info!(member_id = member.id, "Member signed up");
        Ok(member)
    }

    /// Checks credentials and stores the session. The same error is returned
    /// for an unknown email and a wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let Some(member) = self.repo.find_by_email(email).await else {
            tracing::warn!("Login rejected: unknown email");
            return Err(AppError::Unauthorized);
        };

        if !credentials::matches_blocking(password, &member.password_hash).await? {
            tracing::warn!(member_id = member.id, "Login rejected: wrong password");
            return Err(AppError::Unauthorized);
        }

        if !member.is_active {
            tracing::warn!(member_id = member.id, "Login rejected: member is deactivated");
            return Err(AppError::Forbidden);
        }

        let user = member.to_user();
        self.storage.set(keys::USER_SESSION, &user).await?;

        tracing::info!(member_id = member.id, "Member logged in");
        Ok(user)
    }

    pub async fn logout(&self) -> Result<()> {
        self.storage.remove(keys::USER_SESSION).await
    }

    pub async fn current_user(&self) -> Option<User> {
        self.storage.get(keys::USER_SESSION, None).await
    }

    pub async fn require_user(&self) -> Result<User> {
        self.current_user().await.ok_or(AppError::Unauthorized)
    }

    /// Inserts the built-in admin and sample member when their emails are
    /// not registered yet. Returns how many were created.
    pub async fn seed_default_accounts(&self) -> Result<usize> {
        let mut created = 0;

        for (id, email, password, name, grade, role) in DEFAULT_ACCOUNTS {
            if self.repo.find_by_email(email).await.is_some() {
                continue;
            }

            let member = Member {
                id,
                email: email.to_string(),
                password_hash: credentials::hash_blocking(password).await?,
                name: name.to_string(),
                student_type: StudentType::Graduate,
                birth_date: NaiveDate::from_ymd_opt(1966, 3, 1)
                    .ok_or_else(|| AppError::Internal("Invalid default birth date".to_string()))?,
                grade: grade.to_string(),
                role,
                is_active: true,
                created_at: Utc::now(),
            };

            self.repo.add(member).await?;
            self.ids.observe(id)?;
            created += 1;
        }

        if created > 0 {
            tracing::info!(created, "Default accounts seeded");
        }
        Ok(created)
    }
}

use std::sync::Arc;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::MemberRepository,
    selectors,
};

pub struct MemberService {
    repo: Arc<dyn MemberRepository>,
}

impl MemberService {
    pub fn new(repo: Arc<dyn MemberRepository>) -> Self {
        Self { repo }
    }

    /// Roster without credentials, for signed-in members only. Callers get
    /// the `User` from `AuthService::require_user`; holding one is the check.
    pub async fn list(&self, _signed_in: &User, filter: &MemberFilter) -> Result<Vec<MemberProfile>> {
        let members = selectors::filter_members(self.repo.load_all().await, filter);
        Ok(members.iter().map(Member::profile).collect())
    }

    pub async fn toggle_status(&self, actor: &User, id: i64) -> Result<MemberProfile> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden);
        }
        if actor.id == id {
            return Err(AppError::Validation("Cannot change your own status".to_string()));
        }

        let member = self
            .repo
            .load_all()
            .await
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let updated = self.repo.update_status(id, !member.is_active).await?;
        tracing::info!(member_id = id, is_active = updated.is_active, "Member status changed");
        Ok(updated.profile())
    }

    pub async fn stats(&self) -> MemberStats {
        let members = self.repo.load_all().await;

        MemberStats {
            total: members.len(),
            graduates: members.iter().filter(|m| m.student_type == StudentType::Graduate).count(),
            current_students: members.iter().filter(|m| m.student_type == StudentType::Current).count(),
            inactive: members.iter().filter(|m| !m.is_active).count(),
        }
    }
}

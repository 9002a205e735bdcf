use std::sync::Arc;

use chrono::Utc;

use crate::{
    domain::{DuesPledge, DuesRequest, User},
    error::{AppError, Result},
    id::IdGenerator,
    repository::DuesRepository,
};

/// Dues pledges. No payment is taken; a pledge records intent only.
pub struct DuesService {
    repo: Arc<dyn DuesRepository>,
    ids: Arc<IdGenerator>,
}

impl DuesService {
    pub fn new(repo: Arc<dyn DuesRepository>, ids: Arc<IdGenerator>) -> Self {
        Self { repo, ids }
    }

    /// Records a pledge. A member has at most one active pledge, so any
    /// earlier active one is closed.
    pub async fn pledge(&self, actor: &User, request: DuesRequest) -> Result<DuesPledge> {
        request.validate_amount()?;

        let mut pledges = self.repo.load_all().await;
        if let Some(max) = pledges.iter().map(|p| p.id).max() {
            self.ids.observe(max)?;
        }
        for existing in pledges.iter_mut().filter(|p| p.member_id == actor.id && p.is_active) {
            existing.is_active = false;
        }

        let pledge = DuesPledge {
            id: self.ids.next()?,
            member_id: actor.id,
            region: request.region,
            amount: request.amount,
            plan: request.plan,
            is_active: true,
            created_at: Utc::now(),
        };
        pledges.push(pledge.clone());

        self.repo.save_all(&pledges).await?;
        tracing::info!(member_id = actor.id, amount = pledge.amount, "Dues pledged");
        Ok(pledge)
    }

    pub async fn cancel(&self, actor: &User, id: i64) -> Result<DuesPledge> {
        let mut pledges = self.repo.load_all().await;
        let pledge = pledges
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound("Pledge not found".to_string()))?;

        if pledge.member_id != actor.id && !actor.is_admin() {
            return Err(AppError::Forbidden);
        }

        pledge.is_active = false;
        let cancelled = pledge.clone();

        self.repo.save_all(&pledges).await?;
        tracing::info!(pledge_id = id, "Dues pledge cancelled");
        Ok(cancelled)
    }

    pub async fn current(&self, actor: &User) -> Option<DuesPledge> {
        self.repo
            .load_all()
            .await
            .into_iter()
            .filter(|p| p.member_id == actor.id && p.is_active)
            .max_by_key(|p| p.id)
    }
}

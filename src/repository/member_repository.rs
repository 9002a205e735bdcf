use async_trait::async_trait;

use crate::{
    domain::Member,
    error::{AppError, Result},
    repository::MemberRepository,
    storage::{keys, JsonStorage},
};

pub struct JsonMemberRepository {
    storage: JsonStorage,
}

impl JsonMemberRepository {
    pub fn new(storage: JsonStorage) -> Self {
        Self { storage }
    }

    async fn save_all(&self, members: &[Member]) -> Result<()> {
        self.storage.set(keys::MEMBERS, members).await
    }
}

#[async_trait]
impl MemberRepository for JsonMemberRepository {
    async fn load_all(&self) -> Vec<Member> {
        self.storage.get_or_default(keys::MEMBERS).await
    }

    async fn add(&self, member: Member) -> Result<()> {
        let mut members = self.load_all().await;
        members.push(member);
        self.save_all(&members).await
    }

    async fn find_by_email(&self, email: &str) -> Option<Member> {
        self.load_all()
            .await
            .into_iter()
            .find(|m| m.email.eq_ignore_ascii_case(email.trim()))
    }

    async fn update_status(&self, id: i64, is_active: bool) -> Result<Member> {
        let mut members = self.load_all().await;
        let member = members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
        member.is_active = is_active;
        let updated = member.clone();

        self.save_all(&members).await?;
        Ok(updated)
    }

    async fn remove(&self, id: i64) -> Result<()> {
        let mut members = self.load_all().await;
        members.retain(|m| m.id != id);
        self.save_all(&members).await
    }
}

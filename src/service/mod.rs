pub mod auth_service;
pub mod member_service;
pub mod activity_service;
pub mod dues_service;
mod credentials;

use std::sync::Arc;

use crate::{
    config::Settings,
    error::Result,
    id::IdGenerator,
    repository::*,
    storage::{JsonStorage, SqliteKeyValueStore},
    store::{ContentStore, StoreOptions},
};

pub use activity_service::{ActivityService, CommentActivity, MyActivity};
pub use auth_service::AuthService;
pub use dues_service::DuesService;
pub use member_service::MemberService;

pub struct ServiceContext {
    pub settings: Settings,
    pub storage: JsonStorage,
    pub ids: Arc<IdGenerator>,
    pub store: Arc<ContentStore>,
    pub auth_service: Arc<AuthService>,
    pub member_service: Arc<MemberService>,
    pub activity_service: Arc<ActivityService>,
    pub dues_service: Arc<DuesService>,
}

impl ServiceContext {
    /// Opens the SQLite-backed storage named in `settings` and wires
    /// everything on top of it.
    pub async fn open(settings: Settings) -> Result<Self> {
        let backend = SqliteKeyValueStore::connect(&settings.storage).await?;
        Self::with_storage(JsonStorage::new(Arc::new(backend)), settings).await
    }

    pub async fn with_storage(storage: JsonStorage, settings: Settings) -> Result<Self> {
        let ids = Arc::new(IdGenerator::load(&storage).await);

        // Create repositories
        let member_repo = Arc::new(JsonMemberRepository::new(storage.clone()));
        let dues_repo = Arc::new(JsonDuesRepository::new(storage.clone()));

        let store = Arc::new(
            ContentStore::open(storage.clone(), ids.clone(), StoreOptions::from(&settings.content)).await?,
        );

        // Create services
        let auth_service = Arc::new(AuthService::new(member_repo.clone(), storage.clone(), ids.clone()));
        let member_service = Arc::new(MemberService::new(member_repo));
        let activity_service = Arc::new(ActivityService::new(store.clone()));
        let dues_service = Arc::new(DuesService::new(dues_repo, ids.clone()));

        Ok(Self {
            settings,
            storage,
            ids,
            store,
            auth_service,
            member_service,
            activity_service,
            dues_service,
        })
    }
}

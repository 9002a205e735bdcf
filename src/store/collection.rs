use crate::domain::Entity;

/// Where an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    User,
    Seed,
}

/// A list kept as two halves: entries written by visitors, then the
/// compiled-in seed. Reads see the user half first.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    pub user: Vec<T>,
    pub seed: Vec<T>,
}

impl<T: Entity + Clone> Collection<T> {
    pub fn new(user: Vec<T>, seed: Vec<T>) -> Self {
        Self { user, seed }
    }

    pub fn merged(&self) -> Vec<T> {
        self.user.iter().chain(self.seed.iter()).cloned().collect()
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.user
            .iter()
            .chain(self.seed.iter())
            .find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<(Source, &mut T)> {
        if let Some(item) = self.user.iter_mut().find(|item| item.id() == id) {
            return Some((Source::User, item));
        }
        self.seed
            .iter_mut()
            .find(|item| item.id() == id)
            .map(|item| (Source::Seed, item))
    }

    pub fn source_of(&self, id: i64) -> Option<Source> {
        if self.user.iter().any(|item| item.id() == id) {
            Some(Source::User)
        } else if self.seed.iter().any(|item| item.id() == id) {
            Some(Source::Seed)
        } else {
            None
        }
    }

    pub fn remove_user(&mut self, id: i64) -> Option<T> {
        let index = self.user.iter().position(|item| item.id() == id)?;
        Some(self.user.remove(index))
    }

    pub fn max_id(&self) -> Option<i64> {
        self.user.iter().chain(self.seed.iter()).map(Entity::id).max()
    }
}

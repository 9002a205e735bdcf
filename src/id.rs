use std::sync::Mutex;

use chrono::Utc;

use crate::{
    error::{AppError, Result},
    storage::{keys, JsonStorage},
};

/// Hands out ids that grow with creation time and never repeat.
///
/// An id is the current epoch millisecond, bumped past the last id issued
/// when two creations land in the same millisecond (or the clock steps
/// back). Persisting the high-water mark keeps that true across restarts.
pub struct IdGenerator {
    last: Mutex<i64>,
}

impl IdGenerator {
    pub fn new(high_water: i64) -> Self {
        Self {
            last: Mutex::new(high_water),
        }
    }

    pub async fn load(storage: &JsonStorage) -> Self {
        Self::new(storage.get(keys::ID_HIGH_WATER_MARK, 0i64).await)
    }

    pub fn next(&self) -> Result<i64> {
        self.next_at(Utc::now().timestamp_millis())
    }

    pub fn next_at(&self, now_ms: i64) -> Result<i64> {
        let mut last = self
            .last
            .lock()
            .map_err(|e| AppError::Internal(format!("Id generator lock poisoned: {}", e)))?;
        let id = now_ms.max(*last + 1);
        *last = id;
        Ok(id)
    }

    /// Raises the mark to cover ids that were created elsewhere.
    pub fn observe(&self, id: i64) -> Result<()> {
        let mut last = self
            .last
            .lock()
            .map_err(|e| AppError::Internal(format!("Id generator lock poisoned: {}", e)))?;
        *last = (*last).max(id);
        Ok(())
    }

    pub fn high_water(&self) -> Result<i64> {
        self.last
            .lock()
            .map(|last| *last)
            .map_err(|e| AppError::Internal(format!("Id generator lock poisoned: {}", e)))
    }

    pub async fn persist(&self, storage: &JsonStorage) -> Result<()> {
        storage.set(keys::ID_HIGH_WATER_MARK, &self.high_water()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_increase_within_same_millisecond() {
        let ids = IdGenerator::new(0);
        let a = ids.next_at(1_700_000_000_000).unwrap();
        let b = ids.next_at(1_700_000_000_000).unwrap();
        let c = ids.next_at(1_699_999_999_000).unwrap();
        assert_eq!(a, 1_700_000_000_000);
        assert_eq!(b, a + 1);
        assert_eq!(c, b + 1);
    }

    #[test]
    fn test_observe_raises_high_water() {
        let ids = IdGenerator::new(10);
        ids.observe(500).unwrap();
        ids.observe(20).unwrap();
        assert_eq!(ids.high_water().unwrap(), 500);
        assert_eq!(ids.next_at(100).unwrap(), 501);
    }
}

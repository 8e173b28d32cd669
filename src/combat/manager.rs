//! Encounter registry
//!
//! Holds any number of independent encounters. Each encounter has its own
//! lock, so actions on one encounter are applied one at a time while
//! different encounters proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use super::encounter::{reduce, roll_initiatives, Action, EncounterContext};
use super::state::InitiativeState;

/// Errors from the encounter registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncounterError {
    #[error("encounter not found: {0}")]
    NotFound(String),
}

/// One encounter: its static context and current snapshot
#[derive(Debug, Clone)]
pub struct Encounter {
    pub context: EncounterContext,
    pub state: InitiativeState,
}

/// Registry of encounters by id
#[derive(Debug, Default)]
pub struct EncounterManager {
    encounters: RwLock<HashMap<String, Arc<Mutex<Encounter>>>>,
}

impl EncounterManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Start a new encounter in its initial state, returning its id
    pub async fn create(&self, context: EncounterContext) -> String {
        let id = Uuid::new_v4().to_string();
        let state = context.initial_state();
        self.insert(&id, context, state).await;
        info!("encounter {} created", id);
        id
    }

    /// Register an encounter restored from a persisted snapshot
    pub async fn insert(&self, id: &str, context: EncounterContext, state: InitiativeState) {
        let encounter = Arc::new(Mutex::new(Encounter { context, state }));
        self.encounters.write().await.insert(id.to_string(), encounter);
    }

    async fn handle(&self, id: &str) -> Result<Arc<Mutex<Encounter>>, EncounterError> {
        self.encounters
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| EncounterError::NotFound(id.to_string()))
    }

    /// Current snapshot of an encounter
    pub async fn state(&self, id: &str) -> Option<InitiativeState> {
        let handle = self.handle(id).await.ok()?;
        let encounter = handle.lock().await;
        Some(encounter.state.clone())
    }

    pub async fn context(&self, id: &str) -> Option<EncounterContext> {
        let handle = self.handle(id).await.ok()?;
        let encounter = handle.lock().await;
        Some(encounter.context.clone())
    }

    /// Apply an action and return the new snapshot
    pub async fn apply(&self, id: &str, action: &Action) -> Result<InitiativeState, EncounterError> {
        let handle = self.handle(id).await?;
        let mut encounter = handle.lock().await;
        let next = reduce(&encounter.context, &encounter.state, action);
        if next != encounter.state {
            debug!("encounter {}: {:?} applied", id, action);
            encounter.state = next.clone();
        }
        Ok(next)
    }

    /// Roll initiative for every combatant in an encounter
    pub async fn roll_initiative(&self, id: &str) -> Result<InitiativeState, EncounterError> {
        let handle = self.handle(id).await?;
        let mut encounter = handle.lock().await;
        let next = roll_initiatives(&encounter.context, &encounter.state, &mut rand::rng());
        encounter.state = next.clone();
        Ok(next)
    }

    /// Drop an encounter, returning its last state
    pub async fn remove(&self, id: &str) -> Option<Encounter> {
        let handle = self.encounters.write().await.remove(id)?;
        let encounter = handle.lock().await;
        Some(encounter.clone())
    }

    /// Ids of all live encounters
    pub async fn ids(&self) -> Vec<String> {
        self.encounters.read().await.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::roster::{Combatant, ConsumableDef};

    fn context() -> EncounterContext {
        EncounterContext::new(
            vec![
                Combatant::new("Cleric", 18, 38),
                Combatant::new("Troll", 15, 84),
                Combatant::new("Ranger", 15, 44),
            ],
            vec![ConsumableDef::new("reactions", 1).per_round()],
        )
    }

    #[tokio::test]
    async fn test_create_and_apply() {
        let manager = EncounterManager::new();
        let id = manager.create(context()).await;

        let state = manager.state(&id).await.unwrap();
        assert_eq!(state.round, 1);
        assert_eq!(state.active_index, None);

        let state = manager.apply(&id, &Action::Advance).await.unwrap();
        assert_eq!(state.active_index, Some(0));
        assert_eq!(manager.state(&id).await.unwrap(), state);
    }

    #[tokio::test]
    async fn test_unknown_encounter() {
        let manager = EncounterManager::new();
        assert_eq!(
            manager.apply("missing", &Action::Advance).await,
            Err(EncounterError::NotFound("missing".to_string()))
        );
        assert!(manager.state("missing").await.is_none());
        assert!(manager.roll_initiative("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_actions_are_serialized() {
        let manager = EncounterManager::shared();
        let id = manager.create(context()).await;

        let mut tasks = Vec::new();
        for _ in 0..10 {
            let manager = manager.clone();
            let id = id.clone();
            tasks.push(tokio::spawn(async move {
                manager.apply(&id, &Action::Advance).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        // 10 advances over 3 combatants from nobody active
        let state = manager.state(&id).await.unwrap();
        assert_eq!(state.active_index, Some(0));
        assert_eq!(state.round, 4);
    }

    #[tokio::test]
    async fn test_encounters_are_isolated() {
        let manager = EncounterManager::new();
        let a = manager.create(context()).await;
        let b = manager.create(context()).await;
        assert_ne!(a, b);

        manager.apply(&a, &Action::Advance).await.unwrap();
        assert_eq!(manager.state(&a).await.unwrap().active_index, Some(0));
        assert_eq!(manager.state(&b).await.unwrap().active_index, None);
        assert_eq!(manager.ids().await.len(), 2);

        let removed = manager.remove(&a).await.unwrap();
        assert_eq!(removed.state.active_index, Some(0));
        assert_eq!(manager.ids().await, vec![b]);
    }

    #[tokio::test]
    async fn test_roll_initiative() {
        let manager = EncounterManager::new();
        let id = manager.create(context()).await;
        let state = manager.roll_initiative(&id).await.unwrap();

        let context = manager.context(&id).await.unwrap();
        for combatant in &context.roster {
            let value = state.initiative(&combatant.key());
            assert!((1..=20).contains(&value));
        }
    }
}

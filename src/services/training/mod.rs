use crate::algorithms::UserBasedCf;
use crate::config::Config;
use crate::error::RecResult;
use crate::models::Interaction;
use crate::services::store::InteractionStore;
use crate::utils::{days_before, retry_with_backoff};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Output of one successful training run. Never mutated after construction.
#[derive(Debug)]
pub struct Snapshot {
    pub model: UserBasedCf,
    pub generation: u64,
    pub trained_at: DateTime<Utc>,
}

#[derive(Debug)]
pub enum ModelState {
    /// No interactions were available; every lookup goes to the popularity path.
    Untrained { generation: u64 },
    Trained(Snapshot),
}

impl ModelState {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            ModelState::Trained(snapshot) => Some(snapshot),
            ModelState::Untrained { .. } => None,
        }
    }

    pub fn is_trained(&self) -> bool {
        matches!(self, ModelState::Trained(_))
    }

    pub fn generation(&self) -> u64 {
        match self {
            ModelState::Trained(snapshot) => snapshot.generation,
            ModelState::Untrained { generation } => *generation,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingStatus {
    pub trained: bool,
    pub generation: u64,
    pub users: usize,
    pub products: usize,
    pub trained_at: Option<DateTime<Utc>>,
}

/// Owns the live model and replaces it wholesale on retrain.
///
/// Readers clone the `Arc` under a read lock and then work without any lock;
/// a retrain builds the next state off to the side and swaps the pointer under
/// a write lock held only for the assignment.
pub struct TrainingService {
    store: Arc<dyn InteractionStore>,
    config: Arc<Config>,
    state: Arc<RwLock<Arc<ModelState>>>,
    generation: Arc<AtomicU64>,
}

impl TrainingService {
    pub fn new(store: Arc<dyn InteractionStore>, config: Arc<Config>) -> Self {
        Self {
            store,
            config,
            state: Arc::new(RwLock::new(Arc::new(ModelState::Untrained { generation: 0 }))),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The state every request of this moment should read.
    pub fn current(&self) -> Arc<ModelState> {
        self.state.read().clone()
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Runs the pure pipeline over `interactions` without installing the result.
    pub fn train_from(&self, interactions: &[Interaction]) -> ModelState {
        self.train_as(self.next_generation(), interactions)
    }

    fn train_as(&self, generation: u64, interactions: &[Interaction]) -> ModelState {
        let started = Instant::now();

        match UserBasedCf::fit(interactions, self.config.recommendation.neighbors) {
            Some(model) => {
                info!(
                    "Recommendation model trained: generation {}, {} users x {} products from {} interactions in {:?}",
                    generation,
                    model.users().len(),
                    model.products().len(),
                    interactions.len(),
                    started.elapsed()
                );
                ModelState::Trained(Snapshot {
                    model,
                    generation,
                    trained_at: Utc::now(),
                })
            }
            None => {
                warn!("Not enough data to train the model; serving popular products only");
                ModelState::Untrained { generation }
            }
        }
    }

    /// Swaps in `next` unless a newer generation is already live, and returns
    /// whichever state is live afterwards. The previous state is freed once its
    /// last reader drops it.
    pub fn install(&self, next: ModelState) -> Arc<ModelState> {
        let mut live = self.state.write();
        if next.generation() < live.generation() {
            warn!(
                "Discarding generation {}, generation {} is already live",
                next.generation(),
                live.generation()
            );
            return live.clone();
        }
        *live = Arc::new(next);
        live.clone()
    }

    /// Reads the log and installs a fresh state.
    ///
    /// The generation is reserved before the read, so of two overlapping
    /// retrains the one that started later wins. On a store failure the current
    /// state keeps serving and the error is returned.
    pub async fn retrain(&self) -> RecResult<TrainingStatus> {
        let since = match self.config.training.window_days {
            Some(days) => Some(days_before(Utc::now(), days)?),
            None => None,
        };
        let generation = self.next_generation();

        let interactions = retry_with_backoff(
            || self.store.interactions(since),
            self.config.training.retry_attempts,
            Duration::from_millis(self.config.training.retry_initial_delay_ms),
            |e: &crate::error::RecError| e.is_retryable(),
        )
        .await
        .map_err(|e| {
            error!("Retrain failed, keeping generation {}: {}", self.current().generation(), e);
            e
        })?;

        let state = self.install(self.train_as(generation, &interactions));
        Ok(Self::describe(&state))
    }

    pub fn status(&self) -> TrainingStatus {
        Self::describe(&self.current())
    }

    fn describe(state: &ModelState) -> TrainingStatus {
        match state.snapshot() {
            Some(snapshot) => TrainingStatus {
                trained: true,
                generation: snapshot.generation,
                users: snapshot.model.users().len(),
                products: snapshot.model.products().len(),
                trained_at: Some(snapshot.trained_at),
            },
            None => TrainingStatus {
                trained: false,
                generation: state.generation(),
                users: 0,
                products: 0,
                trained_at: None,
            },
        }
    }

    /// Spawns a periodic retrain loop when an interval is configured.
    pub fn start_retrain_worker(&self) -> Option<tokio::task::JoinHandle<()>> {
        let interval = Duration::from_secs(self.config.training.retrain_interval_secs?);
        let service = self.clone();

        info!("Retrain worker started, interval {:?}", interval);
        Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if let Err(e) = service.retrain().await {
                    error!("Scheduled retrain failed: {}", e);
                }
            }
        }))
    }
}

impl Clone for TrainingService {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
            state: self.state.clone(),
            generation: self.generation.clone(),
        }
    }
}

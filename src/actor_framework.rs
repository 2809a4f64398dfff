use std::collections::{HashMap, HashSet};
use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Params, and Actions)
// =============================================================================

/// Trait that any domain entity must implement to be managed by [`ResourceActor`].
///
/// Hooks return the entity's own `Rejection` type so that business failures
/// (bad input, insufficient stock, duplicate email) reach the caller intact
/// instead of being flattened into strings.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;
    type Rejection: std::error::Error + Clone + Send + Sync + 'static;

    /// Short name used in log fields.
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the generated ID and creation params.
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, Self::Rejection>;

    // --- Lifecycle Hooks ---

    /// Checked against every stored entity before a new one is inserted.
    /// Runs inside the actor, so the check and the insert cannot interleave
    /// with another create.
    fn conflicts_with(&self, _existing: &Self) -> Option<Self::Rejection> {
        None
    }

    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Rejection>;

    fn on_delete(&self) -> Result<(), Self::Rejection> {
        Ok(())
    }

    // --- Action Handler ---

    /// Handle a custom domain-specific action.
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Rejection>;
}

// =============================================================================
// 2. ERRORS
// =============================================================================

/// Failure of a request sent to a [`ResourceActor`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameworkError<R> {
    /// The actor's mailbox is closed; the actor has stopped.
    #[error("Actor closed")]
    ActorClosed,
    /// The actor accepted the request but dropped the reply channel.
    #[error("Actor dropped")]
    ActorDropped,
    /// No entity with this id is stored.
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The entity rejected the operation.
    #[error("{0}")]
    Rejected(#[source] R),
}

// =============================================================================
// 3. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, R> = oneshot::Sender<Result<T, FrameworkError<R>>>;

type Rejection<T> = <T as Entity>::Rejection;

/// Predicate evaluated inside the actor against stored entities.
pub type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T, Rejection<T>>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>, Rejection<T>>,
    },
    GetMany {
        ids: Vec<T::Id>,
        respond_to: Response<Vec<T>, Rejection<T>>,
    },
    Find {
        predicate: Predicate<T>,
        respond_to: Response<Option<T>, Rejection<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T, Rejection<T>>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<(), Rejection<T>>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult, Rejection<T>>,
    },
    /// Applies every action or none of them.
    Batch {
        actions: Vec<(T::Id, T::Action)>,
        respond_to: Response<Vec<T::ActionResult>, Rejection<T>>,
    },
}

impl<T: Entity> Debug for ResourceRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceRequest::Create { params, .. } => f.debug_struct("Create").field("params", params).finish(),
            ResourceRequest::Get { id, .. } => f.debug_struct("Get").field("id", id).finish(),
            ResourceRequest::GetMany { ids, .. } => f.debug_struct("GetMany").field("ids", ids).finish(),
            ResourceRequest::Find { .. } => f.debug_struct("Find").finish_non_exhaustive(),
            ResourceRequest::Update { id, patch, .. } => {
                f.debug_struct("Update").field("id", id).field("patch", patch).finish()
            }
            ResourceRequest::Delete { id, .. } => f.debug_struct("Delete").field("id", id).finish(),
            ResourceRequest::Action { id, action, .. } => {
                f.debug_struct("Action").field("id", id).field("action", action).finish()
            }
            ResourceRequest::Batch { actions, .. } => f.debug_struct("Batch").field("actions", actions).finish(),
        }
    }
}

// =============================================================================
// 4. THE GENERIC ACTOR SERVER
// =============================================================================

/// Owns a store of entities and serves requests one at a time.
///
/// Every request runs to completion before the next one is received, so each
/// request (including a whole [`ResourceRequest::Batch`]) is atomic with
/// respect to all other requests on the same actor.
pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
    /// Id handed to a create that was rejected; the next create takes it.
    spare_id: Option<T::Id>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
            spare_id: None,
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    #[instrument(name = "resource_actor", skip(self), fields(kind = T::KIND))]
    pub async fn run(mut self) {
        info!("Actor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.handle_create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::GetMany { ids, respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_get_many(ids)));
                }
                ResourceRequest::Find { predicate, respond_to } => {
                    let found = self.store.values().find(|&item| predicate(item)).cloned();
                    let _ = respond_to.send(Ok(found));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let result = match self.store.get_mut(&id) {
                        Some(item) => item.handle_action(action).map_err(FrameworkError::Rejected),
                        None => Err(FrameworkError::NotFound(id.to_string())),
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Batch { actions, respond_to } => {
                    let _ = respond_to.send(self.handle_batch(actions));
                }
            }
        }
        info!("Actor stopped");
    }

    /// Ids are only spent on stored entities, so successful creates see an
    /// unbroken sequence.
    fn handle_create(&mut self, params: T::CreateParams) -> Result<T, FrameworkError<T::Rejection>> {
        let id = match self.spare_id.take() {
            Some(id) => id,
            None => (self.next_id_fn)(),
        };
        match self.build(id.clone(), params) {
            Ok(item) => {
                self.store.insert(id.clone(), item.clone());
                debug!(id = %id, "Created");
                Ok(item)
            }
            Err(e) => {
                self.spare_id = Some(id);
                Err(FrameworkError::Rejected(e))
            }
        }
    }

    fn build(&self, id: T::Id, params: T::CreateParams) -> Result<T, T::Rejection> {
        let item = T::from_create_params(id, params)?;
        if let Some(conflict) = self.store.values().find_map(|existing| item.conflicts_with(existing)) {
            debug!(error = %conflict, "Create rejected by conflict check");
            return Err(conflict);
        }
        Ok(item)
    }

    fn handle_get_many(&self, ids: Vec<T::Id>) -> Vec<T> {
        let mut seen = HashSet::new();
        ids.into_iter()
            .filter(|id| seen.insert(id.clone()))
            .filter_map(|id| self.store.get(&id).cloned())
            .collect()
    }

    fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError<T::Rejection>> {
        let item = self
            .store
            .get_mut(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        // Patch a copy so a rejected patch leaves the stored entity untouched.
        let mut patched = item.clone();
        patched.on_update(patch).map_err(FrameworkError::Rejected)?;
        *item = patched.clone();
        Ok(patched)
    }

    fn handle_delete(&mut self, id: T::Id) -> Result<(), FrameworkError<T::Rejection>> {
        let item = self
            .store
            .get(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        item.on_delete().map_err(FrameworkError::Rejected)?;
        self.store.remove(&id);
        Ok(())
    }

    /// Applies the actions to staged copies and commits only if all succeed.
    /// Repeated ids see the effect of earlier actions in the same batch.
    fn handle_batch(
        &mut self,
        actions: Vec<(T::Id, T::Action)>,
    ) -> Result<Vec<T::ActionResult>, FrameworkError<T::Rejection>> {
        let mut staged: HashMap<T::Id, T> = HashMap::new();
        let mut results = Vec::with_capacity(actions.len());

        for (id, action) in actions {
            if !staged.contains_key(&id) {
                let current = self.store.get(&id).cloned().ok_or_else(|| {
                    warn!(id = %id, "Batch aborted: item not found");
                    FrameworkError::NotFound(id.to_string())
                })?;
                staged.insert(id.clone(), current);
            }
            let Some(item) = staged.get_mut(&id) else {
                return Err(FrameworkError::NotFound(id.to_string()));
            };
            let result = item.handle_action(action).map_err(|e| {
                warn!(id = %id, error = %e, "Batch aborted: action rejected");
                FrameworkError::Rejected(e)
            })?;
            results.push(result);
        }

        debug!(items = staged.len(), "Batch committed");
        self.store.extend(staged);
        Ok(results)
    }
}

// =============================================================================
// 5. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R, T::Rejection>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError<T::Rejection>> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T, FrameworkError<T::Rejection>> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError<T::Rejection>> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    /// Returns the stored entities among `ids`, each at most once.
    pub async fn get_many(&self, ids: Vec<T::Id>) -> Result<Vec<T>, FrameworkError<T::Rejection>> {
        self.request(|respond_to| ResourceRequest::GetMany { ids, respond_to }).await
    }

    pub async fn find(
        &self,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<Option<T>, FrameworkError<T::Rejection>> {
        let predicate: Predicate<T> = Box::new(predicate);
        self.request(|respond_to| ResourceRequest::Find { predicate, respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError<T::Rejection>> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError<T::Rejection>> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError<T::Rejection>> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }

    pub async fn perform_batch(
        &self,
        actions: Vec<(T::Id, T::Action)>,
    ) -> Result<Vec<T::ActionResult>, FrameworkError<T::Rejection>> {
        self.request(|respond_to| ResourceRequest::Batch { actions, respond_to }).await
    }
}

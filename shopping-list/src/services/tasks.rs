//! Task store
//!
//! Owns the ordered shopping list. Every mutation runs under a single
//! writer lock, commits to the database, and only then replaces the cached
//! snapshot and broadcasts a [`StoreEvent`].

use crate::config::{Storage, StoreConfig, EVENT_CHANNEL_CAPACITY};
use crate::database::{
    create_memory_pool, create_pool, CreateTaskRequest, Repository, Task, UpdateTaskRequest,
};
use crate::error::{AppError, Result};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

/// Change notification published by the task store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// The visible list changed; carries the new sorted snapshot
    SnapshotChanged(Vec<Task>),
    /// A task was created
    ItemAdded(Task),
}

struct OpenStore {
    repo: Repository,
    tasks: Vec<Task>,
}

/// Task store with an explicit Closed → Open lifecycle
#[derive(Clone)]
pub struct TaskStore {
    config: StoreConfig,
    state: Arc<Mutex<Option<OpenStore>>>,
    events: broadcast::Sender<StoreEvent>,
}

impl TaskStore {
    /// Create a closed store; call [`TaskStore::open`] before use
    pub fn new(config: StoreConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            state: Arc::new(Mutex::new(None)),
            events,
        }
    }

    /// Open the configured storage and load the initial snapshot.
    /// Opening an already open store does nothing.
    pub async fn open(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.is_some() {
            return Ok(());
        }

        tracing::info!("Opening task store: {:?}", self.config.storage);

        let pool = match &self.config.storage {
            Storage::File(path) => create_pool(path).await?,
            Storage::Memory => create_memory_pool().await?,
        };
        let repo = Repository::new(pool);

        let mut tasks = repo.list_tasks().await?;
        sort_visible(&mut tasks);

        tracing::info!("Task store opened with {} tasks", tasks.len());

        self.publish(StoreEvent::SnapshotChanged(tasks.clone()));
        *state = Some(OpenStore { repo, tasks });

        Ok(())
    }

    /// Tear the store down; later calls fail with `StoreNotOpen`
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if let Some(store) = state.take() {
            store.repo.close().await;
            tracing::info!("Task store closed");
        }
    }

    pub async fn is_open(&self) -> bool {
        self.state.lock().await.is_some()
    }

    /// Repository sharing this store's database, for collaborating services
    pub async fn repository(&self) -> Result<Repository> {
        let state = self.state.lock().await;
        let store = state.as_ref().ok_or(AppError::StoreNotOpen)?;
        Ok(store.repo.clone())
    }

    /// Subscribe to snapshot and item-added events
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Last committed snapshot in visible order
    pub async fn snapshot(&self) -> Result<Vec<Task>> {
        let state = self.state.lock().await;
        let store = state.as_ref().ok_or(AppError::StoreNotOpen)?;
        Ok(store.tasks.clone())
    }

    /// Read the visible list straight from storage
    pub async fn query(&self) -> Result<Vec<Task>> {
        let state = self.state.lock().await;
        let store = state.as_ref().ok_or(AppError::StoreNotOpen)?;
        store.repo.list_tasks().await
    }

    pub async fn len(&self) -> Result<usize> {
        let state = self.state.lock().await;
        let store = state.as_ref().ok_or(AppError::StoreNotOpen)?;
        Ok(store.tasks.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Add a task at the end of the manual order
    pub async fn create(&self, title: &str, quantity: i64) -> Result<Task> {
        self.create_within_limit(title, quantity, None).await
    }

    /// Add a task unless the list already holds `limit` tasks.
    ///
    /// The count is checked under the writer lock, so concurrent callers
    /// cannot push the list past the limit.
    pub async fn create_within_limit(
        &self,
        title: &str,
        quantity: i64,
        limit: Option<usize>,
    ) -> Result<Task> {
        let title = clean_title(title)?;
        check_quantity(quantity)?;

        let mut state = self.state.lock().await;
        let store = state.as_mut().ok_or(AppError::StoreNotOpen)?;

        if let Some(limit) = limit {
            if store.tasks.len() >= limit {
                tracing::warn!("Item limit {} reached, rejecting {}", limit, title);
                return Err(AppError::FreeTierLimit(limit));
            }
        }

        let task = store
            .repo
            .create_task(CreateTaskRequest { title, quantity })
            .await?;

        tracing::info!("Added task {} ({}) at order {}", task.title, task.id, task.order);

        store.tasks.push(task.clone());
        sort_visible(&mut store.tasks);
        self.publish(StoreEvent::SnapshotChanged(store.tasks.clone()));
        self.publish(StoreEvent::ItemAdded(task.clone()));

        Ok(task)
    }

    /// Change only the supplied fields of a task
    pub async fn update(&self, mut req: UpdateTaskRequest) -> Result<Task> {
        if let Some(title) = req.title.take() {
            req.title = Some(clean_title(&title)?);
        }
        if let Some(quantity) = req.quantity {
            check_quantity(quantity)?;
        }

        let mut state = self.state.lock().await;
        let store = state.as_mut().ok_or(AppError::StoreNotOpen)?;

        self.apply_update(store, req).await
    }

    /// Flip the completed flag of a task
    pub async fn toggle_completed(&self, id: &str) -> Result<Task> {
        let mut state = self.state.lock().await;
        let store = state.as_mut().ok_or(AppError::StoreNotOpen)?;

        let current = store.repo.get_task(id).await?;
        let req = UpdateTaskRequest::new(id).completed(!current.completed);

        self.apply_update(store, req).await
    }

    async fn apply_update(&self, store: &mut OpenStore, req: UpdateTaskRequest) -> Result<Task> {
        let unchanged = req.is_empty();
        let task = store.repo.update_task(req).await?;

        if unchanged {
            return Ok(task);
        }

        tracing::debug!("Updated task: {}", task.id);

        if let Some(slot) = store.tasks.iter_mut().find(|t| t.id == task.id) {
            *slot = task.clone();
        }
        sort_visible(&mut store.tasks);
        self.publish(StoreEvent::SnapshotChanged(store.tasks.clone()));

        Ok(task)
    }

    /// Permanently delete one task
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let store = state.as_mut().ok_or(AppError::StoreNotOpen)?;

        store.repo.delete_task(id).await?;

        tracing::info!("Deleted task: {}", id);

        store.tasks.retain(|t| t.id != id);
        self.publish(StoreEvent::SnapshotChanged(store.tasks.clone()));

        Ok(())
    }

    /// Delete every task, returning how many were removed
    pub async fn delete_all(&self) -> Result<u64> {
        let mut state = self.state.lock().await;
        let store = state.as_mut().ok_or(AppError::StoreNotOpen)?;

        let removed = store.repo.delete_all_tasks().await?;

        tracing::info!("Deleted all {} tasks", removed);

        store.tasks.clear();
        self.publish(StoreEvent::SnapshotChanged(Vec::new()));

        Ok(removed)
    }

    /// Move the tasks at `from` (indices into the visible list) so that the
    /// first of them lands at index `to` of the result, then renumber every
    /// task's order to its new index.
    pub async fn reorder(
        &self,
        from: impl IntoIterator<Item = usize>,
        to: usize,
    ) -> Result<Vec<Task>> {
        let from: BTreeSet<usize> = from.into_iter().collect();

        let mut state = self.state.lock().await;
        let store = state.as_mut().ok_or(AppError::StoreNotOpen)?;

        let len = store.tasks.len();
        if let Some(&index) = from.iter().find(|&&i| i >= len) {
            tracing::warn!("Rejected reorder from position {} of {}", index, len);
            return Err(AppError::InvalidPosition { index, len });
        }
        if from.is_empty() {
            return Ok(store.tasks.clone());
        }

        let mut reordered = move_positions(&store.tasks, &from, to);
        let ids: Vec<String> = reordered.iter().map(|t| t.id.clone()).collect();

        store.repo.renumber_tasks(&ids).await?;

        for (index, task) in reordered.iter_mut().enumerate() {
            task.order = index as i64;
        }
        sort_visible(&mut reordered);

        tracing::info!("Reordered {} tasks to position {}", from.len(), to);

        store.tasks = reordered;
        self.publish(StoreEvent::SnapshotChanged(store.tasks.clone()));

        Ok(store.tasks.clone())
    }

    fn publish(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Sort into visible order: open first, then manual order, then title
pub fn sort_visible(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        a.completed
            .cmp(&b.completed)
            .then(a.order.cmp(&b.order))
            .then_with(|| a.title.cmp(&b.title))
    });
}

/// Multi-select move: remove the items at `from`, keeping their relative
/// order, and insert them as a block at index `to` of what remains.
fn move_positions<T: Clone>(items: &[T], from: &BTreeSet<usize>, to: usize) -> Vec<T> {
    let (moved, mut rest): (Vec<_>, Vec<_>) = items
        .iter()
        .cloned()
        .enumerate()
        .partition(|(i, _)| from.contains(i));

    let insert_at = to.min(rest.len());
    rest.splice(insert_at..insert_at, moved);

    rest.into_iter().map(|(_, item)| item).collect()
}

fn clean_title(title: &str) -> Result<String> {
    let cleaned = title.trim();
    if cleaned.is_empty() {
        tracing::warn!("Rejected empty task title");
        return Err(AppError::InvalidTitle);
    }
    Ok(cleaned.to_string())
}

fn check_quantity(quantity: i64) -> Result<()> {
    if quantity < 1 {
        tracing::warn!("Rejected task quantity {}", quantity);
        return Err(AppError::InvalidQuantity(quantity));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    async fn create_test_store() -> TaskStore {
        let store = TaskStore::new(StoreConfig::in_memory(PathBuf::from("unused")));
        store.open().await.unwrap();
        store
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn test_move_positions() {
        let items = ["A", "B", "C", "D"];

        let moved = move_positions(&items, &BTreeSet::from([0]), 2);
        assert_eq!(moved, ["B", "C", "A", "D"]);

        let moved = move_positions(&items, &BTreeSet::from([3]), 0);
        assert_eq!(moved, ["D", "A", "B", "C"]);

        let moved = move_positions(&items, &BTreeSet::from([0, 2]), 1);
        assert_eq!(moved, ["B", "A", "C", "D"]);

        let moved = move_positions(&items, &BTreeSet::from([1]), 99);
        assert_eq!(moved, ["A", "C", "D", "B"]);
    }

    #[tokio::test]
    async fn test_operations_require_open_store() {
        let store = TaskStore::new(StoreConfig::in_memory(PathBuf::from("unused")));

        assert!(matches!(store.create("Milk", 1).await, Err(AppError::StoreNotOpen)));
        assert!(matches!(store.snapshot().await, Err(AppError::StoreNotOpen)));
        assert!(matches!(store.delete_all().await, Err(AppError::StoreNotOpen)));

        store.open().await.unwrap();
        store.create("Milk", 1).await.unwrap();
        store.close().await;

        assert!(!store.is_open().await);
        assert!(matches!(store.query().await, Err(AppError::StoreNotOpen)));
        assert!(matches!(store.reorder([0], 1).await, Err(AppError::StoreNotOpen)));
    }

    #[tokio::test]
    async fn test_create_assigns_next_order() {
        let store = create_test_store().await;

        for title in ["A", "B", "C"] {
            store.create(title, 1).await.unwrap();
        }
        let orders: Vec<i64> = store.snapshot().await.unwrap().iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);

        let task = store.create("D", 1).await.unwrap();
        assert_eq!(task.order, 3);
    }

    #[tokio::test]
    async fn test_create_trims_and_validates() {
        let store = create_test_store().await;

        let task = store.create("  Milk \n", 2).await.unwrap();
        assert_eq!(task.title, "Milk");
        assert_eq!(task.quantity, 2);

        assert!(matches!(store.create("   ", 1).await, Err(AppError::InvalidTitle)));
        assert!(matches!(store.create("Eggs", 0).await, Err(AppError::InvalidQuantity(0))));
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_stays_sorted() {
        let store = create_test_store().await;

        let bread = store.create("Bread", 1).await.unwrap();
        store.create("Apples", 1).await.unwrap();
        store.create("Cheese", 1).await.unwrap();
        store.toggle_completed(&bread.id).await.unwrap();

        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(titles(&snapshot), vec!["Apples", "Cheese", "Bread"]);
        assert_eq!(snapshot, store.query().await.unwrap());
    }

    #[tokio::test]
    async fn test_title_breaks_order_ties() {
        let store = create_test_store().await;

        let b = store.create("Bananas", 1).await.unwrap();
        let a = store.create("Apples", 1).await.unwrap();

        // Force equal manual order
        let repo = store.repository().await.unwrap();
        repo.renumber_tasks(&[b.id.clone()]).await.unwrap();
        repo.renumber_tasks(&[a.id.clone()]).await.unwrap();

        assert_eq!(titles(&store.query().await.unwrap()), vec!["Apples", "Bananas"]);
    }

    #[tokio::test]
    async fn test_update_with_no_fields_returns_unchanged_task() {
        let store = create_test_store().await;
        let task = store.create("Milk", 3).await.unwrap();

        let same = store.update(UpdateTaskRequest::new(&task.id)).await.unwrap();
        assert_eq!(same, task);
    }

    #[tokio::test]
    async fn test_update_trims_title() {
        let store = create_test_store().await;
        let task = store.create("Milk", 1).await.unwrap();

        let updated = store
            .update(UpdateTaskRequest::new(&task.id).title("  Oat Milk  ").quantity(2))
            .await
            .unwrap();

        assert_eq!(updated.title, "Oat Milk");
        assert_eq!(updated.quantity, 2);
        assert!(!updated.completed);
        assert_eq!(store.snapshot().await.unwrap()[0], updated);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = create_test_store().await;

        let err = store
            .update(UpdateTaskRequest::new("missing").completed(true))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_unknown_id_leaves_snapshot() {
        let store = create_test_store().await;
        store.create("Milk", 1).await.unwrap();
        let before = store.snapshot().await.unwrap();

        let err = store.delete("missing").await.unwrap_err();
        assert!(matches!(err, AppError::TaskNotFound(_)));
        assert_eq!(store.snapshot().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_delete_all() {
        let store = create_test_store().await;
        store.create("Milk", 1).await.unwrap();
        store.create("Eggs", 1).await.unwrap();

        assert_eq!(store.delete_all().await.unwrap(), 2);
        assert!(store.is_empty().await.unwrap());
        assert!(store.query().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reorder_rewrites_all_orders() {
        let store = create_test_store().await;
        for title in ["A", "B", "C", "D"] {
            store.create(title, 1).await.unwrap();
        }

        let reordered = store.reorder([0], 2).await.unwrap();
        assert_eq!(titles(&reordered), vec!["B", "C", "A", "D"]);
        let orders: Vec<i64> = reordered.iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);

        assert_eq!(store.query().await.unwrap(), reordered);
    }

    #[tokio::test]
    async fn test_reorder_rejects_out_of_range() {
        let store = create_test_store().await;
        store.create("A", 1).await.unwrap();

        let err = store.reorder([1], 0).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidPosition { index: 1, len: 1 }));
    }

    #[tokio::test]
    async fn test_create_within_limit() {
        let store = create_test_store().await;
        store.create_within_limit("A", 1, Some(2)).await.unwrap();
        store.create_within_limit("B", 1, Some(2)).await.unwrap();

        let err = store.create_within_limit("C", 1, Some(2)).await.unwrap_err();
        assert!(matches!(err, AppError::FreeTierLimit(2)));
        assert_eq!(store.len().await.unwrap(), 2);

        store.create_within_limit("C", 1, None).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_failed_create_leaves_snapshot() {
        let store = create_test_store().await;
        store.create("A", 1).await.unwrap();
        let before = store.snapshot().await.unwrap();

        store.repository().await.unwrap().close().await;

        let err = store.create("B", 1).await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
        assert_eq!(store.snapshot().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_failed_reorder_leaves_snapshot() {
        let store = create_test_store().await;
        store.create("A", 1).await.unwrap();
        store.create("B", 1).await.unwrap();
        let before = store.snapshot().await.unwrap();

        store.repository().await.unwrap().close().await;

        let err = store.reorder([0], 1).await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
        assert_eq!(store.snapshot().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_failed_delete_all_leaves_snapshot() {
        let store = create_test_store().await;
        store.create("A", 1).await.unwrap();
        let before = store.snapshot().await.unwrap();
        let mut events = store.subscribe();

        store.repository().await.unwrap().close().await;

        let err = store.delete_all().await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
        assert_eq!(store.snapshot().await.unwrap(), before);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_events_follow_mutations() {
        let store = create_test_store().await;
        let mut events = store.subscribe();

        let task = store.create("Milk", 1).await.unwrap();

        assert_eq!(
            events.recv().await.unwrap(),
            StoreEvent::SnapshotChanged(vec![task.clone()])
        );
        assert_eq!(events.recv().await.unwrap(), StoreEvent::ItemAdded(task));

        store.delete_all().await.unwrap();
        assert_eq!(events.recv().await.unwrap(), StoreEvent::SnapshotChanged(vec![]));
    }
}

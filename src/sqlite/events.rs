use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use rusqlite::hooks::Action;

/// Notifications the engine emits for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Commit,
    Rollback,
    Update,
}

/// Kind of row change reported by an update notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateAction {
    Insert,
    Update,
    Delete,
    Unknown,
}

impl UpdateAction {
    /// SQLite's authorizer code for this action (`SQLITE_INSERT` = 18, ...).
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            UpdateAction::Delete => 9,
            UpdateAction::Insert => 18,
            UpdateAction::Update => 23,
            UpdateAction::Unknown => -1,
        }
    }
}

impl From<Action> for UpdateAction {
    fn from(action: Action) -> Self {
        match action {
            Action::SQLITE_INSERT => UpdateAction::Insert,
            Action::SQLITE_UPDATE => UpdateAction::Update,
            Action::SQLITE_DELETE => UpdateAction::Delete,
            _ => UpdateAction::Unknown,
        }
    }
}

/// A single engine notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbEvent {
    Commit,
    Rollback,
    Update {
        action: UpdateAction,
        database: String,
        table: String,
        rowid: i64,
    },
}

impl DbEvent {
    /// The listener kind this event is delivered to.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            DbEvent::Commit => EventKind::Commit,
            DbEvent::Rollback => EventKind::Rollback,
            DbEvent::Update { .. } => EventKind::Update,
        }
    }
}

/// Identifies one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Shared listener callback. Runs on the thread executing the statement.
pub type EventHandler = Arc<dyn Fn(&DbEvent) + Send + Sync>;

struct Listener {
    id: ListenerId,
    kind: EventKind,
    handler: EventHandler,
}

/// Per-connection listener table fed by the engine hooks.
#[derive(Default)]
pub(crate) struct EventRegistry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<Listener>>,
}

impl EventRegistry {
    fn lock(&self) -> MutexGuard<'_, Vec<Listener>> {
        match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub(crate) fn add(&self, kind: EventKind, handler: EventHandler) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push(Listener { id, kind, handler });
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        listeners.len() != before
    }

    pub(crate) fn count(&self, kind: EventKind) -> usize {
        self.lock().iter().filter(|l| l.kind == kind).count()
    }

    /// Call every listener for the event's kind, in registration order.
    ///
    /// Handlers run without the table lock held, so they may add or remove listeners.
    pub(crate) fn dispatch(&self, event: &DbEvent) {
        let kind = event.kind();
        let handlers: Vec<EventHandler> = self
            .lock()
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| Arc::clone(&l.handler))
            .collect();
        for handler in handlers {
            handler(event);
        }
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("listeners", &self.lock().len())
            .finish()
    }
}

/// Route the connection's commit, rollback and update hooks into `registry`.
///
/// The commit hook never vetoes: listeners observe commits, they cannot turn them into
/// rollbacks.
pub(crate) fn install_hooks(conn: &Connection, registry: &Arc<EventRegistry>) {
    let on_commit = Arc::clone(registry);
    conn.commit_hook(Some(move || {
        on_commit.dispatch(&DbEvent::Commit);
        false
    }));

    let on_rollback = Arc::clone(registry);
    conn.rollback_hook(Some(move || on_rollback.dispatch(&DbEvent::Rollback)));

    let on_update = Arc::clone(registry);
    conn.update_hook(Some(
        move |action: Action, database: &str, table: &str, rowid: i64| {
            on_update.dispatch(&DbEvent::Update {
                action: action.into(),
                database: database.to_owned(),
                table: table.to_owned(),
                rowid,
            });
        },
    ));
}

/// Removes its listener when dropped.
///
/// Returned by [`crate::Database::listen`]; transactions use it so the rollback
/// listener is gone on every exit path.
#[must_use = "dropping the guard removes the listener immediately"]
pub struct ListenerGuard<'db> {
    registry: &'db EventRegistry,
    id: ListenerId,
}

impl<'db> ListenerGuard<'db> {
    pub(crate) fn new(registry: &'db EventRegistry, id: ListenerId) -> Self {
        Self { registry, id }
    }

    /// Id of the guarded listener.
    ///
    /// # Returns
    ///
    /// The id [`crate::Database::remove_listener`] would accept; removing it by hand
    /// makes the guard's own removal a no-op.
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for ListenerGuard<'_> {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

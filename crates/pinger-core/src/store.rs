use crate::wire::StatusMessage;
use crate::ApplicationStatus;

/// Receives the state after every applied message.
pub trait Subscriber {
    fn notify(&mut self, state: &ClientState);
}

struct FnSubscriber<F>(F);

impl<F> Subscriber for FnSubscriber<F>
where
    F: FnMut(&ClientState),
{
    fn notify(&mut self, state: &ClientState) {
        (self.0)(state)
    }
}

/// Ordered statuses, unique by `app`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusCollection {
    entries: Vec<ApplicationStatus>,
}

impl StatusCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from snapshot order. Repeated keys collapse onto the
    /// first position with the last value; the count of collapsed records is
    /// returned alongside.
    pub fn from_snapshot(entries: Vec<ApplicationStatus>) -> (Self, usize) {
        let mut collection = Self {
            entries: Vec::with_capacity(entries.len()),
        };
        let mut collapsed = 0;
        for status in entries {
            if let ApplyOutcome::Updated { .. } = collection.upsert(status) {
                collapsed += 1;
            }
        }
        (collection, collapsed)
    }

    pub fn upsert(&mut self, status: ApplicationStatus) -> ApplyOutcome {
        match self.position(&status.app) {
            Some(index) => {
                self.entries[index] = status;
                ApplyOutcome::Updated { index }
            }
            None => {
                self.entries.push(status);
                ApplyOutcome::Inserted {
                    index: self.entries.len() - 1,
                }
            }
        }
    }

    pub fn position(&self, app: &str) -> Option<usize> {
        self.entries.iter().position(|status| status.app == app)
    }

    pub fn get(&self, app: &str) -> Option<&ApplicationStatus> {
        self.entries.iter().find(|status| status.app == app)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ApplicationStatus> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[ApplicationStatus] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ok_count(&self) -> usize {
        self.entries.iter().filter(|status| status.is_ok).count()
    }
}

impl<'a> IntoIterator for &'a StatusCollection {
    type Item = &'a ApplicationStatus;
    type IntoIter = std::slice::Iter<'a, ApplicationStatus>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ClientState {
    /// No message applied yet.
    #[default]
    Uninitialized,
    Ready(StatusCollection),
}

impl ClientState {
    pub fn collection(&self) -> Option<&StatusCollection> {
        match self {
            ClientState::Uninitialized => None,
            ClientState::Ready(collection) => Some(collection),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ClientState::Ready(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Replaced { entries: usize, collapsed: usize },
    Updated { index: usize },
    Inserted { index: usize },
}

/// Owns the client state and reconciles feed messages into it.
#[derive(Default)]
pub struct StateStore {
    state: ClientState,
    subscribers: Vec<Box<dyn Subscriber>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn collection(&self) -> Option<&StatusCollection> {
        self.state.collection()
    }

    pub fn subscribe<S>(&mut self, subscriber: S)
    where
        S: Subscriber + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn subscribe_fn<F>(&mut self, listener: F)
    where
        F: FnMut(&ClientState) + 'static,
    {
        self.subscribe(FnSubscriber(listener));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Snapshot replaces the collection; delta upserts by `app`, keeping the
    /// position of an existing entry and appending a new one. A delta before
    /// any snapshot starts from an empty collection. Subscribers are notified
    /// before this returns.
    pub fn apply_message(&mut self, message: StatusMessage) -> ApplyOutcome {
        let outcome = match message {
            StatusMessage::Snapshot(entries) => {
                let (collection, collapsed) = StatusCollection::from_snapshot(entries);
                let entries = collection.len();
                self.state = ClientState::Ready(collection);
                ApplyOutcome::Replaced { entries, collapsed }
            }
            StatusMessage::Delta(status) => {
                let mut collection = match std::mem::take(&mut self.state) {
                    ClientState::Ready(collection) => collection,
                    ClientState::Uninitialized => StatusCollection::new(),
                };
                let outcome = collection.upsert(status);
                self.state = ClientState::Ready(collection);
                outcome
            }
        };
        self.notify();
        outcome
    }

    fn notify(&mut self) {
        for subscriber in &mut self.subscribers {
            subscriber.notify(&self.state);
        }
    }
}

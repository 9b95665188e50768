//! In-process change feed.
//!
//! Row changes (from the Postgres listener or published directly) fan out
//! over a broadcast channel. Each consumer holds a [`ChangeSubscription`];
//! dropping it is the only way to release the channel, so teardown happens
//! on every exit path.
use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Messages,
    Inquiries,
    Ideas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: Table,
    pub op: ChangeOp,
    #[serde(default)]
    pub recipient_id: Option<Uuid>,
}

/// Matches events on `table`, optionally only those addressed to `recipient_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFilter {
    pub table: Table,
    pub recipient_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeFilter {
    pub tables: Vec<TableFilter>,
}

impl ChangeFilter {
    pub fn table(mut self, table: Table) -> Self {
        self.tables.push(TableFilter { table, recipient_id: None });
        self
    }

    pub fn table_for(mut self, table: Table, recipient_id: Uuid) -> Self {
        self.tables.push(TableFilter { table, recipient_id: Some(recipient_id) });
        self
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        self.tables.iter().any(|f| {
            f.table == event.table && f.recipient_id.is_none_or(|r| event.recipient_id == Some(r))
        })
    }
}

/// What a subscriber observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSignal {
    Changed(ChangeEvent),
    /// The receiver fell behind and `n` events were dropped; state must be
    /// rebuilt from scratch.
    Lagged(u64),
    /// The upstream source may have dropped events (listener reconnect or
    /// outage). Same treatment as a lag.
    Resync,
}

#[derive(Debug, Clone)]
enum Broadcast {
    Event(ChangeEvent),
    Resync,
}

#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<Broadcast>,
    active: Arc<AtomicUsize>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, active: Arc::new(AtomicUsize::new(0)) }
    }

    /// Returns how many subscriptions were reached.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        // an error only means nobody is listening
        self.tx.send(Broadcast::Event(event)).unwrap_or(0)
    }

    /// Tells every subscription, whatever its filter, to rebuild its state.
    pub fn resync(&self) -> usize {
        self.tx.send(Broadcast::Resync).unwrap_or(0)
    }

    pub fn subscribe(&self, filter: ChangeFilter) -> ChangeSubscription {
        self.active.fetch_add(1, Ordering::SeqCst);
        ChangeSubscription { rx: self.tx.subscribe(), filter, active: self.active.clone() }
    }

    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

pub struct ChangeSubscription {
    rx: broadcast::Receiver<Broadcast>,
    filter: ChangeFilter,
    active: Arc<AtomicUsize>,
}

impl ChangeSubscription {
    /// Waits for the next matching event. `None` once the feed is gone.
    /// Cancel safe.
    pub async fn next(&mut self) -> Option<ChangeSignal> {
        loop {
            match self.rx.recv().await {
                Ok(Broadcast::Event(event)) if self.filter.matches(&event) => {
                    return Some(ChangeSignal::Changed(event))
                }
                Ok(Broadcast::Event(_)) => continue,
                Ok(Broadcast::Resync) => return Some(ChangeSignal::Resync),
                Err(RecvError::Lagged(n)) => return Some(ChangeSignal::Lagged(n)),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Consumes already-queued events without waiting; returns how many
    /// matched (a lag or resync counts as one).
    pub fn drain(&mut self) -> usize {
        let mut matched = 0;
        loop {
            match self.rx.try_recv() {
                Ok(Broadcast::Event(event)) => {
                    if self.filter.matches(&event) {
                        matched += 1;
                    }
                }
                Ok(Broadcast::Resync) => matched += 1,
                Err(TryRecvError::Lagged(_)) => matched += 1,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return matched,
            }
        }
    }

    pub fn filter(&self) -> &ChangeFilter {
        &self.filter
    }
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

//! Live unread/pending counters per signed-in principal.
//!
//! Counts are never patched incrementally: every relevant change triggers a
//! full recount, so missed or reordered events cannot skew them.
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error;
use crate::modules::notification::{
    feed::{ChangeFeed, ChangeFilter, ChangeSignal, ChangeSubscription, Table},
    repository::NotificationRepository,
};
use crate::modules::policy::Principal;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCounts {
    pub unread_messages: i64,
    pub pending_inquiries: i64,
    pub pending_ideas: i64,
    pub total: i64,
}

impl NotificationCounts {
    pub fn new(unread_messages: i64, pending_inquiries: i64, pending_ideas: i64) -> Self {
        let (unread_messages, pending_inquiries, pending_ideas) =
            (unread_messages.max(0), pending_inquiries.max(0), pending_ideas.max(0));
        NotificationCounts {
            unread_messages,
            pending_inquiries,
            pending_ideas,
            total: unread_messages + pending_inquiries + pending_ideas,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationState {
    Uninitialized,
    Loaded(NotificationCounts),
}

pub struct NotificationAggregator<R> {
    repo: Arc<R>,
    feed: ChangeFeed,
}

impl<R> Clone for NotificationAggregator<R> {
    fn clone(&self) -> Self {
        Self { repo: self.repo.clone(), feed: self.feed.clone() }
    }
}

impl<R> NotificationAggregator<R>
where
    R: NotificationRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>, feed: ChangeFeed) -> Self {
        NotificationAggregator { repo, feed }
    }

    /// Changes that can move this principal's counts.
    pub fn filter_for(principal: &Principal) -> ChangeFilter {
        let filter = ChangeFilter::default().table_for(Table::Messages, principal.id);
        if principal.is_elevated() {
            filter.table(Table::Inquiries).table(Table::Ideas)
        } else {
            filter
        }
    }

    /// Full recount. A pure read, safe to run concurrently with itself.
    pub async fn recompute(
        &self,
        principal: &Principal,
    ) -> Result<NotificationCounts, error::SystemError> {
        let unread = self.repo.count_unread_messages(&principal.id).await?;

        let (inquiries, ideas) = if principal.is_elevated() {
            self.repo.count_pending_submissions().await?
        } else {
            (0, 0)
        };

        Ok(NotificationCounts::new(unread, inquiries, ideas))
    }

    /// Subscribes first, then loads, so nothing that lands in between is missed.
    pub async fn open(&self, principal: Principal) -> NotificationSession<R> {
        let subscription = self.feed.subscribe(Self::filter_for(&principal));
        let mut session = NotificationSession {
            aggregator: self.clone(),
            principal,
            state: NotificationState::Uninitialized,
            subscription: Some(subscription),
        };
        session.refresh().await;
        session
    }
}

/// One signed-in principal's counters and its change subscription.
pub struct NotificationSession<R> {
    aggregator: NotificationAggregator<R>,
    principal: Principal,
    state: NotificationState,
    subscription: Option<ChangeSubscription>,
}

impl<R> NotificationSession<R>
where
    R: NotificationRepository + Send + Sync,
{
    pub fn state(&self) -> NotificationState {
        self.state
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Last loaded counts, zero before the first successful load.
    pub fn counts(&self) -> NotificationCounts {
        match self.state {
            NotificationState::Loaded(counts) => counts,
            NotificationState::Uninitialized => NotificationCounts::default(),
        }
    }

    /// Recounts and replaces the state. On failure the previous counts stay.
    pub async fn refresh(&mut self) -> NotificationCounts {
        match self.aggregator.recompute(&self.principal).await {
            Ok(counts) => self.state = NotificationState::Loaded(counts),
            Err(e) => log::warn!(
                "Notification recount failed for {}, keeping previous counts: {}",
                self.principal.id,
                e
            ),
        }
        self.counts()
    }

    /// Waits until something relevant changed. Events already queued behind
    /// the first one are folded into it. Returns `false` once closed.
    pub async fn changed(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };

        match subscription.next().await {
            Some(signal) => {
                match signal {
                    ChangeSignal::Lagged(missed) => {
                        log::debug!("Notification session {} lagged by {missed} events", self.principal.id)
                    }
                    ChangeSignal::Resync => {
                        log::debug!("Notification session {} resyncing", self.principal.id)
                    }
                    ChangeSignal::Changed(_) => {}
                }
                subscription.drain();
                true
            }
            None => false,
        }
    }

    pub async fn next_update(&mut self) -> Option<NotificationCounts> {
        if !self.changed().await {
            return None;
        }
        Some(self.refresh().await)
    }

    /// Sign-out: releases the subscription and forgets the counts.
    pub fn close(&mut self) {
        self.subscription = None;
        self.state = NotificationState::Uninitialized;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::inquiry::schema::{SubmissionKind, SubmissionStatus};
    use crate::modules::notification::feed::{ChangeEvent, ChangeOp};
    use crate::modules::profile::schema::UserRole;
    use crate::test::{principal_for, MemoryStore};
    use std::sync::atomic::{AtomicBool, Ordering};
    use uuid::Uuid;

    fn message_event(recipient: Uuid) -> ChangeEvent {
        ChangeEvent { table: Table::Messages, op: ChangeOp::Insert, recipient_id: Some(recipient) }
    }

    #[actix_web::test]
    async fn recompute_is_idempotent() {
        let store = Arc::new(MemoryStore::default());
        let admin = principal_for(&store, store.add_profile(UserRole::Admin));
        store.add_unread_message(admin.id);
        store.add_submission(SubmissionKind::Inquiry, SubmissionStatus::New);
        let aggregator = NotificationAggregator::new(store.clone(), ChangeFeed::new(8));

        let (first, second) =
            futures_util::join!(aggregator.recompute(&admin), aggregator.recompute(&admin));
        let third = aggregator.recompute(&admin).await.unwrap();

        assert_eq!(first.unwrap(), third);
        assert_eq!(second.unwrap(), third);
        assert_eq!(third, NotificationCounts::new(1, 1, 0));
        assert_eq!(third.total, 2);
    }

    #[actix_web::test]
    async fn clients_never_count_submissions() {
        let store = Arc::new(MemoryStore::default());
        let client = principal_for(&store, store.add_profile(UserRole::Client));
        store.add_submission(SubmissionKind::Inquiry, SubmissionStatus::New);
        store.add_submission(SubmissionKind::Idea, SubmissionStatus::New);
        let aggregator = NotificationAggregator::new(store.clone(), ChangeFeed::new(8));

        assert_eq!(aggregator.recompute(&client).await.unwrap(), NotificationCounts::default());
        assert_eq!(NotificationAggregator::<MemoryStore>::filter_for(&client).tables.len(), 1);
    }

    #[actix_web::test]
    async fn only_new_submissions_are_pending() {
        let store = Arc::new(MemoryStore::default());
        let staff = principal_for(&store, store.add_profile(UserRole::Staff));
        store.add_submission(SubmissionKind::Idea, SubmissionStatus::New);
        store.add_submission(SubmissionKind::Idea, SubmissionStatus::Reviewed);
        store.add_submission(SubmissionKind::Inquiry, SubmissionStatus::Archived);
        let aggregator = NotificationAggregator::new(store.clone(), ChangeFeed::new(8));

        assert_eq!(aggregator.recompute(&staff).await.unwrap(), NotificationCounts::new(0, 0, 1));
    }

    #[actix_web::test]
    async fn session_follows_changes_and_resets_on_close() {
        let store = Arc::new(MemoryStore::default());
        let client = principal_for(&store, store.add_profile(UserRole::Client));
        let feed = ChangeFeed::new(8);
        let aggregator = NotificationAggregator::new(store.clone(), feed.clone());

        let mut session = aggregator.open(client.clone()).await;
        assert_eq!(session.state(), NotificationState::Loaded(NotificationCounts::default()));
        assert_eq!(feed.active_subscriptions(), 1);

        store.add_unread_message(client.id);
        store.add_unread_message(client.id);
        feed.publish(message_event(client.id));
        feed.publish(message_event(client.id));

        let counts = session.next_update().await.unwrap();
        assert_eq!(counts.unread_messages, 2);
        // the second event was coalesced into the first recount
        assert_eq!(session.subscription.as_mut().unwrap().drain(), 0);

        session.close();
        assert_eq!(session.state(), NotificationState::Uninitialized);
        assert_eq!(feed.active_subscriptions(), 0);
        assert_eq!(session.next_update().await, None);
    }

    #[actix_web::test]
    async fn resync_recounts_changes_the_feed_never_saw() {
        let store = Arc::new(MemoryStore::default());
        let staff = principal_for(&store, store.add_profile(UserRole::Staff));
        let feed = ChangeFeed::new(8);
        let aggregator = NotificationAggregator::new(store.clone(), feed.clone());
        let mut session = aggregator.open(staff.clone()).await;

        // rows written while the listener was away; no event was published
        store.add_unread_message(staff.id);
        store.add_submission(SubmissionKind::Inquiry, SubmissionStatus::New);
        feed.resync();

        assert_eq!(session.next_update().await.unwrap(), NotificationCounts::new(1, 1, 0));
    }

    #[actix_web::test]
    async fn dropping_a_session_releases_its_subscription() {
        let store = Arc::new(MemoryStore::default());
        let client = principal_for(&store, store.add_profile(UserRole::Client));
        let feed = ChangeFeed::new(8);
        let aggregator = NotificationAggregator::new(store.clone(), feed.clone());

        {
            let _session = aggregator.open(client).await;
            assert_eq!(feed.active_subscriptions(), 1);
        }
        assert_eq!(feed.active_subscriptions(), 0);
    }

    struct FlakyRepo {
        failing: AtomicBool,
    }

    #[async_trait::async_trait]
    impl NotificationRepository for FlakyRepo {
        async fn count_unread_messages(&self, _: &Uuid) -> Result<i64, error::SystemError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(error::SystemError::DatabaseError("connection reset".into()));
            }
            Ok(3)
        }

        async fn count_pending_submissions(&self) -> Result<(i64, i64), error::SystemError> {
            Ok((0, 0))
        }
    }

    #[actix_web::test]
    async fn failed_recounts_degrade_to_stale_or_zero() {
        let principal =
            Principal { id: Uuid::now_v7(), email: "c@example.com".into(), role: Some(UserRole::Client) };
        let repo = Arc::new(FlakyRepo { failing: AtomicBool::new(true) });
        let feed = ChangeFeed::new(8);
        let aggregator = NotificationAggregator::new(repo.clone(), feed.clone());

        let mut session = aggregator.open(principal.clone()).await;
        assert_eq!(session.state(), NotificationState::Uninitialized);
        assert_eq!(session.counts(), NotificationCounts::default());

        repo.failing.store(false, Ordering::SeqCst);
        assert_eq!(session.refresh().await.unread_messages, 3);

        repo.failing.store(true, Ordering::SeqCst);
        feed.publish(message_event(principal.id));
        assert_eq!(session.next_update().await.unwrap().unread_messages, 3);
    }
}

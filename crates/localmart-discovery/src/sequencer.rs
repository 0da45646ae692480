//! Per-session request sequence numbers.
//!
//! Each new request for a session takes the next sequence number. Older
//! in-flight requests for the same session observe that they were superseded
//! and can stop work instead of delivering a stale result.

use std::collections::HashMap;
use std::future::Future;

use tokio::sync::{watch, Mutex};

use crate::SessionId;

#[derive(Debug, Default)]
pub struct RequestSequencer {
    state: Mutex<SequencerState>,
}

#[derive(Debug, Default)]
struct SequencerState {
    // Shared across sessions so a pruned session never restarts at 1.
    last_seq: u64,
    latest: HashMap<SessionId, watch::Sender<u64>>,
}

impl RequestSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request for `session`, superseding any earlier one.
    pub async fn begin(&self, session: SessionId) -> RequestTicket {
        let mut state = self.state.lock().await;
        // Sessions with no live ticket have nothing left to supersede.
        state
            .latest
            .retain(|id, tx| *id == session || tx.receiver_count() > 0);

        state.last_seq += 1;
        let seq = state.last_seq;
        let tx = state
            .latest
            .entry(session)
            .or_insert_with(|| watch::channel(seq).0);
        tx.send_replace(seq);
        RequestTicket {
            seq,
            rx: tx.subscribe(),
        }
    }

    #[cfg(test)]
    async fn tracked_sessions(&self) -> usize {
        self.state.lock().await.latest.len()
    }
}

/// Handle held by one in-flight request.
#[derive(Debug)]
pub struct RequestTicket {
    seq: u64,
    rx: watch::Receiver<u64>,
}

impl RequestTicket {
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// `true` while no newer request has begun for the same session.
    #[must_use]
    pub fn is_current(&self) -> bool {
        *self.rx.borrow() == self.seq
    }

    /// Resolves once a newer request begins for the same session.
    pub async fn superseded(&mut self) {
        let seq = self.seq;
        if self.rx.wait_for(|latest| *latest != seq).await.is_err() {
            // Sequencer dropped: nothing can supersede this request anymore.
            std::future::pending::<()>().await;
        }
    }

    /// Drive `work` to completion unless a newer request begins first, in
    /// which case `work` is dropped and `None` is returned.
    pub async fn run<F: Future>(mut self, work: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            () = self.superseded() => None,
            output = work => Some(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn later_request_supersedes_earlier_one() {
        let sequencer = RequestSequencer::new();
        let session = SessionId::new();

        let first = sequencer.begin(session).await;
        assert!(first.is_current());
        let second = sequencer.begin(session).await;

        assert!(second.seq() > first.seq());
        assert!(!first.is_current());
        assert!(second.is_current());
    }

    #[tokio::test]
    async fn sessions_are_sequenced_independently() {
        let sequencer = RequestSequencer::new();
        let a = sequencer.begin(SessionId::new()).await;
        let b = sequencer.begin(SessionId::new()).await;

        assert!(a.is_current());
        assert!(b.is_current());
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_work_is_dropped() {
        let sequencer = std::sync::Arc::new(RequestSequencer::new());
        let session = SessionId::new();
        let first = sequencer.begin(session).await;

        let slow = tokio::spawn(first.run(async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "stale"
        }));
        tokio::time::sleep(Duration::from_millis(10)).await;

        let second = sequencer.begin(session).await;
        let fresh = second.run(async { "fresh" }).await;

        assert_eq!(slow.await.expect("join"), None);
        assert_eq!(fresh, Some("fresh"));
    }

    #[tokio::test]
    async fn idle_sessions_are_pruned() {
        let sequencer = RequestSequencer::new();
        drop(sequencer.begin(SessionId::new()).await);
        drop(sequencer.begin(SessionId::new()).await);

        let _live = sequencer.begin(SessionId::new()).await;
        assert_eq!(sequencer.tracked_sessions().await, 1);
    }

    #[tokio::test]
    async fn pruned_session_keeps_increasing_sequence() {
        let sequencer = RequestSequencer::new();
        let session = SessionId::new();
        let mut last = 0;
        for _ in 0..5 {
            last = sequencer.begin(session).await.seq();
        }

        drop(sequencer.begin(SessionId::new()).await);
        assert_eq!(sequencer.tracked_sessions().await, 1);

        let next = sequencer.begin(session).await;
        assert!(next.seq() > last, "seq {} after {last}", next.seq());
        assert!(next.is_current());
    }
}

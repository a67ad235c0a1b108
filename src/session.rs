//! Per-user session state: the current record and the summarize trigger.
//!
//! The record slot has exactly one writer, the completion of a summarize
//! call; renderers and exporters only read it. The trigger is disabled while
//! a call is in flight and re-enabled on every exit path by [`BusyGuard`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use crate::clients::SummarizeClient;
use crate::core::models::SummaryRecord;
use crate::errors::SessionError;

pub struct Session {
    client: SummarizeClient,
    busy: AtomicBool,
    record: RwLock<Option<Arc<SummaryRecord>>>,
}

/// Clears the busy flag when dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Session {
    #[must_use]
    pub fn new(client: SummarizeClient) -> Self {
        Self {
            client,
            busy: AtomicBool::new(false),
            record: RwLock::new(None),
        }
    }

    /// Whether the summarize trigger accepts a new request.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.busy.load(Ordering::Acquire)
    }

    /// The most recent successful record, if any.
    #[must_use]
    pub fn record(&self) -> Option<Arc<SummaryRecord>> {
        self.record
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Validate the input, run one summarization and publish the record.
    ///
    /// A failed call leaves the previous record in place.
    ///
    /// # Errors
    ///
    /// `EmptyInput` for a blank transcript, `Busy` when another call is in
    /// flight, otherwise the client's error.
    pub async fn run_summarize(
        &self,
        text_a: &str,
        text_b: &str,
    ) -> Result<Arc<SummaryRecord>, SessionError> {
        if text_a.trim().is_empty() || text_b.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            warn!("Summarize triggered while a request is in flight");
            return Err(SessionError::Busy);
        };

        let record = Arc::new(self.client.summarize(text_a, text_b).await?);
        info!(title = %record.impactful_title, "Summary received");

        *self.record.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&record));
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn session() -> Session {
        Session::new(SummarizeClient::new(
            Url::parse("http://127.0.0.1:1/api/summarize").unwrap(),
        ))
    }

    #[test]
    fn guard_rejects_second_holder_and_releases_on_drop() {
        let flag = AtomicBool::new(false);
        let first = BusyGuard::acquire(&flag);
        assert!(first.is_some());
        assert!(BusyGuard::acquire(&flag).is_none());
        drop(first);
        assert!(BusyGuard::acquire(&flag).is_some());
    }

    #[tokio::test]
    async fn blank_input_never_reaches_the_network() {
        let session = session();
        let err = session.run_summarize("  \n", "text").await.unwrap_err();
        assert!(matches!(err, SessionError::EmptyInput));
        assert!(session.is_enabled());
        assert!(session.record().is_none());
    }
}

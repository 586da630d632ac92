//! Request orchestration over the selection state machine.
//!
//! Composes the selector with a backend client and the user's settings.
//! The selector never performs I/O itself; every network effect flows
//! through here as a begin/complete/fail round-trip.

use tracing::{debug, info, warn};

use crate::api_client::{ApiError, RankClient};
use crate::models::{Ranking, Settings};
use crate::selector::{OpKind, Selector, SubmitStatus};

/// How a submit attempt ended. A refusal never reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted { record_id: String },
    Refused(SubmitStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    Undone { record_id: String },
    NothingToUndo,
}

pub struct RankSession<C> {
    selector: Selector,
    client: C,
    settings: Settings,
}

impl<C: RankClient> RankSession<C> {
    pub fn new(client: C, settings: Settings) -> Self {
        Self {
            selector: Selector::new(),
            client,
            settings,
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut Selector {
        &mut self.selector
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Request a fresh batch. On failure the previous batch stays in place.
    pub fn fetch(&mut self) -> Result<(), ApiError> {
        let token = self.selector.begin(OpKind::Fetch);
        match self.client.fetch_videos(&self.settings) {
            Ok(response) => {
                info!(target: "session", "fetched {} videos", response.videos.len());
                self.selector.complete_fetch(token, response.videos);
                Ok(())
            }
            Err(err) => {
                warn!(target: "session", "fetch failed: {err}");
                self.selector.fail(token, err.detail());
                Err(err)
            }
        }
    }

    /// Submit the current choices. Ineligible submissions are refused
    /// locally without issuing a request.
    pub fn submit(&mut self) -> Result<SubmitOutcome, ApiError> {
        let status = self.selector.submit_status();
        if !status.is_ready() {
            debug!(target: "session", "submit refused: {}", status.message());
            return Ok(SubmitOutcome::Refused(status));
        }

        let choice_set = self.selector.choice_set();
        let token = self.selector.begin(OpKind::Submit);
        match self.client.submit(&choice_set, &self.settings) {
            Ok(response) => {
                info!(target: "session", "submitted as {}", response.record_id);
                let record_id = response.record_id.clone();
                self.selector
                    .complete_submit(token, response.record_id, response.videos);
                Ok(SubmitOutcome::Submitted { record_id })
            }
            Err(err) => {
                warn!(target: "session", "submit failed: {err}");
                self.selector.fail(token, err.detail());
                Err(err)
            }
        }
    }

    /// Record the batch as passed over: every action is sent as `nothing`,
    /// whatever is marked locally.
    pub fn skip(&mut self) -> Result<String, ApiError> {
        let choice_set = self.selector.skip_choice_set();
        let token = self.selector.begin(OpKind::Skip);
        match self.client.skip(&choice_set, &self.settings) {
            Ok(response) => {
                info!(target: "session", "skipped as {}", response.record_id);
                let record_id = response.record_id.clone();
                self.selector
                    .complete_submit(token, response.record_id, response.videos);
                Ok(record_id)
            }
            Err(err) => {
                warn!(target: "session", "skip failed: {err}");
                self.selector.fail(token, err.detail());
                Err(err)
            }
        }
    }

    /// Unwind the most recent submit/skip. The record id is peeked, not
    /// popped; only a successful response removes it from the history, so a
    /// failure leaves the stack intact for a retry.
    pub fn undo(&mut self) -> Result<UndoOutcome, ApiError> {
        let Some(record_id) = self.selector.last_record_id().map(str::to_string) else {
            debug!(target: "session", "nothing to undo");
            return Ok(UndoOutcome::NothingToUndo);
        };

        let token = self.selector.begin(OpKind::Undo);
        match self.client.undo(&record_id) {
            Ok(response) => {
                info!(target: "session", "unwound {record_id}");
                self.selector
                    .complete_undo(token, response.videos, response.choice_set);
                Ok(UndoOutcome::Undone { record_id })
            }
            Err(err) => {
                warn!(target: "session", "undo failed: {err}");
                self.selector.fail(token, err.detail());
                Err(err)
            }
        }
    }

    /// Fetch the backend's current ranking table for the rankings view.
    pub fn rankings(&self) -> Result<Vec<Ranking>, ApiError> {
        let response = self.client.rankings()?;
        Ok(response.rankings)
    }
}

//! Selection state machine for the current video batch.
//!
//! Single authority for what will be submitted: the batch, each video's
//! action, the focused video, and the stack of submitted record ids that
//! undo walks back through. All network effects enter through the
//! `begin`/`complete_*`/`fail` request lifecycle so that a completion from
//! a superseded request can be recognized and discarded.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::models::{Action, Choice, ChoiceSet, Video};

/// Videos shown per grid row. Focus movement and the card layout must agree
/// on this.
pub const ROW_WIDTH: usize = 3;

/// Most videos that may carry `select` in one submission.
pub const MAX_SELECTED_VIDEOS: usize = 4;

/// Fewest videos that must carry a non-`nothing` action in one submission.
pub const MIN_ACTED_VIDEOS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Request status of the component as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    Loading,
    #[default]
    Ready,
    Error(String),
}

/// Operation kinds with independent request-token streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Fetch,
    Submit,
    Skip,
    Undo,
}

impl OpKind {
    fn index(self) -> usize {
        match self {
            OpKind::Fetch => 0,
            OpKind::Submit => 1,
            OpKind::Skip => 2,
            OpKind::Undo => 3,
        }
    }
}

/// Ties a response back to the request that produced it. A completion whose
/// token is no longer the latest for its operation kind is stale and must
/// be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    op: OpKind,
    seq: u64,
}

impl RequestToken {
    pub fn op(self) -> OpKind {
        self.op
    }
}

/// Eligibility verdict for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    Ready,
    TooManySelected,
    NotEnoughActed,
    NoUntouchedLeft,
}

impl SubmitStatus {
    pub fn is_ready(self) -> bool {
        self == SubmitStatus::Ready
    }

    pub fn message(self) -> &'static str {
        match self {
            SubmitStatus::Ready => "Ready to submit",
            SubmitStatus::TooManySelected => "Too many videos selected",
            SubmitStatus::NotEnoughActed => "Not enough videos selected",
            SubmitStatus::NoUntouchedLeft => "At least one video must be left untouched",
        }
    }
}

pub struct Selector {
    videos: Vec<Video>,
    /// One entry per batch member at all times; rebuilt wholesale on batch
    /// replacement, never merged.
    actions: HashMap<String, Action>,
    current_id: Option<String>,
    record_ids: Vec<String>,
    phase: Phase,
    issued: [u64; 4],
}

impl Selector {
    pub fn new() -> Self {
        Self {
            videos: Vec::new(),
            actions: HashMap::new(),
            current_id: None,
            record_ids: Vec::new(),
            phase: Phase::default(),
            issued: [0; 4],
        }
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn action(&self, video_id: &str) -> Action {
        self.actions.get(video_id).copied().unwrap_or_default()
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn history_len(&self) -> usize {
        self.record_ids.len()
    }

    pub fn last_record_id(&self) -> Option<&str> {
        self.record_ids.last().map(String::as_str)
    }

    // --- request lifecycle -------------------------------------------------

    /// Start a request of the given kind. Any token previously issued for
    /// the same kind becomes stale.
    pub fn begin(&mut self, op: OpKind) -> RequestToken {
        self.issued[op.index()] += 1;
        self.phase = Phase::Loading;
        RequestToken {
            op,
            seq: self.issued[op.index()],
        }
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.issued[token.op.index()] == token.seq
    }

    /// Apply a fetched batch. Returns false if the token was stale and the
    /// response was discarded.
    pub fn complete_fetch(&mut self, token: RequestToken, videos: Vec<Video>) -> bool {
        if !self.is_current(token) {
            warn!(target: "selector", "discarding stale {:?} response", token.op());
            return false;
        }
        self.replace_batch(videos);
        self.phase = Phase::Ready;
        true
    }

    /// Apply a submit or skip response: push the new record id and replace
    /// the batch as one unit.
    pub fn complete_submit(
        &mut self,
        token: RequestToken,
        record_id: String,
        videos: Vec<Video>,
    ) -> bool {
        if !self.is_current(token) {
            warn!(target: "selector", "discarding stale {:?} response", token.op());
            return false;
        }
        debug!(target: "selector", "recorded {record_id}");
        self.record_ids.push(record_id);
        self.replace_batch(videos);
        self.phase = Phase::Ready;
        true
    }

    /// Apply an undo response. The undone record id is popped here, only on
    /// success; the caller peeks it beforehand and never removes it itself,
    /// so a failed request cannot lose it.
    pub fn complete_undo(
        &mut self,
        token: RequestToken,
        videos: Vec<Video>,
        choice_set: ChoiceSet,
    ) -> bool {
        if !self.is_current(token) {
            warn!(target: "selector", "discarding stale {:?} response", token.op());
            return false;
        }
        if let Some(record_id) = self.record_ids.pop() {
            debug!(target: "selector", "unwound {record_id}");
        }
        self.replace_batch(videos);
        for choice in choice_set.choices {
            if self.actions.contains_key(&choice.video_id) {
                self.actions.insert(choice.video_id, choice.action);
            } else {
                warn!(target: "selector", "undo echoed unknown video {}", choice.video_id);
            }
        }
        self.phase = Phase::Ready;
        true
    }

    /// Record a failed request. Everything but the phase stays as it was.
    pub fn fail(&mut self, token: RequestToken, detail: String) -> bool {
        if !self.is_current(token) {
            warn!(target: "selector", "discarding stale {:?} failure", token.op());
            return false;
        }
        self.phase = Phase::Error(detail);
        true
    }

    fn replace_batch(&mut self, videos: Vec<Video>) {
        self.actions = videos
            .iter()
            .map(|video| (video.id.clone(), Action::Nothing))
            .collect();
        self.current_id = None;
        self.videos = videos;
    }

    // --- local transitions -------------------------------------------------

    /// Set one video's action. At most one of select/remove holds per video;
    /// the single map entry makes that structural. Ids outside the batch are
    /// ignored.
    pub fn set_action(&mut self, video_id: &str, action: Action) {
        if !self.actions.contains_key(video_id) {
            warn!(target: "selector", "ignoring action for unknown video {video_id}");
            return;
        }
        debug!(target: "selector", "{video_id} -> {action:?}");
        self.actions.insert(video_id.to_string(), action);
    }

    /// The one decision function behind click, space, and the remove chord:
    /// a held remove-modifier forces `Remove`; otherwise an acted video
    /// resets to `Nothing` and an untouched one becomes `Select`.
    pub fn toggle_action(&mut self, video_id: &str, remove_held: bool) {
        let next = if remove_held {
            Action::Remove
        } else {
            match self.action(video_id) {
                Action::Select | Action::Remove => Action::Nothing,
                Action::Nothing => Action::Select,
            }
        };
        self.set_action(video_id, next);
    }

    /// Toggle `Remove` on a video: remove becomes nothing, anything else
    /// becomes remove.
    pub fn toggle_remove(&mut self, video_id: &str) {
        let next = match self.action(video_id) {
            Action::Remove => Action::Nothing,
            _ => Action::Remove,
        };
        self.set_action(video_id, next);
    }

    pub fn toggle_focused(&mut self, remove_held: bool) {
        let Some(video_id) = self.current_id.clone() else {
            return;
        };
        self.toggle_action(&video_id, remove_held);
    }

    pub fn remove_focused(&mut self) {
        let Some(video_id) = self.current_id.clone() else {
            return;
        };
        self.toggle_remove(&video_id);
    }

    pub fn clear_actions(&mut self) {
        debug!(target: "selector", "clearing all actions");
        for action in self.actions.values_mut() {
            *action = Action::Nothing;
        }
    }

    pub fn clear_focus(&mut self) {
        self.current_id = None;
    }

    /// Move the focus along the card grid, wrapping modulo the batch
    /// length. With no prior focus (or a focus the batch no longer
    /// contains) the first video takes it.
    pub fn move_focus(&mut self, direction: Direction) {
        if self.videos.is_empty() {
            return;
        }

        let offset: isize = match direction {
            Direction::Up => -(ROW_WIDTH as isize),
            Direction::Down => ROW_WIDTH as isize,
            Direction::Left => -1,
            Direction::Right => 1,
        };

        let current_index = self
            .current_id
            .as_ref()
            .and_then(|id| self.videos.iter().position(|video| &video.id == id));
        let Some(index) = current_index else {
            self.current_id = Some(self.videos[0].id.clone());
            return;
        };

        let len = self.videos.len() as isize;
        // rem_euclid keeps negative offsets wrapping to the tail.
        let next = (index as isize + offset).rem_euclid(len) as usize;
        self.current_id = Some(self.videos[next].id.clone());
    }

    // --- submission --------------------------------------------------------

    /// Checked in order: the selection cap, the minimum of acted videos,
    /// then the requirement that any selection leaves at least one untouched
    /// video as a ranking baseline.
    pub fn submit_status(&self) -> SubmitStatus {
        let n_selected = self
            .actions
            .values()
            .filter(|action| **action == Action::Select)
            .count();
        let n_acted = self
            .actions
            .values()
            .filter(|action| !action.is_nothing())
            .count();
        let n_untouched = self.videos.len() - n_acted;

        if n_selected > MAX_SELECTED_VIDEOS {
            return SubmitStatus::TooManySelected;
        }
        if n_acted < MIN_ACTED_VIDEOS {
            return SubmitStatus::NotEnoughActed;
        }
        if n_selected > 0 && n_untouched == 0 {
            return SubmitStatus::NoUntouchedLeft;
        }
        SubmitStatus::Ready
    }

    /// The ordered action list for a submit, mirroring batch order.
    pub fn choice_set(&self) -> ChoiceSet {
        ChoiceSet {
            choices: self
                .videos
                .iter()
                .map(|video| Choice {
                    video_id: video.id.clone(),
                    action: self.action(&video.id),
                })
                .collect(),
        }
    }

    /// The all-`nothing` action list a skip sends, whatever is recorded
    /// locally.
    pub fn skip_choice_set(&self) -> ChoiceSet {
        ChoiceSet {
            choices: self
                .videos
                .iter()
                .map(|video| Choice {
                    video_id: video.id.clone(),
                    action: Action::Nothing,
                })
                .collect(),
        }
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::new()
    }
}

//! Session flows against a mock backend: request wiring, failure
//! semantics, and the undo protocol.

use std::cell::{Cell, RefCell};

use chrono::{TimeZone, Utc};

use vidrank_cli::api_client::{
    ApiError, GetRankingsResponse, PostSubmitResponse, PostUndoResponse, PostVideosResponse,
    RankClient,
};
use vidrank_cli::models::{
    Action, ByDateStrategySettings, Choice, ChoiceSet, MatchingSettings, Settings, ThumbnailSet,
    Video, VideoStats,
};
use vidrank_cli::selector::{Phase, SubmitStatus};
use vidrank_cli::session::{RankSession, SubmitOutcome, UndoOutcome};

fn video(id: &str) -> Video {
    Video {
        id: id.to_string(),
        title: format!("Video {id}"),
        description: String::new(),
        duration: "PT4M13S".to_string(),
        channel_id: "UC0001".to_string(),
        channel: "Channel".to_string(),
        published_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        thumbnails: ThumbnailSet::default(),
        stats: VideoStats::default(),
    }
}

fn batch(prefix: &str) -> Vec<Video> {
    (1..=5).map(|i| video(&format!("{prefix}{i}"))).collect()
}

/// Backend double. Each successful response serves a fresh batch with a new
/// prefix so batch replacement is observable; `fail_next` makes the next
/// call answer with a 500.
#[derive(Default)]
struct MockClient {
    fail_next: Cell<bool>,
    serial: Cell<u32>,
    fetches: RefCell<Vec<Settings>>,
    submitted: RefCell<Vec<ChoiceSet>>,
    skipped: RefCell<Vec<ChoiceSet>>,
    undone: RefCell<Vec<String>>,
    undo_echo: RefCell<ChoiceSet>,
}

impl MockClient {
    fn error() -> ApiError {
        ApiError::Status {
            status: 500,
            detail: serde_json::json!({"detail": "backend unavailable"}),
        }
    }

    fn take_failure(&self) -> Result<(), ApiError> {
        if self.fail_next.take() {
            return Err(Self::error());
        }
        Ok(())
    }

    fn next_batch(&self) -> (u32, Vec<Video>) {
        let serial = self.serial.get() + 1;
        self.serial.set(serial);
        (serial, batch(&format!("b{serial}_")))
    }
}

impl RankClient for MockClient {
    fn fetch_videos(&self, settings: &Settings) -> Result<PostVideosResponse, ApiError> {
        self.fetches.borrow_mut().push(settings.clone());
        self.take_failure()?;
        let (_, videos) = self.next_batch();
        Ok(PostVideosResponse { videos })
    }

    fn submit(
        &self,
        choice_set: &ChoiceSet,
        _settings: &Settings,
    ) -> Result<PostSubmitResponse, ApiError> {
        self.take_failure()?;
        self.submitted.borrow_mut().push(choice_set.clone());
        let (serial, videos) = self.next_batch();
        Ok(PostSubmitResponse {
            record_id: format!("rec{serial}"),
            videos,
        })
    }

    fn skip(
        &self,
        choice_set: &ChoiceSet,
        _settings: &Settings,
    ) -> Result<PostSubmitResponse, ApiError> {
        self.take_failure()?;
        self.skipped.borrow_mut().push(choice_set.clone());
        let (serial, videos) = self.next_batch();
        Ok(PostSubmitResponse {
            record_id: format!("rec{serial}"),
            videos,
        })
    }

    fn undo(&self, record_id: &str) -> Result<PostUndoResponse, ApiError> {
        self.take_failure()?;
        self.undone.borrow_mut().push(record_id.to_string());
        Ok(PostUndoResponse {
            videos: batch("u_"),
            choice_set: self.undo_echo.borrow().clone(),
        })
    }

    fn rankings(&self) -> Result<GetRankingsResponse, ApiError> {
        Ok(GetRankingsResponse { rankings: vec![] })
    }
}

fn session() -> RankSession<MockClient> {
    RankSession::new(MockClient::default(), Settings::default())
}

#[test]
fn fetch_populates_the_batch() {
    let mut session = session();
    session.fetch().unwrap();

    assert_eq!(session.selector().videos().len(), 5);
    assert_eq!(*session.selector().phase(), Phase::Ready);
}

#[test]
fn fetch_passes_the_settings_through_unchanged() {
    let settings = Settings {
        matching_settings: MatchingSettings {
            by_date_strategy: Some(ByDateStrategySettings { days: 7 }),
            ..MatchingSettings::default()
        },
    };
    let mut session = RankSession::new(MockClient::default(), settings.clone());
    session.fetch().unwrap();

    let seen = session.client().fetches.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], settings);
}

#[test]
fn submit_pushes_a_record_and_replaces_the_batch() {
    let mut session = session();
    session.fetch().unwrap();
    session.selector_mut().set_action("b1_1", Action::Select);
    session.selector_mut().set_action("b1_2", Action::Remove);

    let outcome = session.submit().unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Submitted {
            record_id: "rec2".to_string()
        }
    );
    assert_eq!(session.selector().history_len(), 1);
    assert_eq!(session.selector().last_record_id(), Some("rec2"));
    // Fresh batch, all actions reset.
    assert_eq!(session.selector().videos()[0].id, "b2_1");
    assert!(session
        .selector()
        .videos()
        .iter()
        .all(|video| session.selector().action(&video.id) == Action::Nothing));
}

#[test]
fn submitted_choices_mirror_batch_order() {
    let mut session = session();
    session.fetch().unwrap();
    session.selector_mut().set_action("b1_3", Action::Select);
    session.selector_mut().set_action("b1_5", Action::Remove);
    session.submit().unwrap();

    let client_choices = {
        let submitted = session.client_submitted();
        submitted[0].clone()
    };
    let ids: Vec<&str> = client_choices
        .choices
        .iter()
        .map(|choice| choice.video_id.as_str())
        .collect();
    assert_eq!(ids, ["b1_1", "b1_2", "b1_3", "b1_4", "b1_5"]);
    assert_eq!(client_choices.choices[2].action, Action::Select);
    assert_eq!(client_choices.choices[4].action, Action::Remove);
    assert_eq!(client_choices.choices[0].action, Action::Nothing);
}

#[test]
fn ineligible_submit_never_reaches_the_backend() {
    let mut session = session();
    session.fetch().unwrap();

    let outcome = session.submit().unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Refused(SubmitStatus::NotEnoughActed)
    );
    assert!(session.client_submitted().is_empty());
    assert_eq!(session.selector().history_len(), 0);
}

#[test]
fn failed_submit_leaves_history_and_actions_untouched() {
    let mut session = session();
    session.fetch().unwrap();
    session.selector_mut().set_action("b1_1", Action::Select);
    session.selector_mut().set_action("b1_2", Action::Select);
    session.fail_next();

    assert!(session.submit().is_err());
    assert_eq!(session.selector().history_len(), 0);
    assert_eq!(session.selector().action("b1_1"), Action::Select);
    assert_eq!(session.selector().action("b1_2"), Action::Select);
    assert_eq!(session.selector().videos()[0].id, "b1_1");
    assert!(matches!(session.selector().phase(), Phase::Error(_)));
}

#[test]
fn skip_sends_all_nothing_whatever_is_marked() {
    let mut session = session();
    session.fetch().unwrap();
    session.selector_mut().set_action("b1_1", Action::Select);
    session.selector_mut().set_action("b1_2", Action::Remove);

    let record_id = session.skip().unwrap();
    assert_eq!(record_id, "rec2");
    assert_eq!(session.selector().history_len(), 1);

    let skipped = session.client_skipped();
    assert_eq!(skipped[0].choices.len(), 5);
    assert!(skipped[0]
        .choices
        .iter()
        .all(|choice| choice.action == Action::Nothing));
}

#[test]
fn undo_with_empty_history_issues_no_request() {
    let mut session = session();
    session.fetch().unwrap();

    let outcome = session.undo().unwrap();
    assert_eq!(outcome, UndoOutcome::NothingToUndo);
    assert!(session.client_undone().is_empty());
}

#[test]
fn failed_undo_keeps_the_record_id() {
    let mut session = session();
    session.fetch().unwrap();
    session.skip().unwrap();
    assert_eq!(session.selector().last_record_id(), Some("rec2"));

    session.fail_next();
    assert!(session.undo().is_err());
    assert_eq!(session.selector().history_len(), 1);
    assert_eq!(session.selector().last_record_id(), Some("rec2"));
}

#[test]
fn undo_pops_the_record_and_rehydrates_the_echo() {
    let mut session = session();
    session.fetch().unwrap();
    session.selector_mut().set_action("b1_1", Action::Select);
    session.selector_mut().set_action("b1_2", Action::Remove);
    session.submit().unwrap();

    session.set_undo_echo(ChoiceSet {
        choices: vec![
            Choice {
                video_id: "u_1".to_string(),
                action: Action::Select,
            },
            Choice {
                video_id: "u_2".to_string(),
                action: Action::Remove,
            },
        ],
    });

    let outcome = session.undo().unwrap();
    assert_eq!(
        outcome,
        UndoOutcome::Undone {
            record_id: "rec2".to_string()
        }
    );
    assert_eq!(session.selector().history_len(), 0);
    assert_eq!(session.selector().action("u_1"), Action::Select);
    assert_eq!(session.selector().action("u_2"), Action::Remove);
    assert_eq!(session.selector().action("u_3"), Action::Nothing);
    assert_eq!(session.selector().current_id(), None);
}

#[test]
fn failed_fetch_keeps_the_previous_batch_visible() {
    let mut session = session();
    session.fetch().unwrap();
    session.fail_next();

    assert!(session.fetch().is_err());
    assert_eq!(session.selector().videos().len(), 5);
    assert_eq!(session.selector().videos()[0].id, "b1_1");
    assert!(matches!(session.selector().phase(), Phase::Error(_)));
}

// Accessors into the mock, kept on the session type for test readability.
trait MockAccess {
    fn fail_next(&mut self);
    fn set_undo_echo(&mut self, echo: ChoiceSet);
    fn client_submitted(&self) -> Vec<ChoiceSet>;
    fn client_skipped(&self) -> Vec<ChoiceSet>;
    fn client_undone(&self) -> Vec<String>;
}

impl MockAccess for RankSession<MockClient> {
    fn fail_next(&mut self) {
        self.client().fail_next.set(true);
    }

    fn set_undo_echo(&mut self, echo: ChoiceSet) {
        *self.client().undo_echo.borrow_mut() = echo;
    }

    fn client_submitted(&self) -> Vec<ChoiceSet> {
        self.client().submitted.borrow().clone()
    }

    fn client_skipped(&self) -> Vec<ChoiceSet> {
        self.client().skipped.borrow().clone()
    }

    fn client_undone(&self) -> Vec<String> {
        self.client().undone.borrow().clone()
    }
}

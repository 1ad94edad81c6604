//! crates/lovecraft_core/src/reveal.rs
//!
//! The reveal flow: a recipient proves who they are, answers the author's quiz,
//! and only then sees the final message.
//!
//! One `RevealController` lives for exactly one viewing. It is built with an
//! injected `SurpriseStore`, counts the view once on a successful load, and
//! never moves backwards. Wrong guesses are recoverable in place, as often as
//! the recipient likes.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::Surprise;
use crate::matching::{answer_matches, fuzzy_match};
use crate::ports::{PortError, SurpriseStore};
use crate::theme::ThemeStyle;

/// Shown when the quiz answer is rejected.
pub const QUIZ_HINT: &str = "Think about who created this surprise…";

/// Picks the surprise to show. A previously persisted id wins over the link's
/// query parameter; blank values count as absent.
pub fn resolve_surprise_id<'a>(persisted: Option<&'a str>, query: Option<&'a str>) -> Option<&'a str> {
    persisted
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .or_else(|| query.map(str::trim).filter(|id| !id.is_empty()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStep {
    IdentityCheck,
    Quiz,
    Revealed,
    /// Terminal. Reached only when loading fails.
    NotFound,
}

impl fmt::Display for RevealStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RevealStep::IdentityCheck => "identity_check",
            RevealStep::Quiz => "quiz",
            RevealStep::Revealed => "revealed",
            RevealStep::NotFound => "not_found",
        };
        f.write_str(name)
    }
}

/// What the recipient should currently see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealView {
    IdentityCheck {
        theme: ThemeStyle,
        error: Option<String>,
    },
    Quiz {
        theme: ThemeStyle,
        recipient: String,
        question: Option<String>,
        hint: Option<String>,
    },
    Revealed {
        theme: ThemeStyle,
        sender: String,
        recipient: String,
        message: String,
    },
    NotFound,
}

/// Result of a guess the controller was willing to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced(RevealStep),
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RevealError {
    #[error("Expected the {expected} step, but the reveal is at {actual}")]
    InvalidStep {
        expected: RevealStep,
        actual: RevealStep,
    },
}

enum RevealState {
    NotFound,
    Active {
        surprise: Surprise,
        step: RevealStep,
        feedback: Option<String>,
    },
}

pub struct RevealController {
    state: RevealState,
}

impl RevealController {
    /// Fetches the surprise and starts the flow at the identity check.
    ///
    /// A missing id, a missing record and a failed fetch all end in the
    /// `NotFound` step. Only a successful load counts a view, and the count is
    /// written in the background so it can never hold up the reveal.
    pub async fn load(store: Arc<dyn SurpriseStore>, id: Option<&str>) -> Self {
        let Some(id) = id else {
            info!("Reveal requested without a surprise id.");
            return Self::not_found();
        };

        let surprise = match store.get_surprise(id).await {
            Ok(surprise) => surprise,
            Err(PortError::NotFound(_)) => {
                info!("Surprise {} does not exist.", id);
                return Self::not_found();
            }
            Err(e) => {
                warn!("Failed to fetch surprise {}: {:?}", id, e);
                return Self::not_found();
            }
        };

        spawn_view_increment(store, surprise.id.clone());

        Self {
            state: RevealState::Active {
                surprise,
                step: RevealStep::IdentityCheck,
                feedback: None,
            },
        }
    }

    fn not_found() -> Self {
        Self {
            state: RevealState::NotFound,
        }
    }

    pub fn step(&self) -> RevealStep {
        match &self.state {
            RevealState::NotFound => RevealStep::NotFound,
            RevealState::Active { step, .. } => *step,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.step(), RevealStep::Revealed | RevealStep::NotFound)
    }

    /// Checks the typed name against the stored recipient.
    pub fn submit_name(&mut self, name: &str) -> Result<StepOutcome, RevealError> {
        let (surprise, step, feedback) = self.active_at(RevealStep::IdentityCheck)?;

        if fuzzy_match(name, &surprise.content.recipient) {
            *step = RevealStep::Quiz;
            *feedback = None;
            Ok(StepOutcome::Advanced(RevealStep::Quiz))
        } else {
            *feedback = Some(format!(
                "Hmm, this surprise is meant for {}. Try again!",
                surprise.content.recipient
            ));
            Ok(StepOutcome::Rejected)
        }
    }

    /// Checks the quiz answer. A surprise without an expected answer lets anything through.
    pub fn submit_answer(&mut self, answer: &str) -> Result<StepOutcome, RevealError> {
        let (surprise, step, feedback) = self.active_at(RevealStep::Quiz)?;

        if answer_matches(answer, surprise.content.expected_answer()) {
            *step = RevealStep::Revealed;
            *feedback = None;
            Ok(StepOutcome::Advanced(RevealStep::Revealed))
        } else {
            *feedback = Some(QUIZ_HINT.to_string());
            Ok(StepOutcome::Rejected)
        }
    }

    fn active_at(
        &mut self,
        expected: RevealStep,
    ) -> Result<(&Surprise, &mut RevealStep, &mut Option<String>), RevealError> {
        let actual = self.step();
        match &mut self.state {
            RevealState::Active {
                surprise,
                step,
                feedback,
            } if *step == expected => Ok((surprise, step, feedback)),
            _ => Err(RevealError::InvalidStep { expected, actual }),
        }
    }

    pub fn view(&self) -> RevealView {
        let RevealState::Active {
            surprise,
            step,
            feedback,
        } = &self.state
        else {
            return RevealView::NotFound;
        };

        let content = &surprise.content;
        let theme = content.theme.style();
        match step {
            RevealStep::IdentityCheck => RevealView::IdentityCheck {
                theme,
                error: feedback.clone(),
            },
            RevealStep::Quiz => RevealView::Quiz {
                theme,
                recipient: content.recipient.clone(),
                question: content
                    .question
                    .clone()
                    .filter(|q| !q.trim().is_empty()),
                hint: feedback.clone(),
            },
            RevealStep::Revealed => RevealView::Revealed {
                theme,
                sender: content.sender.clone(),
                recipient: content.recipient.clone(),
                message: content.final_message.clone(),
            },
            RevealStep::NotFound => RevealView::NotFound,
        }
    }
}

fn spawn_view_increment(store: Arc<dyn SurpriseStore>, id: String) {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        warn!("No async runtime available; view of surprise {} not counted.", id);
        return;
    };
    handle.spawn(async move {
        if let Err(e) = store.increment_views(&id).await {
            warn!("Failed to count view of surprise {}: {:?}", id, e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SurpriseContent;
    use crate::ports::PortResult;
    use crate::theme::Theme;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    /// Serves at most one surprise and reports every view increment on a channel.
    struct RecordingStore {
        surprise: Option<Surprise>,
        fail_reads: bool,
        fail_increments: bool,
        increments: mpsc::UnboundedSender<String>,
    }

    #[async_trait]
    impl SurpriseStore for RecordingStore {
        async fn get_surprise(&self, id: &str) -> PortResult<Surprise> {
            if self.fail_reads {
                return Err(PortError::Unexpected("connection reset".to_string()));
            }
            self.surprise
                .clone()
                .filter(|s| s.id == id)
                .ok_or_else(|| PortError::NotFound(id.to_string()))
        }

        async fn create_surprise(&self, _: Uuid, _: &SurpriseContent) -> PortResult<Surprise> {
            Err(PortError::Unexpected("read-only".to_string()))
        }

        async fn update_surprise(&self, _: &str, _: &SurpriseContent) -> PortResult<()> {
            Err(PortError::Unexpected("read-only".to_string()))
        }

        async fn delete_surprise(&self, _: &str) -> PortResult<()> {
            Err(PortError::Unexpected("read-only".to_string()))
        }

        async fn list_surprises_by_user(&self, _: Uuid) -> PortResult<Vec<Surprise>> {
            Ok(self.surprise.clone().into_iter().collect())
        }

        async fn delete_surprises_by_user(&self, _: Uuid) -> PortResult<u64> {
            Ok(0)
        }

        async fn increment_views(&self, id: &str) -> PortResult<()> {
            let _ = self.increments.send(id.to_string());
            if self.fail_increments {
                return Err(PortError::Unexpected("write rejected".to_string()));
            }
            Ok(())
        }
    }

    fn eve_and_max() -> Surprise {
        Surprise {
            id: "s-1".to_string(),
            user_id: Uuid::new_v4(),
            content: SurpriseContent {
                recipient: "Eve".to_string(),
                sender: "Max".to_string(),
                question: Some("Qui t'aime ?".to_string()),
                answer: Some("Max".to_string()),
                final_message: "Je t'aime".to_string(),
                theme: Theme::Romantique,
            },
            views: 0,
            completed_views: 0,
            created_at: Utc::now(),
        }
    }

    fn store_with(
        surprise: Option<Surprise>,
    ) -> (Arc<RecordingStore>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = Arc::new(RecordingStore {
            surprise,
            fail_reads: false,
            fail_increments: false,
            increments: tx,
        });
        (store, rx)
    }

    async fn next_increment(rx: &mut mpsc::UnboundedReceiver<String>) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .ok()
            .flatten()
    }

    #[test]
    fn persisted_id_wins_over_query() {
        assert_eq!(resolve_surprise_id(Some("a"), Some("b")), Some("a"));
        assert_eq!(resolve_surprise_id(Some("  "), Some("b")), Some("b"));
        assert_eq!(resolve_surprise_id(None, Some(" b ")), Some("b"));
        assert_eq!(resolve_surprise_id(None, Some("")), None);
        assert_eq!(resolve_surprise_id(None, None), None);
    }

    #[tokio::test]
    async fn full_scenario_reaches_the_message() {
        let (store, mut rx) = store_with(Some(eve_and_max()));
        let mut reveal = RevealController::load(store, Some("s-1")).await;
        assert_eq!(reveal.step(), RevealStep::IdentityCheck);

        assert_eq!(
            reveal.submit_name("Eve"),
            Ok(StepOutcome::Advanced(RevealStep::Quiz))
        );
        assert_eq!(
            reveal.submit_answer("maxime"),
            Ok(StepOutcome::Advanced(RevealStep::Revealed))
        );

        match reveal.view() {
            RevealView::Revealed {
                sender,
                recipient,
                message,
                theme,
            } => {
                assert_eq!(sender, "Max");
                assert_eq!(recipient, "Eve");
                assert_eq!(message, "Je t'aime");
                assert_eq!(theme, Theme::Romantique.style());
            }
            other => panic!("expected the revealed view, got {:?}", other),
        }
        assert!(reveal.is_terminal());
        assert_eq!(next_increment(&mut rx).await.as_deref(), Some("s-1"));
    }

    #[tokio::test]
    async fn wrong_name_stays_put_and_names_the_recipient() {
        let (store, _rx) = store_with(Some(eve_and_max()));
        let mut reveal = RevealController::load(store, Some("s-1")).await;

        for _ in 0..5 {
            assert_eq!(reveal.submit_name("Bob"), Ok(StepOutcome::Rejected));
        }
        assert_eq!(reveal.step(), RevealStep::IdentityCheck);
        match reveal.view() {
            RevealView::IdentityCheck { error: Some(e), .. } => assert!(e.contains("Eve")),
            other => panic!("expected an inline error, got {:?}", other),
        }

        reveal.submit_name("eve").unwrap();
        assert_eq!(reveal.step(), RevealStep::Quiz);
    }

    #[tokio::test]
    async fn wrong_answer_shows_the_generic_hint() {
        let (store, _rx) = store_with(Some(eve_and_max()));
        let mut reveal = RevealController::load(store, Some("s-1")).await;
        reveal.submit_name("Eve").unwrap();

        assert_eq!(reveal.submit_answer(""), Ok(StepOutcome::Rejected));
        assert_eq!(reveal.submit_answer("Leo"), Ok(StepOutcome::Rejected));
        match reveal.view() {
            RevealView::Quiz {
                hint, question, ..
            } => {
                assert_eq!(hint.as_deref(), Some(QUIZ_HINT));
                assert_eq!(question.as_deref(), Some("Qui t'aime ?"));
            }
            other => panic!("expected the quiz view, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn blank_answer_makes_the_quiz_skippable() {
        let mut surprise = eve_and_max();
        surprise.content.answer = Some(String::new());
        let (store, _rx) = store_with(Some(surprise));
        let mut reveal = RevealController::load(store, Some("s-1")).await;
        reveal.submit_name("Eve").unwrap();

        assert_eq!(
            reveal.submit_answer("anything at all"),
            Ok(StepOutcome::Advanced(RevealStep::Revealed))
        );
    }

    #[tokio::test]
    async fn steps_cannot_be_skipped_or_repeated() {
        let (store, _rx) = store_with(Some(eve_and_max()));
        let mut reveal = RevealController::load(store, Some("s-1")).await;

        assert_eq!(
            reveal.submit_answer("Max"),
            Err(RevealError::InvalidStep {
                expected: RevealStep::Quiz,
                actual: RevealStep::IdentityCheck,
            })
        );
        reveal.submit_name("Eve").unwrap();
        assert!(reveal.submit_name("Eve").is_err());
        reveal.submit_answer("Max").unwrap();
        assert!(reveal.submit_answer("Max").is_err());
        assert!(reveal.submit_name("Eve").is_err());
    }

    #[tokio::test]
    async fn exactly_one_view_is_counted_per_load() {
        let (store, mut rx) = store_with(Some(eve_and_max()));
        let mut reveal = RevealController::load(store, Some("s-1")).await;
        reveal.submit_name("Bob").unwrap();
        reveal.submit_name("Eve").unwrap();
        reveal.submit_answer("nope").unwrap();
        reveal.submit_answer("Max").unwrap();

        assert_eq!(next_increment(&mut rx).await.as_deref(), Some("s-1"));
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found_and_not_counted() {
        let (store, mut rx) = store_with(Some(eve_and_max()));
        let mut reveal = RevealController::load(store, Some("nope")).await;

        assert_eq!(reveal.view(), RevealView::NotFound);
        assert!(reveal.is_terminal());
        assert!(reveal.submit_name("Eve").is_err());
        assert!(reveal.submit_answer("Max").is_err());
        assert_eq!(next_increment(&mut rx).await, None);
    }

    #[tokio::test]
    async fn missing_id_and_fetch_failure_look_the_same() {
        let (store, mut rx) = store_with(Some(eve_and_max()));
        let missing = RevealController::load(store, None).await;
        assert_eq!(missing.view(), RevealView::NotFound);

        let (tx, _) = mpsc::unbounded_channel();
        let failing = Arc::new(RecordingStore {
            surprise: Some(eve_and_max()),
            fail_reads: true,
            fail_increments: false,
            increments: tx,
        });
        let broken = RevealController::load(failing, Some("s-1")).await;
        assert_eq!(broken.view(), missing.view());
        assert_eq!(next_increment(&mut rx).await, None);
    }

    #[tokio::test]
    async fn failed_increment_does_not_affect_the_flow() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let store = Arc::new(RecordingStore {
            surprise: Some(eve_and_max()),
            fail_reads: false,
            fail_increments: true,
            increments: tx,
        });
        let mut reveal = RevealController::load(store, Some("s-1")).await;
        assert_eq!(next_increment(&mut rx).await.as_deref(), Some("s-1"));

        reveal.submit_name("Eve").unwrap();
        reveal.submit_answer("Max").unwrap();
        assert_eq!(reveal.step(), RevealStep::Revealed);
    }

    #[tokio::test]
    async fn revealed_view_renders_identically_every_time() {
        let (store, _rx) = store_with(Some(eve_and_max()));
        let mut reveal = RevealController::load(store, Some("s-1")).await;
        reveal.submit_name("Eve").unwrap();
        reveal.submit_answer("Max").unwrap();

        assert_eq!(reveal.view(), reveal.view());
    }
}

use quiz_core::quiz::{Feedback, GroupResult, QuizEvent, QuizSnapshot};

pub const ANSWER_INPUT_ID: &str = "quiz-answer";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizIntent {
    Type(String),
    Check,
    NextGroup,
    Exit,
}

/// What the finish screen offers once a group is done.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinishAction {
    NextGroup,
    AllGroupsFinished,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinishVm {
    pub score_line: String,
    pub action: FinishAction,
    pub results: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizVm {
    pub running: bool,
    pub group_label: String,
    pub score_label: String,
    pub progress_label: String,
    pub question_text: String,
    pub input_locked: bool,
    pub feedback_text: Option<&'static str>,
    pub feedback_class: &'static str,
    pub question_class: &'static str,
    pub finish: Option<FinishVm>,
}

impl QuizVm {
    #[must_use]
    pub fn from_snapshot(snapshot: &QuizSnapshot, results: &[GroupResult]) -> Self {
        let (feedback_text, feedback_class) = match snapshot.feedback {
            Feedback::None => (None, "quiz-feedback"),
            Feedback::Correct => (Some("Correct!"), "quiz-feedback quiz-feedback--correct"),
            Feedback::Incorrect => (Some("Try again."), "quiz-feedback quiz-feedback--incorrect"),
        };
        let question_class = if snapshot.transitioning {
            "quiz-question quiz-question--fading"
        } else {
            "quiz-question"
        };
        let finish = snapshot.finished.then(|| FinishVm {
            score_line: format!(
                "Group {} score: {} / {}",
                snapshot.current_group_number, snapshot.score, snapshot.total_questions
            ),
            action: if snapshot.is_last_group {
                FinishAction::AllGroupsFinished
            } else {
                FinishAction::NextGroup
            },
            results: results
                .iter()
                .map(|r| format!("Group {}: {} / {}", r.group, r.score, r.total))
                .collect(),
        });

        Self {
            running: snapshot.running,
            group_label: format!(
                "Group {} of {}",
                snapshot.current_group_number, snapshot.total_groups
            ),
            score_label: format!("Score: {} / {}", snapshot.score, snapshot.total_questions),
            progress_label: format!(
                "Question {} of {}",
                snapshot.question_number, snapshot.total_questions
            ),
            question_text: snapshot.current_question_text.clone().unwrap_or_default(),
            input_locked: snapshot.input_locked,
            feedback_text,
            feedback_class,
            question_class,
            finish,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusAction {
    Focus,
    Select,
}

/// Focus handling for the answer box in response to a run event.
#[must_use]
pub fn focus_action_for(event: &QuizEvent) -> Option<FocusAction> {
    match event {
        QuizEvent::GroupStarted { .. } | QuizEvent::QuestionChanged { .. } => {
            Some(FocusAction::Focus)
        }
        QuizEvent::SelectInput => Some(FocusAction::Select),
        _ => None,
    }
}

#[must_use]
pub fn focus_script(action: FocusAction) -> String {
    let call = match action {
        FocusAction::Focus => "el.focus();",
        FocusAction::Select => "el.focus(); el.select();",
    };
    format!(
        "(function() {{ const el = document.getElementById({ANSWER_INPUT_ID:?}); if (el) {{ {call} }} }})();"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> QuizSnapshot {
        QuizSnapshot {
            running: true,
            current_group_number: 1,
            total_groups: 2,
            is_last_group: false,
            question_number: 1,
            total_questions: 3,
            current_question_text: Some("5 + 3".into()),
            ..QuizSnapshot::default()
        }
    }

    #[test]
    fn labels_follow_the_snapshot() {
        let vm = QuizVm::from_snapshot(&running(), &[]);
        assert_eq!(vm.group_label, "Group 1 of 2");
        assert_eq!(vm.score_label, "Score: 0 / 3");
        assert_eq!(vm.progress_label, "Question 1 of 3");
        assert_eq!(vm.question_text, "5 + 3");
        assert_eq!(vm.feedback_text, None);
        assert_eq!(vm.question_class, "quiz-question");
        assert!(vm.finish.is_none());
    }

    #[test]
    fn feedback_and_fade_classes() {
        let mut snap = running();
        snap.feedback = Feedback::Correct;
        snap.input_locked = true;
        snap.transitioning = true;
        let vm = QuizVm::from_snapshot(&snap, &[]);
        assert_eq!(vm.feedback_text, Some("Correct!"));
        assert!(vm.feedback_class.ends_with("--correct"));
        assert!(vm.question_class.contains("fading"));
        assert!(vm.input_locked);

        snap.feedback = Feedback::Incorrect;
        assert_eq!(
            QuizVm::from_snapshot(&snap, &[]).feedback_text,
            Some("Try again.")
        );
    }

    #[test]
    fn finish_screen_offers_next_group_until_the_last() {
        let mut snap = running();
        snap.finished = true;
        snap.score = 3;
        snap.question_number = 3;
        let results = [GroupResult { group: 1, score: 3, total: 3 }];

        let finish = QuizVm::from_snapshot(&snap, &results).finish.unwrap();
        assert_eq!(finish.score_line, "Group 1 score: 3 / 3");
        assert_eq!(finish.action, FinishAction::NextGroup);
        assert_eq!(finish.results, vec!["Group 1: 3 / 3".to_string()]);

        snap.current_group_number = 2;
        snap.is_last_group = true;
        let finish = QuizVm::from_snapshot(&snap, &results).finish.unwrap();
        assert_eq!(finish.action, FinishAction::AllGroupsFinished);
    }

    #[test]
    fn focus_follows_question_changes_and_wrong_checks() {
        assert_eq!(
            focus_action_for(&QuizEvent::QuestionChanged { index: 1 }),
            Some(FocusAction::Focus)
        );
        assert_eq!(
            focus_action_for(&QuizEvent::GroupStarted { group: 2 }),
            Some(FocusAction::Focus)
        );
        assert_eq!(focus_action_for(&QuizEvent::SelectInput), Some(FocusAction::Select));
        assert_eq!(focus_action_for(&QuizEvent::RunExited), None);
    }

    #[test]
    fn focus_script_targets_the_answer_box() {
        let js = focus_script(FocusAction::Select);
        assert!(js.contains("\"quiz-answer\""));
        assert!(js.contains("el.select()"));
    }
}

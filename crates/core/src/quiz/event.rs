use serde::Serialize;

/// Feedback shown under the answer box for the current question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Feedback {
    #[default]
    None,
    Correct,
    Incorrect,
}

/// Notifications for the host display.
///
/// Sessions and the progression queue these as state changes happen; hosts
/// drain them with `take_events` and react (re-render, re-focus, navigate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum QuizEvent {
    RunStarted { total_groups: u32 },
    GroupStarted { group: u32 },
    FeedbackChanged(Feedback),
    /// An explicit wrong check; the host should select the input for retry.
    SelectInput,
    /// The dwell after a correct answer elapsed and the fade began.
    TransitionStarted { index: usize },
    QuestionChanged { index: usize },
    Finished { score: u32, total: usize },
    GroupFinished { group: u32, last_group: bool },
    RunExited,
}

use quiz_core::model::{Question, QuestionId, QuestionSet, QuestionSetId};

/// Upper bound for the group count field.
pub const MAX_GROUPS: u32 = 99;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetListItemVm {
    pub id: QuestionSetId,
    pub name: String,
    pub question_count_label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionRowVm {
    pub id: QuestionId,
    pub number: usize,
    pub text: String,
    pub answer: String,
}

#[must_use]
pub fn map_set_list(sets: &[QuestionSet]) -> Vec<SetListItemVm> {
    sets.iter()
        .map(|set| SetListItemVm {
            id: set.id(),
            name: set.name().to_string(),
            question_count_label: question_count_label(set.len()),
        })
        .collect()
}

#[must_use]
pub fn map_question_rows(set: &QuestionSet) -> Vec<QuestionRowVm> {
    set.questions()
        .iter()
        .enumerate()
        .map(|(idx, q)| QuestionRowVm {
            id: q.id(),
            number: idx + 1,
            text: q.text().to_string(),
            answer: q.answer().to_string(),
        })
        .collect()
}

fn question_count_label(count: usize) -> String {
    match count {
        1 => "1 question".to_string(),
        n => format!("{n} questions"),
    }
}

/// Contents of the add/edit question form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuestionDraft {
    pub editing: Option<QuestionId>,
    pub text: String,
    pub answer: String,
}

impl QuestionDraft {
    #[must_use]
    pub fn for_edit(question: &Question) -> Self {
        Self {
            editing: Some(question.id()),
            text: question.text().to_string(),
            answer: question.answer().to_string(),
        }
    }

    /// Update the question text. A suggested answer replaces the answer
    /// field; without one the answer is left alone.
    pub fn set_text(&mut self, text: String, suggestion: Option<String>) {
        self.text = text;
        if let Some(answer) = suggestion {
            self.answer = answer;
        }
    }

    #[must_use]
    pub fn can_save(&self) -> bool {
        !self.text.trim().is_empty() && !self.answer.trim().is_empty()
    }

    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        if self.editing.is_some() {
            "Save Question"
        } else {
            "Add Question"
        }
    }
}

/// Parse the group count field from its leading digits, clamping to
/// `1..=MAX_GROUPS`. No digits, or a minus sign, counts as one group.
#[must_use]
pub fn parse_group_count(raw: &str) -> u32 {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if negative || digits == 0 {
        return 1;
    }
    // Leading digits only, like typing "2.5" or "3 groups".
    rest[..digits]
        .parse::<u32>()
        .map_or(MAX_GROUPS, |n| n.clamp(1, MAX_GROUPS))
}

/// A set delete waiting for the teacher to confirm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingDelete {
    pub set_id: QuestionSetId,
    pub prompt: String,
    pub deleting: bool,
}

impl PendingDelete {
    #[must_use]
    pub fn for_set(set_id: QuestionSetId, name: &str) -> Self {
        Self {
            set_id,
            prompt: format!("Are you sure you want to delete the set \"{name}\"?"),
            deleting: false,
        }
    }

    /// Set to delete on confirm. `None` once a delete is already running or
    /// the selection moved to another set.
    #[must_use]
    pub fn confirm_target(&self, selected: Option<QuestionSetId>) -> Option<QuestionSetId> {
        (!self.deleting && selected == Some(self.set_id)).then_some(self.set_id)
    }
}

#[must_use]
pub fn can_start(set: Option<&QuestionSet>) -> bool {
    set.is_some_and(|set| !set.is_empty())
}

/// Set to select after the list reloads: keep the current one if it still
/// exists, otherwise fall back to the first.
#[must_use]
pub fn resolve_selection(
    current: Option<QuestionSetId>,
    sets: &[SetListItemVm],
) -> Option<QuestionSetId> {
    current
        .filter(|id| sets.iter().any(|item| item.id == *id))
        .or_else(|| sets.first().map(|item| item.id))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DashboardIntent {
    SelectSet(QuestionSetId),
    CreateSet(String),
    RenameSet(QuestionSetId, String),
    RequestDeleteSet(QuestionSetId, String),
    ConfirmDeleteSet,
    CancelDeleteSet,
    EditQuestion(QuestionId),
    DeleteQuestion(QuestionId),
    SaveQuestion,
    CancelEdit,
    Start,
}

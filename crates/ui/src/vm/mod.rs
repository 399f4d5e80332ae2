mod dashboard_vm;
mod quiz_vm;

pub use dashboard_vm::{
    DashboardIntent, MAX_GROUPS, PendingDelete, QuestionDraft, QuestionRowVm, SetListItemVm,
    can_start, map_question_rows, map_set_list, parse_group_count, resolve_selection,
};
pub use quiz_vm::{
    ANSWER_INPUT_ID, FinishAction, FinishVm, FocusAction, QuizIntent, QuizVm, focus_action_for,
    focus_script,
};

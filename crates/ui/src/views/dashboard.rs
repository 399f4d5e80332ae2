use dioxus::prelude::*;
use dioxus_router::use_navigator;
use quiz_core::model::{QuestionSet, QuestionSetId};
use tracing::info;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    DashboardIntent, MAX_GROUPS, PendingDelete, QuestionDraft, QuestionRowVm, SetListItemVm,
    can_start, map_question_rows, map_set_list, parse_group_count, resolve_selection,
};

const SET_LIST_LIMIT: u32 = 256;

#[component]
pub fn DashboardView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let question_sets = ctx.question_sets();
    let quiz_runner = ctx.quiz_runner();

    let mut selected = use_signal(|| None::<QuestionSetId>);
    let mut new_set_name = use_signal(String::new);
    let mut rename_value = use_signal(|| None::<String>);
    let mut draft = use_signal(QuestionDraft::default);
    let mut groups_raw = use_signal(|| "1".to_string());
    let pending_delete = use_signal(|| None::<PendingDelete>);
    let error = use_signal(|| None::<ViewError>);

    let sets_resource = {
        let question_sets = question_sets.clone();
        use_resource(move || {
            let question_sets = question_sets.clone();
            async move {
                let sets = question_sets.list_sets(SET_LIST_LIMIT).await?;
                Ok::<_, ViewError>(map_set_list(&sets))
            }
        })
    };

    let set_resource = {
        let question_sets = question_sets.clone();
        use_resource(move || {
            let question_sets = question_sets.clone();
            let id = selected();
            async move {
                let Some(id) = id else {
                    return Ok::<_, ViewError>(None);
                };
                Ok(question_sets.get_set(id).await?)
            }
        })
    };

    // Keep the selection pointing at an existing set.
    use_effect(move || {
        let value = sets_resource.value();
        let guard = value.read();
        let Some(Ok(items)) = guard.as_ref() else {
            return;
        };
        let current = *selected.peek();
        let next = resolve_selection(current, items);
        if next != current {
            selected.set(next);
        }
    });

    let dispatch_intent = {
        let question_sets = question_sets.clone();
        use_callback(move |intent: DashboardIntent| {
            let question_sets = question_sets.clone();
            let quiz_runner = quiz_runner.clone();
            let mut error = error;
            let mut selected = selected;
            let mut draft = draft;
            let mut new_set_name = new_set_name;
            let mut rename_value = rename_value;
            let mut pending_delete = pending_delete;
            let mut sets_resource = sets_resource;
            let mut set_resource = set_resource;

            match intent {
                DashboardIntent::SelectSet(id) => {
                    error.set(None);
                    rename_value.set(None);
                    pending_delete.set(None);
                    draft.set(QuestionDraft::default());
                    selected.set(Some(id));
                }
                DashboardIntent::CancelEdit => {
                    draft.set(QuestionDraft::default());
                }
                DashboardIntent::EditQuestion(question_id) => {
                    let current = set_resource.value();
                    let next = current
                        .read()
                        .as_ref()
                        .and_then(|value| value.as_ref().ok())
                        .and_then(Option::as_ref)
                        .and_then(|set: &QuestionSet| set.question(question_id))
                        .map(QuestionDraft::for_edit);
                    if let Some(next) = next {
                        draft.set(next);
                    }
                }
                DashboardIntent::Start => {
                    let current = set_resource.value();
                    let questions = current
                        .read()
                        .as_ref()
                        .and_then(|value| value.as_ref().ok())
                        .and_then(Option::as_ref)
                        .map(|set: &QuestionSet| set.questions().to_vec())
                        .unwrap_or_default();
                    let groups = parse_group_count(&groups_raw.peek());
                    match quiz_runner.start(questions, groups) {
                        Ok(_) => {
                            error.set(None);
                            navigator.push(Route::Quiz {});
                        }
                        Err(err) => error.set(Some(err.into())),
                    }
                }
                DashboardIntent::CreateSet(name) => {
                    spawn(async move {
                        match question_sets.create_set(&name).await {
                            Ok(id) => {
                                info!(set_id = id.value(), "set created from dashboard");
                                error.set(None);
                                new_set_name.set(String::new());
                                draft.set(QuestionDraft::default());
                                selected.set(Some(id));
                                sets_resource.restart();
                            }
                            Err(err) => error.set(Some(err.into())),
                        }
                    });
                }
                DashboardIntent::RenameSet(id, name) => {
                    spawn(async move {
                        match question_sets.rename_set(id, &name).await {
                            Ok(()) => {
                                error.set(None);
                                rename_value.set(None);
                                sets_resource.restart();
                                set_resource.restart();
                            }
                            Err(err) => error.set(Some(err.into())),
                        }
                    });
                }
                DashboardIntent::RequestDeleteSet(id, name) => {
                    pending_delete.set(Some(PendingDelete::for_set(id, &name)));
                }
                DashboardIntent::CancelDeleteSet => {
                    if pending_delete.peek().as_ref().is_some_and(|p| !p.deleting) {
                        pending_delete.set(None);
                    }
                }
                DashboardIntent::ConfirmDeleteSet => {
                    let target = pending_delete
                        .peek()
                        .as_ref()
                        .and_then(|pending| pending.confirm_target(*selected.peek()));
                    let Some(id) = target else {
                        pending_delete.set(None);
                        return;
                    };
                    if let Some(pending) = &mut *pending_delete.write() {
                        pending.deleting = true;
                    }
                    spawn(async move {
                        let result = question_sets.delete_set(id).await;
                        pending_delete.set(None);
                        match result {
                            Ok(()) => {
                                info!(set_id = id.value(), "set deleted from dashboard");
                                error.set(None);
                                draft.set(QuestionDraft::default());
                                selected.set(None);
                                sets_resource.restart();
                            }
                            Err(err) => error.set(Some(err.into())),
                        }
                    });
                }
                DashboardIntent::DeleteQuestion(question_id) => {
                    let Some(set_id) = selected() else {
                        return;
                    };
                    spawn(async move {
                        match question_sets.delete_question(set_id, question_id).await {
                            Ok(()) => {
                                error.set(None);
                                if draft.peek().editing == Some(question_id) {
                                    draft.set(QuestionDraft::default());
                                }
                                set_resource.restart();
                                sets_resource.restart();
                            }
                            Err(err) => error.set(Some(err.into())),
                        }
                    });
                }
                DashboardIntent::SaveQuestion => {
                    let Some(set_id) = selected() else {
                        return;
                    };
                    let current = draft();
                    if !current.can_save() {
                        error.set(Some(ViewError::Invalid));
                        return;
                    }
                    spawn(async move {
                        let result = match current.editing {
                            Some(question_id) => question_sets
                                .update_question(set_id, question_id, &current.text, &current.answer)
                                .await
                                .map(|_| ()),
                            None => question_sets
                                .add_question(set_id, &current.text, &current.answer)
                                .await
                                .map(|_| ()),
                        };
                        match result {
                            Ok(()) => {
                                error.set(None);
                                draft.set(QuestionDraft::default());
                                set_resource.restart();
                                sets_resource.restart();
                            }
                            Err(err) => error.set(Some(err.into())),
                        }
                    });
                }
            }
        })
    };

    let sets_state = view_state_from_resource(sets_resource);
    let set_state = view_state_from_resource(set_resource);
    let selected_id = selected();
    let current_draft = draft();
    let start_enabled = matches!(&set_state, ViewState::Ready(set) if can_start(set.as_ref()));
    let on_text_input = {
        let question_sets = question_sets.clone();
        move |evt: FormEvent| {
            let text = evt.value();
            let suggestion = question_sets.suggest_answer(&text);
            draft.write().set_text(text, suggestion);
        }
    };

    rsx! {
        div { class: "page dashboard",
            header { class: "dashboard__header",
                h2 { "Teacher Dashboard" }
            }
            if let Some(err) = error() {
                p { class: "dashboard__warning", role: "alert", "{err.message()}" }
            }
            if let Some(pending) = pending_delete() {
                ConfirmDeleteModal { pending, on_intent: dispatch_intent }
            }
            div { class: "dashboard__columns",
                section { class: "dashboard__sets",
                    h3 { "Question Sets" }
                    match sets_state {
                        ViewState::Idle | ViewState::Loading => rsx! {
                            p { "Loading..." }
                        },
                        ViewState::Error(err) => rsx! {
                            p { "{err.message()}" }
                            button {
                                class: "btn btn-secondary",
                                r#type: "button",
                                onclick: move |_| {
                                    let mut sets_resource = sets_resource;
                                    sets_resource.restart();
                                },
                                "Retry"
                            }
                        },
                        ViewState::Ready(items) => rsx! {
                            if items.is_empty() {
                                p { class: "dashboard__empty", "No question sets yet." }
                            }
                            ul { class: "set-list",
                                for item in items {
                                    SetRow {
                                        key: "{item.id}",
                                        selected: selected_id == Some(item.id),
                                        item: item.clone(),
                                        on_intent: dispatch_intent,
                                    }
                                }
                            }
                        },
                    }
                    div { class: "set-create",
                        input {
                            id: "new-set-name",
                            r#type: "text",
                            placeholder: "New set name",
                            value: "{new_set_name}",
                            oninput: move |evt| new_set_name.set(evt.value()),
                            onkeydown: move |evt| {
                                if evt.data.key() == Key::Enter {
                                    evt.prevent_default();
                                    dispatch_intent.call(DashboardIntent::CreateSet(new_set_name()));
                                }
                            },
                        }
                        button {
                            class: "btn btn-primary",
                            r#type: "button",
                            disabled: new_set_name.read().trim().is_empty(),
                            onclick: move |_| dispatch_intent.call(DashboardIntent::CreateSet(new_set_name())),
                            "Create Set"
                        }
                    }
                }
                section { class: "dashboard__questions",
                    match set_state {
                        ViewState::Idle | ViewState::Loading => rsx! {
                            p { "Loading..." }
                        },
                        ViewState::Error(err) => rsx! {
                            p { "{err.message()}" }
                        },
                        ViewState::Ready(None) => rsx! {
                            p { class: "dashboard__empty", "Create a question set to get started." }
                        },
                        ViewState::Ready(Some(set)) => {
                            let set_id = set.id();
                            let set_name = set.name().to_string();
                            let set_name_for_delete = set_name.clone();
                            let rows = map_question_rows(&set);
                            rsx! {
                                div { class: "set-heading",
                                    if let Some(value) = rename_value() {
                                        input {
                                            class: "set-rename-input",
                                            r#type: "text",
                                            value: "{value}",
                                            autofocus: true,
                                            oninput: move |evt| rename_value.set(Some(evt.value())),
                                            onkeydown: move |evt| match evt.data.key() {
                                                Key::Enter => {
                                                    evt.prevent_default();
                                                    let name = rename_value().unwrap_or_default();
                                                    dispatch_intent.call(DashboardIntent::RenameSet(set_id, name));
                                                }
                                                Key::Escape => {
                                                    evt.prevent_default();
                                                    rename_value.set(None);
                                                }
                                                _ => {}
                                            },
                                        }
                                    } else {
                                        h3 {
                                            class: "set-heading__name",
                                            title: "Double-click to rename",
                                            ondoubleclick: move |_| rename_value.set(Some(set_name.clone())),
                                            "{set.name()}"
                                        }
                                    }
                                    button {
                                        class: "btn btn-danger",
                                        r#type: "button",
                                        onclick: move |_| {
                                            let name = set_name_for_delete.clone();
                                            dispatch_intent.call(DashboardIntent::RequestDeleteSet(set_id, name));
                                        },
                                        "Delete Set"
                                    }
                                }
                                if rows.is_empty() {
                                    p { class: "dashboard__empty", "No questions in this set yet." }
                                } else {
                                    table { class: "question-table",
                                        thead {
                                            tr {
                                                th { "#" }
                                                th { "Question" }
                                                th { "Answer" }
                                                th {}
                                            }
                                        }
                                        tbody {
                                            for row in rows {
                                                QuestionRow { key: "{row.id}", row, on_intent: dispatch_intent }
                                            }
                                        }
                                    }
                                }
                                div { class: "question-form",
                                    label { r#for: "question-text", "Question" }
                                    input {
                                        id: "question-text",
                                        r#type: "text",
                                        placeholder: "e.g. 5 + 3 =",
                                        value: "{current_draft.text}",
                                        oninput: on_text_input.clone(),
                                    }
                                    label { r#for: "question-answer", "Answer" }
                                    input {
                                        id: "question-answer",
                                        r#type: "text",
                                        value: "{current_draft.answer}",
                                        oninput: move |evt| draft.write().answer = evt.value(),
                                        onkeydown: move |evt| {
                                            if evt.data.key() == Key::Enter {
                                                evt.prevent_default();
                                                dispatch_intent.call(DashboardIntent::SaveQuestion);
                                            }
                                        },
                                    }
                                    div { class: "question-form__actions",
                                        button {
                                            class: "btn btn-primary",
                                            r#type: "button",
                                            disabled: !current_draft.can_save(),
                                            onclick: move |_| dispatch_intent.call(DashboardIntent::SaveQuestion),
                                            "{current_draft.submit_label()}"
                                        }
                                        if current_draft.editing.is_some() {
                                            button {
                                                class: "btn btn-secondary",
                                                r#type: "button",
                                                onclick: move |_| dispatch_intent.call(DashboardIntent::CancelEdit),
                                                "Cancel"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    div { class: "quiz-launch",
                        label { r#for: "group-count", "Number of groups" }
                        input {
                            id: "group-count",
                            r#type: "number",
                            min: "1",
                            max: "{MAX_GROUPS}",
                            value: "{groups_raw}",
                            oninput: move |evt| groups_raw.set(evt.value()),
                        }
                        button {
                            class: "btn btn-primary quiz-launch__start",
                            id: "start-quiz",
                            r#type: "button",
                            disabled: !start_enabled,
                            onclick: move |_| dispatch_intent.call(DashboardIntent::Start),
                            "Start Quiz"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn SetRow(item: SetListItemVm, selected: bool, on_intent: EventHandler<DashboardIntent>) -> Element {
    let id = item.id;
    let class = if selected {
        "set-list__item set-list__item--selected"
    } else {
        "set-list__item"
    };
    rsx! {
        li { class: "{class}",
            button {
                class: "set-list__select",
                r#type: "button",
                onclick: move |_| on_intent.call(DashboardIntent::SelectSet(id)),
                span { class: "set-list__name", "{item.name}" }
                span { class: "set-list__count", "{item.question_count_label}" }
            }
        }
    }
}

#[component]
fn QuestionRow(row: QuestionRowVm, on_intent: EventHandler<DashboardIntent>) -> Element {
    let id = row.id;
    rsx! {
        tr {
            td { "{row.number}" }
            td { "{row.text}" }
            td { "{row.answer}" }
            td { class: "question-table__actions",
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_| on_intent.call(DashboardIntent::EditQuestion(id)),
                    "Edit"
                }
                button {
                    class: "btn btn-danger",
                    r#type: "button",
                    onclick: move |_| on_intent.call(DashboardIntent::DeleteQuestion(id)),
                    "Delete"
                }
            }
        }
    }
}

#[component]
fn ConfirmDeleteModal(pending: PendingDelete, on_intent: EventHandler<DashboardIntent>) -> Element {
    rsx! {
        div {
            class: "modal-overlay",
            onclick: move |_| on_intent.call(DashboardIntent::CancelDeleteSet),
            div {
                class: "modal",
                role: "dialog",
                onclick: move |evt| evt.stop_propagation(),
                h3 { class: "modal__title", "Delete set?" }
                p { class: "modal__body", "{pending.prompt}" }
                div { class: "modal__actions",
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        disabled: pending.deleting,
                        onclick: move |_| on_intent.call(DashboardIntent::CancelDeleteSet),
                        "Cancel"
                    }
                    button {
                        class: "btn btn-danger",
                        id: "confirm-delete-set",
                        r#type: "button",
                        disabled: pending.deleting,
                        onclick: move |_| on_intent.call(DashboardIntent::ConfirmDeleteSet),
                        "Delete"
                    }
                }
            }
        }
    }
}

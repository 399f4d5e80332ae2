use dioxus::document::eval;
use dioxus::prelude::*;
use dioxus_router::use_navigator;
use quiz_core::quiz::{GroupResult, TransitionTiming};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::ViewError;
use crate::vm::{
    ANSWER_INPUT_ID, FinishAction, FinishVm, FocusAction, QuizIntent, QuizVm, focus_action_for,
    focus_script,
};

#[component]
pub fn QuizView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let quiz_runner = ctx.quiz_runner();
    let fade_ms = quiz_runner
        .timing()
        .map_or(TransitionTiming::DEFAULT_FADE, |timing| timing.fade())
        .as_millis();

    let mut snapshot = {
        let quiz_runner = quiz_runner.clone();
        use_signal(move || quiz_runner.snapshot())
    };
    let mut results = use_signal(Vec::<GroupResult>::new);
    let mut pending_focus = use_signal(|| Some(FocusAction::Focus));
    // Raw answer box text; the run only keeps the trimmed value.
    let mut typed = use_signal(String::new);
    let error = use_signal(|| None::<ViewError>);

    // Mirror the runner's snapshot channel; transitions publish from a task.
    {
        let quiz_runner = quiz_runner.clone();
        use_future(move || {
            let quiz_runner = quiz_runner.clone();
            async move {
                let mut rx = quiz_runner.subscribe_snapshots();
                loop {
                    let next = rx.borrow_and_update().clone();
                    if next.finished {
                        results.set(quiz_runner.results().unwrap_or_default());
                    }
                    if *snapshot.peek() != next {
                        snapshot.set(next);
                    }
                    if rx.changed().await.is_err() {
                        break;
                    }
                }
            }
        });
    }

    {
        let quiz_runner = quiz_runner.clone();
        use_future(move || {
            let quiz_runner = quiz_runner.clone();
            async move {
                let mut rx = quiz_runner.subscribe_events();
                loop {
                    match rx.recv().await {
                        Ok(event) => {
                            if let Some(action) = focus_action_for(&event) {
                                pending_focus.set(Some(action));
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "quiz view lagged behind run events");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        });
    }

    let question_key = use_memo(move || {
        let snap = snapshot.read();
        (snap.running, snap.current_group_number, snap.question_number)
    });
    use_effect(move || {
        let _ = question_key();
        typed.set(String::new());
    });

    // Runs after render, so the input is already enabled when focused.
    use_effect(move || {
        let _ = snapshot.read();
        if let Some(action) = pending_focus() {
            pending_focus.set(None);
            let _ = eval(&focus_script(action));
        }
    });

    let dispatch_intent = use_callback(move |intent: QuizIntent| {
        let quiz_runner = quiz_runner.clone();
        let mut error = error;

        let outcome = match intent {
            QuizIntent::Type(value) => quiz_runner.type_answer(&value).map(|ticket| {
                if let Some(ticket) = ticket {
                    let quiz_runner = quiz_runner.clone();
                    spawn(async move {
                        if let Err(err) = quiz_runner.run_transition(ticket).await {
                            error.set(Some(err.into()));
                        }
                    });
                }
            }),
            QuizIntent::Check => quiz_runner.check_answer().map(|_| ()),
            QuizIntent::NextGroup => quiz_runner.next_group().map(|_| ()),
            QuizIntent::Exit => {
                let exited = quiz_runner.exit().map(|_| ());
                navigator.push(Route::Dashboard {});
                exited
            }
        };

        match outcome {
            Ok(()) => {
                error.set(None);
                snapshot.set(quiz_runner.snapshot());
            }
            Err(err) => error.set(Some(err.into())),
        }
    });

    let vm = QuizVm::from_snapshot(&snapshot.read(), &results.read());

    rsx! {
        div { class: "page quiz-page", id: "quiz-root", style: "--fade-ms: {fade_ms}ms;",
            header { class: "quiz-header",
                span { class: "quiz-header__group", "{vm.group_label}" }
                span { class: "quiz-header__score", "{vm.score_label}" }
                button {
                    class: "btn btn-secondary quiz-header__exit",
                    id: "teacher-mode",
                    r#type: "button",
                    onclick: move |_| dispatch_intent.call(QuizIntent::Exit),
                    "Teacher Mode"
                }
            }
            if let Some(err) = error() {
                p { class: "quiz-error", role: "alert", "{err.message()}" }
            }
            if !vm.running {
                div { class: "quiz-idle",
                    p { "No quiz is running." }
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        onclick: move |_| {
                            navigator.push(Route::Dashboard {});
                        },
                        "Back to Dashboard"
                    }
                }
            } else if let Some(finish) = vm.finish.clone() {
                FinishPanel { finish, on_intent: dispatch_intent }
            } else {
                div { class: "{vm.question_class}",
                    p { class: "quiz-question__progress", "{vm.progress_label}" }
                    h2 { class: "quiz-question__text", "{vm.question_text}" }
                    div { class: "quiz-answer",
                        input {
                            id: ANSWER_INPUT_ID,
                            class: "quiz-answer__input",
                            r#type: "text",
                            autocomplete: "off",
                            value: "{typed}",
                            disabled: vm.input_locked,
                            oninput: move |evt| {
                                let value = evt.value();
                                typed.set(value.clone());
                                dispatch_intent.call(QuizIntent::Type(value));
                            },
                            onkeydown: move |evt| {
                                if evt.data.key() == Key::Enter {
                                    evt.prevent_default();
                                    dispatch_intent.call(QuizIntent::Check);
                                }
                            },
                        }
                        button {
                            class: "btn btn-primary",
                            r#type: "button",
                            disabled: vm.input_locked,
                            onclick: move |_| dispatch_intent.call(QuizIntent::Check),
                            "Check"
                        }
                    }
                    p { class: "{vm.feedback_class}",
                        if let Some(text) = vm.feedback_text {
                            "{text}"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn FinishPanel(finish: FinishVm, on_intent: EventHandler<QuizIntent>) -> Element {
    rsx! {
        div { class: "quiz-finish",
            h2 { "Quiz Complete" }
            p { class: "quiz-finish__score", "{finish.score_line}" }
            if finish.results.len() > 1 {
                ul { class: "quiz-finish__results",
                    for line in finish.results.iter() {
                        li { "{line}" }
                    }
                }
            }
            match finish.action {
                FinishAction::NextGroup => rsx! {
                    button {
                        class: "btn btn-primary",
                        id: "next-group",
                        r#type: "button",
                        onclick: move |_| on_intent.call(QuizIntent::NextGroup),
                        "Next Group"
                    }
                },
                FinishAction::AllGroupsFinished => rsx! {
                    h3 { class: "quiz-finish__done", "All Groups Finished!" }
                    button {
                        class: "btn btn-primary",
                        id: "back-to-dashboard",
                        r#type: "button",
                        onclick: move |_| on_intent.call(QuizIntent::Exit),
                        "Back to Dashboard"
                    }
                },
            }
        }
    }
}

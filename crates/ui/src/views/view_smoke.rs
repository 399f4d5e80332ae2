use quiz_core::model::{Question, QuestionId};

use super::test_harness::{ViewKind, setup_view_harness, test_services};

fn questions() -> Vec<Question> {
    vec![
        Question::new(QuestionId::new(1), "2+2=", "4").unwrap(),
        Question::new(QuestionId::new(2), "Capital of Norway?", "Oslo").unwrap(),
    ]
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_smoke_lists_sets_and_questions() {
    let app = test_services();
    let sets = app.question_sets();
    let set_id = sets.create_set("Warm-up").await.expect("create set");
    sets.add_question(set_id, "5 + 3 =", "8")
        .await
        .expect("add question");

    let mut harness = setup_view_harness(ViewKind::Dashboard, app);
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();

    assert!(html.contains("Teacher Dashboard"), "missing heading in {html}");
    assert!(html.contains("Warm-up"), "missing set name in {html}");
    assert!(html.contains("1 question"), "missing count in {html}");
    assert!(html.contains("5 + 3 ="), "missing question row in {html}");
    assert!(html.contains("Start Quiz"), "missing start button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_smoke_prompts_for_a_first_set() {
    let mut harness = setup_view_harness(ViewKind::Dashboard, test_services());
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();

    assert!(html.contains("No question sets yet."), "missing empty state in {html}");
    assert!(
        html.contains("Create a question set to get started."),
        "missing prompt in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_smoke_without_a_run() {
    let mut harness = setup_view_harness(ViewKind::Quiz, test_services());
    harness.rebuild();
    let html = harness.render();

    assert!(html.contains("No quiz is running."), "missing idle text in {html}");
    assert!(html.contains("Teacher Mode"), "missing exit button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_smoke_renders_the_current_question() {
    let app = test_services();
    app.quiz_runner().start(questions(), 2).expect("start");

    let mut harness = setup_view_harness(ViewKind::Quiz, app);
    harness.rebuild();
    let html = harness.render();

    assert!(html.contains("Group 1 of 2"), "missing group label in {html}");
    assert!(html.contains("Score: 0 / 2"), "missing score in {html}");
    assert!(html.contains("Question 1 of 2"), "missing progress in {html}");
    assert!(html.contains("2+2="), "missing question text in {html}");
    assert!(!html.contains("Correct!"), "unexpected feedback in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_smoke_shows_feedback_from_the_runner() {
    let app = test_services();
    let runner = app.quiz_runner();
    runner.start(questions(), 1).expect("start");

    let mut harness = setup_view_harness(ViewKind::Quiz, app);
    harness.rebuild();

    runner.type_answer("5").expect("type");
    runner.check_answer().expect("check");
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Try again."), "missing retry feedback in {html}");

    runner.type_answer("4").expect("type");
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Correct!"), "missing correct feedback in {html}");
    assert!(html.contains("Score: 1 / 2"), "score not updated in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_smoke_finish_screen_for_the_last_group() {
    let app = test_services();
    let runner = app.quiz_runner();
    runner.start(questions(), 1).expect("start");
    for answer in ["4", "Oslo"] {
        let mut next = runner.type_answer(answer).expect("type");
        while let Some(ticket) = next {
            next = runner.elapse(&ticket).expect("elapse");
        }
    }

    let mut harness = setup_view_harness(ViewKind::Quiz, app);
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();

    assert!(html.contains("Group 1 score: 2 / 2"), "missing final score in {html}");
    assert!(html.contains("All Groups Finished!"), "missing done banner in {html}");
    assert!(html.contains("Back to Dashboard"), "missing back button in {html}");
    assert!(!html.contains("Next Group"), "unexpected next group in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_smoke_offers_the_next_group() {
    let app = test_services();
    let runner = app.quiz_runner();
    runner.start(questions(), 3).expect("start");
    for answer in ["4", "Oslo"] {
        let mut next = runner.type_answer(answer).expect("type");
        while let Some(ticket) = next {
            next = runner.elapse(&ticket).expect("elapse");
        }
    }

    let mut harness = setup_view_harness(ViewKind::Quiz, app);
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();

    assert!(html.contains("Next Group"), "missing next group button in {html}");
    assert!(!html.contains("All Groups Finished!"), "premature banner in {html}");
}

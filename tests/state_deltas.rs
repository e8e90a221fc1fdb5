use serde_json::json;
use squad_terminal::config::Config;
use squad_terminal::error::PredictError;
use squad_terminal::prediction::PredictionResult;
use squad_terminal::squad::{STANDARD_SQUAD, SquadShape};
use squad_terminal::state::{
    AppState, CUSTOM_ERROR_MESSAGE, Delta, FormField, PREDICT_ERROR_MESSAGE, PageKind,
    TeamCustomization, apply_delta,
};

fn ready(ticket: squad_terminal::state::SubmitTicket, value: serde_json::Value) -> Delta {
    Delta::PredictionReady {
        ticket,
        result: PredictionResult::from_prediction(value),
    }
}

fn failed(ticket: squad_terminal::state::SubmitTicket) -> Delta {
    Delta::PredictionFailed {
        ticket,
        error: PredictError::request("connection refused"),
    }
}

#[test]
fn success_replaces_prediction() {
    let mut state = AppState::default();
    state.predict.set_input("Messi");
    let ticket = state.predict.begin_submit();
    assert_eq!(state.predict.in_flight, 1);

    apply_delta(&mut state, ready(ticket, json!("Forward A+")));

    let shown = state.predict.prediction.as_ref().unwrap().display_text();
    assert_eq!(shown, "Forward A+");
    assert_eq!(state.predict.in_flight, 0);
    assert!(state.predict.error.is_none());
}

#[test]
fn predict_failure_sets_fixed_message_and_keeps_prior_prediction() {
    let mut state = AppState::default();
    let first = state.predict.begin_submit();
    apply_delta(&mut state, ready(first, json!("Keeper B")));

    state.predict.set_input("");
    let second = state.predict.begin_submit();
    apply_delta(&mut state, failed(second));

    assert_eq!(state.predict.error.as_deref(), Some(PREDICT_ERROR_MESSAGE));
    assert_eq!(
        PREDICT_ERROR_MESSAGE,
        "There was an error making the prediction. Please try again."
    );
    assert_eq!(
        state.predict.prediction.as_ref().unwrap().display_text(),
        "Keeper B"
    );
    assert!(
        state
            .logs
            .back()
            .unwrap()
            .contains("[WARN] There was an error making the prediction!")
    );
}

#[test]
fn new_submit_clears_error_before_outcome() {
    let mut state = AppState::default();
    let ticket = state.predict.begin_submit();
    apply_delta(&mut state, failed(ticket));
    assert!(state.predict.error.is_some());

    let _pending = state.predict.begin_submit();
    assert!(state.predict.error.is_none());
}

#[test]
fn custom_failure_is_logged_only_by_default() {
    let mut state = AppState::default();
    state.switch_page(PageKind::Custom);
    let first = state.custom.begin_submit();
    apply_delta(&mut state, ready(first, json!({ "team": "A" })));

    let second = state.custom.begin_submit();
    apply_delta(&mut state, failed(second));

    assert!(state.custom.error.is_none());
    assert_eq!(
        state.custom.prediction.as_ref().unwrap().prediction,
        json!({ "team": "A" })
    );
    assert!(
        state
            .logs
            .back()
            .unwrap()
            .contains("There was an error making the custom prediction!")
    );
}

#[test]
fn custom_error_surface_follows_policy() {
    let config = Config {
        custom_show_errors: true,
        ..Config::default()
    };
    let mut state = AppState::new(&config);
    state.switch_page(PageKind::Custom);
    let ticket = state.custom.begin_submit();
    apply_delta(&mut state, failed(ticket));
    assert_eq!(state.custom.error.as_deref(), Some(CUSTOM_ERROR_MESSAGE));
}

#[test]
fn predict_error_surface_can_be_disabled() {
    let config = Config {
        predict_show_errors: false,
        ..Config::default()
    };
    let mut state = AppState::new(&config);
    let ticket = state.predict.begin_submit();
    apply_delta(&mut state, failed(ticket));
    assert!(state.predict.error.is_none());
}

#[test]
fn overlapping_submits_last_applied_wins() {
    let mut state = AppState::default();
    let first = state.predict.begin_submit();
    let second = state.predict.begin_submit();
    assert_ne!(first.request_id, second.request_id);
    assert_eq!(state.predict.in_flight, 2);

    apply_delta(&mut state, ready(second, json!("second")));
    apply_delta(&mut state, ready(first, json!("first")));

    assert_eq!(
        state.predict.prediction.as_ref().unwrap().display_text(),
        "first"
    );
    assert_eq!(state.predict.in_flight, 0);
}

#[test]
fn response_after_dispose_is_discarded() {
    let mut state = AppState::default();
    state.predict.set_input("Messi");
    let ticket = state.predict.begin_submit();
    let cancel = state.predict.lifetime.cancel.clone();

    state.switch_page(PageKind::Custom);
    assert!(cancel.is_cancelled());

    state.switch_page(PageKind::Predict);
    assert!(state.predict.input.is_empty());

    apply_delta(&mut state, ready(ticket, json!("Forward A+")));
    assert!(state.predict.prediction.is_none());

    apply_delta(&mut state, failed(ticket));
    assert!(state.predict.error.is_none());
    assert!(state.logs.back().unwrap().contains("Discarded stale"));
}

#[test]
fn remount_discards_page_state() {
    let mut state = AppState::default();
    state.predict.set_input("Messi");
    let ticket = state.predict.begin_submit();
    apply_delta(&mut state, ready(ticket, json!("Forward A+")));

    let old_session = state.predict.lifetime.session;
    state.toggle_page();
    state.toggle_page();

    assert_eq!(state.screen, PageKind::Predict);
    assert!(state.predict.prediction.is_none());
    assert!(state.predict.input.is_empty());
    assert_ne!(state.predict.lifetime.session, old_session);
    assert!(!state.predict.lifetime.cancel.is_cancelled());
}

#[test]
fn editing_input_changes_only_local_state() {
    let mut state = AppState::default();
    state.predict.insert_char('M');
    state.predict.insert_char('e');
    state.predict.backspace();
    state.predict.insert_char('x');
    assert_eq!(state.predict.input, "Mx");
    assert_eq!(state.predict.in_flight, 0);
    assert!(state.logs.is_empty());
}

#[test]
fn customization_form_clamps_and_serializes() {
    let mut form = TeamCustomization::default();
    assert_eq!(form.selected, FormField::Goalkeepers);
    form.increment();
    assert_eq!(form.shape.goalkeepers, 2);
    form.decrement();
    form.decrement();
    form.decrement();
    assert_eq!(form.shape.goalkeepers, 0);

    form.select_prev();
    assert_eq!(form.selected, FormField::Budget);
    form.increment();
    assert_eq!(form.budget, 100.5);

    let input: serde_json::Value = serde_json::from_str(&form.to_input_text()).unwrap();
    assert_eq!(
        input,
        json!({
            "numGoalkeepers": 0,
            "numDefenders": 5,
            "numMidfielders": 5,
            "numForwards": 3,
            "budget": 100.5,
        })
    );
}

#[test]
fn log_buffer_is_bounded() {
    let mut state = AppState::default();
    for i in 0..250 {
        state.push_log(format!("[INFO] line {i}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert!(state.logs.back().unwrap().ends_with("line 249"));
}

#[test]
fn submit_clears_error_whatever_the_policy() {
    let config = Config {
        predict_show_errors: false,
        ..Config::default()
    };
    let mut state = AppState::new(&config);
    state.predict.error = Some("stale message".to_string());
    let _pending = state.predict.begin_submit();
    assert!(state.predict.error.is_none());
}

#[test]
fn ready_result_keeps_the_counts_it_was_requested_with() {
    let mut state = AppState::default();
    state.switch_page(PageKind::Custom);
    let shape = SquadShape {
        goalkeepers: 1,
        defenders: 3,
        midfielders: 4,
        forwards: 2,
    };
    state.custom.request_shape = shape;
    let ticket = state.custom.begin_submit();
    assert_eq!(ticket.shape, shape);

    // Form changes after submitting do not affect the incoming result.
    state.custom.request_shape = STANDARD_SQUAD;
    apply_delta(&mut state, ready(ticket, json!("ok")));
    assert_eq!(state.custom.result_shape, shape);
}

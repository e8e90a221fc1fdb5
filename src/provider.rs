use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::error::PredictError;
use crate::predict_fetch::{Endpoint, PredictClient};
use crate::squad::STANDARD_SQUAD;
use crate::state::{
    AppState, CancelToken, Delta, PageKind, ProviderCommand, SubmitTicket, apply_delta,
};

/// Runs the request side of the UI. Every `Predict` command gets its own
/// thread so a slow response never holds up the next submit; the provider
/// exits once the command channel closes.
pub fn spawn_predict_provider(
    client: PredictClient,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let _ = tx.send(Delta::Log(format!(
            "[INFO] Prediction service: {}",
            client.base_url()
        )));

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Predict {
                    ticket,
                    endpoint,
                    input,
                    cancel,
                } => {
                    let client = client.clone();
                    let tx = tx.clone();
                    thread::spawn(move || {
                        run_predict(&client, &tx, ticket, endpoint, &input, &cancel);
                    });
                }
            }
        }
    })
}

pub fn run_predict(
    client: &PredictClient,
    tx: &Sender<Delta>,
    ticket: SubmitTicket,
    endpoint: Endpoint,
    input: &str,
    cancel: &CancelToken,
) {
    if cancel.is_cancelled() {
        return;
    }
    let outcome = client.predict(endpoint, input);
    // The page may have been disposed while the request was out.
    if cancel.is_cancelled() {
        return;
    }
    let delta = match outcome {
        Ok(result) => Delta::PredictionReady { ticket, result },
        Err(error) => Delta::PredictionFailed { ticket, error },
    };
    let _ = tx.send(delta);
}

/// Fires the visible page's input at its endpoint without waiting for the
/// outcome. Returns the ticket of the request that was sent.
pub fn submit_current_page(
    state: &mut AppState,
    cmd_tx: Option<&Sender<ProviderCommand>>,
) -> Option<SubmitTicket> {
    let Some(tx) = cmd_tx else {
        state.push_log("[INFO] Prediction service unavailable");
        return None;
    };

    let kind = state.screen;
    // `/api/predict` always ranks the standard squad; the custom endpoint
    // builds its lists with the form's counts.
    let shape = match kind {
        PageKind::Predict => STANDARD_SQUAD,
        PageKind::Custom => state.form.shape,
    };
    let page = state.current_page_mut();
    page.request_shape = shape;
    let ticket = page.begin_submit();
    let cmd = ProviderCommand::Predict {
        ticket,
        endpoint: kind.endpoint(),
        input: page.input.clone(),
        cancel: page.lifetime.cancel.clone(),
    };

    if tx.send(cmd).is_err() {
        apply_delta(
            state,
            Delta::PredictionFailed {
                ticket,
                error: PredictError::request("prediction provider stopped"),
            },
        );
        return None;
    }
    Some(ticket)
}

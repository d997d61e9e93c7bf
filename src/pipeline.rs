//! Kilonova filter pipeline.
//!
//! [`evaluate`] is pure: predicate, history extraction, rate measurement,
//! galactic position and message construction. [`dispatch`] then walks the
//! accepted candidates in batch order and posts their messages.

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    alerts::Alert,
    error::{FilterError, FilterResult},
    filters::kilonova,
    notify::{AmateurGate, DispatchError, DispatchReport, Dispatcher, NotificationMessage},
    photometry::{MagnitudeCorrection, RateMeasurement},
    sky::Galactic,
};

/// Name of the output flag column.
pub const FLAG_COLUMN: &str = "kn_candidate";

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// An alert that passed the predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Row of the alert in the batch.
    pub index: usize,
    pub object_id: String,
    pub galactic: Galactic,
    pub rate: Option<RateMeasurement>,
    /// Predicate passed and the source fades faster than the threshold.
    pub accepted: bool,
    /// Built for accepted candidates only.
    #[serde(skip)]
    pub message: Option<NotificationMessage>,
}

impl Candidate {
    /// Rate as recorded for the batch; 0 when it could not be measured.
    pub fn recorded_rate(&self) -> f64 {
        self.rate.map(|rate| rate.rate).unwrap_or(0.0)
    }
}

/// Result of the pure stage for one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Predicate output, aligned with the batch.
    pub predicate: Vec<bool>,
    /// Final output: predicate AND rate above threshold, aligned with the batch.
    pub flags: Vec<bool>,
    /// One record per predicate-passing row, in batch order.
    pub candidates: Vec<Candidate>,
}

impl Evaluation {
    pub fn accepted(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|candidate| candidate.accepted)
    }
}

#[instrument(skip_all, fields(rows = alerts.len()))]
pub fn evaluate<C>(alerts: &[Alert], correction: &C, portal_url: &str) -> FilterResult<Evaluation>
where
    C: MagnitudeCorrection + ?Sized,
{
    let predicate = kilonova::predicate(alerts);
    let mut flags = predicate.clone();

    let selected: Vec<usize> = predicate
        .iter()
        .enumerate()
        .filter_map(|(index, passed)| passed.then_some(index))
        .collect();
    if selected.is_empty() {
        debug!("no alert passed the kilonova predicate");
        return Ok(Evaluation {
            predicate,
            flags,
            candidates: Vec::new(),
        });
    }

    // Latitude is needed by the amateur gate, so it is computed for every survivor.
    let positions: Vec<Galactic> = selected
        .iter()
        .map(|&index| Galactic::from_equatorial(alerts[index].ra, alerts[index].dec))
        .collect();

    let mut candidates = Vec::with_capacity(selected.len());
    for (&index, galactic) in selected.iter().zip(positions) {
        let alert = &alerts[index];
        let rate = RateMeasurement::measure(alert, correction);
        let accepted = rate.map(|r| r.is_fast_fading()).unwrap_or(false);
        flags[index] = accepted;

        let message = match (&rate, accepted) {
            (Some(rate), true) => Some(NotificationMessage::kilonova(
                alert, rate, galactic, portal_url,
            )?),
            _ => None,
        };
        debug!(
            object_id = %alert.object_id,
            rate = rate.map(|r| r.rate).unwrap_or(0.0),
            accepted,
            "candidate measured"
        );
        candidates.push(Candidate {
            index,
            object_id: alert.object_id.clone(),
            galactic,
            rate,
            accepted,
            message,
        });
    }

    info!(
        candidates = candidates.len(),
        accepted = flags.iter().filter(|flag| **flag).count(),
        "kilonova batch evaluated"
    );
    Ok(Evaluation {
        predicate,
        flags,
        candidates,
    })
}

/// Post the messages of accepted candidates, one after another.
///
/// The first transport failure aborts the remaining candidates.
#[instrument(skip_all, fields(accepted = evaluation.accepted().count()))]
pub async fn dispatch(
    evaluation: &Evaluation,
    dispatcher: &Dispatcher,
) -> Result<Vec<DispatchReport>, DispatchError> {
    let mut reports = Vec::new();
    for candidate in evaluation.accepted() {
        let (Some(message), Some(rate)) = (&candidate.message, &candidate.rate) else {
            continue;
        };
        let gate = AmateurGate {
            galactic_latitude: candidate.galactic.b,
            magnitude: rate.mag,
        };
        reports.push(dispatcher.dispatch(&candidate.object_id, message, gate).await?);
    }
    Ok(reports)
}

/// Evaluate a batch and, when a dispatcher is given, notify accepted candidates.
pub async fn run<C>(
    alerts: &[Alert],
    correction: &C,
    portal_url: &str,
    dispatcher: Option<&Dispatcher>,
) -> Result<Evaluation, PipelineError>
where
    C: MagnitudeCorrection + ?Sized,
{
    let evaluation = evaluate(alerts, correction, portal_url)?;
    if let Some(dispatcher) = dispatcher {
        dispatch(&evaluation, dispatcher).await?;
    }
    Ok(evaluation)
}

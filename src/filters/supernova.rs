//! Supernova candidate predicate. Stateless; no history, no side effects.

use crate::{
    alerts::SnRow,
    filters::{and_assign, or, xmatch},
};

pub const MIN_SNN_SCORE: f64 = 0.5;
pub const MIN_DRB: f64 = 0.5;
pub const MIN_CLASSTAR: f64 = 0.4;
/// Days since first detection, inclusive.
pub const MAX_AGE_DAYS: f64 = 90.0;
/// `roid` value flagging a known minor planet.
pub const KNOWN_MINOR_PLANET: i64 = 3;

pub fn predicate(rows: &[SnRow]) -> Vec<bool> {
    let snn1: Vec<bool> = rows
        .iter()
        .map(|r| r.snn_snia_vs_nonia > MIN_SNN_SCORE)
        .collect();
    let snn2: Vec<bool> = rows.iter().map(|r| r.snn_sn_vs_all > MIN_SNN_SCORE).collect();
    let keep_cds: Vec<bool> = rows
        .iter()
        .map(|r| r.cdsxmatch.as_deref().is_some_and(xmatch::keep_for_supernova))
        .collect();
    let sn_history: Vec<bool> = rows
        .iter()
        .map(|r| r.jd - r.jdstarthist <= MAX_AGE_DAYS)
        .collect();
    let high_drb: Vec<bool> = rows.iter().map(|r| r.drb > MIN_DRB).collect();
    let high_classtar: Vec<bool> = rows.iter().map(|r| r.classtar > MIN_CLASSTAR).collect();
    let no_mpc: Vec<bool> = rows
        .iter()
        .map(|r| r.roid != Some(KNOWN_MINOR_PLANET))
        .collect();
    let no_first_det: Vec<bool> = rows
        .iter()
        .map(|r| r.ndethist.is_some_and(|n| n > 1))
        .collect();

    let mut mask = or(&snn1, &snn2);
    for condition in [
        &keep_cds,
        &sn_history,
        &high_drb,
        &high_classtar,
        &no_first_det,
        &no_mpc,
    ] {
        and_assign(&mut mask, condition);
    }
    mask
}

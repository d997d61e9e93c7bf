//! Kilonova candidate predicate.
//!
//! Cuts follow Andreoni et al. 2021 (arXiv:2104.06352): a real, point-like,
//! recently appeared source that is neither a known minor planet nor
//! associated with a stellar catalogue counterpart.

use tracing::debug;

use crate::{alerts::Alert, filters::and_assign, filters::xmatch};

pub const MIN_DRB: f64 = 0.9;
pub const MIN_CLASSTAR: f64 = 0.4;
/// Days since first detection, exclusive.
pub const MAX_AGE_DAYS: f64 = 14.0;
/// Prior detections, exclusive.
pub const MAX_DETECTIONS: i64 = 20;
/// Arcsec to the nearest known solar-system object.
pub const MIN_SSO_DISTANCE: f64 = 10.0;

/// Evaluate the predicate over a batch, one flag per alert, in input order.
pub fn predicate(alerts: &[Alert]) -> Vec<bool> {
    let high_drb: Vec<bool> = alerts.iter().map(|a| a.drb > MIN_DRB).collect();
    let high_classtar: Vec<bool> = alerts.iter().map(|a| a.classtar > MIN_CLASSTAR).collect();
    let new_detection: Vec<bool> = alerts
        .iter()
        .map(|a| {
            a.days_since_first_detection()
                .map(|age| age < MAX_AGE_DAYS)
                .unwrap_or(false)
        })
        .collect();
    let small_history: Vec<bool> = alerts
        .iter()
        .map(|a| a.ndethist.is_some_and(|n| n < MAX_DETECTIONS))
        .collect();
    let appeared: Vec<bool> = alerts
        .iter()
        .map(|a| {
            a.history
                .current()
                .map(|entry| entry.isdiffpos.is_positive())
                .unwrap_or(false)
        })
        .collect();
    let far_from_mpc: Vec<bool> = alerts
        .iter()
        .map(|a| a.ssdistnr > MIN_SSO_DISTANCE || a.ssdistnr < 0.0)
        .collect();
    let keep_cds: Vec<bool> = alerts
        .iter()
        .map(|a| a.cdsxmatch.as_deref().is_some_and(xmatch::keep_for_kilonova))
        .collect();

    let mut mask = high_drb;
    for condition in [
        &high_classtar,
        &new_detection,
        &small_history,
        &keep_cds,
        &appeared,
        &far_from_mpc,
    ] {
        and_assign(&mut mask, condition);
    }

    debug!(
        rows = alerts.len(),
        passed = mask.iter().filter(|flag| **flag).count(),
        "kilonova predicate evaluated"
    );
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{DiffSign, HistoryEntry, HistorySeries};

    fn alert() -> Alert {
        Alert {
            object_id: "ZTF21aaaaaaa".into(),
            rfscore: 0.1,
            snn_snia_vs_nonia: 0.2,
            snn_sn_vs_all: 0.3,
            drb: 0.95,
            classtar: 0.5,
            jdstarthist: 2459300.0,
            ndethist: Some(5),
            cdsxmatch: Some("Unknown".into()),
            ra: 10.0,
            dec: 10.0,
            ssdistnr: -999.0,
            history: HistorySeries::new(vec![HistoryEntry {
                jd: 2459305.0,
                fid: 1,
                magpsf: Some(19.0),
                sigmapsf: 0.1,
                magnr: 22.0,
                sigmagnr: 0.1,
                magzpsci: 26.0,
                isdiffpos: DiffSign::Positive,
            }]),
        }
    }

    #[test]
    fn baseline_alert_passes() {
        assert_eq!(predicate(&[alert()]), vec![true]);
    }

    #[test]
    fn each_cut_rejects_on_its_own() {
        let mut low_drb = alert();
        low_drb.drb = 0.9;
        let mut stellar = alert();
        stellar.classtar = 0.4;
        let mut old = alert();
        old.jdstarthist = 2459291.0;
        let mut many = alert();
        many.ndethist = Some(20);
        let mut near_sso = alert();
        near_sso.ssdistnr = 5.0;
        let mut star = alert();
        star.cdsxmatch = Some("Star".into());
        let mut negative = alert();
        negative.history = HistorySeries::new(
            negative
                .history
                .entries()
                .iter()
                .cloned()
                .map(|mut entry| {
                    entry.isdiffpos = DiffSign::Negative;
                    entry
                })
                .collect(),
        );
        let mut empty = alert();
        empty.history = HistorySeries::default();

        let batch = [low_drb, stellar, old, many, near_sso, star, negative, empty];
        assert_eq!(predicate(&batch), vec![false; batch.len()]);
    }

    #[test]
    fn far_sso_and_galaxy_host_pass() {
        let mut far = alert();
        far.ssdistnr = 12.0;
        far.cdsxmatch = Some("Seyfert_2".into());
        assert_eq!(predicate(&[far]), vec![true]);
    }

    #[test]
    fn null_inputs_reject_only_their_row() {
        let mut no_drb = alert();
        no_drb.drb = f64::NAN;
        let mut no_count = alert();
        no_count.ndethist = None;
        let mut no_sso = alert();
        no_sso.ssdistnr = f64::NAN;
        let mut no_xmatch = alert();
        no_xmatch.cdsxmatch = None;

        let batch = [alert(), no_drb, no_count, no_sso, no_xmatch];
        assert_eq!(predicate(&batch), vec![true, false, false, false, false]);
    }

    #[test]
    fn empty_batch_yields_empty_mask() {
        assert!(predicate(&[]).is_empty());
    }
}

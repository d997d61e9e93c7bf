//! Block-formatted notification payloads.

use serde::Serialize;

use crate::{
    alerts::Alert,
    error::FilterResult,
    photometry::{band_label, RateMeasurement},
    sky::{format_dec, format_ra, jd_to_iso, Galactic},
};

/// Sender name shown by the receiving channel.
pub const SENDER_NAME: &str = "Rate-based kilonova bot";
const TNS_SEARCH: &str = "https://www.wis-tns.org/search";

/// One markdown text field of a section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextField {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl TextField {
    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            kind: "mrkdwn".to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    #[serde(rename = "type")]
    pub kind: String,
    pub fields: Vec<TextField>,
}

impl Section {
    pub fn new(fields: Vec<TextField>) -> Self {
        Self {
            kind: "section".to_string(),
            fields,
        }
    }
}

/// JSON body posted to webhook endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationMessage {
    pub blocks: Vec<Section>,
    pub username: String,
}

impl NotificationMessage {
    /// Announce a fast-fading kilonova candidate.
    ///
    /// Fails only when the current epoch is not a representable date.
    pub fn kilonova(
        alert: &Alert,
        rate: &RateMeasurement,
        galactic: Galactic,
        portal_url: &str,
    ) -> FilterResult<Self> {
        let id = &alert.object_id;
        let portal = portal_url.trim_end_matches('/');

        let alert_text = format!("*New kilonova candidate:* <{portal}/{id}|{id}>");
        let time_text = format!(
            "*Time:*\n- {} UTC\n- Time since last detection: {:.1} days\n- Time since first detection: {:.1} days",
            jd_to_iso(rate.jd)?,
            rate.days_since_last,
            rate.days_since_first,
        );
        let score_text = format!(
            "*Scores:*\n- Early SN Ia: {:.2}\n- Ia SN vs non-Ia SN: {:.2}\n- SN Ia and Core-Collapse vs non-SN: {:.2}",
            alert.rfscore, alert.snn_snia_vs_nonia, alert.snn_sn_vs_all,
        );
        let radec_text = format!(
            "*RA/Dec:*\n- [hours, deg]: {} {}\n- [deg, deg]: {:.7} {:+.7}",
            format_ra(alert.ra),
            format_dec(alert.dec),
            alert.ra,
            alert.dec,
        );
        let measurement_text = format!(
            "*Measurement (band {}):*\n- Apparent magnitude: {:.2} ± {:.2}\n- Rate: ({:.2} ± {:.2}) mag/day",
            band_label(rate.fid),
            rate.mag,
            rate.mag_err,
            rate.rate,
            rate.rate_err,
        );
        let galactic_text = format!("*Galactic latitude:*\n- [deg]: {:.7}", galactic.b);
        // Debug formatting keeps a trailing `.0` on integral coordinates.
        let tns_text = format!(
            "*TNS:* <{TNS_SEARCH}?ra={:?}&decl={:?}&radius=5&coords_unit=arcsec|link>",
            alert.ra, alert.dec
        );

        Ok(Self {
            blocks: vec![
                Section::new(vec![TextField::markdown(alert_text)]),
                Section::new(vec![
                    TextField::markdown(time_text),
                    TextField::markdown(score_text),
                    TextField::markdown(radec_text),
                    TextField::markdown(measurement_text),
                    TextField::markdown(galactic_text),
                    TextField::markdown(tns_text),
                ]),
            ],
            username: SENDER_NAME.to_string(),
        })
    }
}

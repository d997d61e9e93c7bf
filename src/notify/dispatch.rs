//! Webhook delivery of candidate notifications.
//!
//! Every enabled primary endpoint receives each message. The amateur endpoint
//! only receives bright candidates away from the galactic plane, and only on
//! Fridays (UTC, evaluated when the message is sent). Requests are sent one at
//! a time with no retry and no timeout.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Datelike, Utc, Weekday};
use indexmap::IndexMap;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::notify::{message::NotificationMessage, DispatchError};

/// Channel name used for the amateur endpoint in reports and logs.
pub const AMATEUR_CHANNEL: &str = "amateur";

/// A webhook target that may be switched off by configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Endpoint {
    Enabled(String),
    #[default]
    Disabled,
}

impl Endpoint {
    /// Blank or absent settings disable the endpoint.
    pub fn from_setting(value: Option<String>) -> Self {
        match value {
            Some(url) if !url.trim().is_empty() => Self::Enabled(url.trim().to_string()),
            _ => Self::Disabled,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Enabled(url) => Some(url),
            Self::Disabled => None,
        }
    }
}

/// Named primary endpoints, in delivery order, plus the amateur endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoints {
    pub primary: IndexMap<String, Endpoint>,
    pub amateur: Endpoint,
}

/// Source of "now" for the weekday gate.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Why a channel did not receive a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    NotConfigured,
    GalacticPlane,
    TooFaint,
    NotFriday,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotConfigured => "endpoint is not configured",
            Self::GalacticPlane => "candidate lies within 20 deg of the galactic plane",
            Self::TooFaint => "candidate is fainter than magnitude 20",
            Self::NotFriday => "amateur notifications are only sent on Fridays",
        };
        f.write_str(text)
    }
}

/// Receives dispatch outcomes; the default implementation logs them.
pub trait DispatchObserver: Send + Sync {
    fn delivered(&self, channel: &str, object_id: &str, status: StatusCode);
    fn skipped(&self, channel: &str, object_id: &str, reason: SkipReason);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DispatchObserver for TracingObserver {
    fn delivered(&self, channel: &str, object_id: &str, status: StatusCode) {
        if status.is_success() {
            debug!(%channel, %object_id, %status, "notification delivered");
        } else {
            warn!(%channel, %object_id, %status, "endpoint answered with an error status");
        }
    }

    fn skipped(&self, channel: &str, object_id: &str, reason: SkipReason) {
        warn!(
            %channel,
            %object_id,
            %reason,
            "notification not sent for a candidate that passed the filter"
        );
    }
}

/// Per-channel outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Delivery {
    Sent { channel: String, status: u16 },
    Skipped { channel: String, reason: SkipReason },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub object_id: String,
    pub deliveries: Vec<Delivery>,
}

impl DispatchReport {
    pub fn sent_count(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|delivery| matches!(delivery, Delivery::Sent { .. }))
            .count()
    }
}

/// Conditions on the candidate itself for the amateur channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmateurGate {
    pub galactic_latitude: f64,
    pub magnitude: f64,
}

impl AmateurGate {
    pub const MIN_ABS_LATITUDE: f64 = 20.0;
    pub const MAX_MAGNITUDE: f64 = 20.0;

    /// First failing condition, if any.
    pub fn check(&self, now: DateTime<Utc>) -> Result<(), SkipReason> {
        if self.galactic_latitude.abs() <= Self::MIN_ABS_LATITUDE {
            return Err(SkipReason::GalacticPlane);
        }
        // Written so that a NaN magnitude fails the gate.
        if !(self.magnitude < Self::MAX_MAGNITUDE) {
            return Err(SkipReason::TooFaint);
        }
        if now.weekday() != Weekday::Fri {
            return Err(SkipReason::NotFriday);
        }
        Ok(())
    }
}

pub struct Dispatcher {
    client: Client,
    endpoints: Endpoints,
    clock: Box<dyn Clock>,
    observer: Arc<dyn DispatchObserver>,
}

impl Dispatcher {
    /// Dispatcher on the system clock, logging through `tracing`.
    pub fn new(endpoints: Endpoints) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .user_agent(concat!("kn-rate-filter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DispatchError::Client)?;
        Ok(Self {
            client,
            endpoints,
            clock: Box::new(SystemClock),
            observer: Arc::new(TracingObserver),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Send one candidate's message to every eligible channel.
    ///
    /// A transport failure aborts the remaining channels and is returned.
    pub async fn dispatch(
        &self,
        object_id: &str,
        message: &NotificationMessage,
        gate: AmateurGate,
    ) -> Result<DispatchReport, DispatchError> {
        let mut deliveries = Vec::with_capacity(self.endpoints.primary.len() + 1);

        for (channel, endpoint) in &self.endpoints.primary {
            let delivery = match endpoint.url() {
                Some(url) => self.post(channel, object_id, url, message).await?,
                None => self.skip(channel, object_id, SkipReason::NotConfigured),
            };
            deliveries.push(delivery);
        }

        let amateur = match self.endpoints.amateur.url() {
            None => self.skip(AMATEUR_CHANNEL, object_id, SkipReason::NotConfigured),
            Some(url) => match gate.check(self.clock.now()) {
                Ok(()) => self.post(AMATEUR_CHANNEL, object_id, url, message).await?,
                Err(reason) => self.skip(AMATEUR_CHANNEL, object_id, reason),
            },
        };
        deliveries.push(amateur);

        Ok(DispatchReport {
            object_id: object_id.to_string(),
            deliveries,
        })
    }

    async fn post(
        &self,
        channel: &str,
        object_id: &str,
        url: &str,
        message: &NotificationMessage,
    ) -> Result<Delivery, DispatchError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(message)
            .send()
            .await
            .map_err(|source| DispatchError::Transport {
                channel: channel.to_string(),
                source,
            })?;
        let status = response.status();
        self.observer.delivered(channel, object_id, status);
        Ok(Delivery::Sent {
            channel: channel.to_string(),
            status: status.as_u16(),
        })
    }

    fn skip(&self, channel: &str, object_id: &str, reason: SkipReason) -> Delivery {
        self.observer.skipped(channel, object_id, reason);
        Delivery::Skipped {
            channel: channel.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // 2024-03-15 was a Friday.
    fn friday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn thursday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, 23, 59, 59).unwrap()
    }

    #[test]
    fn blank_settings_disable_endpoints() {
        assert_eq!(Endpoint::from_setting(None), Endpoint::Disabled);
        assert_eq!(Endpoint::from_setting(Some("  ".into())), Endpoint::Disabled);
        assert_eq!(
            Endpoint::from_setting(Some(" https://hooks.test/a ".into())),
            Endpoint::Enabled("https://hooks.test/a".into())
        );
    }

    #[test]
    fn amateur_gate_checks_every_condition() {
        let gate = AmateurGate {
            galactic_latitude: -35.0,
            magnitude: 18.2,
        };
        assert_eq!(gate.check(friday()), Ok(()));
        assert_eq!(gate.check(thursday()), Err(SkipReason::NotFriday));

        let plane = AmateurGate {
            galactic_latitude: 20.0,
            ..gate
        };
        assert_eq!(plane.check(friday()), Err(SkipReason::GalacticPlane));

        let faint = AmateurGate {
            magnitude: 20.0,
            ..gate
        };
        assert_eq!(faint.check(friday()), Err(SkipReason::TooFaint));

        let unknown = AmateurGate {
            magnitude: f64::NAN,
            ..gate
        };
        assert_eq!(unknown.check(friday()), Err(SkipReason::TooFaint));
    }

    #[test]
    fn report_counts_sent_channels() {
        let report = DispatchReport {
            object_id: "ZTF".into(),
            deliveries: vec![
                Delivery::Sent {
                    channel: "internal".into(),
                    status: 200,
                },
                Delivery::Skipped {
                    channel: AMATEUR_CHANNEL.into(),
                    reason: SkipReason::NotFriday,
                },
            ],
        };
        assert_eq!(report.sent_count(), 1);
    }
}

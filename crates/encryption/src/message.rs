//! Envelope framing shared by signing and encryption.
//!
//! A payload is wrapped as
//!
//! ```text
//! {"message":<payload>,"purpose":"<purpose>","expiryDate":"2024-01-01T00:00:00.000Z"}
//! ```
//!
//! with `purpose` and `expiryDate` omitted when absent. Field order is fixed
//! and object payloads keep their insertion order, so the serialized bytes are
//! stable across implementations.

use std::str::FromStr;

use chrono::{DateTime, Datelike, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EncryptionError;

/// When a token stops being valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Valid for this long after the token is produced.
    In(TimeDelta),
    /// Valid until this instant.
    At(DateTime<Utc>),
}

impl Expiry {
    /// Parse a duration such as `"1h"`, `"30 mins"`, `"-1s"` or `"2.5d"`.
    /// A bare number is read as milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::InvalidExpiry`] if `input` does not match the
    /// duration grammar.
    pub fn parse(input: &str) -> Result<Self, EncryptionError> {
        parse_duration(input)
            .map(Expiry::In)
            .ok_or_else(|| EncryptionError::InvalidExpiry(input.to_owned()))
    }

    /// Resolve to an absolute deadline relative to `now`.
    pub fn deadline(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Expiry::In(delta) => now.checked_add_signed(*delta),
            Expiry::At(at) => Some(*at),
        }
    }
}

impl FromStr for Expiry {
    type Err = EncryptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expiry::parse(s)
    }
}

impl From<TimeDelta> for Expiry {
    fn from(delta: TimeDelta) -> Self {
        Expiry::In(delta)
    }
}

impl From<DateTime<Utc>> for Expiry {
    fn from(at: DateTime<Utc>) -> Self {
        Expiry::At(at)
    }
}

/// Milliseconds, as accepted by numeric expiries.
impl From<i64> for Expiry {
    fn from(millis: i64) -> Self {
        let delta = TimeDelta::try_milliseconds(millis).unwrap_or(if millis < 0 {
            TimeDelta::MIN
        } else {
            TimeDelta::MAX
        });
        Expiry::In(delta)
    }
}

fn parse_duration(input: &str) -> Option<TimeDelta> {
    let split = input
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);
    let number = number.trim_end_matches(' ');

    if !is_decimal(number) {
        return None;
    }
    let value: f64 = number.parse().ok()?;

    let unit_ms: f64 = match unit.to_ascii_lowercase().as_str() {
        "" | "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => 1_000.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60_000.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600_000.0,
        "d" | "day" | "days" => 86_400_000.0,
        "w" | "week" | "weeks" => 604_800_000.0,
        "y" | "yr" | "yrs" | "year" | "years" => 31_557_600_000.0,
        _ => return None,
    };

    let millis = value * unit_ms;
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64)
}

/// `-?\d*\.?\d+`: a digit must follow the decimal point.
fn is_decimal(number: &str) -> bool {
    let unsigned = number.strip_prefix('-').unwrap_or(number);
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    match unsigned.split_once('.') {
        Some((whole, fraction)) => {
            all_digits(whole) && !fraction.is_empty() && all_digits(fraction)
        }
        None => !unsigned.is_empty() && all_digits(unsigned),
    }
}

/// Per-call options for encrypting or signing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptOptions {
    /// Optional expiry, resolved to an absolute deadline at build time.
    pub expires_in: Option<Expiry>,
    /// Optional purpose that must match when decrypting.
    pub purpose: Option<String>,
}

impl EncryptOptions {
    /// Options with neither expiry nor purpose.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expiry.
    pub fn expires_in(mut self, expiry: impl Into<Expiry>) -> Self {
        self.expires_in = Some(expiry.into());
        self
    }

    /// Parse and set the expiry from a duration string.
    pub fn try_expires_in(mut self, expiry: &str) -> Result<Self, EncryptionError> {
        self.expires_in = Some(Expiry::parse(expiry)?);
        Ok(self)
    }

    /// Set the purpose.
    pub fn purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    /// The purpose, with an empty string treated as absent.
    pub fn purpose_str(&self) -> Option<&str> {
        normalize_purpose(self.purpose.as_deref())
    }
}

/// An empty purpose is the same as no purpose.
pub(crate) fn normalize_purpose(purpose: Option<&str>) -> Option<&str> {
    purpose.filter(|p| !p.is_empty())
}

/// Serialize any payload into the JSON value carried by an envelope.
pub(crate) fn to_payload<T: Serialize + ?Sized>(payload: &T) -> Result<Value, EncryptionError> {
    let value =
        serde_json::to_value(payload).map_err(|e| EncryptionError::InvalidPayload(e.to_string()))?;
    if value.is_null() {
        return Err(EncryptionError::InvalidPayload(
            "cannot sign a null value".into(),
        ));
    }
    Ok(value)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutgoingEnvelope<'a> {
    message: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    purpose: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiry_date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomingEnvelope {
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    purpose: Option<String>,
    #[serde(default)]
    expiry_date: Option<Value>,
}

/// Builds and verifies envelopes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageBuilder;

impl MessageBuilder {
    /// Serialize `message` with its optional purpose and expiry.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::InvalidPayload`] for a `null` message and
    /// [`EncryptionError::InvalidExpiry`] if the deadline overflows.
    pub fn build(
        message: &Value,
        expires_in: Option<&Expiry>,
        purpose: Option<&str>,
    ) -> Result<String, EncryptionError> {
        if message.is_null() {
            return Err(EncryptionError::InvalidPayload(
                "cannot sign a null value".into(),
            ));
        }

        let expiry_date = expires_in
            .map(|expiry| {
                expiry
                    .deadline(Utc::now())
                    .map(format_deadline)
                    .ok_or_else(|| EncryptionError::InvalidExpiry(format!("{expiry:?}")))
            })
            .transpose()?;

        let envelope = OutgoingEnvelope {
            message,
            purpose: normalize_purpose(purpose),
            expiry_date,
        };
        serde_json::to_string(&envelope).map_err(|e| EncryptionError::InvalidPayload(e.to_string()))
    }

    /// Parse an envelope and return its message if the purpose matches and
    /// the deadline (if any) has not passed.
    pub fn verify(raw: &[u8], purpose: Option<&str>) -> Option<Value> {
        let envelope: IncomingEnvelope = serde_json::from_slice(raw).ok()?;
        let message = envelope.message?;

        if normalize_purpose(envelope.purpose.as_deref()) != normalize_purpose(purpose) {
            return None;
        }

        if let Some(expiry_date) = envelope.expiry_date {
            // An unreadable deadline counts as expired.
            let deadline = parse_deadline(&expiry_date)?;
            if deadline < Utc::now() {
                return None;
            }
        }

        Some(message)
    }
}

/// ISO 8601 with millisecond precision. Years outside `0..=9999` use the
/// expanded `±YYYYYY` form.
fn format_deadline(at: DateTime<Utc>) -> String {
    let rest = at.format("%m-%dT%H:%M:%S%.3fZ");
    let year = at.year();
    if (0..=9999).contains(&year) {
        format!("{year:04}-{rest}")
    } else {
        let sign = if year < 0 { '-' } else { '+' };
        format!("{sign}{:06}-{rest}", year.unsigned_abs())
    }
}

fn parse_deadline(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let (negative, expanded) = match s.as_bytes().first()? {
        b'+' => (false, &s[1..]),
        b'-' => (true, &s[1..]),
        _ => {
            return DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|at| at.with_timezone(&Utc))
        }
    };

    let digits = expanded.get(..6)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = digits.parse().ok()?;
    // `-000000` is not a valid expanded year.
    if negative && year == 0 {
        return None;
    }
    let year = if negative { -year } else { year };

    // Parse the rest against a leap placeholder year, then move it.
    let rest = expanded.get(6..)?;
    DateTime::parse_from_rfc3339(&format!("2000{rest}"))
        .ok()?
        .with_year(year)
        .map(|at| at.with_timezone(&Utc))
}

//! Lifecycle classification of accreditation records.
//!
//! The classifier is a pure function of a record's `expires_on` date, its
//! optional manual override, and an explicit reference day. It performs no
//! I/O, holds no state, and never fails: malformed input degrades to "no
//! expiration pressure" rather than surfacing an error into a list view.
//!
//! Callers capture `today` once per evaluation batch (one API request, one
//! rendered frame) so every row in the same view is classified against the
//! same reference day, even if evaluation straddles midnight.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::AccreditationRecord;

/// Records expiring within this many days (day 0 inclusive) are `Expiring`.
pub const EXPIRING_WINDOW_DAYS: i64 = 30;

// ─── State ────────────────────────────────────────────────────────────────────

/// The standing of an accreditation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
  Current,
  Expiring,
  Expired,
  /// Only reachable through a manual override. "In renewal" reflects an
  /// administrative process the date arithmetic cannot infer.
  InRenewal,
}

impl LifecycleState {
  /// Position on the urgency scale. Date-computed states are totally
  /// ordered (`Current` < `Expiring` < `Expired`); `InRenewal` sits between
  /// `Expiring` and `Expired` for dashboard sorting.
  pub fn urgency(self) -> u8 {
    match self {
      Self::Current => 0,
      Self::Expiring => 1,
      Self::InRenewal => 2,
      Self::Expired => 3,
    }
  }

  /// Spanish display label used across the UI surfaces.
  pub fn label(self) -> &'static str {
    match self {
      Self::Current => "Vigente",
      Self::Expiring => "Por vencer",
      Self::Expired => "Vencido",
      Self::InRenewal => "En renovación",
    }
  }
}

// ─── Classifier ───────────────────────────────────────────────────────────────

/// Whole days from `today` until `expires_on`. Negative when already past.
///
/// Both sides are calendar dates, so the subtraction is exact whole days;
/// time-of-day and DST drift cannot produce an off-by-one.
pub fn days_until(expires_on: NaiveDate, today: NaiveDate) -> i64 {
  expires_on.signed_duration_since(today).num_days()
}

/// Classify a record's standing as of `today`.
///
/// A manual override short-circuits the date arithmetic entirely. Without
/// one, a missing `expires_on` means there is nothing to evaluate and the
/// record is `Current`.
pub fn classify(
  expires_on: Option<NaiveDate>,
  manual: Option<LifecycleState>,
  today: NaiveDate,
) -> LifecycleState {
  if let Some(state) = manual {
    return state;
  }
  let Some(expires_on) = expires_on else {
    return LifecycleState::Current;
  };
  let d = days_until(expires_on, today);
  if d < 0 {
    LifecycleState::Expired
  } else if d <= EXPIRING_WINDOW_DAYS {
    LifecycleState::Expiring
  } else {
    LifecycleState::Current
  }
}

/// Human-readable countdown for an expiry date, as of `today`.
///
/// Absent when there is no expiry or it is comfortably (> 30 days) in the
/// future. Always derived from the dates, never from an override.
pub fn countdown(expires_on: Option<NaiveDate>, today: NaiveDate) -> Option<String> {
  let d = days_until(expires_on?, today);
  if d < 0 {
    Some(format!("Vencido hace {} días", -d))
  } else if d == 0 {
    Some("Vence hoy".to_string())
  } else if d <= EXPIRING_WINDOW_DAYS {
    Some(format!("Vence en {d} días"))
  } else {
    None
  }
}

/// Leniently parse an ISO-8601 date or datetime, truncating any time
/// component to the calendar day. Unparsable input yields `None` — upstream
/// systems hand us raw strings and a bad value must read as "no expiry",
/// never crash a table render.
pub fn parse_vigency_date(raw: &str) -> Option<NaiveDate> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }
  // A datetime is a date followed by `T` or a space; the leading ten
  // characters are the calendar day either way.
  let date_part = trimmed
    .split_once(['T', ' '])
    .map(|(d, _)| d)
    .unwrap_or(trimmed);
  NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

// ─── Computed view ────────────────────────────────────────────────────────────

/// Everything a view needs to render a record's standing: the effective
/// state, the state the dates alone would give (so an overridden record can
/// still show its would-be status, tagged as manually modified), the day
/// count, and the countdown message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
  /// Effective state; equals `manual_state` when an override is set.
  pub state:      LifecycleState,
  /// The state the dates alone produce, override or not.
  pub computed:   LifecycleState,
  pub days_until: Option<i64>,
  pub message:    Option<String>,
  pub overridden: bool,
}

impl Classification {
  pub fn compute(
    expires_on: Option<NaiveDate>,
    manual: Option<LifecycleState>,
    today: NaiveDate,
  ) -> Self {
    Self {
      state:      classify(expires_on, manual, today),
      computed:   classify(expires_on, None, today),
      days_until: expires_on.map(|e| days_until(e, today)),
      message:    countdown(expires_on, today),
      overridden: manual.is_some(),
    }
  }
}

/// A record bundled with its classification as of a given day — the read
/// model returned by list and detail endpoints, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedRecord {
  pub record:         AccreditationRecord,
  pub classification: Classification,
}

impl ClassifiedRecord {
  pub fn new(record: AccreditationRecord, today: NaiveDate) -> Self {
    let classification =
      Classification::compute(record.expires_on, record.manual_state, today);
    Self { record, classification }
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  /// Reference day used by the scenario tests.
  fn today() -> NaiveDate { d(2024, 6, 15) }

  // ── Concrete scenarios ────────────────────────────────────────────────────

  #[test]
  fn expires_today_is_expiring_with_message() {
    assert_eq!(
      classify(Some(today()), None, today()),
      LifecycleState::Expiring
    );
    assert_eq!(
      countdown(Some(today()), today()).as_deref(),
      Some("Vence hoy")
    );
  }

  #[test]
  fn expired_45_days_ago() {
    let expires = d(2024, 5, 1);
    assert_eq!(classify(Some(expires), None, today()), LifecycleState::Expired);
    assert_eq!(
      countdown(Some(expires), today()).as_deref(),
      Some("Vencido hace 45 días")
    );
  }

  #[test]
  fn expiring_in_16_days() {
    let expires = d(2024, 7, 1);
    assert_eq!(classify(Some(expires), None, today()), LifecycleState::Expiring);
    assert_eq!(
      countdown(Some(expires), today()).as_deref(),
      Some("Vence en 16 días")
    );
  }

  #[test]
  fn far_future_is_current_with_no_message() {
    let expires = d(2024, 12, 1);
    assert_eq!(classify(Some(expires), None, today()), LifecycleState::Current);
    assert_eq!(countdown(Some(expires), today()), None);
  }

  #[test]
  fn override_makes_in_renewal_reachable() {
    assert_eq!(
      classify(None, Some(LifecycleState::InRenewal), today()),
      LifecycleState::InRenewal
    );
  }

  #[test]
  fn override_wins_over_expired_dates() {
    assert_eq!(
      classify(Some(d(2024, 5, 1)), Some(LifecycleState::Current), today()),
      LifecycleState::Current
    );
  }

  // ── Boundaries ────────────────────────────────────────────────────────────

  #[test]
  fn window_boundaries_are_inclusive_at_30() {
    let t = today();
    assert_eq!(
      classify(Some(t + chrono::Days::new(30)), None, t),
      LifecycleState::Expiring
    );
    assert_eq!(
      classify(Some(t + chrono::Days::new(31)), None, t),
      LifecycleState::Current
    );
    assert_eq!(
      classify(Some(t - chrono::Days::new(1)), None, t),
      LifecycleState::Expired
    );
    assert_eq!(
      classify(Some(t - chrono::Days::new(31)), None, t),
      LifecycleState::Expired
    );
  }

  #[test]
  fn null_expiry_is_current() {
    assert_eq!(classify(None, None, today()), LifecycleState::Current);
    assert_eq!(countdown(None, today()), None);
  }

  // ── Properties ────────────────────────────────────────────────────────────

  #[test]
  fn classification_is_monotonic_in_days_until() {
    // Walk expiry from 60 days past to 60 days out; urgency never rises.
    let t = today();
    let mut last = u8::MAX;
    for offset in -60i64..=60 {
      let expires = t + chrono::Duration::days(offset);
      let state = classify(Some(expires), None, t);
      assert!(
        state.urgency() <= last,
        "urgency regressed at offset {offset}"
      );
      last = state.urgency();
    }
  }

  #[test]
  fn override_supremacy_for_every_state() {
    let cases = [
      LifecycleState::Current,
      LifecycleState::Expiring,
      LifecycleState::Expired,
      LifecycleState::InRenewal,
    ];
    for state in cases {
      assert_eq!(classify(Some(d(2024, 5, 1)), Some(state), today()), state);
      assert_eq!(classify(None, Some(state), today()), state);
    }
  }

  #[test]
  fn expired_message_count_matches_abs_days() {
    let t = today();
    for n in 1i64..=90 {
      let expires = t - chrono::Days::new(n as u64);
      assert_eq!(days_until(expires, t), -n);
      assert_eq!(
        countdown(Some(expires), t),
        Some(format!("Vencido hace {n} días"))
      );
    }
  }

  // ── Lenient parsing ───────────────────────────────────────────────────────

  #[test]
  fn parses_plain_dates_and_datetimes() {
    assert_eq!(parse_vigency_date("2024-06-15"), Some(d(2024, 6, 15)));
    assert_eq!(
      parse_vigency_date("2024-06-15T23:59:59Z"),
      Some(d(2024, 6, 15))
    );
    assert_eq!(
      parse_vigency_date("2024-06-15 08:00:00"),
      Some(d(2024, 6, 15))
    );
    assert_eq!(parse_vigency_date("  2024-01-02  "), Some(d(2024, 1, 2)));
  }

  #[test]
  fn garbage_input_reads_as_no_expiry() {
    for raw in ["", "  ", "mañana", "15/06/2024", "2024-13-40"] {
      assert_eq!(parse_vigency_date(raw), None, "input {raw:?}");
      // End to end: the conservative default is Current, never a panic.
      assert_eq!(
        classify(parse_vigency_date(raw), None, today()),
        LifecycleState::Current
      );
    }
  }

  // ── Classification bundle ─────────────────────────────────────────────────

  #[test]
  fn overridden_record_keeps_date_based_message() {
    let c = Classification::compute(
      Some(d(2024, 5, 1)),
      Some(LifecycleState::InRenewal),
      today(),
    );
    assert_eq!(c.state, LifecycleState::InRenewal);
    assert_eq!(c.computed, LifecycleState::Expired);
    assert_eq!(c.days_until, Some(-45));
    assert_eq!(c.message.as_deref(), Some("Vencido hace 45 días"));
    assert!(c.overridden);
  }

  #[test]
  fn unoverridden_record_is_not_tagged() {
    let c = Classification::compute(Some(d(2024, 7, 1)), None, today());
    assert_eq!(c.state, c.computed);
    assert!(!c.overridden);
  }
}

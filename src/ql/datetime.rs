use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

/// A time instant value.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Datetime(pub DateTime<Utc>);

impl Default for Datetime {
	fn default() -> Self {
		Self(Utc::now())
	}
}

impl From<DateTime<Utc>> for Datetime {
	fn from(v: DateTime<Utc>) -> Self {
		Self(v)
	}
}

impl From<Datetime> for DateTime<Utc> {
	fn from(x: Datetime) -> Self {
		x.0
	}
}

impl Deref for Datetime {
	type Target = DateTime<Utc>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Datetime {
	/// Construct a datetime from fractional epoch seconds
	pub fn from_epoch(secs: f64) -> Self {
		let whole = secs.trunc() as i64;
		let nanos = (secs.fract() * 1_000_000_000.0) as u32;
		match Utc.timestamp_opt(whole, nanos) {
			chrono::LocalResult::Single(v) => Self(v),
			_ => Self(DateTime::<Utc>::MIN_UTC),
		}
	}
	/// Construct a datetime from a Windows FILETIME value
	pub fn from_winfiletime(ft: i64) -> Self {
		// FILETIME counts 100ns ticks since 1601-01-01
		const EPOCH_DIFFERENCE_SECS: i64 = 11_644_473_600;
		let secs = ft / 10_000_000 - EPOCH_DIFFERENCE_SECS;
		let nanos = ((ft % 10_000_000) * 100) as u32;
		match Utc.timestamp_opt(secs, nanos) {
			chrono::LocalResult::Single(v) => Self(v),
			_ => Self(DateTime::<Utc>::MIN_UTC),
		}
	}
	/// Convert the datetime to fractional epoch seconds
	pub fn to_epoch(&self) -> f64 {
		self.0.timestamp() as f64 + self.0.timestamp_subsec_nanos() as f64 / 1_000_000_000.0
	}
}

impl Display for Datetime {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "'{}'", self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn epoch_roundtrip() {
		let dt = Datetime::from_epoch(1_500_000_000.5);
		assert_eq!(dt.0.timestamp(), 1_500_000_000);
		assert!((dt.to_epoch() - 1_500_000_000.5).abs() < 1e-6);
	}

	#[test]
	fn winfiletime_conversion() {
		// 2009-07-25T23:00:00Z expressed as a FILETIME
		let dt = Datetime::from_winfiletime(128930364000000000);
		assert_eq!(dt.0.timestamp(), 1248562800);
	}
}

//! Catalog entities.
//!
//! These are the read-only inputs a request is built from: games, the streaming packages
//! that might cover them, the offers linking the two, and the caller's live/highlight
//! preferences. Nothing in this module mutates a catalog; the builder in [`crate::instance`]
//! copies what it needs into a [`crate::instance::ReducedInstance`].

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// A price, or any other amount, expressed in integer minor currency units (cents).
pub type Cents = i64;

/// Opaque identifier for a game, as supplied by the host catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameId(String);

impl GameId {
    /// Wrap a raw catalog id as a `GameId`.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for GameId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Opaque identifier for a streaming package, as supplied by the host catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(String);

impl PackageId {
    /// Wrap a raw catalog id as a `PackageId`.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PackageId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A sporting event with a start date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    /// Catalog id.
    pub id: GameId,

    /// Calendar date the game starts on (time-of-day is not part of this model; the host
    /// layer is responsible for collapsing a timestamp to a date before building a request).
    pub start_date: NaiveDate,
}

/// A purchasable streaming plan.
///
/// Either price may be absent: a `None` monthly price means the package is not sold monthly,
/// and analogously for the yearly price. A price of `Some(0)` is a legal, free package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Catalog id.
    pub id: PackageId,

    /// Display name.
    pub name: String,

    /// Monthly subscription price in cents, if the package is sold monthly.
    pub monthly_price_cents: Option<Cents>,

    /// Monthly price of a yearly subscription, in cents, if the package is sold yearly.
    ///
    /// The full-year price is `12 *` this value; see [`crate::instance`].
    pub monthly_price_yearly_subscription_in_cents: Option<Cents>,
}

/// A (game, package) row describing whether the package streams that game live and/or as
/// highlights.
///
/// Multiple offers from distinct packages for the same game are expected and normal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    /// The game this offer covers.
    pub game_id: GameId,

    /// The package making the offer.
    pub streaming_package_id: PackageId,

    /// Whether the package streams this game live.
    pub live: bool,

    /// Whether the package streams this game as highlights.
    pub highlights: bool,
}

/// Errors constructing a [`Preferences`] value.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum PreferencesError {
    /// A weight was negative; weights are fractions in `[0, inf)`.
    #[error("preference weight must be non-negative, got {0}")]
    NegativeWeight(f64),
}

/// The caller's live/highlight coverage preferences for a request.
///
/// Weights are fractions: `0` is a no-op, values in `(0, 1)` put the corresponding property
/// into soft (price-penalty) mode, and values `>= 1` put it into hard (filtering) mode. See
/// [`crate::preference`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preferences {
    /// Live-coverage preference weight.
    pub live_weight: f64,

    /// Highlight-coverage preference weight.
    pub highlight_weight: f64,
}

impl Preferences {
    /// Build a `Preferences` value, rejecting negative weights.
    ///
    /// # Errors
    ///
    /// Returns [`PreferencesError::NegativeWeight`] if either weight is negative.
    pub fn new(live_weight: f64, highlight_weight: f64) -> Result<Self, PreferencesError> {
        if live_weight < 0.0 {
            return Err(PreferencesError::NegativeWeight(live_weight));
        }

        if highlight_weight < 0.0 {
            return Err(PreferencesError::NegativeWeight(highlight_weight));
        }

        Ok(Self {
            live_weight,
            highlight_weight,
        })
    }

    /// No preference on either axis.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            live_weight: 0.0,
            highlight_weight: 0.0,
        }
    }
}

/// How a preference weight applies to an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PreferenceMode {
    /// `w == 0`: no-op.
    None,

    /// `0 < w < 1`: inflate the price of packages lacking the property.
    Soft,

    /// `w >= 1`: drop offers lacking the property.
    Hard,
}

impl PreferenceMode {
    pub(crate) fn for_weight(weight: f64) -> Self {
        if weight >= 1.0 {
            Self::Hard
        } else if weight > 0.0 {
            Self::Soft
        } else {
            Self::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_id_displays_as_raw_string() {
        let id = GameId::new("g-1");

        assert_eq!(id.to_string(), "g-1");
        assert_eq!(id.as_str(), "g-1");
    }

    #[test]
    fn preferences_rejects_negative_weight() {
        assert_eq!(
            Preferences::new(-0.1, 0.0),
            Err(PreferencesError::NegativeWeight(-0.1))
        );
        assert_eq!(
            Preferences::new(0.0, -1.0),
            Err(PreferencesError::NegativeWeight(-1.0))
        );
    }

    #[test]
    fn preferences_none_is_a_no_op_on_both_axes() {
        let prefs = Preferences::none();

        assert_eq!(PreferenceMode::for_weight(prefs.live_weight), PreferenceMode::None);
        assert_eq!(
            PreferenceMode::for_weight(prefs.highlight_weight),
            PreferenceMode::None
        );
    }

    #[test]
    fn preference_mode_thresholds() {
        assert_eq!(PreferenceMode::for_weight(0.0), PreferenceMode::None);
        assert_eq!(PreferenceMode::for_weight(0.5), PreferenceMode::Soft);
        assert_eq!(PreferenceMode::for_weight(0.999), PreferenceMode::Soft);
        assert_eq!(PreferenceMode::for_weight(1.0), PreferenceMode::Hard);
        assert_eq!(PreferenceMode::for_weight(2.0), PreferenceMode::Hard);
    }
}

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The twelve Western tropical sun signs used as a member's `energy_type`.
///
/// Each sign owns an inclusive `(month, day)` range. Capricorn is the only
/// range that wraps the year boundary (December 22 through January 19).
/// Together the ranges cover every calendar day, February 29 included,
/// exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// Resolves the sign for a birth date. Only month and day matter.
    pub fn for_date(date: NaiveDate) -> Self {
        Self::for_month_day(date.month(), date.day())
    }

    /// Resolves the sign for a `(month, day)` pair.
    ///
    /// Pisces is the fall-through, so out-of-range input never panics.
    pub fn for_month_day(month: u32, day: u32) -> Self {
        Self::ALL
            .into_iter()
            .find(|sign| sign.contains(month, day))
            .unwrap_or(ZodiacSign::Pisces)
    }

    /// Inclusive `((start_month, start_day), (end_month, end_day))` range.
    pub const fn range(self) -> ((u32, u32), (u32, u32)) {
        match self {
            ZodiacSign::Aries => ((3, 21), (4, 19)),
            ZodiacSign::Taurus => ((4, 20), (5, 20)),
            ZodiacSign::Gemini => ((5, 21), (6, 20)),
            ZodiacSign::Cancer => ((6, 21), (7, 22)),
            ZodiacSign::Leo => ((7, 23), (8, 22)),
            ZodiacSign::Virgo => ((8, 23), (9, 22)),
            ZodiacSign::Libra => ((9, 23), (10, 22)),
            ZodiacSign::Scorpio => ((10, 23), (11, 21)),
            ZodiacSign::Sagittarius => ((11, 22), (12, 21)),
            ZodiacSign::Capricorn => ((12, 22), (1, 19)),
            ZodiacSign::Aquarius => ((1, 20), (2, 18)),
            ZodiacSign::Pisces => ((2, 19), (3, 20)),
        }
    }

    pub fn contains(self, month: u32, day: u32) -> bool {
        let (start, end) = self.range();
        let point = (month, day);
        if start <= end {
            start <= point && point <= end
        } else {
            // wraps the new year
            point >= start || point <= end
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }

    /// The descriptive note stored next to the derived sign.
    pub fn auto_notes(self) -> String {
        format!("Auto-generated based on {}", self.label())
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ZodiacSign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sign| sign.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown energy type: {}", s))
    }
}

/// Stored energy record, one per member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyMap {
    pub id: i64,
    pub member_id: i64,
    pub energy_type: ZodiacSign,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

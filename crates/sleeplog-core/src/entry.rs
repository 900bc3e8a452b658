//! Nightly sleep diary records.
//!
//! [`NightlyEntry`] uses the camelCase field names of the diary's JSON
//! export so that exported files round-trip without loss. Deserialization
//! is the ingestion boundary: numeric fields are coerced with a single
//! "parse or zero" policy (see [`lenient`]), and the two legacy field
//! shapes (`alcohol` as an object, `meds` as a string) are migrated into
//! their array form once, here, so the rest of the crate only ever sees
//! the normalized shape.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Sleep quality assumed when none was recorded (1-5 scale).
pub const DEFAULT_SLEEP_QUALITY: u8 = 3;
/// Energy level assumed when none was recorded (1-10 scale).
pub const DEFAULT_ENERGY_LEVEL: u8 = 5;
/// Mood assumed when none was recorded (1-5 scale).
pub const DEFAULT_MOOD: u8 = 3;

/// Clock time a migrated legacy alcohol record is placed at.
pub const LEGACY_ALCOHOL_TIME: &str = "21:00";
/// Clock time a migrated legacy medication note is placed at.
pub const LEGACY_MEDS_TIME: &str = "22:00";
/// Drink type given to migrated legacy alcohol records.
pub const LEGACY_ALCOHOL_KIND: &str = "Other";

/// A waking episode during the sleep period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Awakening {
    #[serde(default, deserialize_with = "lenient::text")]
    pub time: String,
    /// Minutes awake
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub duration: u32,
    #[serde(default)]
    pub got_out_of_bed: bool,
    #[serde(default, deserialize_with = "lenient::text")]
    pub activity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nap {
    #[serde(default, deserialize_with = "lenient::text")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub duration: u32,
    #[serde(default)]
    pub intentional: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaffeineIntake {
    #[serde(default, deserialize_with = "lenient::text")]
    pub time: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicalActivity {
    #[serde(default, deserialize_with = "lenient::text")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub duration: u32,
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlcoholIntake {
    #[serde(default, deserialize_with = "lenient::text")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub units: u32,
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    #[serde(default, deserialize_with = "lenient::text")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
}

/// Relaxation practice before bed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relaxation {
    #[serde(default)]
    pub used: bool,
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub duration: u32,
}

/// One night of the sleep diary.
///
/// The four clock fields are `HH:MM` wall-clock readings; ordering between
/// them is only meaningful as offsets from `time_in_bed` (see
/// [`crate::validation`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NightlyEntry {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    /// Calendar date, `YYYY-MM-DD`
    #[serde(deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default)]
    pub is_day_off: bool,
    #[serde(default, deserialize_with = "lenient::text")]
    pub time_in_bed: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub lights_out: String,
    /// Sleep onset latency in minutes
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub sol: u32,
    #[serde(default, deserialize_with = "lenient::list")]
    pub awakenings: Vec<Awakening>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub final_wake_time: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub time_out_of_bed: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub naps: Vec<Nap>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub caffeine: Vec<CaffeineIntake>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub physical_activity: Vec<PhysicalActivity>,
    #[serde(default, deserialize_with = "deserialize_alcohol")]
    pub alcohol: Vec<AlcoholIntake>,
    #[serde(default, deserialize_with = "deserialize_meds")]
    pub meds: Vec<Medication>,
    /// Screen time before bed, minutes
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub screen_time: u32,
    #[serde(default, deserialize_with = "lenient::relaxation")]
    pub relaxation: Relaxation,
    #[serde(
        default = "default_sleep_quality",
        deserialize_with = "lenient::rating"
    )]
    pub sleep_quality: u8,
    #[serde(
        default = "default_energy_level",
        deserialize_with = "lenient::rating"
    )]
    pub energy_level: u8,
    #[serde(default = "default_mood", deserialize_with = "lenient::rating")]
    pub mood: u8,
    #[serde(default, deserialize_with = "lenient::text")]
    pub notes: String,
    /// Fields this version does not know about, kept for lossless export.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_sleep_quality() -> u8 {
    DEFAULT_SLEEP_QUALITY
}
fn default_energy_level() -> u8 {
    DEFAULT_ENERGY_LEVEL
}
fn default_mood() -> u8 {
    DEFAULT_MOOD
}

impl NightlyEntry {
    /// Create an entry with the four clock readings and no events.
    pub fn new(
        id: impl Into<String>,
        date: impl Into<String>,
        time_in_bed: impl Into<String>,
        lights_out: impl Into<String>,
        final_wake_time: impl Into<String>,
        time_out_of_bed: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            is_day_off: false,
            time_in_bed: time_in_bed.into(),
            lights_out: lights_out.into(),
            sol: 0,
            awakenings: Vec::new(),
            final_wake_time: final_wake_time.into(),
            time_out_of_bed: time_out_of_bed.into(),
            naps: Vec::new(),
            caffeine: Vec::new(),
            physical_activity: Vec::new(),
            alcohol: Vec::new(),
            meds: Vec::new(),
            screen_time: 0,
            relaxation: Relaxation::default(),
            sleep_quality: DEFAULT_SLEEP_QUALITY,
            energy_level: DEFAULT_ENERGY_LEVEL,
            mood: DEFAULT_MOOD,
            notes: String::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Parsed calendar date, if `date` is a valid `YYYY-MM-DD`.
    pub fn night_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }

    /// Sleep quality, falling back to the default when unrecorded (0).
    pub fn quality_or_default(&self) -> u8 {
        if self.sleep_quality == 0 {
            DEFAULT_SLEEP_QUALITY
        } else {
            self.sleep_quality
        }
    }

    /// Energy level, falling back to the default when unrecorded (0).
    pub fn energy_or_default(&self) -> u8 {
        if self.energy_level == 0 {
            DEFAULT_ENERGY_LEVEL
        } else {
            self.energy_level
        }
    }
}

/// Return the entries sorted by date ascending.
///
/// Entries with an unparseable date go first, ordered by their raw text.
/// The sort is stable, so nights sharing a date keep their input order.
pub fn sorted_by_date(entries: &[NightlyEntry]) -> Vec<&NightlyEntry> {
    let mut sorted: Vec<&NightlyEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        (a.night_date(), a.date.as_str()).cmp(&(b.night_date(), b.date.as_str()))
    });
    sorted
}

/// `alcohol` as it appears in stored records of any age.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AlcoholRecord {
    /// Current shape: one record per drink occasion
    Intakes(Vec<AlcoholIntake>),
    /// Older shape: a single checkbox with a unit count
    Legacy {
        #[serde(default)]
        used: bool,
        #[serde(default, deserialize_with = "lenient::minutes")]
        units: u32,
    },
}

impl AlcoholRecord {
    /// Normalize into the current array shape.
    pub fn into_intakes(self) -> Vec<AlcoholIntake> {
        match self {
            Self::Intakes(intakes) => intakes,
            Self::Legacy { used: true, units } => vec![AlcoholIntake {
                time: LEGACY_ALCOHOL_TIME.to_string(),
                units,
                kind: LEGACY_ALCOHOL_KIND.to_string(),
            }],
            Self::Legacy { used: false, .. } => Vec::new(),
        }
    }
}

/// `meds` as it appears in stored records of any age.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MedsRecord {
    Entries(Vec<Medication>),
    /// Older shape: free-text note
    Note(String),
}

impl MedsRecord {
    /// Normalize into the current array shape.
    pub fn into_medications(self) -> Vec<Medication> {
        match self {
            Self::Entries(meds) => meds,
            Self::Note(note) if note.trim().is_empty() => Vec::new(),
            Self::Note(note) => vec![Medication {
                time: LEGACY_MEDS_TIME.to_string(),
                name: note,
            }],
        }
    }
}

fn deserialize_alcohol<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<AlcoholIntake>, D::Error> {
    let record = Option::<AlcoholRecord>::deserialize(d)?;
    Ok(record.map(AlcoholRecord::into_intakes).unwrap_or_default())
}

fn deserialize_meds<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Medication>, D::Error> {
    let record = Option::<MedsRecord>::deserialize(d)?;
    Ok(record.map(MedsRecord::into_medications).unwrap_or_default())
}

/// Parse-or-default coercion for loosely typed diary fields.
///
/// Policy: a value that cannot be read as intended becomes the type's zero
/// value (`0`, `""`, empty list). Numbers given as strings are read the way
/// a form would submit them: leading integer digits count, the rest is
/// ignored, and negative values clamp to zero.
pub mod lenient {
    use serde::de::{self, Deserialize, Deserializer, Visitor};
    use std::fmt;

    use super::Relaxation;

    /// Leading integer of `s` (after whitespace and an optional sign), or 0.
    pub fn parse_int_prefix(s: &str) -> i64 {
        let s = s.trim_start();
        let (negative, digits) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        let value = digits[..end].parse::<i64>().unwrap_or(0);
        if negative {
            -value
        } else {
            value
        }
    }

    struct MinutesVisitor;

    impl<'de> Visitor<'de> for MinutesVisitor {
        type Value = u32;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative number, a numeric string, or null")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u32, E> {
            Ok(u32::try_from(v).unwrap_or(u32::MAX))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u32, E> {
            Ok(u32::try_from(v.max(0)).unwrap_or(u32::MAX))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u32, E> {
            if v.is_finite() && v > 0.0 {
                Ok(v.trunc().min(f64::from(u32::MAX)) as u32)
            } else {
                Ok(0)
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u32, E> {
            self.visit_i64(parse_int_prefix(v))
        }

        fn visit_bool<E: de::Error>(self, _v: bool) -> Result<u32, E> {
            Ok(0)
        }

        fn visit_unit<E: de::Error>(self) -> Result<u32, E> {
            Ok(0)
        }

        fn visit_none<E: de::Error>(self) -> Result<u32, E> {
            Ok(0)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<u32, D::Error> {
            d.deserialize_any(self)
        }
    }

    /// Minutes (or any non-negative count); garbage becomes 0.
    pub fn minutes<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        d.deserialize_any(MinutesVisitor)
    }

    /// Small-integer rating; garbage becomes 0, which readers treat as unrecorded.
    pub fn rating<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
        let value = d.deserialize_any(MinutesVisitor)?;
        Ok(u8::try_from(value).unwrap_or(u8::MAX))
    }

    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string, a number, or null")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<String, D::Error> {
            d.deserialize_any(self)
        }
    }

    /// Text field; numbers are stringified, null becomes empty.
    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        d.deserialize_any(TextVisitor)
    }

    /// List field; null becomes empty.
    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
    }

    /// Relaxation block; null becomes "not used".
    pub fn relaxation<'de, D: Deserializer<'de>>(d: D) -> Result<Relaxation, D::Error> {
        Ok(Option::<Relaxation>::deserialize(d)?.unwrap_or_default())
    }
}

//! Fixed clinical risk rubric.
//!
//! Three dimensions are scored independently and summed:
//!
//! | Dimension      | Bands                                                   |
//! |----------------|---------------------------------------------------------|
//! | Blood pressure | max of systolic (1..=4) and diastolic (1, 3 or 4) stage |
//! | Temperature    | <=99.5 → 0, <=100.9 → 1, above → 2                      |
//! | Age            | >65 → 2, otherwise 1                                    |
//!
//! The diastolic scale has no stage 2: readings below 80 score 1 and 80-89
//! jump straight to 3. This mirrors the external rubric and is intentional.
//!
//! A dimension that cannot be parsed scores 0 and flags the record as a
//! data-quality issue; the other dimensions still count.

use serde_json::Value;

use crate::coerce::{coerce_float, coerce_integer, Coerced};
use crate::domain::{RawPatientRecord, ScoreResult};

/// Lowest temperature (°F) reported as fever.
pub const FEVER_THRESHOLD_F: f64 = 99.6;

/// Score one record. Total, pure and deterministic.
pub fn score(record: &RawPatientRecord) -> ScoreResult {
    let bp = blood_pressure_stage(&record.blood_pressure);
    let temperature = coerce_float(&record.temperature);
    let age = age_stage(&record.age);

    let temp_stage = temperature.ok().map_or(0, temperature_stage);
    let has_fever = temperature
        .ok()
        .is_some_and(|t| t >= FEVER_THRESHOLD_F);

    let bp_stage = bp.ok().unwrap_or(0);
    let age_stage = age.ok().unwrap_or(0);

    ScoreResult {
        bp_stage,
        temp_stage,
        age_stage,
        total_score: bp_stage + temp_stage + age_stage,
        is_data_quality_issue: !(bp.is_parsed() && temperature.is_parsed() && age.is_parsed()),
        has_fever,
    }
}

/// Stage a `"SYSTOLIC/DIASTOLIC"` reading.
///
/// Anything other than exactly two integer parts is unparseable; each part
/// may carry surrounding whitespace.
pub fn blood_pressure_stage(value: &Value) -> Coerced<u32> {
    let Some(reading) = value.as_str() else {
        return Coerced::Unparseable;
    };

    let parts: Vec<&str> = reading.split('/').collect();
    let [systolic, diastolic] = parts.as_slice() else {
        return Coerced::Unparseable;
    };

    match (
        systolic.trim().parse::<i64>(),
        diastolic.trim().parse::<i64>(),
    ) {
        (Ok(sys), Ok(dia)) => Coerced::Parsed(systolic_stage(sys).max(diastolic_stage(dia))),
        _ => Coerced::Unparseable,
    }
}

fn systolic_stage(systolic: i64) -> u32 {
    match systolic {
        s if s < 120 => 1,
        120..=129 => 2,
        130..=139 => 3,
        _ => 4,
    }
}

fn diastolic_stage(diastolic: i64) -> u32 {
    match diastolic {
        d if d < 80 => 1,
        80..=89 => 3,
        _ => 4,
    }
}

/// Stage a temperature that has already been coerced.
pub fn temperature_stage(fahrenheit: f64) -> u32 {
    if fahrenheit <= 99.5 {
        0
    } else if fahrenheit <= 100.9 {
        1
    } else {
        2
    }
}

/// Stage an age field. Every parseable age scores at least 1.
pub fn age_stage(value: &Value) -> Coerced<u32> {
    match coerce_integer(value) {
        Coerced::Parsed(age) if age > 65 => Coerced::Parsed(2),
        Coerced::Parsed(_) => Coerced::Parsed(1),
        Coerced::Unparseable => Coerced::Unparseable,
    }
}

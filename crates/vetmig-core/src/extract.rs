//! Vital-sign extraction from free-text clinical notes.
//!
//! Notes are scanned with an ordered rule list per quantity: labelled
//! forms first (`peso: 4.5 kg`, `t: 38.2`), then bare unit forms
//! (`4.5 kg`, `101.5 f`). Within a rule, occurrences are visited in
//! reading order and the first candidate inside the plausibility range
//! wins; out-of-range candidates are skipped and the scan continues.
//! Values are normalized to canonical units (kg, °C, bpm, rpm).

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;
use vetmig_model::ExtractedVitals;

const LB_TO_KG: f64 = 0.453_592_37;
const G_TO_KG: f64 = 0.001;

/// Plausible weight for a companion animal, in kilograms.
const WEIGHT_RANGE_KG: (f64, f64) = (0.1, 100.0);
/// Plausible body temperature, in degrees Celsius.
const TEMPERATURE_RANGE_C: (f64, f64) = (35.0, 45.0);
/// Plausible heart rate, in beats per minute.
const HEART_RATE_RANGE_BPM: (u32, u32) = (40, 250);
/// Plausible respiratory rate, in breaths per minute.
const RESPIRATORY_RANGE_RPM: (u32, u32) = (10, 60);

static WEIGHT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:peso|weight|w|p)\s*:\s*(\d+(?:[.,]\d+)?)\s*(kilos?|kg|lbs?|libras?|gramos?|gr|g)?\b")
        .unwrap_or_else(|error| panic!("invalid weight label pattern: {error}"))
});

static WEIGHT_UNIT_RULES: LazyLock<Vec<(Regex, f64)>> = LazyLock::new(|| {
    [
        (r"(\d+(?:[.,]\d+)?)\s*(?:kilos?|kg)\b", 1.0),
        (r"(\d+(?:[.,]\d+)?)\s*(?:lbs?|libras?)\b", LB_TO_KG),
        (r"(\d+(?:[.,]\d+)?)\s*(?:gramos?|gr|g)\b", G_TO_KG),
    ]
    .into_iter()
    .map(|(pattern, factor)| {
        let regex = Regex::new(pattern)
            .unwrap_or_else(|error| panic!("invalid weight unit pattern: {error}"));
        (regex, factor)
    })
    .collect()
});

/// Bare `peso 15.5` without a colon; only trusted in short notes where
/// the number cannot belong to another phrase.
static WEIGHT_SHORT_NOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bpeso\s+(\d+(?:[.,]\d+)?)\b")
        .unwrap_or_else(|error| panic!("invalid short-note weight pattern: {error}"))
});

static TEMPERATURE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:temperatura|temperature|temp|tc|t)\s*:\s*(\d+(?:[.,]\d+)?)\s*°?\s*([cf])?\b")
        .unwrap_or_else(|error| panic!("invalid temperature label pattern: {error}"))
});

static TEMPERATURE_UNIT_RULES: LazyLock<Vec<(Regex, TemperatureUnit)>> = LazyLock::new(|| {
    [
        (
            r"(\d+(?:[.,]\d+)?)\s*°?\s*(?:celsius|c)\b",
            TemperatureUnit::Celsius,
        ),
        (
            r"(\d+(?:[.,]\d+)?)\s*°?\s*(?:fahrenheit|f)\b",
            TemperatureUnit::Fahrenheit,
        ),
        (
            r"(\d+(?:[.,]\d+)?)\s*(?:grados?|degrees?)\b",
            TemperatureUnit::Celsius,
        ),
    ]
    .into_iter()
    .map(|(pattern, unit)| {
        let regex = Regex::new(pattern)
            .unwrap_or_else(|error| panic!("invalid temperature pattern: {error}"));
        (regex, unit)
    })
    .collect()
});

static HEART_RATE_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(?:frecuencia\s+card[ií]aca|fc|pulso)\s*:?\s*(\d+)\b",
        r"(\d+)\s*(?:lpm|bpm)\b",
    ]
    .into_iter()
    .map(|pattern| {
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("invalid heart rate pattern: {error}"))
    })
    .collect()
});

static RESPIRATORY_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(?:frecuencia\s+respiratoria|fr|respiraci[oó]n)\s*:?\s*(\d+)\b",
        r"(\d+)\s*rpm\b",
    ]
    .into_iter()
    .map(|pattern| {
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("invalid respiratory pattern: {error}"))
    })
    .collect()
});

#[derive(Clone, Copy)]
enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    fn to_celsius(self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => value,
            TemperatureUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        }
    }
}

/// Scans a note for vital signs. Matching is case-insensitive; absent
/// quantities stay `None`.
pub fn extract_vitals(text: &str) -> ExtractedVitals {
    let lowered = text.to_lowercase();
    let vitals = ExtractedVitals {
        weight_kg: extract_weight_kg(&lowered),
        temperature_c: extract_temperature_c(&lowered),
        heart_rate_bpm: extract_heart_rate(&lowered),
        respiratory_rate_rpm: extract_respiratory_rate(&lowered),
    };
    if !vitals.is_empty() {
        trace!(
            weight_kg = ?vitals.weight_kg,
            temperature_c = ?vitals.temperature_c,
            heart_rate_bpm = ?vitals.heart_rate_bpm,
            respiratory_rate_rpm = ?vitals.respiratory_rate_rpm,
            "vitals extracted"
        );
    }
    vitals
}

fn extract_weight_kg(text: &str) -> Option<f64> {
    for captures in WEIGHT_LABEL.captures_iter(text) {
        let value = parse_number(captures.get(1)?.as_str())?;
        let factor = captures
            .get(2)
            .map(|unit| weight_unit_factor(unit.as_str()))
            .unwrap_or(1.0);
        let kg = value * factor;
        if in_range(kg, WEIGHT_RANGE_KG) {
            return Some(kg);
        }
    }
    for (regex, factor) in WEIGHT_UNIT_RULES.iter() {
        for captures in regex.captures_iter(text) {
            let value = parse_number(captures.get(1)?.as_str())?;
            let kg = value * factor;
            if in_range(kg, WEIGHT_RANGE_KG) {
                return Some(kg);
            }
        }
    }
    if text.split_whitespace().count() <= 10 {
        for captures in WEIGHT_SHORT_NOTE.captures_iter(text) {
            let kg = parse_number(captures.get(1)?.as_str())?;
            if in_range(kg, WEIGHT_RANGE_KG) {
                return Some(kg);
            }
        }
    }
    None
}

fn weight_unit_factor(unit: &str) -> f64 {
    if unit.starts_with("lb") || unit.starts_with("libra") {
        LB_TO_KG
    } else if unit == "g" || unit == "gr" || unit.starts_with("gramo") {
        G_TO_KG
    } else {
        1.0
    }
}

fn extract_temperature_c(text: &str) -> Option<f64> {
    for captures in TEMPERATURE_LABEL.captures_iter(text) {
        let value = parse_number(captures.get(1)?.as_str())?;
        let unit = match captures.get(2) {
            Some(mark) if mark.as_str() == "f" => TemperatureUnit::Fahrenheit,
            _ => TemperatureUnit::Celsius,
        };
        let celsius = unit.to_celsius(value);
        if in_range(celsius, TEMPERATURE_RANGE_C) {
            return Some(celsius);
        }
    }
    for (regex, unit) in TEMPERATURE_UNIT_RULES.iter() {
        for captures in regex.captures_iter(text) {
            let value = parse_number(captures.get(1)?.as_str())?;
            let celsius = unit.to_celsius(value);
            if in_range(celsius, TEMPERATURE_RANGE_C) {
                return Some(celsius);
            }
        }
    }
    None
}

fn extract_heart_rate(text: &str) -> Option<u32> {
    extract_rate(text, &HEART_RATE_RULES, HEART_RATE_RANGE_BPM)
}

fn extract_respiratory_rate(text: &str) -> Option<u32> {
    extract_rate(text, &RESPIRATORY_RULES, RESPIRATORY_RANGE_RPM)
}

fn extract_rate(text: &str, rules: &[Regex], range: (u32, u32)) -> Option<u32> {
    for regex in rules {
        for captures in regex.captures_iter(text) {
            let Ok(value) = captures.get(1)?.as_str().parse::<u32>() else {
                continue;
            };
            if value >= range.0 && value <= range.1 {
                return Some(value);
            }
        }
    }
    None
}

/// Parses a captured number, accepting a decimal comma and a stray
/// trailing separator.
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', ".");
    let cleaned = cleaned.trim_end_matches('.');
    cleaned.parse::<f64>().ok()
}

fn in_range(value: f64, range: (f64, f64)) -> bool {
    value >= range.0 && value <= range.1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.unwrap();
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn labelled_weight_and_temperature() {
        let vitals = extract_vitals("Peso: 4.5 kg, Temp: 38.2 C");
        assert_close(vitals.weight_kg, 4.5);
        assert_close(vitals.temperature_c, 38.2);
        assert_eq!(vitals.heart_rate_bpm, None);
        assert_eq!(vitals.respiratory_rate_rpm, None);
    }

    #[test]
    fn pounds_convert_to_kilograms() {
        let vitals = extract_vitals("Peso: 10 lb");
        assert_close(vitals.weight_kg, 4.535_923_7);
    }

    #[test]
    fn grams_convert_to_kilograms() {
        let vitals = extract_vitals("cachorro, peso: 850 g");
        assert_close(vitals.weight_kg, 0.85);
    }

    #[test]
    fn fahrenheit_converts_to_celsius() {
        let vitals = extract_vitals("temperatura: 101.3 f");
        assert_close(vitals.temperature_c, (101.3 - 32.0) * 5.0 / 9.0);
    }

    #[test]
    fn bare_unit_forms_match_without_label() {
        let vitals = extract_vitals("control anual, 12.3 kg, 38.5 grados");
        assert_close(vitals.weight_kg, 12.3);
        assert_close(vitals.temperature_c, 38.5);
    }

    #[test]
    fn decimal_comma_is_accepted() {
        let vitals = extract_vitals("peso: 4,5 kg");
        assert_close(vitals.weight_kg, 4.5);
    }

    #[test]
    fn implausible_values_are_skipped_and_scan_continues() {
        let vitals = extract_vitals("peso: 900 kg corregido peso: 9 kg");
        assert_close(vitals.weight_kg, 9.0);
        let vitals = extract_vitals("t: 98.0");
        assert_eq!(vitals.temperature_c, None);
    }

    #[test]
    fn rates_extracted_within_plausible_ranges() {
        let vitals = extract_vitals("FC: 120 FR: 25");
        assert_eq!(vitals.heart_rate_bpm, Some(120));
        assert_eq!(vitals.respiratory_rate_rpm, Some(25));

        let vitals = extract_vitals("fc: 900");
        assert_eq!(vitals.heart_rate_bpm, None);
    }

    #[test]
    fn rate_units_match_without_label() {
        let vitals = extract_vitals("auscultado 96 lpm, 22 rpm");
        assert_eq!(vitals.heart_rate_bpm, Some(96));
        assert_eq!(vitals.respiratory_rate_rpm, Some(22));
    }

    #[test]
    fn short_note_bare_peso() {
        let vitals = extract_vitals("peso 15.5");
        assert_close(vitals.weight_kg, 15.5);
        // In a long narrative a bare number is not trusted.
        let long = "el paciente llego al control y durante la visita se observo \
                    que el peso 15 dias atras era distinto al actual";
        assert_eq!(extract_vitals(long).weight_kg, None);
    }

    #[test]
    fn note_without_vitals_is_empty() {
        let vitals = extract_vitals("Aplicada correctamente, sin reacciones");
        assert!(vitals.is_empty());
    }

    #[test]
    fn milligram_doses_are_not_weights() {
        let vitals = extract_vitals("amoxicilina 500 mg cada 12 horas");
        assert_eq!(vitals.weight_kg, None);
    }
}

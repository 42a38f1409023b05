use super::types::NewRange;

/// Reference NEWS table for temperature, heart rate and respiratory rate.
pub fn standard_ranges() -> Vec<NewRange> {
    const TABLE: &[(&str, f64, f64, i32)] = &[
        ("TEMP", 31.0, 35.0, 3),
        ("TEMP", 35.0, 36.0, 1),
        ("TEMP", 36.0, 38.0, 0),
        ("TEMP", 38.0, 39.0, 1),
        ("TEMP", 39.0, 42.0, 2),
        ("HR", 25.0, 40.0, 3),
        ("HR", 40.0, 50.0, 1),
        ("HR", 50.0, 90.0, 0),
        ("HR", 90.0, 110.0, 1),
        ("HR", 110.0, 130.0, 2),
        ("HR", 130.0, 220.0, 3),
        ("RR", 3.0, 8.0, 3),
        ("RR", 8.0, 11.0, 1),
        ("RR", 11.0, 20.0, 0),
        ("RR", 20.0, 24.0, 2),
        ("RR", 24.0, 60.0, 3),
    ];

    TABLE
        .iter()
        .map(|&(measurement_type, min, max, score)| NewRange::new(measurement_type, min, max, score))
        .collect()
}

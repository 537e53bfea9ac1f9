use std::path::Path;

/// Shortest round-trip form, always with a fractional part (`120.0`).
pub fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

pub fn is_csv_path(path: &Path) -> bool {
    match mime_guess::from_path(path).first() {
        Some(mime) => mime.essence_str() == "text/csv",
        None => false,
    }
}

/// Rough advance width of `text` in a proportional sans font.
pub fn estimate_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_keep_a_fraction() {
        assert_eq!(format_float(120.0), "120.0");
        assert_eq!(format_float(100.0 / 3.0), "33.333333333333336");
    }

    #[test]
    fn csv_detection_uses_extension() {
        assert!(is_csv_path(Path::new("marks.csv")));
        assert!(!is_csv_path(Path::new("marks.xlsx")));
        assert!(!is_csv_path(Path::new("marks")));
    }
}

//! Percentage Badges
//!
//! Maps a percentage to a badge color and its style class.

use serde::Serialize;

/// Badge color category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Navy,
    Green,
    Orange,
    Red,
}

impl BadgeColor {
    /// Category for a percentage. Missing and NaN values count as 0.
    pub fn for_percentage(percentage: Option<f64>) -> Self {
        let p = percentage.filter(|p| !p.is_nan()).unwrap_or(0.0);

        if p > 75.0 {
            BadgeColor::Navy
        } else if p >= 50.0 {
            BadgeColor::Green
        } else if p >= 25.0 {
            BadgeColor::Orange
        } else {
            BadgeColor::Red
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BadgeColor::Navy => "navy",
            BadgeColor::Green => "green",
            BadgeColor::Orange => "orange",
            BadgeColor::Red => "red",
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            BadgeColor::Navy => "bg-blue-900 text-white",
            BadgeColor::Green => "bg-green-600 text-white",
            BadgeColor::Orange => "bg-orange-500 text-white",
            BadgeColor::Red => "bg-red-600 text-white",
        }
    }
}

/// Badge color and class for a percentage
pub fn badge_color(percentage: Option<f64>) -> BadgeColor {
    BadgeColor::for_percentage(percentage)
}

pub fn badge_class(percentage: Option<f64>) -> &'static str {
    badge_color(percentage).class()
}

/// Rounded percentage text, e.g. `62%`; missing values render as `0%`
pub fn badge_label(percentage: Option<f64>) -> String {
    let p = percentage.filter(|p| p.is_finite()).unwrap_or(0.0);
    format!("{}%", p.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        let cases = [
            (100.0, BadgeColor::Navy),
            (75.01, BadgeColor::Navy),
            (75.0, BadgeColor::Green),
            (50.0, BadgeColor::Green),
            (49.99, BadgeColor::Orange),
            (25.0, BadgeColor::Orange),
            (24.99, BadgeColor::Red),
            (0.0, BadgeColor::Red),
            (-10.0, BadgeColor::Red),
        ];

        for (p, expected) in cases {
            assert_eq!(badge_color(Some(p)), expected, "percentage {}", p);
        }
    }

    #[test]
    fn test_missing_is_zero() {
        assert_eq!(badge_color(None), BadgeColor::Red);
        assert_eq!(badge_color(Some(f64::NAN)), BadgeColor::Red);
        assert_eq!(badge_label(None), "0%");
    }

    #[test]
    fn test_classes_and_labels() {
        assert_eq!(badge_class(Some(80.0)), "bg-blue-900 text-white");
        assert_eq!(badge_class(Some(10.0)), "bg-red-600 text-white");
        assert_eq!(BadgeColor::Orange.name(), "orange");
        assert_eq!(badge_label(Some(62.4)), "62%");
        assert_eq!(
            serde_json::to_string(&BadgeColor::Navy).unwrap(),
            "\"navy\""
        );
    }
}

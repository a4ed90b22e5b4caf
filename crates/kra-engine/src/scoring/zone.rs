use super::domain::{ThresholdBands, Zone};
use super::thresholds::reaches;

/// Classifies a percentage against resolved bands.
///
/// Bands are inclusive at their minimum, so a value sitting exactly on a
/// boundary belongs to the higher zone. The green band is open-ended.
pub fn classify(percent: f64, bands: &ThresholdBands) -> Zone {
    if reaches(percent, bands.green.min) {
        Zone::Green
    } else if reaches(percent, bands.amber.min) {
        Zone::Amber
    } else {
        Zone::Red
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_amber_min_is_amber() {
        let bands = ThresholdBands::default();
        assert_eq!(classify(70.0, &bands), Zone::Amber);
        assert_eq!(classify(69.99, &bands), Zone::Red);
    }

    #[test]
    fn exact_green_min_is_green() {
        let bands = ThresholdBands::default();
        assert_eq!(classify(90.0, &bands), Zone::Green);
        assert_eq!(classify(89.99, &bands), Zone::Amber);
    }

    #[test]
    fn green_is_open_ended() {
        let bands = ThresholdBands::default();
        assert_eq!(classify(100.0, &bands), Zone::Green);
        assert_eq!(classify(180.0, &bands), Zone::Green);
    }

    #[test]
    fn computed_ratio_on_boundary_is_not_demoted() {
        let bands = ThresholdBands::default();
        let amber_edge = 23.24 / 33.2 * 100.0;
        let green_edge = 29.88 / 33.2 * 100.0;
        assert_eq!(classify(amber_edge, &bands), Zone::Amber);
        assert_eq!(classify(green_edge, &bands), Zone::Green);
    }

    #[test]
    fn zero_is_red() {
        assert_eq!(classify(0.0, &ThresholdBands::default()), Zone::Red);
    }

    #[test]
    fn custom_bands_shift_boundaries() {
        let bands = ThresholdBands::from_boundaries(50.0, 75.0);
        assert_eq!(classify(50.0, &bands), Zone::Amber);
        assert_eq!(classify(74.0, &bands), Zone::Amber);
        assert_eq!(classify(75.0, &bands), Zone::Green);
    }
}

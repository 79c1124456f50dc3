//! Dew point from air temperature and relative humidity (Magnus-Tetens).

const MAGNUS_B: f64 = 17.625;
const MAGNUS_C: f64 = 243.04;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum DewPointError {
    #[error("relative humidity {0}% is outside (0, 100]")]
    HumidityOutOfRange(f64),
    #[error("dew point is not a finite number")]
    NonFinite,
}

/// Dew point in °C for a temperature in °C and relative humidity in percent.
///
/// Humidity must lie in (0, 100]; at zero the logarithm is undefined.
/// No rounding is applied.
pub fn try_dew_point(temperature_c: f64, humidity_pct: f64) -> Result<f64, DewPointError> {
    if !(humidity_pct > 0.0 && humidity_pct <= 100.0) {
        return Err(DewPointError::HumidityOutOfRange(humidity_pct));
    }

    let gamma = (humidity_pct / 100.0).ln() + (MAGNUS_B * temperature_c) / (MAGNUS_C + temperature_c);
    let dew_point = (MAGNUS_C * gamma) / (MAGNUS_B - gamma);

    if dew_point.is_finite() {
        Ok(dew_point)
    } else {
        Err(DewPointError::NonFinite)
    }
}

/// Dew point when both inputs are known and the formula is defined, `None` otherwise.
pub fn dew_point(temperature_c: Option<f64>, humidity_pct: Option<f64>) -> Option<f64> {
    match (temperature_c, humidity_pct) {
        (Some(t), Some(h)) => try_dew_point(t, h).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} ± {tolerance}, got {actual}"
        );
    }

    #[test]
    fn warm_humid_afternoon() {
        assert_close(try_dew_point(25.0, 60.0).unwrap(), 16.7, 0.1);
    }

    #[test]
    fn mild_dry_morning() {
        assert_close(try_dew_point(20.0, 50.0).unwrap(), 9.3, 0.1);
    }

    #[test]
    fn saturated_air_dew_point_equals_temperature() {
        assert_close(try_dew_point(18.4, 100.0).unwrap(), 18.4, 1e-9);
    }

    #[test]
    fn below_freezing_is_defined() {
        let dp = try_dew_point(-5.0, 80.0).unwrap();
        assert!(dp < -5.0);
    }

    #[test]
    fn zero_humidity_is_undefined_not_nan() {
        assert_eq!(
            try_dew_point(25.0, 0.0),
            Err(DewPointError::HumidityOutOfRange(0.0))
        );
        assert_eq!(dew_point(Some(25.0), Some(0.0)), None);
    }

    #[test]
    fn humidity_above_saturation_is_rejected() {
        assert!(try_dew_point(25.0, 100.5).is_err());
        assert!(try_dew_point(25.0, f64::NAN).is_err());
    }

    #[test]
    fn missing_input_yields_absent() {
        assert_eq!(dew_point(None, Some(60.0)), None);
        assert_eq!(dew_point(Some(25.0), None), None);
        assert_eq!(dew_point(None, None), None);
    }
}

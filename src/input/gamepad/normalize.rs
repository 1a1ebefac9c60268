//! Deadzone-aware normalization of raw XInput analog values.
//!
//! # Stick Normalization
//!
//! Uses radial (circular) deadzone rather than per-axis (square) deadzone.
//! The raw vector is split into a unit direction and a magnitude; the
//! magnitude is zeroed inside the deadzone and rescaled outside of it so the
//! deadzone edge maps to 0.0 and full deflection (32767) maps to 1.0.
//!
//! # Trigger Normalization
//!
//! Triggers report 0-255. Values at or below the threshold read as 0.0, the
//! remaining range is stretched linearly to 0.0..=1.0.

/// XInput left thumbstick deadzone radius.
///
/// Values from Microsoft's XInput documentation.
pub const XINPUT_GAMEPAD_LEFT_THUMB_DEADZONE: u16 = 7849;

/// XInput right thumbstick deadzone radius.
///
/// Right stick has a slightly larger deadzone than left.
pub const XINPUT_GAMEPAD_RIGHT_THUMB_DEADZONE: u16 = 8689;

/// XInput trigger threshold below which input is ignored.
pub const XINPUT_GAMEPAD_TRIGGER_THRESHOLD: u8 = 30;

/// Largest stick radius used for rescaling. Diagonals and `i16::MIN` exceed
/// it and are clamped.
pub const STICK_MAX_MAGNITUDE: f64 = 32767.0;

/// Normalize a trigger byte against a threshold.
///
/// # Returns
/// * `0.0` when `raw <= deadzone`
/// * `(raw - deadzone) / (255 - deadzone)` otherwise
///
/// # Example
/// ```
/// use xinput_events::input::gamepad::normalize::normalize_trigger;
///
/// assert_eq!(normalize_trigger(30, 30), 0.0);
/// assert!(normalize_trigger(31, 30) > 0.0);
/// assert_eq!(normalize_trigger(255, 30), 1.0);
/// ```
pub fn normalize_trigger(raw: u8, deadzone: u8) -> f64 {
    if raw <= deadzone {
        return 0.0;
    }
    // raw > deadzone implies deadzone < 255, so the range is never zero
    let adjusted = (raw - deadzone) as f64;
    let range = (u8::MAX - deadzone) as f64;
    adjusted / range
}

/// Normalize a stick with a radial deadzone.
///
/// # Arguments
/// * `x`, `y` - Raw stick values from XInput (-32768 to 32767)
/// * `deadzone` - Circular deadzone radius (7849 left, 8689 right by default)
///
/// # Returns
/// * `(dir_x, dir_y, magnitude)` - unit direction of the raw vector and the
///   rescaled magnitude in [0.0, 1.0]. Direction is `(0.0, 0.0)` for a raw
///   vector of exactly zero length.
///
/// # Example
/// ```
/// use xinput_events::input::gamepad::normalize::normalize_stick;
///
/// let (dx, dy, mag) = normalize_stick(0, 0, 7849);
/// assert_eq!((dx, dy, mag), (0.0, 0.0, 0.0));
///
/// let (dx, _, mag) = normalize_stick(32767, 0, 7849);
/// assert_eq!(dx, 1.0);
/// assert_eq!(mag, 1.0);
/// ```
pub fn normalize_stick(x: i16, y: i16, deadzone: u16) -> (f64, f64, f64) {
    let x = x as f64;
    let y = y as f64;
    let magnitude = (x * x + y * y).sqrt();

    let (dir_x, dir_y) = if magnitude == 0.0 {
        (0.0, 0.0)
    } else {
        (x / magnitude, y / magnitude)
    };

    let deadzone = deadzone as f64;
    // Deadzone edge is inclusive; a deadzone at full radius leaves no live range
    if magnitude <= deadzone || deadzone >= STICK_MAX_MAGNITUDE {
        return (dir_x, dir_y, 0.0);
    }

    let clamped = magnitude.min(STICK_MAX_MAGNITUDE);
    let normalized = (clamped - deadzone) / (STICK_MAX_MAGNITUDE - deadzone);

    (dir_x, dir_y, normalized)
}

/// Scale a normalized stick into its `(x, y)` position.
pub fn stick_position(dir_x: f64, dir_y: f64, magnitude: f64) -> (f64, f64) {
    (dir_x * magnitude, dir_y * magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LEFT: u16 = XINPUT_GAMEPAD_LEFT_THUMB_DEADZONE;
    const TRIGGER: u8 = XINPUT_GAMEPAD_TRIGGER_THRESHOLD;

    #[test]
    fn test_normalize_stick_centered() {
        let (dx, dy, mag) = normalize_stick(0, 0, LEFT);
        assert_eq!((dx, dy, mag), (0.0, 0.0, 0.0));

        // Zero deadzone must not divide by zero either
        let (dx, dy, mag) = normalize_stick(0, 0, 0);
        assert_eq!((dx, dy, mag), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_normalize_stick_inside_deadzone_keeps_direction() {
        let (dx, dy, mag) = normalize_stick(7000, 0, LEFT);
        assert_eq!(mag, 0.0);
        assert_eq!((dx, dy), (1.0, 0.0));
    }

    #[test]
    fn test_normalize_stick_deadzone_edge_is_inclusive() {
        let (_, _, mag) = normalize_stick(7849, 0, LEFT);
        assert_eq!(mag, 0.0);

        let (_, _, mag) = normalize_stick(7850, 0, LEFT);
        assert!(mag > 0.0);
    }

    #[test]
    fn test_normalize_stick_outside_deadzone_diagonally() {
        // 7000^2 + 7000^2 = ~9899 magnitude > 7849, so NOT in deadzone
        let (dx, dy, mag) = normalize_stick(7000, 7000, LEFT);
        assert!(mag > 0.0);
        assert!((dx - dy).abs() < 1e-12);
        assert!((dx - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_stick_full_deflection_clamps() {
        let (_, _, mag) = normalize_stick(32767, 0, LEFT);
        assert_eq!(mag, 1.0);

        let (dx, _, mag) = normalize_stick(-32768, 0, LEFT);
        assert_eq!(dx, -1.0);
        assert_eq!(mag, 1.0);

        let (_, _, mag) = normalize_stick(32767, 32767, LEFT);
        assert_eq!(mag, 1.0);
    }

    #[test]
    fn test_normalize_stick_max_deadzone() {
        let (_, _, mag) = normalize_stick(-32768, -32768, 32767);
        assert_eq!(mag, 0.0);
    }

    #[test]
    fn test_normalize_trigger() {
        assert_eq!(normalize_trigger(0, TRIGGER), 0.0);
        assert_eq!(normalize_trigger(29, TRIGGER), 0.0);
        assert_eq!(normalize_trigger(30, TRIGGER), 0.0); // At threshold, still zero
        assert!(normalize_trigger(31, TRIGGER) > 0.0); // Just above threshold
        assert_eq!(normalize_trigger(255, TRIGGER), 1.0);
        assert!((normalize_trigger(100, TRIGGER) - 70.0 / 225.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_trigger_extreme_thresholds() {
        assert_eq!(normalize_trigger(255, 255), 0.0);
        assert_eq!(normalize_trigger(0, 0), 0.0);
        assert_eq!(normalize_trigger(255, 0), 1.0);
    }

    proptest! {
        #[test]
        fn prop_trigger_zero_at_or_below_deadzone(raw in 0u8..=255, dz in 0u8..=255) {
            prop_assume!(raw <= dz);
            prop_assert_eq!(normalize_trigger(raw, dz), 0.0);
        }

        #[test]
        fn prop_trigger_strictly_increasing_above_deadzone(raw in 1u8..=254, dz in 0u8..=253) {
            prop_assume!(raw > dz);
            prop_assert!(normalize_trigger(raw + 1, dz) > normalize_trigger(raw, dz));
        }

        #[test]
        fn prop_trigger_full_scale(dz in 0u8..=254) {
            prop_assert_eq!(normalize_trigger(255, dz), 1.0);
        }

        #[test]
        fn prop_stick_magnitude_in_unit_range(x in any::<i16>(), y in any::<i16>(), dz in 0u16..=32767) {
            let (dx, dy, mag) = normalize_stick(x, y, dz);
            prop_assert!((0.0..=1.0).contains(&mag));
            let dir_len = (dx * dx + dy * dy).sqrt();
            prop_assert!(dir_len == 0.0 || (dir_len - 1.0).abs() < 1e-9);
        }
    }
}

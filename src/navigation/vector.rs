use super::error::NavigationError;

/// A direction (degrees true) and a speed (knots).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedVector {
    pub course: f64,
    pub speed: f64,
}

impl SpeedVector {
    pub fn new(course: f64, speed: f64) -> Self {
        Self { course, speed }
    }
}

/// Wraps an angle into [0, 360).
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Heading to steer, and the resulting speed over ground, so that a vessel
/// making `water_speed` through a current setting `current_set` at
/// `current_rate` tracks along `ground_course`.
pub fn course_to_steer(
    ground_course: f64,
    water_speed: f64,
    current_set: f64,
    current_rate: f64,
) -> Result<SpeedVector, NavigationError> {
    if current_rate == 0.0 {
        return Ok(SpeedVector::new(ground_course, water_speed));
    }
    if water_speed <= 0.0 {
        return Err(NavigationError::NoWaterSpeed);
    }

    let ratio = current_rate / water_speed;
    let relative = (ground_course - current_set).to_radians();
    let cross = ratio * relative.sin();
    if cross.abs() > 1.0 {
        return Err(NavigationError::CannotHoldTrack {
            track: ground_course,
            set: current_set,
            rate: current_rate,
        });
    }

    let correction = cross.asin();
    let course = normalize_degrees(ground_course + correction.to_degrees());
    let speed = water_speed * correction.cos() + current_rate * relative.cos();

    Ok(SpeedVector::new(course, speed))
}

/// Ground track and speed over ground that result from steering
/// `steered_course` at `water_speed` through the given current.
///
/// Law of cosines for the speed; the drift angle is taken with `atan2` so
/// that it stays correct when the current sets the vessel more than 90°
/// off its heading.
pub fn course_made_good(
    steered_course: f64,
    water_speed: f64,
    current_set: f64,
    current_rate: f64,
) -> SpeedVector {
    if current_rate == 0.0 {
        return SpeedVector::new(steered_course, water_speed);
    }

    let relative = (current_set - steered_course).to_radians();
    let speed = (current_rate.powi(2)
        + water_speed.powi(2)
        + 2.0 * current_rate * water_speed * relative.cos())
    .max(0.0)
    .sqrt();
    if speed == 0.0 {
        return SpeedVector::new(steered_course, 0.0);
    }

    let drift = (current_rate * relative.sin()).atan2(water_speed + current_rate * relative.cos());
    SpeedVector::new(normalize_degrees(steered_course + drift.to_degrees()), speed)
}

/// Plain vector sum of the through-water velocity and the current.
pub fn resultant_over_ground(
    heading: f64,
    water_speed: f64,
    current_set: f64,
    current_rate: f64,
) -> SpeedVector {
    if current_rate == 0.0 {
        return SpeedVector::new(heading, water_speed);
    }

    let heading_rad = heading.to_radians();
    let set_rad = current_set.to_radians();

    // (north, east) components
    let north = water_speed * heading_rad.cos() + current_rate * set_rad.cos();
    let east = water_speed * heading_rad.sin() + current_rate * set_rad.sin();

    let speed = north.hypot(east);
    let course = normalize_degrees(east.atan2(north).to_degrees());
    SpeedVector::new(course, speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const EPS: f64 = 1e-9;

    fn angle_diff(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[rstest]
    #[case(0.0, 5.0)]
    #[case(95.5, 7.25)]
    #[case(359.0, 0.0)]
    #[case(181.0, 12.0)]
    fn zero_current_leaves_vector_untouched(#[case] course: f64, #[case] speed: f64) {
        let cts = course_to_steer(course, speed, 42.0, 0.0).unwrap();
        assert_eq!(cts, SpeedVector::new(course, speed));

        let cmg = course_made_good(course, speed, 42.0, 0.0);
        assert_eq!(cmg, SpeedVector::new(course, speed));

        let res = resultant_over_ground(course, speed, 42.0, 0.0);
        assert_eq!(res, SpeedVector::new(course, speed));
    }

    #[test]
    fn beam_current_matches_closed_form() {
        // Track due north, current setting due east.
        let (ws, rate) = (5.0, 2.0);
        let v = course_to_steer(0.0, ws, 90.0, rate).unwrap();

        let delta = (rate / ws * (0.0_f64 - 90.0).to_radians().sin()).asin();
        let expected_course = normalize_degrees(delta.to_degrees());
        assert!((v.course - expected_course).abs() < EPS);
        // Steering into the current, i.e. west of north.
        assert!((v.course - (360.0 - (0.4_f64).asin().to_degrees())).abs() < EPS);
        assert!((v.speed - (ws * delta.cos())).abs() < EPS);
        assert!((v.speed - (ws * ws - rate * rate).sqrt()).abs() < EPS);
    }

    #[test]
    fn fair_and_foul_currents_change_speed_only() {
        let fair = course_to_steer(45.0, 6.0, 45.0, 1.5).unwrap();
        assert!((fair.course - 45.0).abs() < EPS);
        assert!((fair.speed - 7.5).abs() < EPS);

        let foul = course_to_steer(45.0, 6.0, 225.0, 1.5).unwrap();
        assert!((foul.course - 45.0).abs() < EPS);
        assert!((foul.speed - 4.5).abs() < EPS);
    }

    #[test]
    fn current_too_strong_for_track() {
        let err = course_to_steer(0.0, 2.0, 90.0, 3.0).unwrap_err();
        assert!(matches!(err, NavigationError::CannotHoldTrack { .. }));
    }

    #[test]
    fn current_without_water_speed() {
        assert_eq!(
            course_to_steer(10.0, 0.0, 90.0, 1.0).unwrap_err(),
            NavigationError::NoWaterSpeed
        );
    }

    #[rstest]
    #[case(0.0, 5.0, 90.0, 2.0)]
    #[case(123.0, 6.5, 10.0, 1.2)]
    #[case(270.0, 4.0, 300.0, 3.5)]
    #[case(350.0, 8.0, 200.0, 2.5)]
    #[case(15.0, 5.0, 195.0, 4.0)]
    fn course_to_steer_round_trips_through_course_made_good(
        #[case] ground: f64,
        #[case] ws: f64,
        #[case] set: f64,
        #[case] rate: f64,
    ) {
        let steer = course_to_steer(ground, ws, set, rate).unwrap();
        let made_good = course_made_good(steer.course, ws, set, rate);
        assert!(angle_diff(made_good.course, ground) < 1e-9, "{made_good:?}");
        assert!((made_good.speed - steer.speed).abs() < 1e-9);
    }

    #[rstest]
    #[case(0.0, 5.0, 90.0, 5.0)]
    #[case(200.0, 3.0, 20.0, 1.0)]
    #[case(90.0, 1.0, 0.0, 4.0)]
    #[case(300.0, 7.0, 135.0, 6.0)]
    fn course_made_good_agrees_with_vector_sum(
        #[case] heading: f64,
        #[case] ws: f64,
        #[case] set: f64,
        #[case] rate: f64,
    ) {
        let a = course_made_good(heading, ws, set, rate);
        let b = resultant_over_ground(heading, ws, set, rate);
        assert!(angle_diff(a.course, b.course) < 1e-9);
        assert!((a.speed - b.speed).abs() < 1e-9);
    }

    #[test]
    fn resultant_of_perpendicular_vectors() {
        let v = resultant_over_ground(0.0, 3.0, 90.0, 4.0);
        assert!((v.speed - 5.0).abs() < EPS);
        assert!((v.course - (4.0_f64).atan2(3.0).to_degrees()).abs() < EPS);
    }

    #[test]
    fn current_dead_against_stops_the_vessel() {
        let v = course_made_good(0.0, 2.0, 180.0, 2.0);
        assert_eq!(v.speed, 0.0);
        assert_eq!(v.course, 0.0);
    }

    #[test]
    fn normalize_wraps_both_ways() {
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert!(normalize_degrees(-1e-20) < 360.0);
    }
}

use chrono::Duration;
use groundtrack::frames::{geodetic_sub_point, norm, unwind_deg, view_extent};
use groundtrack::{compute_gst, rotate_to_earth_fixed, Epoch, FrameConverter, GstModel, SubPoint, TrackError};

#[test]
fn cubic_gst_at_zero_is_constant_term() {
    let gst = compute_gst(0.0, GstModel::Cubic).unwrap();
    assert_eq!(gst, 100.4606184);
}

#[test]
fn linear_gst_after_one_day() {
    let gst = compute_gst(1.0, GstModel::Linear).unwrap();
    assert!((gst - 0.98564724).abs() < 1e-9, "got {gst}");
}

#[test]
fn gst_is_reproducible() {
    for ut1 in [0.0, 0.25, 0.2578, 1.0, 12.5, 9131.25] {
        for model in [GstModel::Cubic, GstModel::Linear] {
            let a = compute_gst(ut1, model).unwrap();
            let b = compute_gst(ut1, model).unwrap();
            assert_eq!(a.to_bits(), b.to_bits());
            assert!((0.0..360.0).contains(&a), "{model} at {ut1} gave {a}");
        }
    }
}

#[test]
fn negative_ut1_is_invalid_input() {
    for model in [GstModel::Cubic, GstModel::Linear] {
        let err = compute_gst(-1e-12, model).unwrap_err();
        assert!(matches!(err, TrackError::InvalidInput(_)), "got {err:?}");
    }
    assert!(matches!(compute_gst(f64::NAN, GstModel::Cubic), Err(TrackError::InvalidInput(_))));
    assert!(matches!(compute_gst(f64::INFINITY, GstModel::Linear), Err(TrackError::InvalidInput(_))));
}

#[test]
fn gst_model_parses_from_text() {
    assert_eq!("cubic".parse::<GstModel>().unwrap(), GstModel::Cubic);
    assert_eq!(" Linear ".parse::<GstModel>().unwrap(), GstModel::Linear);
    assert!("quadratic".parse::<GstModel>().is_err());
    assert_eq!(GstModel::default(), GstModel::Cubic);
}

#[test]
fn rotation_preserves_norm() {
    let vectors = [
        [6778.137, 0.0, 0.0],
        [-4123.5, 5012.25, 1987.0],
        [1.0e-3, -2.0e-3, 7.0e-3],
        [42164.0, -15.5, 0.25],
    ];
    for v in vectors {
        let n = norm(v);
        for gst in [0.0, 33.3, 90.0, 179.999, 271.5, 359.9999, 7200.5, -45.0] {
            let r = rotate_to_earth_fixed(v, gst);
            assert!(((norm(r) - n) / n).abs() < 1e-9, "norm changed for {v:?} at {gst}");
        }
    }
}

#[test]
fn rotation_round_trip() {
    let v = [-4123.5, 5012.25, 1987.0];
    for gst in [0.0, 12.34, 100.4606184, 245.0, 359.0] {
        let back = rotate_to_earth_fixed(rotate_to_earth_fixed(v, gst), -gst);
        for k in 0..3 {
            assert!((back[k] - v[k]).abs() < 1e-9 * norm(v), "component {k} at {gst}");
        }
    }
}

#[test]
fn rotation_is_passive_about_z() {
    // frame turns +90 deg, so the inertial +X axis appears along -Y
    let r = rotate_to_earth_fixed([1.0, 0.0, 5.0], 90.0);
    assert!(r[0].abs() < 1e-12);
    assert!((r[1] + 1.0).abs() < 1e-12);
    assert_eq!(r[2], 5.0);
}

#[test]
fn converter_uses_model_argument() {
    let epoch = Epoch::parse("2000-01-01T12:00:00Z").unwrap();
    let cubic = FrameConverter::new(GstModel::Cubic, 0.0);
    // noon of 2000-01-01: cubic at 0h plus half a sidereal day
    assert!((cubic.gst_at(&epoch).unwrap() - 280.4606183).abs() < 1e-6);

    let next_day = Epoch::parse("2000-01-02T12:00:00Z").unwrap();
    let linear = FrameConverter::new(GstModel::Linear, 0.0);
    assert!((linear.gst_at(&next_day).unwrap() - 0.98564724).abs() < 1e-6);

    // before J2000 the UT1 argument is negative
    let early = Epoch::parse("1999-12-31T00:00:00Z").unwrap();
    assert!(matches!(cubic.gst_at(&early), Err(TrackError::InvalidInput(_))));
}

#[test]
fn sub_point_on_axes() {
    let equator = geodetic_sub_point([6778.137, 0.0, 0.0]).unwrap();
    assert!(equator.latitude_deg.abs() < 1e-9);
    assert!(equator.longitude_deg.abs() < 1e-9);
    assert!((equator.altitude_km - 400.0).abs() < 0.01);

    let east = geodetic_sub_point([0.0, 7000.0, 0.0]).unwrap();
    assert!((east.longitude_deg - 90.0).abs() < 1e-9);

    let west = geodetic_sub_point([-7000.0, -1e-9, 0.0]).unwrap();
    assert!((west.longitude_deg + 180.0).abs() < 1e-6);

    let pole = geodetic_sub_point([0.0, 0.0, 7000.0]).unwrap();
    assert!((pole.latitude_deg - 90.0).abs() < 1e-9);
    assert!(pole.altitude_km > 600.0 && pole.altitude_km < 650.0);

    let south = geodetic_sub_point([1000.0, 1000.0, -6500.0]).unwrap();
    assert!((-90.0..=90.0).contains(&south.latitude_deg));
    assert!(south.latitude_deg < -70.0);
}

#[test]
fn sub_point_rejects_geocenter() {
    assert!(matches!(geodetic_sub_point([0.0, 0.0, 0.0]), Err(TrackError::InvalidInput(_))));
    assert!(matches!(geodetic_sub_point([f64::NAN, 0.0, 0.0]), Err(TrackError::InvalidInput(_))));
}

#[test]
fn view_extent_clamps_to_globe() {
    let sp = SubPoint::new(-80.0, 39.5);
    assert_eq!(view_extent(&sp, 500.0), [-180.0, 180.0, -90.0, 90.0]);
    assert_eq!(view_extent(&sp, 10.0), [-90.0, -70.0, 29.5, 49.5]);
}

#[test]
fn unwind_stays_in_range() {
    assert_eq!(unwind_deg(360.0), 0.0);
    assert_eq!(unwind_deg(-90.0), 270.0);
    assert!(unwind_deg(-1e-20) < 360.0);
    assert!((unwind_deg(725.5) - 5.5).abs() < 1e-12);
}

#[test]
fn epoch_julian_dates() {
    let j2000 = Epoch::parse("2000-01-01T12:00:00Z").unwrap();
    assert_eq!(j2000.julian_date(), 2_451_545.0);
    assert_eq!(j2000.ut1_days_since_j2000(0.0), 0.0);
    assert!((j2000.greenwich_mean_sidereal_deg(0.0) - 280.46061837).abs() < 1e-9);

    let bare = Epoch::parse("2024-01-01T00:00:00").unwrap();
    assert_eq!(bare.to_iso(), "2024-01-01T00:00:00");
    assert!(matches!(Epoch::parse("yesterday"), Err(TrackError::InvalidInput(_))));
}

#[test]
fn cubic_converter_turns_a_full_circle_per_day() {
    let cubic = FrameConverter::new(GstModel::Cubic, 0.0);
    let midnight = Epoch::parse("2025-10-05T00:00:00Z").unwrap();
    let g0 = cubic.gst_at(&midnight).unwrap();
    let mut previous = g0;
    let mut wrapped = false;
    for hour in [6, 12, 18, 24] {
        let epoch = midnight.checked_add(Duration::hours(hour)).unwrap();
        let gst = cubic.gst_at(&epoch).unwrap();
        let expected = unwind_deg(g0 + 360.98564724 * hour as f64 / 24.0);
        assert!((gst - expected).abs() < 1e-6, "{hour}h: {gst} vs {expected}");
        wrapped |= gst < previous;
        previous = gst;
    }
    assert!(wrapped, "GST should wrap at 360 within a day");

    // agrees with the IAU 1982 expression through the day
    for hour in [0, 6, 12, 18] {
        let epoch = Epoch::parse(&format!("2025-10-05T{hour:02}:00:00Z")).unwrap();
        let diff = cubic.gst_at(&epoch).unwrap() - epoch.greenwich_mean_sidereal_deg(0.0);
        assert!(diff.abs() < 1e-3, "{hour}h: off by {diff}");
    }
}

#[test]
fn dut1_shifts_sidereal_time() {
    let epoch = Epoch::parse("2025-10-05T06:00:00Z").unwrap();
    let step = 360.98564724 / 86_400.0;
    let shifted = epoch.greenwich_mean_sidereal_deg(0.5) - epoch.greenwich_mean_sidereal_deg(0.0);
    assert!((shifted - 0.5 * step).abs() < 1e-6, "got {shifted}");

    let a = FrameConverter::new(GstModel::Cubic, 0.0).gst_at(&epoch).unwrap();
    let b = FrameConverter::new(GstModel::Cubic, 0.5).gst_at(&epoch).unwrap();
    assert!((b - a - 0.5 * step).abs() < 1e-6, "got {}", b - a);

    assert_eq!(epoch.ut1_day_fraction(0.0), 0.25);
    assert_eq!(Epoch::parse("2025-10-05T00:00:00Z").unwrap().ut1_day_fraction(-1.0), 86_399.0 / 86_400.0);
}

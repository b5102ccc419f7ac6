use chrono::{TimeZone, Utc};
use groundtrack::oem::{data_line, format};
use groundtrack::{Catalog, Epoch, OemHeader, OemRecord, OrbitalElementSet, StateVector};

fn noaa19() -> OrbitalElementSet {
    let catalog = Catalog::parse(include_str!("fixtures/stations.txt")).unwrap();
    catalog.get(33591).unwrap().clone()
}

fn sample_state() -> StateVector {
    StateVector {
        position: [7000.123456, -123.456789, 1234.567890],
        velocity: [1.1, -2.2, 3.3],
    }
}

fn header() -> OemHeader {
    OemHeader {
        creation_date: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        originator: "Ground Segment".to_string(),
    }
}

#[test]
fn data_line_fixed_point_fields() {
    let epoch = Epoch::parse("2024-01-01T00:00:00").unwrap();
    assert_eq!(
        data_line(&epoch, &sample_state()),
        "2024-01-01T00:00:00 7000.123456 -123.456789 1234.567890 1.100000 -2.200000 3.300000 0.0 0.0 0.0"
    );
}

#[test]
fn single_sample_message_layout() {
    let epoch = Epoch::parse("2024-01-01T00:00:00Z").unwrap();
    let text = format(header(), &noaa19(), "TEME", &epoch, &sample_state());
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        [
            "CCSDS_OEM_VERS = 2.0",
            "CREATION_DATE = 2024-01-02T03:04:05",
            "ORIGINATOR = Ground Segment",
            "",
            "META_START",
            "OBJECT_NAME = NOAA 19",
            "OBJECT_ID = 33591",
            "CENTER_NAME = EARTH",
            "REF_FRAME = TEME",
            "TIME_SYSTEM = UTC",
            "META_STOP",
            "",
            "2024-01-01T00:00:00 7000.123456 -123.456789 1234.567890 1.100000 -2.200000 3.300000 0.0 0.0 0.0",
        ]
    );
}

#[test]
fn record_keeps_samples_in_push_order() {
    let mut record = OemRecord::new(header(), &noaa19(), "TEME");
    let t0 = Epoch::parse("2024-01-01T00:10:00Z").unwrap();
    let t1 = Epoch::parse("2024-01-01T00:05:00Z").unwrap();
    record.push(t0, sample_state());
    record.push(t1, sample_state());

    assert_eq!(record.samples().len(), 2);
    let text = record.to_string();
    let data: Vec<&str> = text.lines().skip_while(|l| *l != "META_STOP").skip(2).collect();
    assert_eq!(data.len(), 2);
    assert!(data[0].starts_with("2024-01-01T00:10:00 "));
    assert!(data[1].starts_with("2024-01-01T00:05:00 "));
}

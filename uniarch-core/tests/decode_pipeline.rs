//! End-to-end decoding of synthetic archives through the public API.

use chrono::{NaiveDate, NaiveDateTime};
use uniarch_core::decoder::decoded_row_count;
use uniarch_core::inference::marker::{marker_score, MAX_SAMPLE_ROWS};
use uniarch_core::{
    create_inference, parse_table, ArchError, Column, ColumnDefinition, DecodeOptions, ErrorKind,
    FixedWidth, InferenceStrategy, MarkerPeriodicity, RowWidthInference, Table, DEFAULT_ROW_WIDTH,
    MARKER_BYTES,
};

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

/// Marker prefix plus `rows` rows of `width` fields. Every row starts with
/// the marker, followed by `service_fields - 1` counters, then measurements.
fn synthetic_archive(rows: usize, width: usize, service_fields: usize) -> Vec<u8> {
    let mut data = MARKER_BYTES.to_vec();
    for r in 0..rows {
        data.extend_from_slice(&MARKER_BYTES);
        for f in 1..width {
            let value = if f < service_fields {
                r as f32
            } else {
                49.9 + (f - service_fields) as f32 * 0.25
            };
            data.extend_from_slice(&value.to_be_bytes());
        }
    }
    data
}

fn minute_options() -> DecodeOptions {
    DecodeOptions {
        start: at(0, 0),
        period_ms: 60_000,
        service_fields: 2,
        ..Default::default()
    }
}

#[test]
fn ten_rows_of_forty_nine_fields() {
    let data = synthetic_archive(10, 49, 2);

    let width = MarkerPeriodicity.infer(&data[4..]);
    assert_eq!(width, 49);

    let table = parse_table(&data, &MarkerPeriodicity, &minute_options(), None).unwrap();
    assert_eq!(table.row_count(), 10);
    assert_eq!(table.column_count(), 47);
    assert_eq!(table.timestamps().len(), 10);
    assert_eq!(table.timestamps()[3], at(0, 3));
    assert!(table.rows().iter().all(|row| row.len() == 47));
    assert_eq!(table.rows()[9][0], 49.9);
}

#[test]
fn inference_recovers_width_and_full_score() {
    for (rows, width) in [(10, 49), (50, 12), (350, 47), (1000, 6)] {
        let data = synthetic_archive(rows, width, 2);
        let payload = &data[4..];
        assert_eq!(MarkerPeriodicity.infer(payload), width);
        assert_eq!(
            marker_score(payload, width),
            Some(rows.min(MAX_SAMPLE_ROWS)),
            "rows {} width {}",
            rows,
            width
        );
    }
}

#[test]
fn fewer_than_three_markers_gives_default_width() {
    let mut data = vec![0u8; 4000];
    data[100..104].copy_from_slice(&MARKER_BYTES);
    data[2000..2004].copy_from_slice(&MARKER_BYTES);

    let inference = create_inference(InferenceStrategy::MarkerPeriodicity);
    assert_eq!(inference.infer(&data), DEFAULT_ROW_WIDTH);
    assert_eq!(inference.infer(&data), DEFAULT_ROW_WIDTH);
}

#[test]
fn decoded_row_count_matches_formula() {
    let options = DecodeOptions {
        max_rows: 25,
        ..minute_options()
    };
    for rows in [1, 2, 24, 25, 26, 60] {
        for extra in 0..4 {
            let mut data = synthetic_archive(rows, 9, 2);
            data.extend(std::iter::repeat(0x55).take(extra));

            let table = parse_table(&data, &FixedWidth::new(9), &options, None).unwrap();
            let expected = ((data.len() - 4) / (9 * 4)).min(25);
            assert_eq!(table.row_count(), expected);
            assert_eq!(decoded_row_count(&data, 9, &options), expected);
        }
    }
}

#[test]
fn timestamps_step_by_period() {
    let data = synthetic_archive(40, 8, 2);
    let options = DecodeOptions {
        period_ms: 250,
        ..minute_options()
    };
    let table = parse_table(&data, &MarkerPeriodicity, &options, None).unwrap();
    for pair in table.timestamps().windows(2) {
        assert!(pair[1] > pair[0]);
        assert_eq!((pair[1] - pair[0]).num_milliseconds(), 250);
    }
}

#[test]
fn decoding_is_deterministic() {
    let mut data = synthetic_archive(30, 10, 2);
    // Sprinkle a NaN into the measurements
    data[4 + 10 * 4 * 3 + 5 * 4..][..4].copy_from_slice(&0x7FC0_1234u32.to_be_bytes());

    for strategy in InferenceStrategy::ALL {
        let inference = create_inference(strategy);
        let a = parse_table(&data, inference.as_ref(), &minute_options(), None);
        let b = parse_table(&data, inference.as_ref(), &minute_options(), None);
        match (a, b) {
            (Ok(a), Ok(b)) => assert!(a.bit_eq(&b), "{}", strategy),
            (Err(a), Err(b)) => assert_eq!(a, b),
            _ => panic!("{} gave different outcomes", strategy),
        }
    }
}

#[test]
fn trailing_three_bytes_are_discarded() {
    let mut data = synthetic_archive(5, 49, 2);
    data.extend_from_slice(&[0xAB, 0xCD, 0xEF]);
    let table = parse_table(&data, &MarkerPeriodicity, &minute_options(), None).unwrap();
    assert_eq!(table.row_count(), 5);
}

#[test]
fn minimum_size_buffer_is_one_row() {
    let data = synthetic_archive(1, 3, 2);
    assert_eq!(data.len(), 16);
    let table = parse_table(&data, &FixedWidth::new(3), &minute_options(), None).unwrap();
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.column_count(), 1);
}

#[test]
fn tiny_buffers_are_invalid_input() {
    for len in 0..8 {
        let data = vec![0u8; len];
        let err = parse_table(&data, &MarkerPeriodicity, &minute_options(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(matches!(err, ArchError::TooShort { expected: 8, .. }));
    }
}

#[test]
fn plausibility_whole_buffer_row() {
    // Prefix + 7 fields: nothing divides 7, so the payload is one 7-field row
    let mut data = MARKER_BYTES.to_vec();
    for v in [50.0f32, 0.0, 230.0, 231.0, 229.0, 12.0, 13.0] {
        data.extend_from_slice(&v.to_be_bytes());
    }
    let inference = create_inference(InferenceStrategy::Plausibility);
    let table = parse_table(&data, inference.as_ref(), &minute_options(), None).unwrap();
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.rows()[0], vec![230.0, 231.0, 229.0, 12.0, 13.0]);
}

#[test]
fn public_types_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<Table>();
    assert_send_sync::<DecodeOptions>();
    assert_send_sync::<Column>();
    assert_send_sync::<ColumnDefinition>();
    assert_send_sync::<ArchError>();
    assert_send_sync::<InferenceStrategy>();
    assert_send_sync::<Box<dyn RowWidthInference>>();
}

#[test]
fn concurrent_decodes_agree() {
    let data = synthetic_archive(120, 12, 2);
    let options = minute_options();

    for strategy in InferenceStrategy::ALL {
        let inference = create_inference(strategy);
        let expected = parse_table(&data, inference.as_ref(), &options, None).unwrap();

        let tables: Vec<Table> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| parse_table(&data, inference.as_ref(), &options, None)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect()
        });

        for table in &tables {
            assert!(table.bit_eq(&expected), "{}", strategy);
        }
    }
}

#[test]
fn leading_row_marker_is_taken_as_prefix_by_default() {
    // Marker-led rows with no separate prefix
    let data = synthetic_archive(10, 49, 2).split_off(4);
    assert_eq!(data.len(), 10 * 49 * 4);

    let literal = DecodeOptions {
        skip_marker_prefix: false,
        ..minute_options()
    };
    let table = parse_table(&data, &MarkerPeriodicity, &literal, None).unwrap();
    assert_eq!(table.row_count(), 10);
    assert_eq!(table.column_count(), 47);
    assert_eq!(table.rows()[0][0], 49.9);

    // The first row's marker is consumed as a prefix: every row shifts one
    // field and the final partial row is dropped
    let shifted = parse_table(&data, &MarkerPeriodicity, &minute_options(), None).unwrap();
    assert_eq!(shifted.row_count(), 9);
    assert_eq!(shifted.rows()[0][0].to_bits(), table.rows()[0][1].to_bits());
    assert_eq!(shifted.rows()[0][46].to_bits(), uniarch_core::MARKER);
}

#[test]
fn plausibility_fallback_below_minimum_width_is_rejected() {
    let no_service = DecodeOptions {
        skip_marker_prefix: false,
        service_fields: 0,
        ..minute_options()
    };
    let inference = create_inference(InferenceStrategy::Plausibility);

    let mut data = Vec::new();
    for v in [50.0f32, 230.0] {
        data.extend_from_slice(&v.to_be_bytes());
    }
    assert_eq!(inference.infer(&data), 2);
    let err = parse_table(&data, inference.as_ref(), &no_service, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    data.extend_from_slice(&231.0f32.to_be_bytes());
    let table = parse_table(&data, inference.as_ref(), &no_service, None).unwrap();
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.rows()[0], vec![50.0, 230.0, 231.0]);
}

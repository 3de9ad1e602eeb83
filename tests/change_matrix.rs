// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! End-to-end change matrix scenarios.

use changematrix::{
    crop::{crop, MosaicNoData},
    parallel::compute_all,
    ChangeMatrix, ChangeMatrixError, ChangeMatrixOp, ChangeMatrixParams, NoDataRange, Raster,
    Rect, Roi, SampleType, NODATA_CLASS,
};
use ndarray::{arr2, Array2};
use rayon::ThreadPoolBuilder;

fn byte_raster(rows: usize, cols: usize, f: impl Fn(usize, usize) -> u8) -> Raster {
    Raster::from_band(Array2::from_shape_fn((rows, cols), |(r, c)| f(r, c)))
}

/// Run an operation over the whole grid and freeze the matrix.
fn run(
    reference: &Raster,
    actual: &Raster,
    area: Option<&Raster>,
    params: &ChangeMatrixParams,
    cm: &ChangeMatrix,
) -> Result<changematrix::EncodedRaster, ChangeMatrixError> {
    let op = ChangeMatrixOp::new(reference, actual, area, params, cm)?;
    let out = compute_all(&op);
    cm.freeze();
    out
}

#[test]
fn test_encoding_and_counts() {
    let reference = byte_raster(12, 9, |r, c| ((r * 3 + c) % 5) as u8).with_tile_size(4, 4);
    let actual = byte_raster(12, 9, |r, c| ((r + 2 * c) % 5) as u8).with_tile_size(4, 4);
    let cm = ChangeMatrix::new(0..5);
    let out = run(&reference, &actual, None, &ChangeMatrixParams::new(10), &cm).unwrap();
    assert_eq!(out.sample_type(), SampleType::Byte);

    let mut expected = Array2::<u64>::zeros((5, 5));
    for r in 0..12 {
        for c in 0..9 {
            let rc = (r * 3 + c) % 5;
            let ac = (r + 2 * c) % 5;
            expected[[rc, ac]] += 1;
            assert_eq!(
                out.sample(c as i64, r as i64),
                Some((rc + 10 * ac) as i64),
                "pixel ({}, {})",
                c,
                r
            );
        }
    }
    for ((rc, ac), n) in expected.indexed_iter() {
        assert_eq!(cm.pair_count(rc as i32, ac as i32), *n);
    }
    assert_eq!(cm.total_registrations(), 12 * 9);
}

#[test]
fn test_repeat_is_deterministic() {
    let reference = byte_raster(30, 30, |r, c| ((r * c) % 7) as u8).with_tile_size(8, 8);
    let actual = byte_raster(30, 30, |r, c| ((r + c) % 7) as u8).with_tile_size(8, 8);
    let area = Raster::from_band(Array2::from_shape_fn((30, 30), |(r, _)| 1.0 + r as f64));
    let params = ChangeMatrixParams::new(7);

    let first = ChangeMatrix::new(0..7);
    let second = ChangeMatrix::new(0..7);
    let out1 = run(&reference, &actual, Some(&area), &params, &first).unwrap();
    let out2 = run(&reference, &actual, Some(&area), &params, &second).unwrap();

    assert_eq!(out1, out2);
    assert_eq!(first.pairs(), second.pairs());
}

#[test]
fn test_roi_exclusion() {
    let reference = byte_raster(10, 10, |_, c| (c % 3) as u8).with_tile_size(4, 4);
    let actual = byte_raster(10, 10, |r, _| (r % 3) as u8).with_tile_size(4, 4);
    let cm = ChangeMatrix::new(0..3);
    let params = ChangeMatrixParams::new(3).with_roi(Rect::new(2, 2, 4, 4));
    let out = run(&reference, &actual, None, &params, &cm).unwrap();

    assert_eq!(cm.total_registrations(), 16);
    for y in 0..10 {
        for x in 0..10 {
            let inside = (2..6).contains(&x) && (2..6).contains(&y);
            let value = out.sample(x, y).unwrap();
            if inside {
                assert_eq!(value, (x % 3) + 3 * (y % 3));
            } else {
                assert_eq!(value, i8::MIN as i64);
            }
        }
    }
}

#[test]
fn test_mask_roi() {
    let reference = byte_raster(6, 6, |_, _| 1);
    let actual = byte_raster(6, 6, |_, _| 2);
    let mask = Array2::from_shape_fn((6, 6), |(r, c)| (r + c) % 2 == 0);
    let cm = ChangeMatrix::new([1, 2]);
    let params = ChangeMatrixParams::new(5).with_roi(Roi::from_mask(0, 0, mask));
    let out = run(&reference, &actual, None, &params, &cm).unwrap();

    assert_eq!(cm.pair_count(1, 2), 18);
    assert_eq!(out.sample(0, 0), Some(11));
    assert_eq!(out.sample(1, 0), Some(i8::MIN as i64));
}

#[test]
fn test_nodata_substitution() {
    let reference = byte_raster(4, 4, |r, _| if r == 0 { 5 } else { 1 });
    let actual = byte_raster(4, 4, |_, c| if c == 0 { 5 } else { 2 });
    let cm = ChangeMatrix::new([1, 2]);
    let nodata = NoDataRange::new(4.0, 6.0, false, false).unwrap();
    let params = ChangeMatrixParams::new(10).with_nodata(nodata);
    let out = run(&reference, &actual, None, &params, &cm).unwrap();

    assert_eq!(cm.pair_count(NODATA_CLASS, NODATA_CLASS), 1);
    assert_eq!(cm.pair_count(NODATA_CLASS, 2), 3);
    assert_eq!(cm.pair_count(1, NODATA_CLASS), 3);
    assert_eq!(cm.pair_count(1, 2), 9);
    assert_eq!(cm.pair_count(5, 2), 0);
    assert_eq!(cm.total_registrations(), 16);

    let sentinel = i8::MIN;
    assert_eq!(
        out.array::<i8>().unwrap(),
        arr2(&[
            [sentinel, sentinel, sentinel, sentinel],
            [sentinel, 21, 21, 21],
            [sentinel, 21, 21, 21],
            [sentinel, 21, 21, 21],
        ])
    );
}

#[test]
fn test_nodata_overlapping_class_rejected() {
    let reference = byte_raster(2, 2, |_, _| 1);
    let cm = ChangeMatrix::new([1, 5]);
    let params = ChangeMatrixParams::new(10).with_nodata(NoDataRange::single(5.0).unwrap());
    let err = ChangeMatrixOp::new(&reference, &reference, None, &params, &cm)
        .err()
        .unwrap();
    assert!(matches!(err, ChangeMatrixError::Configuration(_)));
}

#[test]
fn test_multiplier_too_small() {
    let reference = byte_raster(4, 4, |_, _| 35);
    let actual = byte_raster(4, 4, |r, c| if r == 3 && c == 3 { 36 } else { 0 });
    let cm = ChangeMatrix::new([0, 35, 36]);
    let err = run(&reference, &actual, None, &ChangeMatrixParams::new(1), &cm)
        .err()
        .unwrap();
    assert!(matches!(err, ChangeMatrixError::IllegalInput { multiplier: 1, .. }));
    assert!(err.to_string().contains("should be bigger than the maximum class"));
}

#[test]
fn test_class_check_applies_outside_roi() {
    let reference = byte_raster(4, 4, |r, c| if r == 3 && c == 3 { 50 } else { 1 });
    let cm = ChangeMatrix::new([1]);
    let params = ChangeMatrixParams::new(10).with_roi(Rect::new(0, 0, 1, 1));
    let res = run(&reference, &reference, None, &params, &cm);
    assert!(matches!(res, Err(ChangeMatrixError::IllegalInput { class: 50, .. })));
}

#[test]
fn test_byte_promotion() {
    let reference = byte_raster(2, 2, |_, _| 11);
    let actual = byte_raster(2, 2, |_, _| 11);
    let cm = ChangeMatrix::new([11]);
    let out = run(&reference, &actual, None, &ChangeMatrixParams::new(11), &cm).unwrap();
    assert_eq!(out.sample_type(), SampleType::Short);
    assert_eq!(out.sample(1, 1), Some(11 + 11 * 11));

    let reference = byte_raster(2, 2, |_, _| 200);
    let cm = ChangeMatrix::new([200]);
    let out = run(&reference, &reference, None, &ChangeMatrixParams::new(200), &cm).unwrap();
    assert_eq!(out.sample_type(), SampleType::Int);
    assert_eq!(out.sample(0, 0), Some(200 + 200 * 200));
}

#[test]
fn test_ushort_promotion() {
    let reference = Raster::from_band(Array2::from_elem((2, 2), 255u16));
    let cm = ChangeMatrix::new([255]);
    let out = run(&reference, &reference, None, &ChangeMatrixParams::new(255), &cm).unwrap();
    assert_eq!(out.sample_type(), SampleType::UShort);
    assert_eq!(out.array::<u16>().unwrap()[[0, 0]], 65280);

    let reference = Raster::from_band(Array2::from_elem((2, 2), 256u16));
    let cm = ChangeMatrix::new([256]);
    let out = run(&reference, &reference, None, &ChangeMatrixParams::new(256), &cm).unwrap();
    assert_eq!(out.sample_type(), SampleType::Int);
    assert_eq!(out.sample(1, 0), Some(256 + 256 * 256));
}

#[test]
fn test_short_promotion() {
    let reference = Raster::from_band(arr2(&[[-5i16, 3]]));
    let actual = Raster::from_band(arr2(&[[180i16, 2]]));
    let cm = ChangeMatrix::new([]);
    let out = run(&reference, &actual, None, &ChangeMatrixParams::new(180), &cm).unwrap();
    assert_eq!(out.sample_type(), SampleType::Short);
    assert_eq!(out.sample(0, 0), Some(-5 + 180 * 180));

    let cm = ChangeMatrix::new([]);
    let out = run(&reference, &actual, None, &ChangeMatrixParams::new(181), &cm).unwrap();
    assert_eq!(out.sample_type(), SampleType::Int);
    assert_eq!(out.sample(1, 0), Some(3 + 181 * 2));
}

#[test]
fn test_constant_rasters() {
    let reference = byte_raster(50, 40, |_, _| 1).with_tile_size(16, 16);
    let actual = byte_raster(50, 40, |_, _| 0).with_tile_size(16, 16);
    let cm = ChangeMatrix::new([0, 1]);
    let out = run(&reference, &actual, None, &ChangeMatrixParams::new(100), &cm).unwrap();

    assert_eq!(cm.pair_count(1, 0), 50 * 40);
    assert_eq!(cm.total_registrations(), 50 * 40);
    assert_eq!(cm.num_pairs(), 1);
    assert_eq!(cm.pair_area(1, 0), 0.0);
    assert!(out.array::<i16>().unwrap().iter().all(|v| *v == 1));
}

#[test]
fn test_area_accumulation() {
    let reference = byte_raster(8, 8, |r, _| (r % 2) as u8).with_tile_size(3, 3);
    let actual = byte_raster(8, 8, |_, c| (c % 2) as u8).with_tile_size(3, 3);
    let area = Raster::from_band(Array2::from_elem((8, 8), 2.5));
    let cm = ChangeMatrix::new([0, 1]);
    run(&reference, &actual, Some(&area), &ChangeMatrixParams::new(2), &cm).unwrap();

    for rc in 0..2 {
        for ac in 0..2 {
            let n = cm.pair_count(rc, ac);
            assert_eq!(n, 16);
            assert_eq!(cm.pair_area(rc, ac), 2.5 * n as f64);
        }
    }
    assert_eq!(cm.total_area(), 2.5 * 64.0);
}

#[test]
fn test_concurrent_tiles() {
    let reference = byte_raster(200, 150, |r, c| ((r / 7 + c / 5) % 6) as u8).with_tile_size(16, 16);
    let actual = byte_raster(200, 150, |r, c| ((r * 31 + c * 17) % 6) as u8).with_tile_size(16, 16);
    let cm = ChangeMatrix::new(0..6);
    let op = ChangeMatrixOp::new(&reference, &actual, None, &ChangeMatrixParams::new(6), &cm).unwrap();

    let pool = ThreadPoolBuilder::new().num_threads(4).build().unwrap();
    pool.install(|| compute_all(&op)).unwrap();
    cm.freeze();

    let mut expected = Array2::<u64>::zeros((6, 6));
    for r in 0..200 {
        for c in 0..150 {
            expected[[(r / 7 + c / 5) % 6, (r * 31 + c * 17) % 6]] += 1;
        }
    }
    for ((rc, ac), n) in expected.indexed_iter() {
        assert_eq!(cm.pair_count(rc as i32, ac as i32), *n);
    }
    assert_eq!(cm.total_registrations(), 200 * 150);
}

#[test]
fn test_frozen_matrix_ignores_tiles() {
    let reference = byte_raster(4, 4, |_, _| 1);
    let cm = ChangeMatrix::new([1]);
    let op = ChangeMatrixOp::new(&reference, &reference, None, &ChangeMatrixParams::new(3), &cm).unwrap();
    cm.freeze();
    let out = compute_all(&op).unwrap();
    assert_eq!(out.sample(0, 0), Some(4));
    assert_eq!(cm.total_registrations(), 0);
}

#[test]
fn test_configuration_errors() {
    let reference = byte_raster(4, 4, |_, _| 1);
    let small = byte_raster(3, 4, |_, _| 1);
    let cm = ChangeMatrix::new([1]);
    let params = ChangeMatrixParams::new(3);

    let res = ChangeMatrixOp::new(&reference, &small, None, &params, &cm);
    assert!(matches!(res, Err(ChangeMatrixError::Configuration(_))));

    let multi = Raster::multi_band(0, 0, ndarray::Array3::<u8>::zeros((2, 4, 4)));
    let res = ChangeMatrixOp::new(&multi, &multi, None, &params, &cm);
    assert!(matches!(res, Err(ChangeMatrixError::Configuration(_))));

    let doubles = Raster::from_band(Array2::<f64>::zeros((4, 4)));
    let res = ChangeMatrixOp::new(&doubles, &doubles, None, &params, &cm);
    assert!(matches!(res, Err(ChangeMatrixError::Configuration(_))));

    let res = ChangeMatrixOp::new(&reference, &reference, None, &ChangeMatrixParams::new(0), &cm);
    assert!(matches!(res, Err(ChangeMatrixError::Configuration(_))));
}

#[test]
fn test_params_from_json() {
    let reference = byte_raster(6, 6, |r, _| (r % 3) as u8);
    let actual = byte_raster(6, 6, |_, c| (c % 3) as u8);
    let params = ChangeMatrixParams::from_json(
        r#"{"multiplier": 4, "roi": [{"x": 0, "y": 0, "width": 3, "height": 6}], "tile_size": 2}"#,
    )
    .unwrap();
    let cm = ChangeMatrix::new(0..3);
    let op = ChangeMatrixOp::new(&reference, &actual, None, &params, &cm).unwrap();
    assert_eq!(op.tile_grid().total_tiles(), 9);
    compute_all(&op).unwrap();
    cm.freeze();
    assert_eq!(cm.total_registrations(), 18);
}

#[test]
fn test_crop_then_compute() {
    let reference = byte_raster(10, 10, |r, c| ((r + c) % 4) as u8);
    let actual = byte_raster(10, 10, |_, _| 2);
    let nodata = MosaicNoData {
        range: NoDataRange::single(0.0).unwrap(),
        destination: 9.0,
    };
    let window = Rect::new(2, 2, 4, 4);
    let reference = crop(&reference, &window, None, Some(&nodata)).unwrap();
    let actual = crop(&actual, &window, None, None).unwrap();
    assert_eq!(reference.bounds(), window);

    let cm = ChangeMatrix::new(1..4);
    let params = ChangeMatrixParams::new(10).with_nodata(NoDataRange::single(9.0).unwrap());
    let out = run(&reference, &actual, None, &params, &cm).unwrap();

    // (x + y) % 4 == 0 became no-data
    assert_eq!(cm.pair_count(NODATA_CLASS, 2), 4);
    assert_eq!(cm.total_registrations(), 16);
    assert_eq!(out.sample(2, 2), Some(i8::MIN as i64));
    assert_eq!(out.sample(3, 2), Some(1 + 20));
}

#[test]
fn test_arrow_export() {
    let reference = byte_raster(3, 3, |_, c| c as u8);
    let actual = byte_raster(3, 3, |_, _| 1);
    let cm = ChangeMatrix::new(0..3);
    run(&reference, &actual, None, &ChangeMatrixParams::new(3), &cm).unwrap();
    let batch = cm.to_record_batch().unwrap();
    assert_eq!(batch.num_rows(), 3);
    assert_eq!(batch.schema().field(0).name(), "reference");
}

#[test]
fn test_nodata_ushort_destination() {
    let reference = Raster::from_band(arr2(&[[7u16, 1], [1, 1]]));
    let actual = Raster::from_band(arr2(&[[2u16, 7], [2, 2]]));
    let cm = ChangeMatrix::new([1, 2]);
    let params = ChangeMatrixParams::new(200).with_nodata(NoDataRange::single(7.0).unwrap());
    let out = run(&reference, &actual, None, &params, &cm).unwrap();

    assert_eq!(out.sample_type(), SampleType::UShort);
    assert_eq!(out.array::<u16>().unwrap(), arr2(&[[0u16, 0], [401, 401]]));
    assert_eq!(cm.pair_count(NODATA_CLASS, 2), 1);
    assert_eq!(cm.pair_count(1, NODATA_CLASS), 1);
    assert_eq!(cm.pair_count(1, 2), 2);
}

#[test]
fn test_nodata_byte_to_short_destination() {
    let reference = byte_raster(1, 3, |_, c| [5, 1, 5][c]);
    let actual = byte_raster(1, 3, |_, c| [2, 2, 5][c]);
    let cm = ChangeMatrix::new([1, 2]);
    let params = ChangeMatrixParams::new(11).with_nodata(NoDataRange::single(5.0).unwrap());
    let out = run(&reference, &actual, None, &params, &cm).unwrap();

    assert_eq!(out.sample_type(), SampleType::Short);
    assert_eq!(out.array::<i16>().unwrap(), arr2(&[[i16::MIN, 1 + 11 * 2, i16::MIN]]));
    assert_eq!(cm.pair_count(NODATA_CLASS, 2), 1);
    assert_eq!(cm.pair_count(NODATA_CLASS, NODATA_CLASS), 1);
}

#[test]
fn test_nodata_int_destination() {
    let reference = Raster::from_band(arr2(&[[-1i32, 0, 1]]));
    let actual = Raster::from_band(arr2(&[[1i32, -1, 1]]));
    let cm = ChangeMatrix::new([0, 1]);
    let params = ChangeMatrixParams::new(3).with_nodata(NoDataRange::single(-1.0).unwrap());
    let out = run(&reference, &actual, None, &params, &cm).unwrap();

    assert_eq!(out.sample_type(), SampleType::Int);
    assert_eq!(out.array::<i32>().unwrap(), arr2(&[[i32::MIN, i32::MIN, 4]]));
    assert_eq!(cm.pair_count(NODATA_CLASS, 1), 1);
    assert_eq!(cm.pair_count(0, NODATA_CLASS), 1);
    assert_eq!(cm.pair_count(1, 1), 1);
}

#[test]
fn test_nodata_ushort_to_int_destination() {
    let reference = Raster::from_band(arr2(&[[0u16, 3]]));
    let actual = Raster::from_band(arr2(&[[4u16, 5]]));
    let cm = ChangeMatrix::new([3, 4, 5]);
    let params = ChangeMatrixParams::new(300).with_nodata(NoDataRange::single(0.0).unwrap());
    let out = run(&reference, &actual, None, &params, &cm).unwrap();

    assert_eq!(out.sample_type(), SampleType::Int);
    assert_eq!(out.array::<i32>().unwrap(), arr2(&[[i32::MIN, 3 + 300 * 5]]));
    assert_eq!(cm.pair_count(NODATA_CLASS, 4), 1);
}

#[test]
fn test_roi_exclusion_ushort_sentinel() {
    let reference = Raster::from_band(Array2::from_elem((4, 4), 3u16));
    let actual = Raster::from_band(Array2::from_elem((4, 4), 4u16));
    let cm = ChangeMatrix::new([3, 4]);
    let params = ChangeMatrixParams::new(200).with_roi(Rect::new(0, 0, 2, 2));
    let out = run(&reference, &actual, None, &params, &cm).unwrap();

    assert_eq!(out.sample_type(), SampleType::UShort);
    assert_eq!(cm.pair_count(3, 4), 4);
    assert_eq!(out.sample(1, 1), Some(3 + 200 * 4));
    assert_eq!(out.sample(2, 1), Some(0));
    assert_eq!(out.sample(3, 3), Some(0));
}

#[test]
fn test_short_overflow_aborts() {
    let reference = Raster::from_band(arr2(&[[1i16, -200]]));
    let actual = Raster::from_band(arr2(&[[1i16, -181]]));
    let cm = ChangeMatrix::new([]);
    let err = run(&reference, &actual, None, &ChangeMatrixParams::new(180), &cm)
        .err()
        .unwrap();
    assert!(matches!(err, ChangeMatrixError::Internal(_)));
}

#[test]
fn test_int_large_multiplier_registers() {
    let reference = Raster::from_band(arr2(&[[50_000i32, 1]]));
    let actual = Raster::from_band(arr2(&[[50_000i32, 2]]));
    let cm = ChangeMatrix::new([]);
    let out = run(&reference, &actual, None, &ChangeMatrixParams::new(50_000), &cm).unwrap();
    assert_eq!(out.sample(1, 0), Some(100_001));
    assert_eq!(cm.pair_count(1, 2), 1);
    assert_eq!(cm.pair_count(50_000, 50_000), 1);
}

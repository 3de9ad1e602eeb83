// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Macros for dispatching over typed raster buffers.

/// Evaluate an expression with the typed array behind a [RasterData](crate::raster::RasterData).
#[macro_export]
macro_rules! with_band_array {
    ($data:expr, $var:ident => $e:expr) => {
        match $data {
            $crate::raster::RasterData::Byte($var) => $e,
            $crate::raster::RasterData::UShort($var) => $e,
            $crate::raster::RasterData::Short($var) => $e,
            $crate::raster::RasterData::Int($var) => $e,
            $crate::raster::RasterData::Float($var) => $e,
            $crate::raster::RasterData::Double($var) => $e,
        }
    };
}

/// Evaluate an expression with the typed array behind an
/// [EncodedData](crate::raster::EncodedData).
#[macro_export]
macro_rules! with_encoded_array {
    ($data:expr, $var:ident => $e:expr) => {
        match $data {
            $crate::raster::EncodedData::Byte($var) => $e,
            $crate::raster::EncodedData::UShort($var) => $e,
            $crate::raster::EncodedData::Short($var) => $e,
            $crate::raster::EncodedData::Int($var) => $e,
        }
    };
}

/// Dispatch a generic region kernel on (source, destination) sample types.
///
/// Each branch maps a source type to its element type and a destination
/// variant to its element type; the kernel is called as
/// `func::<Src, Dst>(args..., dest_view)`. Unlisted combinations yield `None`.
#[macro_export]
macro_rules! dispatch_region {
    (@call $func:ident, $st:ty, $dt:ty, $arr:ident, ($($arg:expr),*)) => {
        $func::<$st, $dt>($($arg,)* $arr.view_mut())
    };
    ($src:expr, $dst:expr, $func:ident $args:tt, {$($sty:ident($st:ty) => $dty:ident($dt:ty)),+$(,)?}) => {
        match ($src, $dst) {
            $(
                ($crate::types::SampleType::$sty, $crate::raster::EncodedData::$dty(arr)) => {
                    Some($crate::dispatch_region!(@call $func, $st, $dt, arr, $args))
                }
            )+
            _ => None,
        }
    };
}

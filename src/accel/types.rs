// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Pixel storage types and the numeric traits the kernels are generic over.
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Storage type of raster samples.
///
/// Variants are ordered by width, so promotions only ever move "up".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleType {
    Byte,
    UShort,
    Short,
    Int,
    Float,
    Double,
}

impl SampleType {
    /// Whether samples of this type can hold class identifiers.
    pub fn is_integral(self) -> bool {
        !matches!(self, SampleType::Float | SampleType::Double)
    }
}

impl Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleType::Byte => "byte",
            SampleType::UShort => "ushort",
            SampleType::Short => "short",
            SampleType::Int => "int",
            SampleType::Float => "float",
            SampleType::Double => "double",
        };
        f.write_str(name)
    }
}

/// Any sample that can live in a raster buffer.
pub trait RasterSample: Copy + Send + Sync + Default + 'static {
    const SAMPLE_TYPE: SampleType;

    fn to_f64(self) -> f64;

    /// Convert from a double, saturating at the type bounds.
    fn from_f64(value: f64) -> Self;
}

/// Source samples holding class identifiers.
pub trait ClassSample: RasterSample {
    fn class(self) -> i32;
}

/// Destination samples holding encoded transitions.
pub trait EncodedSample: RasterSample {
    /// Value written outside the ROI and for no-data transitions.
    const SENTINEL: Self;

    /// Narrow an encoded value, failing if it does not fit.
    fn from_encoded(value: i64) -> Option<Self>;

    /// Narrow an encoded value with two's complement wrapping.
    fn wrap_encoded(value: i64) -> Self;

    fn to_encoded(self) -> i64;
}

macro_rules! raster_sample {
    ($t:ty, $st:ident) => {
        impl RasterSample for $t {
            const SAMPLE_TYPE: SampleType = SampleType::$st;

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(value: f64) -> Self {
                value as $t
            }
        }
    };
}

macro_rules! class_sample {
    ($t:ty) => {
        impl ClassSample for $t {
            fn class(self) -> i32 {
                self as i32
            }
        }
    };
}

macro_rules! encoded_sample {
    ($t:ty, $sentinel:expr) => {
        impl EncodedSample for $t {
            const SENTINEL: Self = $sentinel;

            fn from_encoded(value: i64) -> Option<Self> {
                <$t>::try_from(value).ok()
            }

            fn wrap_encoded(value: i64) -> Self {
                value as $t
            }

            fn to_encoded(self) -> i64 {
                self as i64
            }
        }
    };
}

raster_sample!(u8, Byte);
raster_sample!(i8, Byte);
raster_sample!(u16, UShort);
raster_sample!(i16, Short);
raster_sample!(i32, Int);
raster_sample!(f32, Float);
raster_sample!(f64, Double);

class_sample!(u8);
class_sample!(u16);
class_sample!(i16);
class_sample!(i32);

encoded_sample!(i8, i8::MIN);
encoded_sample!(u16, 0);
encoded_sample!(i16, i16::MIN);
encoded_sample!(i32, i32::MIN);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_minimums() {
        assert_eq!(<i8 as EncodedSample>::SENTINEL, i8::MIN);
        assert_eq!(<u16 as EncodedSample>::SENTINEL, 0);
        assert_eq!(<i16 as EncodedSample>::SENTINEL, i16::MIN);
        assert_eq!(<i32 as EncodedSample>::SENTINEL, i32::MIN);
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(i8::from_encoded(127), Some(127));
        assert_eq!(i8::from_encoded(128), None);
        assert_eq!(u16::from_encoded(65535), Some(65535));
        assert_eq!(u16::from_encoded(-1), None);
        assert_eq!(i16::from_encoded(-32769), None);
        assert_eq!(i32::wrap_encoded(2_500_050_000), -1_794_917_296);
    }

    #[test]
    fn test_class_values_unsigned() {
        assert_eq!(200u8.class(), 200);
        assert_eq!(40000u16.class(), 40000);
        assert_eq!((-3i16).class(), -3);
    }

    #[test]
    fn test_type_ordering() {
        assert!(SampleType::Byte < SampleType::UShort);
        assert!(SampleType::UShort < SampleType::Short);
        assert!(SampleType::Short < SampleType::Int);
        assert!(!SampleType::Double.is_integral());
    }
}

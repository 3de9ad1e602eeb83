// This file is part of changematrix.
// Copyright (C) 2026 changematrix contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Arrow export of change matrices.
use std::sync::Arc;

use arrow::array::{Float64Array, Int32Array, RecordBatch, UInt64Array};
use arrow_schema::{DataType, Field, SchemaBuilder};
use log::*;

use super::ChangeMatrix;
use crate::errors::Result;

impl ChangeMatrix {
    /// Export the matrix as a table of `reference`, `actual`, `count`, and `area`.
    ///
    /// Rows are sorted by pair; no-data transitions appear with the
    /// no-data class in place of the missing side.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let pairs = self.pairs();
        debug!("exporting change matrix with {} pairs", pairs.len());

        let mut reference = Vec::with_capacity(pairs.len());
        let mut actual = Vec::with_capacity(pairs.len());
        let mut count = Vec::with_capacity(pairs.len());
        let mut area = Vec::with_capacity(pairs.len());
        for (pair, tally) in pairs {
            reference.push(pair.reference);
            actual.push(pair.actual);
            count.push(tally.count);
            area.push(tally.area);
        }

        let mut schema = SchemaBuilder::new();
        schema.push(Field::new("reference", DataType::Int32, false));
        schema.push(Field::new("actual", DataType::Int32, false));
        schema.push(Field::new("count", DataType::UInt64, false));
        schema.push(Field::new("area", DataType::Float64, false));
        let schema = schema.finish();

        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int32Array::from(reference)),
                Arc::new(Int32Array::from(actual)),
                Arc::new(UInt64Array::from(count)),
                Arc::new(Float64Array::from(area)),
            ],
        )?;
        Ok(batch)
    }
}

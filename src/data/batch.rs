//! Batch driver
//!
//! Partitions parallel input/target arrays into contiguous fixed-size
//! batches. Training epochs pass a fresh random permutation so inputs and
//! targets stay paired while sample order changes; validation passes run in
//! original order. The trailing remainder smaller than the batch size is
//! included unless `drop_last` is set.

use crate::{Error, Result};
use ndarray::{Array2, ArrayD, Axis, Slice};
use rand::seq::SliceRandom;
use rand::Rng;

/// One batch of samples
#[derive(Debug, Clone)]
pub struct Batch {
    pub inputs: ArrayD<f32>,
    pub targets: Array2<f32>,
}

/// One batch of id-keyed samples (image path)
#[derive(Debug, Clone)]
pub struct IdBatch {
    pub ids: Vec<String>,
    pub targets: Array2<f32>,
}

/// Random permutation of `0..n`, used to shuffle the training split once
/// per epoch
pub fn permutation<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    order
}

fn batch_count(n: usize, batch_size: usize, drop_last: bool) -> usize {
    if drop_last {
        n / batch_size
    } else {
        n.div_ceil(batch_size)
    }
}

fn check_plan(n: usize, targets: usize, batch_size: usize, order: Option<&[usize]>) -> Result<()> {
    if targets != n {
        return Err(Error::ShapeMismatch {
            expected: vec![n],
            got: vec![targets],
        });
    }
    if batch_size == 0 {
        return Err(Error::InvalidParameter(
            "batch size must be at least 1".into(),
        ));
    }
    if let Some(order) = order {
        if order.len() != n {
            return Err(Error::InvalidParameter(format!(
                "permutation length {} does not cover {} samples",
                order.len(),
                n
            )));
        }
    }
    Ok(())
}

/// Iterator over array batches
pub struct Batches<'a> {
    inputs: &'a ArrayD<f32>,
    targets: &'a Array2<f32>,
    order: Option<Vec<usize>>,
    batch_size: usize,
    num_batches: usize,
    cursor: usize,
}

impl<'a> Batches<'a> {
    /// Batches in original sample order (validation, evaluation)
    pub fn sequential(
        inputs: &'a ArrayD<f32>,
        targets: &'a Array2<f32>,
        batch_size: usize,
        drop_last: bool,
    ) -> Result<Self> {
        Self::build(inputs, targets, batch_size, drop_last, None)
    }

    /// Batches drawn through a caller-supplied permutation (training)
    pub fn with_order(
        inputs: &'a ArrayD<f32>,
        targets: &'a Array2<f32>,
        batch_size: usize,
        drop_last: bool,
        order: Vec<usize>,
    ) -> Result<Self> {
        Self::build(inputs, targets, batch_size, drop_last, Some(order))
    }

    fn build(
        inputs: &'a ArrayD<f32>,
        targets: &'a Array2<f32>,
        batch_size: usize,
        drop_last: bool,
        order: Option<Vec<usize>>,
    ) -> Result<Self> {
        let n = inputs.len_of(Axis(0));
        check_plan(n, targets.nrows(), batch_size, order.as_deref())?;
        Ok(Self {
            inputs,
            targets,
            order,
            batch_size,
            num_batches: batch_count(n, batch_size, drop_last),
            cursor: 0,
        })
    }

    /// Total number of batches this iterator will yield
    pub fn num_batches(&self) -> usize {
        self.num_batches
    }
}

impl Iterator for Batches<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.cursor >= self.num_batches {
            return None;
        }
        let n = self.targets.nrows();
        let start = self.cursor * self.batch_size;
        let end = (start + self.batch_size).min(n);
        self.cursor += 1;

        Some(match &self.order {
            Some(order) => {
                let idx = &order[start..end];
                Batch {
                    inputs: self.inputs.select(Axis(0), idx),
                    targets: self.targets.select(Axis(0), idx),
                }
            }
            None => Batch {
                inputs: self
                    .inputs
                    .slice_axis(Axis(0), Slice::from(start..end))
                    .to_owned(),
                targets: self
                    .targets
                    .slice_axis(Axis(0), Slice::from(start..end))
                    .to_owned(),
            },
        })
    }
}

/// Iterator over id-keyed batches, same partitioning as [`Batches`]
pub struct IdBatches<'a> {
    ids: &'a [String],
    targets: &'a Array2<f32>,
    order: Option<Vec<usize>>,
    batch_size: usize,
    num_batches: usize,
    cursor: usize,
}

impl<'a> IdBatches<'a> {
    /// Batches in original sample order
    pub fn sequential(
        ids: &'a [String],
        targets: &'a Array2<f32>,
        batch_size: usize,
        drop_last: bool,
    ) -> Result<Self> {
        Self::build(ids, targets, batch_size, drop_last, None)
    }

    /// Batches drawn through a caller-supplied permutation
    pub fn with_order(
        ids: &'a [String],
        targets: &'a Array2<f32>,
        batch_size: usize,
        drop_last: bool,
        order: Vec<usize>,
    ) -> Result<Self> {
        Self::build(ids, targets, batch_size, drop_last, Some(order))
    }

    fn build(
        ids: &'a [String],
        targets: &'a Array2<f32>,
        batch_size: usize,
        drop_last: bool,
        order: Option<Vec<usize>>,
    ) -> Result<Self> {
        check_plan(ids.len(), targets.nrows(), batch_size, order.as_deref())?;
        Ok(Self {
            ids,
            targets,
            order,
            batch_size,
            num_batches: batch_count(ids.len(), batch_size, drop_last),
            cursor: 0,
        })
    }

    /// Total number of batches this iterator will yield
    pub fn num_batches(&self) -> usize {
        self.num_batches
    }
}

impl Iterator for IdBatches<'_> {
    type Item = IdBatch;

    fn next(&mut self) -> Option<IdBatch> {
        if self.cursor >= self.num_batches {
            return None;
        }
        let n = self.ids.len();
        let start = self.cursor * self.batch_size;
        let end = (start + self.batch_size).min(n);
        self.cursor += 1;

        Some(match &self.order {
            Some(order) => {
                let idx = &order[start..end];
                IdBatch {
                    ids: idx.iter().map(|&i| self.ids[i].clone()).collect(),
                    targets: self.targets.select(Axis(0), idx),
                }
            }
            None => IdBatch {
                ids: self.ids[start..end].to_vec(),
                targets: self
                    .targets
                    .slice_axis(Axis(0), Slice::from(start..end))
                    .to_owned(),
            },
        })
    }
}

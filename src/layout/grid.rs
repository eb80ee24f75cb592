//! Grid placement and track sizing.

use super::resolve::{distribute, Basis};
use crate::css::scalar::{Scalar, Unit};
use crate::geometry::Axis;

/// Where one child sits in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub row: usize,
    pub column: usize,
    pub row_span: usize,
    pub column_span: usize,
}

/// Result of auto-placing children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPlan {
    pub columns: usize,
    pub rows: usize,
    pub cells: Vec<GridCell>,
}

/// Auto-place children left to right, top to bottom.
///
/// `spans` holds `(column_span, row_span)` per child. Column spans are
/// clamped to the column count. Rows are added as needed, so the plan never
/// has fewer than `min_rows` rows but may have more.
pub fn place(spans: &[(usize, usize)], columns: usize, min_rows: usize) -> GridPlan {
    let columns = columns.max(1);
    let mut occupied: Vec<Vec<bool>> = Vec::new();
    let mut cells = Vec::with_capacity(spans.len());
    let mut cursor = 0usize;

    for &(column_span, row_span) in spans {
        let column_span = column_span.clamp(1, columns);
        let row_span = row_span.max(1);
        let mut index = cursor;
        loop {
            let (row, column) = (index / columns, index % columns);
            if column + column_span <= columns && is_free(&occupied, row, column, row_span, column_span) {
                occupy(&mut occupied, columns, row, column, row_span, column_span);
                cells.push(GridCell { row, column, row_span, column_span });
                cursor = index + column_span;
                break;
            }
            index += 1;
        }
    }

    GridPlan { columns, rows: occupied.len().max(min_rows), cells }
}

fn is_free(occupied: &[Vec<bool>], row: usize, column: usize, rows: usize, columns: usize) -> bool {
    (row..row + rows).all(|r| {
        (column..column + columns).all(|c| !occupied.get(r).is_some_and(|line| line[c]))
    })
}

fn occupy(occupied: &mut Vec<Vec<bool>>, width: usize, row: usize, column: usize, rows: usize, columns: usize) {
    while occupied.len() < row + rows {
        occupied.push(vec![false; width]);
    }
    for line in &mut occupied[row..row + rows] {
        for cell in &mut line[column..column + columns] {
            *cell = true;
        }
    }
}

/// One scalar per track: the declared list repeated as needed, `1fr` when
/// nothing is declared.
pub fn tracks(declared: Option<&[Scalar]>, count: usize) -> Vec<Scalar> {
    match declared {
        Some(list) if !list.is_empty() => list.iter().copied().cycle().take(count).collect(),
        _ => vec![Scalar::fr(1.0); count],
    }
}

/// Track lengths along `axis`.
///
/// Fixed and relative tracks resolve against `basis`, `auto` tracks take the
/// matching entry of `auto_sizes`, and fractional tracks share whatever is
/// left of `total` after those and the gutters.
pub fn size_tracks(tracks: &[Scalar], total: i32, gutter: i32, axis: Axis, basis: Basis, auto_sizes: &[i32]) -> Vec<i32> {
    if tracks.is_empty() {
        return Vec::new();
    }
    let mut sizes = vec![0; tracks.len()];
    let mut weights = vec![0.0; tracks.len()];
    let mut used = gutter * (tracks.len() as i32 - 1);
    for (index, track) in tracks.iter().enumerate() {
        match track.unit {
            Unit::Fr => weights[index] = track.value.max(0.0),
            Unit::Auto => sizes[index] = auto_sizes.get(index).copied().unwrap_or(0),
            _ => sizes[index] = basis.resolve(*track, axis).unwrap_or(0),
        }
        used += sizes[index];
    }
    let shares = distribute((total - used).max(0), &weights);
    for (index, share) in shares.into_iter().enumerate() {
        if weights[index] > 0.0 {
            sizes[index] = share;
        }
    }
    sizes
}

/// Start offset of each track.
pub fn offsets(start: i32, sizes: &[i32], gutter: i32) -> Vec<i32> {
    let mut position = start;
    sizes
        .iter()
        .map(|size| {
            let here = position;
            position += size + gutter;
            here
        })
        .collect()
}

/// Length covered by `span` tracks from `first`, gutters between them included.
pub fn span_length(sizes: &[i32], first: usize, span: usize, gutter: i32) -> i32 {
    let end = (first + span).min(sizes.len());
    let covered = sizes.get(first..end).unwrap_or_default();
    covered.iter().sum::<i32>() + gutter * (covered.len() as i32 - 1).max(0)
}

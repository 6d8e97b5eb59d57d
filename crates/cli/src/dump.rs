//! Roadmap dumps: one row per live node with id, dimension, validity (if
//! evaluated) and coordinates `x0..x{d-1}`. Invalid nodes are deleted from the
//! roadmap, so they never appear. CSV by default, Parquet when the path ends in
//! `.parquet`.

use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

use mgsearch::roadmap::Roadmap;

pub fn roadmap_frame(roadmap: &Roadmap) -> Result<DataFrame> {
    let d = roadmap.dimension();
    let mut ids = Vec::new();
    let mut valid = Vec::new();
    let mut coords: Vec<Vec<f64>> = vec![Vec::new(); d];
    for node in roadmap.nodes() {
        ids.push(node.id.0 as u64);
        valid.push(node.validity);
        for (i, x) in node.config.iter().enumerate() {
            coords[i].push(*x);
        }
    }
    let n = ids.len();
    let mut columns = vec![
        Series::new("id".into(), ids),
        Series::new("dim".into(), vec![d as u32; n]),
        Series::new("valid".into(), valid),
    ];
    for (i, xs) in coords.into_iter().enumerate() {
        columns.push(Series::new(format!("x{i}").into(), xs));
    }
    Ok(DataFrame::new(columns)?)
}

fn is_parquet(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "parquet")
}

pub fn write_roadmap(roadmap: &Roadmap, path: &Path) -> Result<()> {
    let mut df = roadmap_frame(roadmap)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    if is_parquet(path) {
        ParquetWriter::new(&mut file)
            .finish(&mut df)
            .with_context(|| format!("writing {}", path.display()))?;
    } else {
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    tracing::info!(rows = df.height(), path = %path.display(), "roadmap_dump");
    Ok(())
}

/// Per-dump summary printed by `inspect`.
#[derive(Debug, Serialize, PartialEq)]
pub struct DumpSummary {
    pub nodes: usize,
    pub dimension: usize,
    pub valid: usize,
    pub unchecked: usize,
    /// Per-coordinate (min, max).
    pub extent: Vec<(f64, f64)>,
}

pub fn summarize(path: &Path) -> Result<DumpSummary> {
    let lf = if is_parquet(path) {
        LazyFrame::scan_parquet(path, ScanArgsParquet::default())
    } else {
        LazyCsvReader::new(path)
            .with_infer_schema_length(Some(100))
            .finish()
    };
    let df = lf
        .with_context(|| format!("opening {}", path.display()))?
        .collect()?;
    let coord_cols: Vec<String> = df
        .get_column_names()
        .iter()
        .filter(|c| c.starts_with('x'))
        .map(|c| c.to_string())
        .collect();
    let valid = match df.column("valid")?.bool() {
        Ok(ca) => ca.into_iter().filter(|v| *v == Some(true)).count(),
        // an all-empty column is not inferred as boolean
        Err(_) => 0,
    };
    let unchecked = df.height() - valid;
    let mut extent = Vec::with_capacity(coord_cols.len());
    for c in &coord_cols {
        let s = df.column(c)?.cast(&DataType::Float64)?;
        let ca = s.f64()?;
        extent.push((
            ca.min().unwrap_or(f64::NAN),
            ca.max().unwrap_or(f64::NAN),
        ));
    }
    Ok(DumpSummary {
        nodes: df.height(),
        dimension: coord_cols.len(),
        valid,
        unchecked,
        extent,
    })
}

//! Columnar batch decoding and output framing.
//!
//! Every column is strictly cast to the type the filters need. A failed cast
//! or a missing column aborts the whole batch. Nulls in score columns decode
//! to NaN, and nulls in count or label columns to `None`, so they fail only
//! the cuts of their own row. A null `objectId` is fatal.

use std::{fs::File, path::Path};

use polars::prelude::{
    CsvWriter, DataFrame, DataType, NamedFrom, ParquetReader, SerReader, SerWriter, Series,
};
use tracing::{debug, info};

use crate::{
    alerts::{Alert, DiffSign, HistoryEntry, HistorySeries, SnRow},
    error::{FilterError, FilterResult},
};

pub fn read_parquet(path: &Path) -> FilterResult<DataFrame> {
    let file = File::open(path).map_err(polars::prelude::PolarsError::from)?;
    let df = ParquetReader::new(file).finish()?;
    debug!(path = %path.display(), rows = df.height(), "read alert partition");
    Ok(df)
}

/// Decode the inputs of the kilonova filter.
pub fn decode_alerts(df: &DataFrame) -> FilterResult<Vec<Alert>> {
    let object_ids = str_values(df, "objectId")?;
    let rfscore = f64_values(df, "rfscore")?;
    let snn_snia_vs_nonia = f64_values(df, "snn_snia_vs_nonia")?;
    let snn_sn_vs_all = f64_values(df, "snn_sn_vs_all")?;
    let drb = f64_values(df, "drb")?;
    let classtar = f64_values(df, "classtar")?;
    let jdstarthist = f64_values(df, "jdstarthist")?;
    let ndethist = opt_i64_values(df, "ndethist")?;
    let cdsxmatch = opt_str_values(df, "cdsxmatch")?;
    let ra = f64_values(df, "ra")?;
    let dec = f64_values(df, "dec")?;
    let ssdistnr = f64_values(df, "ssdistnr")?;

    let histories = decode_histories(df)?;

    let mut alerts = Vec::with_capacity(df.height());
    for (row, history) in histories.into_iter().enumerate() {
        alerts.push(Alert {
            object_id: object_ids[row].clone(),
            rfscore: rfscore[row],
            snn_snia_vs_nonia: snn_snia_vs_nonia[row],
            snn_sn_vs_all: snn_sn_vs_all[row],
            drb: drb[row],
            classtar: classtar[row],
            jdstarthist: jdstarthist[row],
            ndethist: ndethist[row],
            cdsxmatch: cdsxmatch[row].clone(),
            ra: ra[row],
            dec: dec[row],
            ssdistnr: ssdistnr[row],
            history,
        });
    }
    Ok(alerts)
}

/// Decode the inputs of the supernova filter. `objectId` is optional.
pub fn decode_sn_rows(df: &DataFrame) -> FilterResult<Vec<SnRow>> {
    let object_ids = if df.column("objectId").is_ok() {
        Some(str_values(df, "objectId")?)
    } else {
        None
    };
    let cdsxmatch = opt_str_values(df, "cdsxmatch")?;
    let snn_snia_vs_nonia = f64_values(df, "snn_snia_vs_nonia")?;
    let snn_sn_vs_all = f64_values(df, "snn_sn_vs_all")?;
    let drb = f64_values(df, "drb")?;
    let classtar = f64_values(df, "classtar")?;
    let jd = f64_values(df, "jd")?;
    let jdstarthist = f64_values(df, "jdstarthist")?;
    let roid = opt_i64_values(df, "roid")?;
    let ndethist = opt_i64_values(df, "ndethist")?;

    Ok((0..df.height())
        .map(|row| SnRow {
            object_id: object_ids.as_ref().map(|ids| ids[row].clone()),
            cdsxmatch: cdsxmatch[row].clone(),
            snn_snia_vs_nonia: snn_snia_vs_nonia[row],
            snn_sn_vs_all: snn_sn_vs_all[row],
            drb: drb[row],
            classtar: classtar[row],
            jd: jd[row],
            jdstarthist: jdstarthist[row],
            roid: roid[row],
            ndethist: ndethist[row],
        })
        .collect())
}

/// Two-column frame pairing identifiers with a filter's output flag.
pub fn flag_frame(object_ids: &[String], flags: &[bool], flag_name: &str) -> FilterResult<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new("objectId".into(), object_ids.to_vec()),
        Series::new(flag_name.into(), flags.to_vec()),
    ])?;
    Ok(df)
}

pub fn write_csv(df: &mut DataFrame, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).finish(df)?;
    info!(path = %path.display(), rows = df.height(), "wrote filter flags");
    Ok(())
}

fn decode_histories(df: &DataFrame) -> FilterResult<Vec<HistorySeries>> {
    let jd = f64_lists(df, "cjdc")?;
    let fid = i64_lists(df, "cfidc")?;
    let magpsf = f64_lists(df, "cmagpsfc")?;
    let sigmapsf = f64_lists(df, "csigmapsfc")?;
    let magnr = f64_lists(df, "cmagnrc")?;
    let sigmagnr = f64_lists(df, "csigmagnrc")?;
    let magzpsci = f64_lists(df, "cmagzpscic")?;
    let isdiffpos = str_lists(df, "cisdiffposc")?;

    let mut histories = Vec::with_capacity(jd.len());
    for (row, times) in jd.iter().enumerate() {
        let expected = times.len();
        let lengths = [
            ("cfidc", fid[row].len()),
            ("cmagpsfc", magpsf[row].len()),
            ("csigmapsfc", sigmapsf[row].len()),
            ("cmagnrc", magnr[row].len()),
            ("csigmagnrc", sigmagnr[row].len()),
            ("cmagzpscic", magzpsci[row].len()),
            ("cisdiffposc", isdiffpos[row].len()),
        ];
        if let Some((column, found)) = lengths.iter().find(|(_, len)| *len != expected) {
            return Err(FilterError::RaggedHistory {
                row,
                column: *column,
                expected,
                found: *found,
            });
        }

        let mut entries = Vec::with_capacity(expected);
        for idx in 0..expected {
            let jd = times[idx].ok_or(FilterError::MissingValue { column: "cjdc", row })?;
            let fid = fid[row][idx].ok_or(FilterError::MissingValue { column: "cfidc", row })?;
            entries.push(HistoryEntry {
                jd,
                fid,
                magpsf: magpsf[row][idx].filter(|value| !value.is_nan()),
                sigmapsf: sigmapsf[row][idx].unwrap_or(f64::NAN),
                magnr: magnr[row][idx].unwrap_or(f64::NAN),
                sigmagnr: sigmagnr[row][idx].unwrap_or(f64::NAN),
                magzpsci: magzpsci[row][idx].unwrap_or(f64::NAN),
                isdiffpos: isdiffpos[row][idx]
                    .as_deref()
                    .map(DiffSign::parse)
                    .unwrap_or(DiffSign::Negative),
            });
        }
        histories.push(HistorySeries::new(entries));
    }
    Ok(histories)
}

fn f64_values(df: &DataFrame, name: &'static str) -> FilterResult<Vec<f64>> {
    let cast = df.column(name)?.strict_cast(&DataType::Float64)?;
    Ok(cast
        .f64()?
        .into_iter()
        .map(|value| value.unwrap_or(f64::NAN))
        .collect())
}

fn opt_i64_values(df: &DataFrame, name: &'static str) -> FilterResult<Vec<Option<i64>>> {
    let cast = df.column(name)?.strict_cast(&DataType::Int64)?;
    Ok(cast.i64()?.into_iter().collect())
}

fn opt_str_values(df: &DataFrame, name: &'static str) -> FilterResult<Vec<Option<String>>> {
    let cast = df.column(name)?.strict_cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

fn str_values(df: &DataFrame, name: &'static str) -> FilterResult<Vec<String>> {
    opt_str_values(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| value.ok_or(FilterError::MissingValue { column: name, row }))
        .collect()
}

fn f64_lists(df: &DataFrame, name: &'static str) -> FilterResult<Vec<Vec<Option<f64>>>> {
    let cast = df
        .column(name)?
        .strict_cast(&DataType::List(Box::new(DataType::Float64)))?;
    let mut out = Vec::with_capacity(cast.len());
    for (row, inner) in cast.list()?.into_iter().enumerate() {
        let inner = inner.ok_or(FilterError::MissingValue { column: name, row })?;
        out.push(inner.f64()?.into_iter().collect());
    }
    Ok(out)
}

fn i64_lists(df: &DataFrame, name: &'static str) -> FilterResult<Vec<Vec<Option<i64>>>> {
    let cast = df
        .column(name)?
        .strict_cast(&DataType::List(Box::new(DataType::Int64)))?;
    let mut out = Vec::with_capacity(cast.len());
    for (row, inner) in cast.list()?.into_iter().enumerate() {
        let inner = inner.ok_or(FilterError::MissingValue { column: name, row })?;
        out.push(inner.i64()?.into_iter().collect());
    }
    Ok(out)
}

fn str_lists(df: &DataFrame, name: &'static str) -> FilterResult<Vec<Vec<Option<String>>>> {
    let cast = df
        .column(name)?
        .strict_cast(&DataType::List(Box::new(DataType::String)))?;
    let mut out = Vec::with_capacity(cast.len());
    for (row, inner) in cast.list()?.into_iter().enumerate() {
        let inner = inner.ok_or(FilterError::MissingValue { column: name, row })?;
        out.push(
            inner
                .str()?
                .into_iter()
                .map(|value| value.map(str::to_string))
                .collect(),
        );
    }
    Ok(out)
}

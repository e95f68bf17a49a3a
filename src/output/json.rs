//! JSON representation of grid data.
//!
//! The document lists the axes first and then one entry per
//! (parameter, time, level) field, each holding the grid values row by row
//! starting at the bottom left corner.
use std::io::Write;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::OutputError;
use crate::config::Producer;
use crate::descriptors::Level;
use crate::grid::{GridData, LonLat, MISSING_VALUE};

#[derive(Debug, Serialize)]
struct GridDocument<'a> {
    producer: &'a Producer,
    origin_time: NaiveDateTime,
    valid_times: &'a [NaiveDateTime],
    parameters: Vec<ParameterEntry>,
    levels: &'a [Level],
    grid: GridEntry<'a>,
    missing_value: f32,
    fields: Vec<FieldEntry>,
}

#[derive(Debug, Serialize)]
struct ParameterEntry {
    id: u32,
    name: &'static str,
}

#[derive(Debug, Serialize)]
struct GridEntry<'a> {
    projection: &'a str,
    bottom_left: LonLat,
    top_right: LonLat,
    nx: usize,
    ny: usize,
}

#[derive(Debug, Serialize)]
struct FieldEntry {
    parameter: &'static str,
    time: NaiveDateTime,
    level: usize,
    values: Vec<f32>,
}

fn document(data: &GridData) -> GridDocument<'_> {
    let params = data.params().params();
    let times = data.times().times();
    let nlevels = data.levels().len();

    let mut fields = vec![];
    for (p, param) in params.iter().enumerate() {
        for (t, time) in times.iter().enumerate() {
            for l in 0..nlevels {
                fields.push(FieldEntry {
                    parameter: param.name(),
                    time: *time,
                    level: l,
                    values: data.field(p, t, l).to_vec(),
                });
            }
        }
    }

    let area = data.grid().area();
    GridDocument {
        producer: data.producer(),
        origin_time: data.times().origin(),
        valid_times: times,
        parameters: params.iter().map(|p| ParameterEntry { id: p.id(), name: p.name() }).collect(),
        levels: data.levels().levels(),
        grid: GridEntry {
            projection: area.projection().definition(),
            bottom_left: area.bottom_left_latlon(),
            top_right: area.top_right_latlon(),
            nx: data.grid().nx(),
            ny: data.grid().ny(),
        },
        missing_value: MISSING_VALUE,
        fields,
    }
}

/// Write `data` as pretty printed JSON
pub fn write_json<W: Write>(data: &GridData, writer: W) -> Result<(), OutputError> {
    serde_json::to_writer_pretty(writer, &document(data))?;
    Ok(())
}

pub fn to_json_value(data: &GridData) -> Result<serde_json::Value, OutputError> {
    Ok(serde_json::to_value(document(data))?)
}

//! Command line interface definitions
use std::path::{Path, PathBuf};

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use odim_grid::config::{OptionOverrides, Producer, ProducerOverride};
use odim_grid::output::OutputFormat;

use crate::errors::CliError;

/// Convert an OPERA (ODIM_H5) radar file into gridded data.
///
/// Composites and other Cartesian products keep their own grid unless
/// --projection asks for a different one; polar volumes are placed on an
/// azimuthal equidistant grid centered on the radar.
#[derive(Debug, Parser)]
#[command(name = "odim2grid", version)]
pub(crate) struct Cli {
    /// The ODIM_H5 file to convert. A file ending in .json is read as a JSON
    /// attribute dump, and "-" reads such a dump from standard input.
    #[clap(value_name = "INFILE", conflicts_with = "infile")]
    pub(crate) infile_pos: Option<PathBuf>,

    /// Where to write the grid data. "-" writes JSON to standard output.
    #[clap(value_name = "OUTFILE", conflicts_with = "outfile")]
    pub(crate) outfile_pos: Option<PathBuf>,

    /// The input file, as an alternative to the first positional argument
    #[clap(short = 'i', long)]
    pub(crate) infile: Option<PathBuf>,

    /// The output file, as an alternative to the second positional argument
    #[clap(short = 'o', long)]
    pub(crate) outfile: Option<PathBuf>,

    /// Output grid, given as "<projdef>:<LL_lon>,<LL_lat>,<UR_lon>,<UR_lat>:<nx>,<ny>",
    /// for example "+proj=stere +lat_0=90 +lon_0=20 +lat_ts=60:6,51.3,49,70.2:600,800".
    #[clap(short = 'P', long)]
    pub(crate) projection: Option<String>,

    /// Name of the numbered data groups without the number (default "dataset")
    #[clap(long = "datasetname")]
    pub(crate) dataset_prefix: Option<String>,

    /// Producer as "<number>,<name>", e.g. "1014,RADAR"
    #[clap(long, value_parser = parse_producer)]
    pub(crate) producer: Option<Producer>,

    /// Producer number; takes precedence over the number in --producer
    #[clap(long)]
    pub(crate) producer_number: Option<u32>,

    /// Producer name; takes precedence over the name in --producer
    #[clap(long)]
    pub(crate) producer_name: Option<String>,

    /// TOML file with conversion options. Command line flags override its values.
    #[clap(short = 'c', long)]
    pub(crate) config: Option<PathBuf>,

    /// Print the effective conversion options as TOML and exit
    #[clap(long)]
    pub(crate) print_config: bool,

    /// Output format. If not given, it is chosen from the output file extension
    /// (.nc or .nc4 for netCDF, JSON otherwise).
    #[clap(short = 'f', long)]
    pub(crate) format: Option<OutputFormat>,

    /// Also write log messages to this file
    #[clap(long)]
    pub(crate) log_file: Option<PathBuf>,

    #[command(flatten)]
    pub(crate) verbosity: Verbosity<WarnLevel>,
}

fn parse_producer(s: &str) -> Result<Producer, String> {
    s.parse::<Producer>().map_err(|e| e.to_string())
}

impl Cli {
    /// Collect the flags that override the configuration file
    pub(crate) fn overrides(&self) -> OptionOverrides {
        let (id, name) = match &self.producer {
            Some(p) => (Some(p.id), Some(p.name.clone())),
            None => (None, None),
        };

        OptionOverrides {
            dataset_prefix: self.dataset_prefix.clone(),
            projection: self.projection.clone(),
            producer: ProducerOverride {
                id: self.producer_number.or(id),
                name: self.producer_name.clone().or(name),
            },
        }
    }

    /// The input and output paths, from either the positional or the named arguments
    pub(crate) fn files(&self) -> Result<(&Path, &Path), CliError> {
        let infile = self.infile.as_deref().or(self.infile_pos.as_deref())
            .ok_or_else(|| CliError::usage_error("an input file is required"))?;
        let outfile = self.outfile.as_deref().or(self.outfile_pos.as_deref())
            .ok_or_else(|| CliError::usage_error("an output file is required"))?;
        Ok((infile, outfile))
    }
}

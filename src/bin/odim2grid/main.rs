use std::{
    io::{BufWriter, Write},
    path::Path,
    process::ExitCode,
};

use clap::Parser;
use error_stack::ResultExt;
use log::{error, info};
use odim_grid::{
    convert::{convert, ConvertError},
    grid::GridData,
    logging,
    output::{json::write_json, OutputError, OutputFormat},
    store::{AttributeStore, MemoryStore},
    ConvertOptions,
};

use cli::Cli;
use errors::CliError;

mod cli;
mod errors;

fn main() -> ExitCode {
    let clargs = Cli::parse();
    if let Err(msg) = logging::init_logging(clargs.verbosity.log_level_filter(), clargs.log_file.as_deref()) {
        eprintln!("{msg}");
        return ExitCode::FAILURE;
    }

    match driver(clargs) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("\nodim2grid failed:\n\n{e:?}\n");
            ExitCode::FAILURE
        }
    }
}

fn driver(clargs: Cli) -> error_stack::Result<(), CliError> {
    let options = ConvertOptions::load(clargs.config.as_deref(), &clargs.overrides())
        .change_context_lazy(|| CliError::usage_error("could not set up the conversion options"))?;

    if clargs.print_config {
        let text = options.to_toml_string()
            .change_context_lazy(|| CliError::internal_error("could not serialize the conversion options"))?;
        print!("{text}");
        return Ok(());
    }

    let (infile, outfile) = clargs.files()?;
    let store = open_input(infile)?;

    let data = convert(store.as_ref(), &options).map_err(|e| {
        let context = match e.current_context() {
            ConvertError::OptionsError(_) => CliError::usage_error("the conversion options are not usable"),
            ConvertError::InputError(_) => CliError::input_error(format!("could not convert {}", infile.display())),
            ConvertError::InternalError(_) => CliError::internal_error("the conversion failed unexpectedly"),
        };
        e.change_context(context)
    })?;
    // Release the input before writing, in case the output replaces it
    drop(store);

    write_output(&data, outfile, clargs.format)?;
    info!("Wrote {}", outfile.display());
    Ok(())
}

fn open_input(infile: &Path) -> error_stack::Result<Box<dyn AttributeStore>, CliError> {
    if infile == Path::new("-") {
        let store = MemoryStore::from_json_reader(std::io::stdin().lock())
            .change_context_lazy(|| CliError::input_error("could not read a JSON attribute dump from standard input"))?;
        return Ok(Box::new(store));
    }

    if !infile.exists() {
        return Err(CliError::input_error(format!("input file {} does not exist", infile.display())).into());
    }

    if infile.extension().is_some_and(|ext| ext == "json") {
        let store = MemoryStore::from_json_file(infile)
            .change_context_lazy(|| CliError::input_error(format!("could not read {}", infile.display())))?;
        Ok(Box::new(store))
    } else {
        open_odim(infile)
    }
}

#[cfg(feature = "netcdf")]
fn open_odim(infile: &Path) -> error_stack::Result<Box<dyn AttributeStore>, CliError> {
    let store = odim_grid::store::NcStore::open(infile)
        .change_context_lazy(|| CliError::input_error(format!("could not open {} as HDF5", infile.display())))?;
    Ok(Box::new(store))
}

#[cfg(not(feature = "netcdf"))]
fn open_odim(infile: &Path) -> error_stack::Result<Box<dyn AttributeStore>, CliError> {
    Err(CliError::usage_error(format!(
        "cannot read {}: this build only reads JSON attribute dumps, rebuild with the 'netcdf' feature to read HDF5 files",
        infile.display()
    )).into())
}

fn write_output(data: &GridData, outfile: &Path, format: Option<OutputFormat>) -> error_stack::Result<(), CliError> {
    let res = if outfile == Path::new("-") {
        write_json(data, std::io::stdout().lock())
    } else {
        match format.unwrap_or_else(|| OutputFormat::from_path(outfile)) {
            OutputFormat::Json => write_json_file(data, outfile),
            OutputFormat::Netcdf => write_netcdf_file(data, outfile),
        }
    };
    res.change_context_lazy(|| CliError::runtime_error(format!("could not write {}", outfile.display())))
}

fn write_json_file(data: &GridData, outfile: &Path) -> Result<(), OutputError> {
    let io_err = |e: std::io::Error| OutputError::Io { path: outfile.display().to_string(), reason: e.to_string() };
    let mut writer = BufWriter::new(std::fs::File::create(outfile).map_err(io_err)?);
    write_json(data, &mut writer)?;
    writer.flush().map_err(io_err)
}

#[cfg(feature = "netcdf")]
fn write_netcdf_file(data: &GridData, outfile: &Path) -> Result<(), OutputError> {
    odim_grid::output::nc::write_netcdf(data, outfile)
}

#[cfg(not(feature = "netcdf"))]
fn write_netcdf_file(_data: &GridData, _outfile: &Path) -> Result<(), OutputError> {
    Err(OutputError::Unavailable(OutputFormat::Netcdf))
}

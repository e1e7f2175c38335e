use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Builds the S3M static-data NetCDF file from a DEM and its auxiliary layers
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON settings file
    #[arg(long = "settings-file", alias = "settings_file", default_value = "configuration.json")]
    pub settings_file: PathBuf,

    /// Log the value range of every regridded layer
    #[arg(long)]
    pub debug_regrid: bool,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

pub fn get_args() -> Args {
    Args::parse_from(normalize_args(std::env::args_os()))
}

// Accept the historical single-dash `-settings_file` spelling
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some("-settings_file") => OsString::from("--settings_file"),
            Some(s) if s.starts_with("-settings_file=") => OsString::from(format!("-{}", s)),
            _ => arg,
        })
        .collect()
}

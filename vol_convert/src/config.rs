use std::path::PathBuf;

use clap::ArgMatches;
use volren_lib::volumetric::{RawParams, ValueType};

/// Conversion job
/// Config is built from args parsed by `clap`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub width: u16,
    pub height: u16,
    pub depth: u16,
    pub value_type: ValueType,
}

fn dimension(args: &ArgMatches, key: &str) -> Result<u16, String> {
    let value = args.value_of(key).ok_or_else(|| format!("missing {key}"))?;
    value.parse().map_err(|_| format!("{key} `{value}` does not fit into 16 bits"))
}

impl Config {
    pub fn from_args(args: &ArgMatches) -> Result<Config, String> {
        let input_file = args.value_of_os("input-file").ok_or("missing input file")?.into();
        let output_file = args.value_of_os("output-file").ok_or("missing output file")?.into();
        let value_type = args
            .value_of("input-type")
            .ok_or("missing input type")?
            .parse::<ValueType>()
            .map_err(|e| e.to_string())?;

        Ok(Config {
            input_file,
            output_file,
            width: dimension(args, "width")?,
            height: dimension(args, "height")?,
            depth: dimension(args, "depth")?,
            value_type,
        })
    }

    pub fn raw_params(&self) -> RawParams {
        RawParams {
            width: self.width as usize,
            height: self.height as usize,
            depth: self.depth as usize,
            value_type: self.value_type,
        }
    }
}

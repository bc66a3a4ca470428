//! Argument parsing
//! Uses library `clap`

use std::path::PathBuf;

use clap::{Arg, ArgMatches, Command, ValueHint};
use volren_lib::volumetric::RawParams;

pub const DEFAULT_SETTINGS_FILE: &str = "vol_app.json";

pub fn is_raw_arg(arg: &str) -> Result<(), String> {
    parse_raw_arg(arg).map(|_| ())
}

/// `WxHxD:TYPE`, for example `256x256x113:uint8`
pub fn parse_raw_arg(arg: &str) -> Result<RawParams, String> {
    arg.parse().map_err(|e| format!("{e}"))
}

pub fn get_command<'a>() -> Command<'a> {
    Command::new("Vol-app")
        .author("Michal Majer")
        .version("0.1.0")
        .about("Interactive volume viewer")
        .arg(
            Arg::new("file")
                .help("Frame or cube file to open, a generated volume is shown without it")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("raw")
                .help("Read FILE as headerless samples, detected from a `.raw` file name when omitted")
                .long("raw")
                .value_name("WxHxD:TYPE")
                .requires("file")
                .validator(is_raw_arg),
        )
        .arg(
            Arg::new("settings")
                .help("Settings file, created when missing")
                .long("settings")
                .value_name("PATH")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath),
        )
}

#[derive(Debug)]
pub struct Config {
    pub file: Option<PathBuf>,
    pub raw: Option<RawParams>,
    pub settings: PathBuf,
}

impl Config {
    pub fn from_args(args: &ArgMatches) -> Result<Config, String> {
        let raw = match args.value_of("raw") {
            Some(arg) => Some(parse_raw_arg(arg)?),
            None => None,
        };
        Ok(Config {
            file: args.value_of_os("file").map(PathBuf::from),
            raw,
            settings: args
                .value_of_os("settings")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE)),
        })
    }
}

//! Argument parsing and validation
//! Uses library `clap`

use clap::{Arg, Command, ValueHint};
use volren_lib::volumetric::ValueType;

// volume side stored as u16 in the frame header
pub fn is_dimension(num: &str) -> Result<(), String> {
    match num.parse::<u32>() {
        Ok(0) => Err("Dimension must be greater than 0".into()),
        Ok(n) if n > u16::MAX as u32 => Err(format!("Dimension must be at most {}", u16::MAX)),
        Ok(_) => Ok(()),
        Err(_) => Err("Number required".into()),
    }
}

pub fn is_value_type(name: &str) -> Result<(), String> {
    name.parse::<ValueType>().map(|_| ()).map_err(|e| e.to_string())
}

pub fn get_command<'a>() -> Command<'a> {
    Command::new("Vol-convert")
        .author("Michal Majer")
        .version("0.1.0")
        .about("Repacks raw volume samples into a frame file")
        .arg(
            Arg::new("input-file")
                .help("Headerless file with samples, x fastest")
                .required(true)
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("input-type")
                .help("Type of samples (int8, uint8, int16, uint16, int32, uint32, float32)")
                .required(true)
                .value_name("TYPE")
                .validator(is_value_type),
        )
        .arg(Arg::new("width").required(true).validator(is_dimension))
        .arg(Arg::new("height").required(true).validator(is_dimension))
        .arg(Arg::new("depth").required(true).validator(is_dimension))
        .arg(
            Arg::new("output-file")
                .help("Frame file to write")
                .required(true)
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath),
        )
}

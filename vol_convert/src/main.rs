use std::process::ExitCode;

use volren_lib::{
    volumetric::{decode_raw, save_frame, DataSource, RawFrame},
    VolumeError,
};

mod args;
mod config;

use crate::{args::get_command, config::Config};

fn convert(cfg: &Config) -> Result<(), VolumeError> {
    let input = DataSource::from_file(&cfg.input_file)?;
    let samples = decode_raw(input.as_slice(), &cfg.raw_params())?;
    let frame = RawFrame::new(cfg.width, cfg.height, cfg.depth, samples)?;
    save_frame(&cfg.output_file, &frame)
}

pub fn main() -> ExitCode {
    env_logger::init();

    let args = get_command().get_matches();
    let cfg = match Config::from_args(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    log::info!("{:?}", cfg);

    match convert(&cfg) {
        Ok(()) => {
            println!(
                "Written {} ({}x{}x{} {})",
                cfg.output_file.display(),
                cfg.width,
                cfg.height,
                cfg.depth,
                cfg.value_type
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

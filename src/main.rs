use std::fs::File;

use anyhow::Context;
use log::info;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode, WriteLogger};

use epsilon::{app, create_clap_command, Config, DisplayTarget};

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let log_config = ConfigBuilder::new()
        .set_time_level(log::LevelFilter::Debug)
        .build();

    match config.target {
        // stdout belongs to the frame in terminal mode
        DisplayTarget::Terminal => {
            let file = File::create(&config.log_file).with_context(|| {
                format!("failed to create log file '{}'", config.log_file.display())
            })?;
            WriteLogger::init(config.log_level, log_config, file)
        }
        DisplayTarget::Window | DisplayTarget::Snapshot => TermLogger::init(
            config.log_level,
            log_config,
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
    }
    .context("failed to install logger")
}

fn main() -> anyhow::Result<()> {
    let matches = create_clap_command().get_matches();
    let config = Config::from_matches(&matches);
    init_logging(&config)?;

    info!("{:?}", config);
    config.validate().context("invalid configuration")?;
    app::run(&config).context("renderer stopped with an error")?;
    Ok(())
}

use camara::configuration::config::{CliArgs, Config};
use camara::controller::controller_handler::Controller;
use clap::Parser;
use log::{error, info};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Unable to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // RUST_LOG takes precedence over the configured level
    // https://docs.rs/env_logger/latest/env_logger/
    env_logger::Builder::new()
        .filter_level(config.log_level().unwrap_or(log::LevelFilter::Info))
        .parse_default_env()
        .format_target(false)
        .init();

    println!(
        "
 ██████╗ █████╗ ███╗   ███╗ █████╗ ██████╗  █████╗ 
██╔════╝██╔══██╗████╗ ████║██╔══██╗██╔══██╗██╔══██╗
██║     ███████║██╔████╔██║███████║██████╔╝███████║
██║     ██╔══██║██║╚██╔╝██║██╔══██║██╔══██╗██╔══██║
╚██████╗██║  ██║██║ ╚═╝ ██║██║  ██║██║  ██║██║  ██║
 ╚═════╝╚═╝  ╚═╝╚═╝     ╚═╝╚═╝  ╚═╝╚═╝  ╚═╝╚═╝  ╚═╝
===================================================
   Sessões, presenças e votações v{}
===================================================
",
        env!("CARGO_PKG_VERSION")
    );

    info!("Configuration loaded");

    let mut controller = match Controller::new(config) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Unable to create a controller instance: {}, exiting...", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = controller.run().await {
        error!("Error occured in the controller process: {}, exiting...", e);
        std::process::exit(1);
    }
}

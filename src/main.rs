//! npuctl - DCMI-based NPU management tool
//!
//! A command-line tool for inspecting Ascend NPU devices and managing
//! virtual NPU partitions.

use clap::Parser;
use npuctl::cli::args::{generate_completions, Cli, Commands};
use npuctl::commands::{
    driver_from_config, open_manager, run_check_name, run_chip, run_endpoint, run_info, run_list,
    run_vdev,
};
use npuctl::config::{Config, ConfigBuilder};
use npuctl::error::{AppError, DcmiError, DeviceError, NotFoundKind};

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    let result = build_config(&cli).and_then(|config| {
        if config.general.verbose {
            log::set_max_level(log::LevelFilter::Debug);
        }
        run(&cli, &config)
    });

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn build_config(cli: &Cli) -> Result<Config, AppError> {
    let endpoint = match &cli.command {
        Commands::Endpoint { uri } => uri.clone(),
        _ => None,
    };

    let config = ConfigBuilder::new()
        .with_file(cli.config.as_deref())?
        .with_verbose(cli.verbose.then_some(true))
        .with_device_type(cli.device_type)
        .with_library(cli.library.clone())
        .with_endpoint(endpoint)
        .build();
    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli, config: &Config) -> Result<(), AppError> {
    match &cli.command {
        Commands::Chip => run_chip(&mut driver_from_config(config), cli.format),

        Commands::List => with_manager(config, |mgr| run_list(mgr, cli.format)),

        Commands::Info(args) => with_manager(config, |mgr| run_info(mgr, args, cli.format)),

        Commands::Vdev(args) => with_manager(config, |mgr| run_vdev(mgr, args, cli.format)),

        Commands::Endpoint { .. } => run_endpoint(&config.container.endpoint, cli.format),

        Commands::CheckName { name } => run_check_name(name, cli.format),

        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
    }
}

/// Open the device manager, run `f`, and always shut the manager down
fn with_manager<F>(config: &Config, f: F) -> Result<(), AppError>
where
    F: FnOnce(&npuctl::DeviceManager<npuctl::dcmi::DcmiLibrary>) -> Result<(), AppError>,
{
    let manager = open_manager(config)?;
    let result = f(&manager);
    let shutdown = manager.shutdown();
    result?;
    shutdown?;
    Ok(())
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    let dcmi = match err {
        AppError::Dcmi(e) => Some(e),
        AppError::Device(e) => e.dcmi_source(),
        _ => None,
    };

    // Print helpful hints for common errors
    match (err, dcmi) {
        (_, Some(DcmiError::LibraryNotFound(_))) => {
            eprintln!();
            eprintln!("Hint: Make sure the Ascend driver is installed.");
            eprintln!("      Use --library or NPUCTL_LIBRARY to point at libdcmi.so.");
        }
        (_, Some(DcmiError::PermissionDenied(_))) => {
            eprintln!();
            eprintln!("Hint: Try running with sudo or as root.");
        }
        (AppError::Device(DeviceError::NotFound(NotFoundKind::NoHardware)), _) => {
            eprintln!();
            eprintln!("Hint: Make sure an Ascend NPU is installed.");
            eprintln!("      Check 'npu-smi info' for device detection.");
        }
        (AppError::Device(DeviceError::TypeMismatch { .. }), _) => {
            eprintln!();
            eprintln!("Hint: Drop --device-type or fix device.expected_type in the config file.");
        }
        _ => {}
    }
}

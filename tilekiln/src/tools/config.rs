use super::args::load_config;
use anyhow::Result;
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	#[command(subcommand)]
	sub_command: ConfigCommands,
}

#[derive(clap::Subcommand, Debug)]
enum ConfigCommands {
	/// Check a tileset definition, exiting with 0 if it is valid
	Test(Test),
}

#[derive(clap::Args, Debug)]
struct Test {
	/// Tileset definition file (YAML)
	#[arg(long, value_name = "FILE")]
	config: PathBuf,
}

pub fn run(command: &Subcommand) -> Result<()> {
	match &command.sub_command {
		ConfigCommands::Test(args) => {
			let config = load_config(&args.config, None)?;
			log::info!("'{}' defines {} layers", config.id(), config.layers().len());
		}
	}
	Ok(())
}

use predicates::{prelude::*, str};
use test_utilities::*;

fn sql_cmd(args: &[&str]) -> assert_cmd::Command {
	let mut cmd = tilekiln_cmd();
	cmd.arg("sql").arg("--config").arg(get_testdata("tileset.yaml")).args(args);
	cmd
}

#[test]
fn all_layers() -> Result<(), Box<dyn std::error::Error>> {
	let output = sql_cmd(&["-z", "10", "-x", "511", "-y", "340"]).assert().success();
	let stdout = String::from_utf8(output.get_output().stdout.clone())?;

	let water = stdout.find("SELECT ST_AsMVT(mvtgeom.*, 'water', 4096)").unwrap();
	let roads = stdout.find("SELECT ST_AsMVT(mvtgeom.*, 'roads', 1024)").unwrap();
	assert!(water < roads, "layers out of order:\n{stdout}");
	assert!(stdout.contains("FROM roads\n"));
	assert!(!stdout.contains("{{"));
	Ok(())
}

#[test]
fn one_layer() -> Result<(), Box<dyn std::error::Error>> {
	sql_cmd(&["--layer", "roads", "-z", "5", "-x", "1", "-y", "2"])
		.assert()
		.success()
		.stdout(str::contains("FROM roads_low").and(str::contains("'water'").not()));
	Ok(())
}

#[test]
fn layer_out_of_range() -> Result<(), Box<dyn std::error::Error>> {
	sql_cmd(&["--layer", "roads", "-z", "2", "-x", "1", "-y", "1"])
		.assert()
		.failure()
		.code(1)
		.stdout(str::is_empty())
		.stderr(str::contains("Zoom 2 not between min zoom 4 and max zoom 14 for layer roads."));
	Ok(())
}

#[test]
fn unknown_layer() -> Result<(), Box<dyn std::error::Error>> {
	sql_cmd(&["--layer", "rail", "-z", "5", "-x", "1", "-y", "1"])
		.assert()
		.failure()
		.code(1)
		.stderr(str::contains("Layer 'rail' not found in configuration"));
	Ok(())
}

#[test]
fn invalid_tile() -> Result<(), Box<dyn std::error::Error>> {
	sql_cmd(&["-z", "1", "-x", "2", "-y", "0"]).assert().failure().code(1);
	Ok(())
}

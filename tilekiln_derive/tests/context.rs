use anyhow::{Result, bail};
use tilekiln_derive::context;

#[context("parsing zoom '{}'", text)]
fn parse_zoom(text: &str) -> Result<u8> {
	let zoom: u8 = text.parse()?;
	if zoom > 31 {
		bail!("zoom {zoom} is too large");
	}
	Ok(zoom)
}

#[context("joining layer names")]
fn join(names: Vec<String>) -> Result<String> {
	if names.is_empty() {
		bail!("no layers");
	}
	Ok(names.into_iter().reduce(|a, b| a + "," + &b).unwrap_or_default())
}

#[context("rendering layer {layer}")]
async fn render(layer: &str, fail: bool) -> Result<String> {
	if fail {
		bail!("query failed");
	}
	Ok(format!("{layer} rendered"))
}

#[test]
fn sync_success_passes_through() {
	assert_eq!(parse_zoom("14").unwrap(), 14);
}

#[test]
fn sync_error_gets_context() {
	let err = parse_zoom("40").unwrap_err();
	assert_eq!(err.to_string(), "parsing zoom '40'");
	assert_eq!(err.root_cause().to_string(), "zoom 40 is too large");
}

#[test]
fn sync_body_may_consume_arguments() {
	assert_eq!(join(vec!["water".into(), "roads".into()]).unwrap(), "water,roads");
	assert_eq!(join(Vec::new()).unwrap_err().to_string(), "joining layer names");
}

#[tokio::test]
async fn async_error_gets_context() {
	assert_eq!(render("roads", false).await.unwrap(), "roads rendered");

	let err = render("water", true).await.unwrap_err();
	let chain: Vec<String> = err.chain().map(|e| e.to_string()).collect();
	assert_eq!(chain, vec!["rendering layer water", "query failed"]);
}

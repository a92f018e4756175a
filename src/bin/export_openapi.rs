use rust_oauth2_flows::{init_telemetry, openapi_from_config, Config};
use std::path::PathBuf;

fn default_output_path() -> PathBuf {
    PathBuf::from("docs/assets/openapi/openapi.json")
}

/// Usage: `export_openapi [OUTPUT] [CONFIG]`. Without a config path the usual
/// lookup applies (`$OAUTH2_CONFIG`, `oauth2.conf`, then environment).
fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_telemetry("export_openapi")?;

    let mut args = std::env::args().skip(1);
    let output_path = args.next().map(PathBuf::from).unwrap_or_else(default_output_path);

    let config = match args.next() {
        Some(path) => Config::from_hocon_path(path)?,
        None => Config::load(),
    };
    config.validate()?;

    let openapi = openapi_from_config(&config);
    let json = serde_json::to_string_pretty(&openapi)?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(&output_path, json)?;

    eprintln!(
        "Wrote OpenAPI spec to {}",
        output_path.canonicalize().unwrap_or(output_path).display()
    );

    Ok(())
}

use isbnscan_core::ScanError;

use super::ConfigArgs;

pub fn run(config_args: &ConfigArgs) -> Result<(), ScanError> {
    let config = config_args.resolve()?;
    let json = serde_json::to_string_pretty(&config)?;
    println!("{json}");
    Ok(())
}

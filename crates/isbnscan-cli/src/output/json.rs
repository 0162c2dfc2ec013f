use isbnscan_core::batch::BatchReport;
use isbnscan_core::ScanError;

pub fn print(report: &BatchReport) -> Result<(), ScanError> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

use super::delimiter::Delimiter;
use super::loader::parse_delimited;
use super::model::Dataset;

// ---------------------------------------------------------------------------
// Bundled example dataset
// ---------------------------------------------------------------------------

/// The restaurant tips dataset: one row per bill with `total_bill`, `tip`,
/// `sex`, `smoker`, `day`, `time` and party `size`.
const TIPS_CSV: &str = include_str!("../../assets/tips.csv");

/// Parse the bundled tips dataset.
///
/// The CSV is compiled into the binary, so a parse failure is a build
/// defect; it is logged and an empty dataset is returned.
pub fn tips() -> Dataset {
    parse_delimited(TIPS_CSV, Delimiter::Comma).unwrap_or_else(|e| {
        log::error!("Bundled tips dataset failed to parse: {e:#}");
        Dataset::default()
    })
}

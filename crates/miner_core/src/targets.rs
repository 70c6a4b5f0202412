use crate::ShopId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid shop id {entry:?} in target list")]
pub struct TargetParseError {
    pub entry: String,
}

/// Parse a comma-separated list of shop ids (e.g. `"216,68,105"`), keeping order.
/// Blank entries are skipped.
pub fn parse_shop_ids(raw: &str) -> Result<Vec<ShopId>, TargetParseError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry.parse::<ShopId>().map_err(|_| TargetParseError {
                entry: entry.to_string(),
            })
        })
        .collect()
}

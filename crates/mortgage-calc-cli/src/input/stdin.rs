use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialise piped input, or `None` when stdin is an interactive terminal
/// or carries nothing but whitespace.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

/// JSON documents start with `{`; anything else is read as YAML.
fn parse_piped<T: DeserializeOwned>(text: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    log::info!("reading input from stdin");
    let parsed = if trimmed.starts_with('{') {
        serde_json::from_str(trimmed).map_err(|e| format!("Failed to parse stdin as JSON: {e}"))?
    } else {
        serde_yaml::from_str(trimmed).map_err(|e| format!("Failed to parse stdin as YAML: {e}"))?
    };
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mortgage_calc_core::down_payment::calculator::{DownPaymentInput, DownPaymentTier};
    use rust_decimal::Decimal;

    #[test]
    fn test_blank_stdin_is_none() {
        let parsed: Option<DownPaymentInput> = parse_piped("  \n").unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn test_json_stdin() {
        let parsed: DownPaymentInput =
            parse_piped(r#"{"purchase_price": "450000", "tier": "20"}"#).unwrap().unwrap();
        assert_eq!(parsed.purchase_price, Some(Decimal::from(450_000)));
        assert_eq!(parsed.tier, DownPaymentTier::Pct20);
    }

    #[test]
    fn test_yaml_stdin() {
        let parsed: DownPaymentInput = parse_piped("purchase_price: \"450000\"\ntier: tiered\n")
            .unwrap()
            .unwrap();
        assert_eq!(parsed.tier, DownPaymentTier::Tiered);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(parse_piped::<DownPaymentInput>("{\"purchase_price\": ").is_err());
    }
}

//! Price quote for a single product: displayed price plus installment ladder.
//!
//! Input is the shape the data store returns for a product's prices:
//! `{ "base_price": "2000.00" | null, "variations": [{ "price": "999.00", ... }] }`.
//! Extra fields on the product or its variations are ignored.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

use psl_catalog::{compute_installments, resolve_price, PriceResolution};
use psl_core::Money;

/// Env var naming the input file when no path argument is given.
pub const INPUT_ENV: &str = "PSL_QUOTE_INPUT";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PricedVariation {
    pub price: Money,
}

/// A product's stored prices.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuoteInput {
    #[serde(default)]
    pub base_price: Option<Money>,
    #[serde(default)]
    pub variations: Vec<PricedVariation>,
}

impl QuoteInput {
    pub fn resolve(&self) -> PriceResolution {
        resolve_price(self.base_price, self.variations.iter().map(|v| v.price))
    }
}

/// Where to read the input from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// First CLI argument wins, then `PSL_QUOTE_INPUT`, then stdin. `-` means stdin.
    pub fn select(arg: Option<String>, env: Option<String>) -> Self {
        match arg.or(env).filter(|s| !s.trim().is_empty()) {
            Some(path) if path != "-" => InputSource::File(PathBuf::from(path)),
            _ => InputSource::Stdin,
        }
    }

    pub fn read(&self) -> anyhow::Result<QuoteInput> {
        let raw = match self {
            InputSource::Stdin => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read quote input from stdin")?;
                buf
            }
            InputSource::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read quote input from {}", path.display()))?,
        };
        parse_input(&raw)
    }
}

pub fn parse_input(raw: &str) -> anyhow::Result<QuoteInput> {
    serde_json::from_str(raw).context("quote input is not a valid product price document")
}

/// Render the quote as the storefront shows it.
pub fn render_quote(input: &QuoteInput) -> String {
    let price = input.resolve();
    let mut out = format!("Preço: {}\n", price.label());

    let ladder: Vec<_> = compute_installments(price.amount()).collect();
    if ladder.is_empty() {
        return out;
    }

    out.push_str("Opções de parcelamento:\n");
    for option in ladder {
        out.push_str(&format!("  {} ({})\n", option.label(), option.total_label()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variations_win_over_base_price() {
        let input = parse_input(
            r#"{
                "base_price": "2000.00",
                "variations": [
                    { "price": "1200.00", "barrel_length": "18\"" },
                    { "price": "1450.00" },
                    { "price": 999 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(
            input.resolve(),
            PriceResolution::StartingFrom(Money::from_cents(99_900))
        );
    }

    #[test]
    fn missing_fields_mean_no_price() {
        let input = parse_input("{}").unwrap();
        assert_eq!(input.resolve(), PriceResolution::NoPrice);
        assert_eq!(render_quote(&input), "Preço: N/A\n");
    }

    #[test]
    fn negative_prices_are_rejected() {
        let err = parse_input(r#"{ "base_price": "-1.00" }"#).unwrap_err();
        assert!(err.to_string().contains("not a valid product price document"));
    }

    #[test]
    fn prices_above_the_ceiling_are_rejected() {
        let err = parse_input(r#"{ "base_price": "79228162514264337593543950335" }"#).unwrap_err();
        assert!(err.to_string().contains("not a valid product price document"));

        let err = parse_input(r#"{ "variations": [{ "price": "300000000000000000000" }] }"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("exceeds the maximum"));
    }

    #[test]
    fn renders_full_ladder() {
        let input = parse_input(r#"{ "base_price": "1000.00", "variations": [] }"#).unwrap();
        let text = render_quote(&input);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "Preço: R$ 1.000,00");
        assert_eq!(lines[1], "Opções de parcelamento:");
        assert_eq!(lines.len(), 12);
        assert_eq!(lines[2], "  1x de R$ 1.000,00 (sem juros)");
        assert_eq!(lines[6], "  5x de R$ 216,00 (Total: R$ 1.080,00 (com juros de 8%))");
        assert_eq!(lines[11], "  10x de R$ 108,00 (Total: R$ 1.080,00 (com juros de 8%))");
    }

    #[test]
    fn input_source_precedence() {
        assert_eq!(
            InputSource::select(Some("a.json".into()), Some("b.json".into())),
            InputSource::File("a.json".into())
        );
        assert_eq!(
            InputSource::select(None, Some("b.json".into())),
            InputSource::File("b.json".into())
        );
        assert_eq!(InputSource::select(Some("-".into()), None), InputSource::Stdin);
        assert_eq!(InputSource::select(None, Some("  ".into())), InputSource::Stdin);
        assert_eq!(InputSource::select(None, None), InputSource::Stdin);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = InputSource::File("/nonexistent/quote.json".into())
            .read()
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/quote.json"));
    }
}

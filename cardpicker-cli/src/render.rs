//! Output formatting for picked cards.

use anyhow::{Context, Result};
use cardpicker_core::CardRecord;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One numbered line per card
    #[default]
    Text,
    /// A JSON array of card records
    Json,
}

pub fn render(cards: &[CardRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(cards)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(cards).context("Failed to serialize cards")
        }
    }
}

fn render_text(cards: &[CardRecord]) -> String {
    cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            format!(
                "NUM: {} ID: {} | Name: {} | Class: {} | Rarity: {} | Mana Cost: {}\n",
                i + 1,
                card.id,
                card.name,
                card.class,
                card.rarity,
                card.mana_cost
            )
        })
        .collect()
}

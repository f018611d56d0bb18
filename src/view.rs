//! Card rendering
//!
//! Terminal presentation of a product card for the demo binaries.

use std::io;

use ethers::{types::Address, utils::to_checksum};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{Color, Style, Theme, object::Rows},
};
use thiserror::Error;

use crate::card::ProductCard;

/// Errors that can occur while rendering a card.
#[derive(Debug, Error)]
pub enum ViewError {
    /// IO error
    #[error("IO error")]
    Io,
}

/// Write a rendered card table to `out`.
///
/// # Errors
///
/// Returns [`ViewError::Io`] if the card cannot be written.
pub fn write_card(mut out: impl io::Write, card: &ProductCard) -> Result<(), ViewError> {
    let mut builder = Builder::default();

    builder.push_record([
        card.product.name.clone(),
        format!("{} cUSD", card.product.price),
    ]);
    builder.push_record(["Description".to_string(), card.product.description.clone()]);
    builder.push_record(["Image".to_string(), card.product.image.clone()]);
    builder.push_record(["Seller".to_string(), short_address(card.product.owner)]);
    builder.push_record([
        "Seller's listings".to_string(),
        card.products_created.to_string(),
    ]);
    builder.push_record(["Sold".to_string(), card.product.sold.to_string()]);
    builder.push_record(["Reactions".to_string(), reaction_line(card)]);

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);

    writeln!(out, "{table}").map_err(|_err| ViewError::Io)
}

/// Render the card to a string, for callers without a sink.
///
/// # Errors
///
/// Returns [`ViewError::Io`] if the rendered table is not valid UTF-8,
/// which would indicate a rendering defect.
pub fn render_card(card: &ProductCard) -> Result<String, ViewError> {
    let mut rendered = Vec::new();
    write_card(&mut rendered, card)?;

    String::from_utf8(rendered).map_err(|_err| ViewError::Io)
}

/// All six reaction tallies on one line, in wire-code order.
fn reaction_line(card: &ProductCard) -> String {
    card.reactions
        .iter()
        .map(|(reaction, count)| format!("{} {count}", reaction.emoji()))
        .collect::<Vec<_>>()
        .join("   ")
}

/// Checksummed address shortened to its ends, RainbowKit style.
fn short_address(address: Address) -> String {
    let checksum = to_checksum(&address, None);
    let head: String = checksum.chars().take(6).collect();
    let skip = checksum.chars().count().saturating_sub(4);
    let tail: String = checksum.chars().skip(skip).collect();

    format!("{head}…{tail}")
}

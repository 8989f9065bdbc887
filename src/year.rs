//! Code for working with years.
use crate::input::is_sorted_and_unique;
use anyhow::{Context, Result, ensure};
use itertools::Itertools;

/// Parse a string of years separated by semicolons into a vector of u32 years.
///
/// The string can be either "all" (case-insensitive), a single year, or a semicolon-separated list
/// of years (e.g. "2020;2030;2040" or "2020; 2030; 2040")
///
/// # Arguments
///
/// - `s` - Input string to parse
/// - `valid_years` - The years which can be referenced in `s`
///
/// # Returns
///
/// A [`Vec`] of years or an error.
pub fn parse_year_str(s: &str, valid_years: &[u32]) -> Result<Vec<u32>> {
    let s = s.trim();
    ensure!(!s.is_empty(), "No years provided");

    if s.eq_ignore_ascii_case("all") {
        return Ok(valid_years.to_vec());
    }

    let parse_and_validate_year = |s: &str| {
        let year = s.trim().parse::<u32>().ok()?;
        valid_years.contains(&year).then_some(year)
    };
    let years: Vec<_> = s
        .split(';')
        .map(|y| parse_and_validate_year(y).with_context(|| format!("Invalid year: {y}")))
        .try_collect()?;

    ensure!(
        is_sorted_and_unique(&years),
        "Years must be in order and unique"
    );

    Ok(years)
}

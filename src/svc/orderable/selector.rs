//! # Selector module
//!
//! This module picks a single orderable option out of the listing.

use crate::svc::{docdb::OrderableOption, orderable::Error};

// -----------------------------------------------------------------------------
// helpers

/// returns the option of the first preferred class found in the listing, the
/// listing order breaks ties within a class. Without any match, the listing
/// must hold exactly one option.
///
/// A class given twice in the preferences is only looked for once, at its first
/// position.
pub fn select(
    options: Vec<OrderableOption>,
    preferred: &[String],
) -> Result<OrderableOption, Error> {
    let found = preferred.iter().find_map(|class| {
        options
            .iter()
            .position(|option| &option.db_instance_class == class)
    });

    if let Some(index) = found {
        return options.into_iter().nth(index).ok_or(Error::NotFound);
    }

    match options.len() {
        0 => Err(Error::NotFound),
        1 => options.into_iter().next().ok_or(Error::NotFound),
        _ => Err(Error::Ambiguous(options)),
    }
}

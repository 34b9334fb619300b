// src/transform/reference.rs

//! GUID-reference substitution on attribute values

use std::borrow::Cow;

use tracing::warn;

use super::Warning;
use crate::element::Attribute;
use crate::guid::{GuidMap, is_guid_reference, sanitize_reference_key};
use crate::{Error, Result};

/// Produce a new attribute list with every GUID reference resolved
///
/// Order and duplicates are kept; only values starting with the reference
/// prefix change.
pub(crate) fn substitute_attributes(
    attributes: Vec<Attribute>,
    line: u64,
    guids: &mut GuidMap,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<Attribute>> {
    attributes
        .into_iter()
        .map(|attr| {
            let value = substitute_value(attr.value, line, guids, warnings)?;
            Ok(Attribute {
                name: attr.name,
                value,
            })
        })
        .collect()
}

fn substitute_value(
    value: String,
    line: u64,
    guids: &mut GuidMap,
    warnings: &mut Vec<Warning>,
) -> Result<String> {
    if !is_guid_reference(&value) {
        return Ok(value);
    }

    if value.contains(['\n', '\r']) {
        return Err(Error::GuidKeyLineBreak { line, value });
    }

    let rewritten = match sanitize_reference_key(&value) {
        Cow::Borrowed(_) => None,
        Cow::Owned(rewritten) => Some(rewritten),
    };

    let key = match rewritten {
        None => value,
        Some(rewritten) => {
            warn!(
                "line {}: spaces in GUID reference replaced: {} -> {}",
                line, value, rewritten
            );
            warnings.push(Warning::SanitizedGuidKey {
                line,
                old: value,
                new: rewritten.clone(),
            });
            rewritten
        }
    };

    Ok(guids.resolve(&key))
}

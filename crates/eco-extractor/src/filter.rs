//! Canonical-name filter
//!
//! Restricts each heading's entity list to names the reference table knows:
//! the intersection of the extracted entities with the table's display
//! names, always including the heading's own canonical name. Matched
//! entities are emitted in their canonical display form, deduplicated and
//! sorted.

use std::collections::BTreeSet;

use tracing::warn;

use eco_core::config::MissingHeading;
use eco_core::{match_key, EcoError, EntityMapping, ReferenceTable, Result};

/// Filter a mapping against a reference table
///
/// Output entries keep the original heading keys. A heading with no key in
/// the table is handled per `on_missing`: `Fail` aborts with an error,
/// `Skip` drops the heading from the output.
pub fn filter_mapping(
    mapping: &EntityMapping,
    table: &ReferenceTable,
    on_missing: MissingHeading,
    case_fold: bool,
) -> Result<EntityMapping> {
    let keys = table.key_index(case_fold);
    let names = table.display_index(case_fold);

    let mut filtered = EntityMapping::new();
    for (heading, entities) in mapping.iter() {
        let own = match keys.get(&match_key(heading, case_fold)) {
            Some(entry) => entry.display_name.clone(),
            None => match on_missing {
                MissingHeading::Fail => {
                    return Err(EcoError::HeadingNotInReference(heading.clone()));
                }
                MissingHeading::Skip => {
                    warn!("heading {:?} not in reference table, dropping it", heading);
                    continue;
                }
            },
        };

        let mut kept: BTreeSet<String> = BTreeSet::new();
        kept.insert(own);
        for entity in entities {
            if let Some(name) = names.get(&match_key(entity, case_fold)) {
                kept.insert((*name).to_string());
            }
        }

        filtered.insert(heading.clone(), kept.into_iter().collect());
    }

    Ok(filtered)
}

// ============================================================================
// Tests
// ============================================================================

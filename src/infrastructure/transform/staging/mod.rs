//! Export formats for element sequences

mod base;
mod baseplate;
mod datasaur;
mod label_box;
mod label_studio;
mod prodigy;
mod weaviate;

pub use base::{
    convert_to_csv, convert_to_dataframe, convert_to_dict, dict_to_elements, element_to_record,
};
pub use baseplate::stage_for_baseplate;
pub use datasaur::stage_for_datasaur;
pub use label_box::stage_for_label_box;
pub use label_studio::stage_for_label_studio;
pub use prodigy::{stage_csv_for_prodigy, stage_for_prodigy};
pub use weaviate::{stage_for_weaviate, weaviate_properties};

use crate::domain::DomainError;

/// Fail unless a per-element list has one entry per element
pub(crate) fn check_len(name: &str, elements: usize, given: usize) -> Result<(), DomainError> {
    if elements == given {
        return Ok(());
    }

    Err(DomainError::validation(format!(
        "The length of {} ({}) does not match the number of elements ({})",
        name, given, elements
    )))
}

//! Label Studio export

use serde_json::{Map, Value};

use super::check_len;
use crate::domain::transform::LabelStudioParams;
use crate::domain::{DomainError, Element};

fn validate_tasks(
    name: &str,
    elements: usize,
    tasks: &Option<Vec<Vec<Value>>>,
) -> Result<(), DomainError> {
    let Some(tasks) = tasks else {
        return Ok(());
    };

    check_len(name, elements, tasks.len())?;

    for entry in tasks.iter().flatten() {
        let valid = entry
            .as_object()
            .is_some_and(|object| object.get("result").is_none_or(Value::is_array));

        if !valid {
            return Err(DomainError::validation(format!(
                "Each of {} must be an object whose 'result' is a list",
                name
            )));
        }
    }

    Ok(())
}

/// One task per element: `{"data": {text_field, id_field}}` plus optional
/// `annotations` and `predictions`
pub fn stage_for_label_studio(
    elements: &[Element],
    params: &LabelStudioParams,
) -> Result<Vec<Map<String, Value>>, DomainError> {
    if params.text_field == params.id_field {
        return Err(DomainError::validation(
            "text_field and id_field must be different keys",
        ));
    }

    validate_tasks("annotations", elements.len(), &params.annotations)?;
    validate_tasks("predictions", elements.len(), &params.predictions)?;

    Ok(elements
        .iter()
        .enumerate()
        .map(|(idx, element)| {
            let mut data = Map::new();
            data.insert(params.text_field.clone(), Value::String(element.text.clone()));
            data.insert(params.id_field.clone(), Value::String(element.element_id.clone()));

            let mut task = Map::new();
            task.insert("data".to_string(), Value::Object(data));

            for (key, entries) in [
                ("annotations", &params.annotations),
                ("predictions", &params.predictions),
            ] {
                if let Some(entries) = entries.as_ref().and_then(|all| all.get(idx)) {
                    task.insert(key.to_string(), Value::Array(entries.clone()));
                }
            }

            task
        })
        .collect())
}

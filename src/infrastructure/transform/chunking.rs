//! Title-based chunking

use crate::domain::{DomainError, Element, ElementCategory, ElementSequence, TitleChunkingParams};

const SEPARATOR: &str = "\n\n";
const SEPARATOR_LEN: usize = 2;

/// A run of elements that will become one or more chunks
#[derive(Debug)]
enum Section<'a> {
    Text(Vec<&'a Element>),
    Table(&'a Element),
}

impl Section<'_> {
    fn text_len(&self) -> usize {
        match self {
            Self::Text(elements) => text_len(elements),
            Self::Table(element) => element.char_count(),
        }
    }

    fn page(&self) -> Option<u32> {
        match self {
            Self::Text(elements) => elements.first().and_then(|e| e.metadata.page_number),
            Self::Table(element) => element.metadata.page_number,
        }
    }
}

fn text_len(elements: &[&Element]) -> usize {
    let chars: usize = elements.iter().map(|e| e.char_count()).sum();
    chars + SEPARATOR_LEN * elements.len().saturating_sub(1)
}

fn build_sections<'a>(elements: &'a [Element], params: &TitleChunkingParams) -> Vec<Section<'a>> {
    let soft_max = params.soft_max();
    let mut sections = Vec::new();
    let mut current: Vec<&Element> = Vec::new();

    for element in elements {
        match element.category {
            ElementCategory::PageBreak => continue,
            ElementCategory::Table => {
                if !current.is_empty() {
                    sections.push(Section::Text(std::mem::take(&mut current)));
                }
                sections.push(Section::Table(element));
                continue;
            }
            _ => {}
        }

        if !current.is_empty() {
            let is_title = element.category == ElementCategory::Title;
            let page_changed = !params.multipage_sections
                && current[0].metadata.page_number != element.metadata.page_number;
            let too_long = text_len(&current) + SEPARATOR_LEN + element.char_count() > soft_max;

            if is_title || page_changed || too_long {
                sections.push(Section::Text(std::mem::take(&mut current)));
            }
        }

        current.push(element);
    }

    if !current.is_empty() {
        sections.push(Section::Text(current));
    }

    sections
}

fn combine_sections<'a>(
    sections: Vec<Section<'a>>,
    params: &TitleChunkingParams,
) -> Vec<Section<'a>> {
    let combine_under = params.combine_under();
    let mut combined: Vec<Section<'a>> = Vec::new();

    for section in sections {
        if let (Some(Section::Text(previous)), Section::Text(next)) =
            (combined.last_mut(), &section)
        {
            let previous_len = text_len(previous);
            let same_page = params.multipage_sections
                || previous.first().and_then(|e| e.metadata.page_number)
                    == next.first().and_then(|e| e.metadata.page_number);

            if previous_len < combine_under
                && previous_len + SEPARATOR_LEN + section.text_len() <= params.max_characters
                && same_page
            {
                previous.extend(next.iter().copied());
                continue;
            }
        }

        combined.push(section);
    }

    combined
}

/// Split text into pieces of at most `max` characters, preferring whitespace
fn split_at_words(text: &str, max: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest = text.trim();

    while max > 0 && rest.chars().count() > max {
        let limit = rest
            .char_indices()
            .nth(max)
            .map_or(rest.len(), |(idx, _)| idx);

        let cut = if rest[limit..].starts_with(char::is_whitespace) {
            limit
        } else {
            rest[..limit]
                .rfind(char::is_whitespace)
                .filter(|idx| *idx > 0)
                .unwrap_or(limit)
        };

        let piece = rest[..cut].trim_end();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
        rest = rest[cut..].trim_start();
    }

    if !rest.is_empty() {
        pieces.push(rest.to_string());
    }

    pieces
}

/// Group elements into section chunks bounded by titles and size limits.
///
/// Text sections become `CompositeElement`s carrying the metadata of their
/// first element; tables are kept as their own chunks. Invalid limits are
/// rejected before any element is read.
pub fn chunk_by_title(
    elements: &[Element],
    params: &TitleChunkingParams,
) -> Result<ElementSequence, DomainError> {
    params.validate()?;

    let sections = combine_sections(build_sections(elements, params), params);
    let mut chunks = Vec::with_capacity(sections.len());

    for section in &sections {
        match section {
            Section::Table(table) => {
                if table.char_count() <= params.max_characters {
                    chunks.push((*table).clone());
                    continue;
                }

                let mut metadata = table.metadata.clone();
                metadata.text_as_html = None;

                for piece in split_at_words(&table.text, params.max_characters) {
                    let position = chunks.len();
                    chunks.push(Element::at_position(
                        ElementCategory::Table,
                        piece,
                        metadata.clone(),
                        position,
                    ));
                }
            }
            Section::Text(members) => {
                let Some(first) = members.first() else {
                    continue;
                };

                let text = members
                    .iter()
                    .map(|e| e.text.as_str())
                    .collect::<Vec<_>>()
                    .join(SEPARATOR);

                let mut metadata = first.metadata.clone();
                metadata.text_as_html = None;
                metadata.category_depth = None;
                metadata.page_number = section.page();

                for piece in split_at_words(&text, params.max_characters) {
                    let position = chunks.len();
                    chunks.push(Element::at_position(
                        ElementCategory::CompositeElement,
                        piece,
                        metadata.clone(),
                        position,
                    ));
                }
            }
        }
    }

    Ok(chunks)
}

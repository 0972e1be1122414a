//! Accumulates elements in reading order with shared base metadata

use crate::domain::{Element, ElementCategory, ElementMetadata, ElementSequence};

/// Builds the element sequence for one document.
///
/// Every pushed element inherits the base metadata (source, filetype,
/// languages), the current page number and the id of the closest enclosing
/// title as `parent_id`.
#[derive(Debug)]
pub struct ElementCollector {
    base: ElementMetadata,
    include_page_breaks: bool,
    page: Option<u32>,
    titles: Vec<(u32, String)>,
    elements: ElementSequence,
}

impl ElementCollector {
    pub fn new(base: ElementMetadata, include_page_breaks: bool) -> Self {
        Self {
            base,
            include_page_breaks,
            page: None,
            titles: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Start numbering pages from 1
    pub fn start_paging(&mut self) {
        if self.page.is_none() {
            self.page = Some(1);
        }
    }

    /// Advance to the next page, emitting a `PageBreak` element when requested
    pub fn page_break(&mut self) {
        if self.include_page_breaks {
            let metadata = self.metadata_for(None);
            self.append(ElementCategory::PageBreak, String::new(), metadata);
        }

        self.page = Some(self.page.map_or(2, |page| page + 1));
    }

    /// Push a section title at `depth` (0 = top level)
    pub fn push_title(&mut self, text: impl Into<String>, depth: u32) {
        self.push_title_with(text.into(), depth, |metadata| metadata);
    }

    fn push_title_with(
        &mut self,
        text: String,
        depth: u32,
        adjust: impl FnOnce(ElementMetadata) -> ElementMetadata,
    ) {
        while self.titles.last().is_some_and(|(d, _)| *d >= depth) {
            self.titles.pop();
        }

        let parent = self.titles.last().map(|(_, id)| id.clone());
        let metadata = adjust(self.metadata_for(parent).with_category_depth(depth));
        let id = self.append(ElementCategory::Title, text, metadata);
        self.titles.push((depth, id));
    }

    /// Push a non-title element
    pub fn push(&mut self, category: ElementCategory, text: impl Into<String>) {
        self.push_with(category, text, |metadata| metadata);
    }

    /// Push an element, adjusting its metadata first
    pub fn push_with(
        &mut self,
        category: ElementCategory,
        text: impl Into<String>,
        adjust: impl FnOnce(ElementMetadata) -> ElementMetadata,
    ) {
        if category == ElementCategory::Title {
            self.push_title_with(text.into(), 0, adjust);
            return;
        }

        let parent = self.titles.last().map(|(_, id)| id.clone());
        let metadata = adjust(self.metadata_for(parent));
        self.append(category, text.into(), metadata);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn finish(self) -> ElementSequence {
        self.elements
    }

    fn metadata_for(&self, parent_id: Option<String>) -> ElementMetadata {
        let mut metadata = self.base.clone();

        if let Some(page) = self.page {
            metadata = metadata.with_page_number(page);
        }

        if let Some(parent_id) = parent_id {
            metadata = metadata.with_parent_id(parent_id);
        }

        metadata
    }

    fn append(
        &mut self,
        category: ElementCategory,
        text: String,
        metadata: ElementMetadata,
    ) -> String {
        let element = Element::at_position(category, text, metadata, self.elements.len());
        let id = element.element_id.clone();
        self.elements.push(element);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_ids_follow_title_hierarchy() {
        let mut collector = ElementCollector::new(ElementMetadata::new(), false);
        collector.push_title("Guide", 0);
        collector.push(ElementCategory::NarrativeText, "Intro text here.");
        collector.push_title("Setup", 1);
        collector.push(ElementCategory::ListItem, "Install it");
        collector.push_title("Usage", 1);

        let elements = collector.finish();
        let guide = &elements[0].element_id;
        let setup = &elements[2].element_id;

        assert_eq!(elements[1].metadata.parent_id.as_ref(), Some(guide));
        assert_eq!(elements[3].metadata.parent_id.as_ref(), Some(setup));
        assert_eq!(elements[4].metadata.category_depth, Some(1));
        assert_eq!(elements[4].metadata.parent_id.as_ref(), Some(guide));
        assert!(elements[0].metadata.parent_id.is_none());
    }

    #[test]
    fn test_page_breaks() {
        let mut collector = ElementCollector::new(ElementMetadata::new(), true);
        collector.start_paging();
        collector.push(ElementCategory::Text, "one");
        collector.page_break();
        collector.push(ElementCategory::Text, "two");

        let elements = collector.finish();

        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].metadata.page_number, Some(1));
        assert_eq!(elements[1].category, ElementCategory::PageBreak);
        assert_eq!(elements[2].metadata.page_number, Some(2));
    }

    #[test]
    fn test_same_text_gets_distinct_ids() {
        let mut collector = ElementCollector::new(ElementMetadata::new(), false);
        collector.push(ElementCategory::Text, "same");
        collector.push(ElementCategory::Text, "same");

        let elements = collector.finish();
        assert_ne!(elements[0].element_id, elements[1].element_id);
    }
}

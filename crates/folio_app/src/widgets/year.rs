use chrono::Datelike;
use folio_core::Page;

/// Element whose text is replaced with the current year
pub const YEAR_ELEMENT_ID: &str = "year";

/// Write `year` into `#year`; returns false when the element is absent
pub fn stamp_year(page: &mut Page, year: i32) -> bool {
    let Some(target) = page.document().get_by_id(YEAR_ELEMENT_ID) else {
        return false;
    };
    page.document_mut().set_text(target, year.to_string()).is_ok()
}

pub fn stamp_current_year(page: &mut Page) -> bool {
    stamp_year(page, chrono::Local::now().year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{element, Document};

    #[test]
    fn test_stamp_year() {
        let mut doc = Document::new();
        let body = doc.body();
        let span = doc.append(body, element("span").id("year").text("2020")).unwrap();
        let mut page = Page::new(doc);

        assert!(stamp_year(&mut page, 2031));
        assert_eq!(page.document().text_content(span).unwrap(), "2031");
    }

    #[test]
    fn test_current_year_without_element() {
        let mut page = Page::new(Document::new());
        assert!(!stamp_current_year(&mut page));
    }
}

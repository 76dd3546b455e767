use scraper::{ElementRef, Html};

/// Trims and folds every run of whitespace into a single space.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text content of an HTML snippet, with tags dropped and entities decoded.
pub fn html_to_text(fragment: &str) -> String {
    let html = Html::parse_fragment(fragment);
    collapse_whitespace(&html.root_element().text().collect::<String>())
}

pub fn element_text(e: ElementRef) -> String {
    collapse_whitespace(&e.text().collect::<String>())
}

//! Title and body text extraction from the gateway's HTML responses.

use scraper::{ElementRef, Html};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedBody {
    pub title: String,
    pub body: String,
}

pub trait BodyExtractor: Send + Sync {
    fn extract(&self, raw: &str) -> ExtractedBody;
}

/// Extracts the concatenated text of the first `<title>` and `<body>` elements, trimmed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlBodyExtractor;

impl BodyExtractor for HtmlBodyExtractor {
    fn extract(&self, raw: &str) -> ExtractedBody {
        let document = Html::parse_document(raw);
        ExtractedBody {
            title: element_text(&document, "title"),
            body: element_text(&document, "body"),
        }
    }
}

fn element_text(document: &Html, name: &str) -> String {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == name)
        .map(|element| element.text().collect::<String>())
        .unwrap_or_default()
        .trim()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_and_body_text() {
        let html = "<html><head><title>M4U SMSMASTER</title></head>\
                    <body>\r\n100 OK\r\n.\r\n</body></html>";

        let extracted = HtmlBodyExtractor.extract(html);
        assert_eq!(extracted.title, "M4U SMSMASTER");
        assert_eq!(extracted.body.lines().collect::<Vec<_>>(), vec!["100 OK", "."]);
    }

    #[test]
    fn body_text_spans_nested_elements() {
        let html = "<html><head><title> M4U SMSMASTER </title></head>\
                    <body><p>100 <b>OK</b> 250</p></body></html>";

        let extracted = HtmlBodyExtractor.extract(html);
        assert_eq!(extracted.title, "M4U SMSMASTER");
        assert_eq!(extracted.body, "100 OK 250");
    }

    #[test]
    fn missing_title_is_empty() {
        let extracted = HtmlBodyExtractor.extract("100 OK");
        assert_eq!(extracted.title, "");
        assert_eq!(extracted.body, "100 OK");
    }
}

//! Markdown reassembly: substitute inline images, then join pages.
//!
//! The OCR provider returns each page as Markdown in which every embedded
//! image appears as `![<id>](<id>)` — the image identifier doubles as the
//! link target — plus a per-page list of `(id, base64 payload)` pairs.
//! Reassembly replaces each such reference with `![<id>](<payload>)` and
//! joins the pages with one blank line, in page order.
//!
//! ## Why literal substitution, not Markdown parsing?
//!
//! The placeholder form is fully under the provider's control and is exactly
//! the bracket-paren pattern with identical text and target. Matching that
//! literal substring is unambiguous; a Markdown parser would add a
//! dependency and a failure mode for zero gain. Payloads are base64 (or
//! `data:` URIs), whose alphabet cannot contain `![`, so substitutions for
//! distinct identifiers are on disjoint substrings and replacement order
//! does not matter.

use crate::ocr::{OcrImage, OcrPage};
use crate::output::PageOutput;

/// Replace every `![<id>](<id>)` reference whose id has a payload in
/// `images` with `![<id>](<payload>)`.
///
/// Returns the processed Markdown and the number of references replaced.
/// Identifiers without a payload (or never referenced) are left untouched;
/// neither case is an error.
pub fn inline_images(markdown: &str, images: &[OcrImage]) -> (String, usize) {
    let mut result = markdown.to_string();
    let mut replaced = 0;

    for img in images {
        let Some(payload) = img.image_base64.as_deref() else {
            continue;
        };
        let needle = format!("![{}]({})", img.id, img.id);
        let occurrences = result.matches(&needle).count();
        if occurrences == 0 {
            continue;
        }
        let replacement = format!("![{}]({})", img.id, payload);
        result = result.replace(&needle, &replacement);
        replaced += occurrences;
    }

    (result, replaced)
}

/// Process each page independently and join them with exactly one blank
/// line, preserving input page order.
///
/// An empty page list yields the empty string.
pub fn combine_pages(pages: &[OcrPage]) -> (String, Vec<PageOutput>) {
    let mut outputs = Vec::with_capacity(pages.len());

    for (i, page) in pages.iter().enumerate() {
        let (markdown, images_inlined) = inline_images(&page.markdown, &page.images);
        outputs.push(PageOutput {
            page_num: i + 1,
            markdown,
            images_inlined,
            image_count: page.images.len(),
        });
    }

    let combined = outputs
        .iter()
        .map(|p| p.markdown.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    (combined, outputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img(id: &str, payload: &str) -> OcrImage {
        OcrImage {
            id: id.to_string(),
            image_base64: Some(payload.to_string()),
        }
    }

    fn page(markdown: &str, images: Vec<OcrImage>) -> OcrPage {
        OcrPage {
            index: 0,
            markdown: markdown.to_string(),
            images,
        }
    }

    #[test]
    fn replaces_single_reference() {
        let (out, n) = inline_images("![img-0](img-0)\ntext", &[img("img-0", "QQ==")]);
        assert_eq!(out, "![img-0](QQ==)\ntext");
        assert_eq!(n, 1);
    }

    #[test]
    fn replaces_all_occurrences_of_same_id() {
        let md = "a ![fig](fig) b ![fig](fig) c";
        let (out, n) = inline_images(md, &[img("fig", "AAAA")]);
        assert_eq!(out, "a ![fig](AAAA) b ![fig](AAAA) c");
        assert_eq!(n, 2);
    }

    #[test]
    fn unknown_identifier_is_left_untouched() {
        let md = "![mystery](mystery)";
        let (out, n) = inline_images(md, &[img("other", "QQ==")]);
        assert_eq!(out, md);
        assert_eq!(n, 0);
    }

    #[test]
    fn unreferenced_mapping_entry_is_no_error() {
        let (out, n) = inline_images("plain text", &[img("img-0", "QQ==")]);
        assert_eq!(out, "plain text");
        assert_eq!(n, 0);
    }

    #[test]
    fn mismatched_text_and_target_are_not_replaced() {
        // Only the exact form where link text and target are identical and
        // equal the id counts as a placeholder.
        let md = "![caption](img-0) ![img-0](other.png)";
        let (out, n) = inline_images(md, &[img("img-0", "QQ==")]);
        assert_eq!(out, md);
        assert_eq!(n, 0);
    }

    #[test]
    fn payload_missing_leaves_reference_as_is() {
        let images = vec![OcrImage {
            id: "img-0".into(),
            image_base64: None,
        }];
        let (out, n) = inline_images("![img-0](img-0)", &images);
        assert_eq!(out, "![img-0](img-0)");
        assert_eq!(n, 0);
    }

    #[test]
    fn replacement_order_does_not_matter() {
        let md = "![a](a) ![b](b)";
        let forward = inline_images(md, &[img("a", "AAAA"), img("b", "BBBB")]);
        let reverse = inline_images(md, &[img("b", "BBBB"), img("a", "AAAA")]);
        assert_eq!(forward.0, reverse.0);
        assert_eq!(forward.0, "![a](AAAA) ![b](BBBB)");
    }

    #[test]
    fn idempotent_once_replaced() {
        // Base64 payloads cannot re-introduce the placeholder pattern, so a
        // second pass changes nothing.
        let images = [img("img-0", "QQ==")];
        let (once, _) = inline_images("![img-0](img-0)", &images);
        let (twice, n) = inline_images(&once, &images);
        assert_eq!(once, twice);
        assert_eq!(n, 0);
    }

    #[test]
    fn data_uri_payload_passes_through_verbatim() {
        let (out, _) = inline_images(
            "![img-0.jpeg](img-0.jpeg)",
            &[img("img-0.jpeg", "data:image/jpeg;base64,QQ==")],
        );
        assert_eq!(out, "![img-0.jpeg](data:image/jpeg;base64,QQ==)");
    }

    #[test]
    fn combine_empty_page_list_is_empty_string() {
        let (combined, outputs) = combine_pages(&[]);
        assert_eq!(combined, "");
        assert!(outputs.is_empty());
    }

    #[test]
    fn combine_preserves_order_with_blank_line_separators() {
        let pages = vec![
            page("first", vec![]),
            page("second", vec![]),
            page("third", vec![]),
        ];
        let (combined, outputs) = combine_pages(&pages);
        assert_eq!(combined, "first\n\nsecond\n\nthird");
        // N pages, N-1 separators
        assert_eq!(combined.matches("\n\n").count(), 2);
        assert_eq!(outputs.len(), 3);
        assert_eq!(outputs[2].page_num, 3);
    }

    #[test]
    fn page_without_references_and_empty_mapping_is_unchanged() {
        let pages = vec![page("# Heading\n\nBody text.", vec![])];
        let (combined, _) = combine_pages(&pages);
        assert_eq!(combined, "# Heading\n\nBody text.");
    }

    #[test]
    fn worked_example_from_contract() {
        let pages = vec![
            page("![img-0](img-0)\ntext", vec![img("img-0", "QQ==")]),
            page("p2", vec![]),
        ];
        let (combined, outputs) = combine_pages(&pages);
        assert_eq!(combined, "![img-0](QQ==)\ntext\n\np2");
        assert_eq!(outputs[0].images_inlined, 1);
        assert!(!combined.contains("![img-0](img-0)"));
    }
}

use std::path::Path;

use lopdf::{Document, Object, Stream, dictionary};
use markup_extract::config::color::ColorClass;
use markup_extract::error::ExtractError;
use markup_extract::geometry::BoundingBox;
use markup_extract::pdf::reader::{PdfReader, looks_like_pdf};

fn numbers(values: &[f64]) -> Vec<Object> {
    values.iter().map(|v| Object::Real(*v as f32)).collect()
}

/// ヘルパー: 指定ページ数の最小限のPDFを保存する
fn save_pdf(path: &Path, num_pages: usize) {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for _ in 0..num_pages {
        let contents_id = doc.add_object(Stream::new(dictionary! {}, vec![]));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
            "Contents" => contents_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => num_pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("failed to save test PDF");
}

/// ヘルパー: 1ページ目に注釈を持つ2ページのPDFを保存する。
///
/// MediaBox は Pages ノードにのみ置き、ページ側は継承する。
fn save_annotated_pdf(path: &Path) {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let highlight_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Highlight",
        "Rect" => numbers(&[300.0, 720.0, 100.0, 700.0]),
        "C" => numbers(&[1.0, 1.0, 0.0]),
    });
    let blue_ink = dictionary! {
        "Type" => "Annot",
        "Subtype" => "Ink",
        "Rect" => numbers(&[50.0, 50.0, 80.0, 90.0]),
        "C" => numbers(&[0.0, 0.0, 1.0]),
    };
    let red_ink_cmyk_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Ink",
        "Rect" => vec![
            Object::Integer(400),
            Object::Integer(100),
            Object::Integer(450),
            Object::Integer(160),
        ],
        "C" => numbers(&[0.0, 1.0, 1.0, 0.0]),
    });
    let no_rect = dictionary! {
        "Type" => "Annot",
        "Subtype" => "Text",
    };

    let mut kids: Vec<Object> = Vec::new();
    let annots: Vec<Object> = vec![
        highlight_id.into(),
        Object::Dictionary(blue_ink),
        red_ink_cmyk_id.into(),
        Object::Dictionary(no_rect),
    ];
    for page_annots in [Some(annots), None] {
        let contents_id = doc.add_object(Stream::new(dictionary! {}, vec![]));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => contents_id,
        };
        if let Some(annots) = page_annots {
            page.set("Annots", annots);
        }
        kids.push(doc.add_object(page).into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(2),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("failed to save test PDF");
}

// ============================================================
// 1. ページツリー
// ============================================================

#[test]
fn test_page_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("three.pdf");
    save_pdf(&path, 3);

    let reader = PdfReader::open(&path).expect("should open");
    assert_eq!(reader.page_count(), 3);
}

#[test]
fn test_open_garbage_is_pdf_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.pdf");
    std::fs::write(&path, b"%PDF-1.7\nthis is not a pdf").unwrap();

    assert!(matches!(
        PdfReader::open(&path),
        Err(ExtractError::PdfReadError(_))
    ));
}

#[test]
fn test_looks_like_pdf_checks_signature() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("a.pdf");
    save_pdf(&pdf, 1);
    assert!(looks_like_pdf(&pdf));

    let png = dir.path().join("a.png");
    std::fs::write(&png, b"\x89PNG\r\n\x1a\n").unwrap();
    assert!(!looks_like_pdf(&png));

    let short = dir.path().join("short.pdf");
    std::fs::write(&short, b"%P").unwrap();
    assert!(!looks_like_pdf(&short));

    assert!(!looks_like_pdf(&dir.path().join("missing.pdf")));
}

// ============================================================
// 2. 注釈 (/Annots)
// ============================================================

#[test]
fn test_page_box_inherited_from_pages_node() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotated.pdf");
    save_annotated_pdf(&path);

    let reader = PdfReader::open(&path).unwrap();
    assert_eq!(reader.page_box(0).unwrap(), [0.0, 0.0, 612.0, 792.0]);
    assert!(matches!(reader.page_box(2), Err(ExtractError::PdfReadError(_))));
}

#[test]
fn test_page_annotations_read_subtype_rect_and_color() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotated.pdf");
    save_annotated_pdf(&path);

    let reader = PdfReader::open(&path).unwrap();
    let annotations = reader.page_annotations(0).expect("annotations should be readable");

    // /Rect を持たない Text 注釈は読み飛ばされる
    let subtypes: Vec<&str> = annotations.iter().map(|a| a.subtype.as_str()).collect();
    assert_eq!(subtypes, vec!["Highlight", "Ink", "Ink"]);

    let highlight = &annotations[0];
    assert_eq!(highlight.page_index, 0);
    assert_eq!(highlight.rect, [100.0, 700.0, 300.0, 720.0], "rect is normalized");
    assert_eq!(highlight.color, Some([1.0, 1.0, 0.0]));
    assert_eq!(highlight.color_class(), Some(ColorClass::Highlight));

    assert_eq!(annotations[1].color_class(), None, "blue ink is not a mark");

    // CMYK (0, 1, 1, 0) is red
    assert_eq!(annotations[2].color, Some([1.0, 0.0, 0.0]));
    assert_eq!(annotations[2].color_class(), Some(ColorClass::Mark));

    assert!(reader.page_annotations(1).unwrap().is_empty());
}

#[test]
fn test_annotation_located_on_page_raster() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotated.pdf");
    save_annotated_pdf(&path);

    let reader = PdfReader::open(&path).unwrap();
    let page_box = reader.page_box(0).unwrap();
    let annotations = reader.page_annotations(0).unwrap();

    // 144 dpi: 2px per pt, y flipped from the top of the MediaBox
    let located: Vec<_> = annotations
        .iter()
        .filter_map(|a| a.locate(page_box, 144, 1224, 1584))
        .collect();
    assert_eq!(located.len(), 2);
    assert_eq!(located[0].color_class, ColorClass::Highlight);
    assert_eq!(located[0].bounding_box, BoundingBox::new(200, 144, 400, 40));
    assert_eq!(located[1].color_class, ColorClass::Mark);
    assert_eq!(located[1].bounding_box, BoundingBox::new(800, 1264, 100, 120));
}

/// Opening a PDF only reads its page tree; pdfium is bound on page load.
#[cfg(feature = "pdfium")]
#[test]
fn test_open_document_reports_pdf_page_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two.pdf");
    save_pdf(&path, 2);

    let loader = markup_extract::loader::open_document(&path, 72).expect("should open");
    assert_eq!(loader.page_count(), 2);
}

use std::path::Path;

use lopdf::{Document, Object};

use super::annotation::PdfAnnotation;

pub struct PdfReader {
    doc: Document,
}

impl PdfReader {
    /// PDFファイルを開いてPdfReaderを作成する。
    pub fn open(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let doc = Document::load(path)?;
        Ok(Self { doc })
    }

    /// ページ数を返す。
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// ページ辞書からMediaBoxを取得する。Parentをたどって継承も考慮する。
    fn get_media_box(&self, dict: &lopdf::Dictionary) -> crate::error::Result<Object> {
        if let Ok(obj) = dict.get(b"MediaBox") {
            return Ok(obj.clone());
        }

        if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
            let parent_dict = self.doc.get_dictionary(*parent_id)?;
            return self.get_media_box(parent_dict);
        }

        Err(crate::error::ExtractError::pdf_read("MediaBox not found"))
    }

    /// 指定ページ(0-indexed)のMediaBoxを `[x0, y0, x1, y1]`（正規化済み）で返す。
    pub fn page_box(&self, page_index: u32) -> crate::error::Result<[f64; 4]> {
        let page_dict = self.doc.get_dictionary(self.get_page_id(page_index)?)?;
        let media_box = self.get_media_box(page_dict)?;

        let page_box = read_rect(self.resolve(&media_box)?)
            .ok_or_else(|| crate::error::ExtractError::pdf_read("Invalid MediaBox"))?;
        if page_box[2] - page_box[0] <= 0.0 || page_box[3] - page_box[1] <= 0.0 {
            return Err(crate::error::ExtractError::pdf_read(
                "Invalid MediaBox: non-positive page dimensions",
            ));
        }
        Ok(page_box)
    }

    /// 指定ページ(0-indexed)の注釈 (/Annots) を列挙する。
    ///
    /// `/Subtype` または `/Rect` が読めない注釈は読み飛ばす。
    pub fn page_annotations(&self, page_index: u32) -> crate::error::Result<Vec<PdfAnnotation>> {
        let page_dict = self.doc.get_dictionary(self.get_page_id(page_index)?)?;

        let annots = match page_dict.get(b"Annots") {
            Ok(entry) => self.resolve(entry).and_then(Object::as_array)?,
            Err(_) => return Ok(Vec::new()), // 注釈なし
        };

        let mut annotations = Vec::new();
        for entry in annots {
            let Ok(dict) = self.resolve(entry).and_then(Object::as_dict) else {
                continue;
            };
            let subtype = match dict.get(b"Subtype").and_then(Object::as_name) {
                Ok(name) => String::from_utf8_lossy(name).into_owned(),
                Err(_) => continue,
            };
            let Some(rect) = dict
                .get(b"Rect")
                .and_then(|r| self.resolve(r))
                .ok()
                .and_then(read_rect)
            else {
                continue;
            };
            let color = [b"C".as_slice(), b"IC".as_slice()].into_iter().find_map(|key| {
                dict.get(key)
                    .and_then(|c| self.resolve(c))
                    .ok()
                    .and_then(read_color)
            });

            annotations.push(PdfAnnotation {
                page_index,
                subtype,
                rect,
                color,
            });
        }

        Ok(annotations)
    }

    /// 間接参照なら参照先のオブジェクトを返す。
    fn resolve<'a>(&'a self, obj: &'a Object) -> lopdf::Result<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id),
            other => Ok(other),
        }
    }

    /// ページ番号(0-indexed)からObjectIdを取得する。
    fn get_page_id(&self, page_index: u32) -> crate::error::Result<lopdf::ObjectId> {
        let pages = self.doc.get_pages();
        page_index
            .checked_add(1)
            .and_then(|page_num| pages.get(&page_num).copied())
            .ok_or_else(|| {
                crate::error::ExtractError::pdf_read(format!("page index {page_index} not found"))
            })
    }
}

/// 整数または実数を f64 として読む。
fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(*f as f64),
        _ => None,
    }
}

/// 4要素の矩形配列を `x0 <= x1`, `y0 <= y1` に正規化して読む。
fn read_rect(obj: &Object) -> Option<[f64; 4]> {
    let values = obj.as_array().ok()?;
    if values.len() < 4 {
        return None;
    }
    let [a, b, c, d] = [
        number(&values[0])?,
        number(&values[1])?,
        number(&values[2])?,
        number(&values[3])?,
    ];
    Some([a.min(c), b.min(d), a.max(c), b.max(d)])
}

/// 注釈色配列を RGB (0.0-1.0) に変換する。要素数 0 は透明で `None`。
fn read_color(obj: &Object) -> Option<[f64; 3]> {
    let values: Vec<f64> = obj
        .as_array()
        .ok()?
        .iter()
        .map(number)
        .collect::<Option<_>>()?;
    match values.as_slice() {
        [g] => Some([*g, *g, *g]),
        [r, g, b] => Some([*r, *g, *b]),
        [c, m, y, k] => Some([
            (1.0 - c) * (1.0 - k),
            (1.0 - m) * (1.0 - k),
            (1.0 - y) * (1.0 - k),
        ]),
        _ => None,
    }
}

/// Returns true when the file starts with the `%PDF-` signature.
pub fn looks_like_pdf(path: &Path) -> bool {
    use std::io::Read;

    let mut header = [0u8; 5];
    std::fs::File::open(path)
        .and_then(|mut f| f.read_exact(&mut header))
        .map(|_| &header == b"%PDF-")
        .unwrap_or(false)
}

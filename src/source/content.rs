//! Content stream walking for positioned text spans.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{is_spaceless_script_char, TextSpan};

/// Kerning adjustment (in 1/1000 text space units) treated as a word break.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Extract positioned text spans from a page.
pub(crate) fn page_spans(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<TextSpan>> {
    let fonts = doc
        .get_page_fonts(page_id)
        .map_err(|e| Error::UnreadablePdf(e.to_string()))?;

    let mut base_fonts = BTreeMap::new();
    for (name, font) in &fonts {
        let base_font = font
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        base_fonts.insert(name.clone(), base_font);
    }

    let content = page_content(doc, page_id)?;
    if content.is_empty() {
        return Ok(Vec::new());
    }
    let content = lopdf::content::Content::decode(&content)
        .map_err(|e| Error::UnreadablePdf(e.to_string()))?;

    let mut walker = SpanWalker::new(doc, &fonts, &base_fonts);
    for op in &content.operations {
        walker.apply(&op.operator, &op.operands);
    }
    Ok(walker.spans)
}

/// Raw (decompressed) content stream bytes of a page.
///
/// A page without `/Contents` is blank and yields no bytes.
fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::UnreadablePdf(e.to_string()))?;

    let contents = match page_dict.get(b"Contents") {
        Ok(contents) => contents,
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Reference(r) => match doc.get_object(*r) {
            Ok(Object::Stream(s)) => Ok(s
                .decompressed_content()
                .unwrap_or_else(|_| s.content.clone())),
            Ok(Object::Array(arr)) => Ok(concat_streams(doc, arr)),
            _ => Err(Error::UnreadablePdf("invalid content stream".to_string())),
        },
        Object::Array(arr) => Ok(concat_streams(doc, arr)),
        _ => Err(Error::UnreadablePdf("invalid content stream".to_string())),
    }
}

fn concat_streams(doc: &LopdfDocument, refs: &[Object]) -> Vec<u8> {
    let mut content = Vec::new();
    for obj in refs {
        if let Object::Reference(r) = obj {
            if let Ok(Object::Stream(s)) = doc.get_object(*r) {
                if let Ok(data) = s.decompressed_content() {
                    content.extend_from_slice(&data);
                    content.push(b' ');
                }
            }
        }
    }
    content
}

/// Text state tracked while walking a content stream.
struct SpanWalker<'a> {
    doc: &'a LopdfDocument,
    fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>,
    base_fonts: &'a BTreeMap<Vec<u8>, String>,
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: f32,
    matrix: TextMatrix,
    in_text: bool,
    spans: Vec<TextSpan>,
}

impl<'a> SpanWalker<'a> {
    fn new(
        doc: &'a LopdfDocument,
        fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>,
        base_fonts: &'a BTreeMap<Vec<u8>, String>,
    ) -> Self {
        Self {
            doc,
            fonts,
            base_fonts,
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            leading: 0.0,
            matrix: TextMatrix::default(),
            in_text: false,
            spans: Vec::new(),
        }
    }

    fn apply(&mut self, operator: &str, operands: &[Object]) {
        match operator {
            "BT" => {
                self.in_text = true;
                self.matrix = TextMatrix::default();
            }
            "ET" => self.in_text = false,
            "Tf" => {
                if operands.len() >= 2 {
                    if let Object::Name(key) = &operands[0] {
                        self.font_key = key.clone();
                        self.font_name = self
                            .base_fonts
                            .get(key)
                            .cloned()
                            .unwrap_or_else(|| String::from_utf8_lossy(key).to_string());
                    }
                    self.font_size = get_number(&operands[1]).unwrap_or(12.0);
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(get_number) {
                    self.leading = leading;
                }
            }
            "Td" | "TD" => {
                if operands.len() >= 2 {
                    let tx = get_number(&operands[0]).unwrap_or(0.0);
                    let ty = get_number(&operands[1]).unwrap_or(0.0);
                    if operator == "TD" {
                        self.leading = -ty;
                    }
                    self.matrix.translate(tx, ty);
                }
            }
            "Tm" => {
                if operands.len() >= 6 {
                    let n: Vec<f32> = operands
                        .iter()
                        .take(6)
                        .map(|o| get_number(o).unwrap_or(0.0))
                        .collect();
                    self.matrix.set(n[0], n[1], n[2], n[3], n[4], n[5]);
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let text = self.decode(bytes);
                    self.emit(text);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let text = self.decode_array(items);
                    self.emit(text);
                }
            }
            "'" | "\"" => {
                self.next_line();
                let index = if operator == "\"" { 2 } else { 0 };
                if let Some(Object::String(bytes, _)) = operands.get(index) {
                    let text = self.decode(bytes);
                    self.emit(text);
                }
            }
            _ => {}
        }
    }

    fn next_line(&mut self) {
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.matrix.translate(0.0, -leading);
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let encoding = self
            .fonts
            .get(&self.font_key)
            .and_then(|font| font.get_font_encoding(self.doc).ok());
        match encoding {
            Some(ref encoding) => LopdfDocument::decode_text(encoding, bytes)
                .unwrap_or_else(|_| decode_text_simple(bytes)),
            None => decode_text_simple(bytes),
        }
    }

    /// Decode a `TJ` array; large negative adjustments become word spaces.
    fn decode_array(&self, items: &[Object]) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => combined.push_str(&self.decode(bytes)),
                other => {
                    let adjustment = -get_number(other).unwrap_or(0.0);
                    let wants_space = adjustment > TJ_SPACE_THRESHOLD
                        && !combined.ends_with(char::is_whitespace)
                        && combined
                            .chars()
                            .last()
                            .is_some_and(|c| !is_spaceless_script_char(c));
                    if wants_space {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }

    fn emit(&mut self, text: String) {
        if !self.in_text || text.trim().is_empty() {
            return;
        }
        let (x, y) = self.matrix.position();
        let size = self.font_size * self.matrix.scale();
        let width = text.chars().count() as f32 * size * 0.5;
        let span = TextSpan {
            width,
            ..TextSpan::new(text, x, y, size, self.font_name.clone())
        };
        self.spans.push(span);
    }
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self { a, b, c, d, e, f };
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Helper to extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Decode a PDF string without font encoding information.
///
/// Tries UTF-16BE (with BOM), then UTF-8, then falls back to Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(ops: Vec<(&str, Vec<Object>)>) -> Vec<TextSpan> {
        let doc = LopdfDocument::with_version("1.5");
        let fonts = BTreeMap::new();
        let base_fonts = BTreeMap::from([(b"F1".to_vec(), "Helvetica-Bold".to_string())]);
        let mut walker = SpanWalker::new(&doc, &fonts, &base_fonts);
        for (op, operands) in &ops {
            walker.apply(op, operands);
        }
        walker.spans
    }

    #[test]
    fn test_decode_text_simple_utf8() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
    }

    #[test]
    fn test_decode_text_simple_latin1() {
        // 0xE9 = 'é' in Latin-1
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_simple(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_text_simple_utf16be() {
        let bytes = vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }

    #[test]
    fn test_walker_positions_and_fonts() {
        let spans = walk(vec![
            ("BT", vec![]),
            ("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(24)]),
            ("Td", vec![Object::Integer(72), Object::Integer(700)]),
            ("Tj", vec![Object::string_literal("Annual Report")]),
            ("ET", vec![]),
        ]);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Annual Report");
        assert_eq!(spans[0].x, 72.0);
        assert_eq!(spans[0].y, 700.0);
        assert_eq!(spans[0].font_size, 24.0);
        assert!(spans[0].is_bold);
    }

    #[test]
    fn test_walker_tj_array_spacing() {
        let spans = walk(vec![
            ("BT", vec![]),
            ("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
            (
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Hello"),
                    Object::Integer(-300),
                    Object::string_literal("World"),
                    Object::Integer(-20),
                    Object::string_literal("!"),
                ])],
            ),
            ("ET", vec![]),
        ]);
        assert_eq!(spans[0].text, "Hello World!");
    }

    #[test]
    fn test_walker_next_line_uses_leading() {
        let spans = walk(vec![
            ("BT", vec![]),
            ("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(10)]),
            ("TL", vec![Object::Integer(14)]),
            ("Td", vec![Object::Integer(50), Object::Integer(500)]),
            ("Tj", vec![Object::string_literal("one")]),
            ("T*", vec![]),
            ("Tj", vec![Object::string_literal("two")]),
            ("ET", vec![]),
        ]);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].y, 486.0);
    }

    #[test]
    fn test_walker_ignores_text_outside_bt() {
        let spans = walk(vec![("Tj", vec![Object::string_literal("stray")])]);
        assert!(spans.is_empty());
    }
}

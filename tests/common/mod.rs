//! PDF fixtures generated on the fly with lopdf.

#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::encryption::{decrypt_object, get_encryption_key};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// One line of text: content, font size, bold.
pub struct Line {
    pub text: String,
    pub size: i64,
    pub bold: bool,
}

pub fn line(text: &str, size: i64) -> Line {
    Line {
        text: text.to_string(),
        size,
        bold: false,
    }
}

pub fn bold(text: &str, size: i64) -> Line {
    Line {
        text: text.to_string(),
        size,
        bold: true,
    }
}

/// Builds small single-column PDFs, one BT/ET block per line.
#[derive(Default)]
pub struct PdfBuilder {
    pages: Vec<Vec<Line>>,
    title: Option<String>,
    author: Option<String>,
    creation_date: Option<String>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, lines: Vec<Line>) -> Self {
        self.pages.push(lines);
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.author = Some(author.to_string());
        self
    }

    /// PDF date string, e.g. `D:20240115093000Z`.
    pub fn creation_date(mut self, date: &str) -> Self {
        self.creation_date = Some(date.to_string());
        self
    }

    pub fn build(&self) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for lines in &self.pages {
            let mut operations = Vec::new();
            let mut y: i64 = 780;
            for l in lines {
                let font = if l.bold { "F2" } else { "F1" };
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec![font.into(), l.size.into()]));
                operations.push(Operation::new("Td", vec![72.into(), y.into()]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(l.text.as_str())]));
                operations.push(Operation::new("ET", vec![]));
                y -= l.size + 8;
            }
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut info = lopdf::Dictionary::new();
        if let Some(title) = &self.title {
            info.set("Title", Object::string_literal(title.as_str()));
        }
        if let Some(author) = &self.author {
            info.set("Author", Object::string_literal(author.as_str()));
        }
        if let Some(date) = &self.creation_date {
            info.set("CreationDate", Object::string_literal(date.as_str()));
        }
        if !info.is_empty() {
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", info_id);
        }

        doc
    }

    pub fn save(&self, path: &Path) {
        let mut doc = self.build();
        doc.save(path).expect("save pdf");
    }

    /// Save with the standard security handler (RC4, 40-bit, revision 2).
    pub fn save_protected(&self, path: &Path, protection: Protection) {
        let mut doc = self.build();
        let file_id = Object::String(b"pdfsift-fixture!".to_vec(), StringFormat::Hexadecimal);
        doc.trailer.set("ID", vec![file_id.clone(), file_id]);

        let mut encrypt = dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
            "Length" => 40,
            "O" => Object::String(vec![0x5A; 32], StringFormat::Hexadecimal),
            "P" => -4,
        };
        // Without /U any password is accepted, the empty one included.
        if let Protection::UserPassword = protection {
            encrypt.set("U", Object::String(vec![0xA5; 32], StringFormat::Hexadecimal));
        }
        let encrypt_id = doc.add_object(encrypt);
        doc.trailer.set("Encrypt", encrypt_id);

        let key = get_encryption_key(&doc, "", false).expect("encryption key");
        let info_id = doc.trailer.get(b"Info").and_then(Object::as_reference).ok();
        let ids: Vec<ObjectId> = doc.objects.keys().copied().collect();
        for id in ids {
            if id == encrypt_id {
                continue;
            }
            let obj = doc.objects.get_mut(&id).expect("object");
            // RC4 is symmetric, so decrypting plain bytes encrypts them.
            if let Ok(cipher) = decrypt_object(&key, id, &*obj) {
                match obj {
                    Object::Stream(stream) => stream.set_content(cipher),
                    Object::String(bytes, _) => *bytes = cipher,
                    _ => {}
                }
            } else if Some(id) == info_id {
                if let Object::Dictionary(info) = obj {
                    for (_, value) in info.iter_mut() {
                        if let Ok(cipher) = decrypt_object(&key, id, &*value) {
                            if let Object::String(bytes, _) = value {
                                *bytes = cipher;
                            }
                        }
                    }
                }
            }
        }

        doc.save(path).expect("save pdf");
    }
}

/// How an encrypted fixture can be opened.
pub enum Protection {
    /// Only an owner password; the content opens with the empty user password.
    OwnerOnly,
    /// A user password is required.
    UserPassword,
}

/// A one-page resume with a large name line and labeled contact lines.
pub fn resume() -> PdfBuilder {
    PdfBuilder::new().page(vec![
        bold("Jane Doe", 24),
        line("Email: a@b.com", 11),
        line("Phone: +1 (555) 123-4567", 11),
        line("Portfolio: https://janedoe.dev", 11),
        bold("EXPERIENCE", 16),
        line("Senior engineer at Example Corp since 2019-04-01.", 11),
        line("Led the migration of the billing platform.", 11),
        bold("EDUCATION", 16),
        line("BSc Computer Science, State University.", 11),
    ])
}

/// Bytes that are not a PDF at all.
pub fn write_garbage(path: &Path) {
    std::fs::write(path, b"this file is definitely not a pdf").expect("write garbage");
}

/// A PDF header followed by truncated content.
pub fn write_truncated(path: &Path) {
    std::fs::write(path, b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R").expect("write truncated");
}

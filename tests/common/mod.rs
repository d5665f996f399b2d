//! Builds small PDFs with lopdf for the integration tests

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{
    dictionary, Document, EncryptionState, EncryptionVersion, Object, Permissions, Stream,
    StringFormat,
};
use std::path::{Path, PathBuf};

/// Contents of one generated page
pub enum Page {
    Text(&'static str),
    Blank,
    /// A gray image and no text, like a scanned page
    Scan { width: i64, height: i64 },
}

pub fn write_pdf(dir: &Path, name: &str, pages: &[Page]) -> PathBuf {
    let mut doc = build_pdf(pages);
    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

/// RC4 128-bit encryption with an owner password and an empty user password
pub fn write_encrypted_pdf(dir: &Path, name: &str, pages: &[Page]) -> PathBuf {
    let mut doc = build_pdf(pages);
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(b"0123456789abcdef".to_vec(), StringFormat::Literal),
            Object::String(b"fedcba9876543210".to_vec(), StringFormat::Literal),
        ]),
    );

    let version = EncryptionVersion::V2 {
        document: &doc,
        owner_password: "owner",
        user_password: "",
        key_length: 128,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version).unwrap();
    doc.encrypt(&state).unwrap();

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

fn build_pdf(pages: &[Page]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let (operations, resources) = match page {
            Page::Text(text) => (
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                dictionary! { "Font" => dictionary! { "F1" => font_id } },
            ),
            Page::Blank => (vec![], dictionary! {}),
            Page::Scan { width, height } => {
                let image_id = doc.add_object(Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => *width,
                        "Height" => *height,
                        "ColorSpace" => "DeviceGray",
                        "BitsPerComponent" => 8,
                    },
                    vec![255; (*width * *height) as usize],
                ));
                (
                    vec![
                        Operation::new("q", vec![]),
                        Operation::new(
                            "cm",
                            vec![500.into(), 0.into(), 0.into(), 700.into(), 50.into(), 50.into()],
                        ),
                        Operation::new("Do", vec!["Im0".into()]),
                        Operation::new("Q", vec![]),
                    ],
                    dictionary! { "XObject" => dictionary! { "Im0" => image_id } },
                )
            }
        };

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        kids.push(
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources,
            })
            .into(),
        );
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

//! Static format and style tables.
use axum::{Json, extract::Query};
use serde::Deserialize;
use serde_json::{Value, json};

/// `(mime, public extensions)` of every export format.
const EXPORT_FORMATS: [(&str, &[&str]); 8] = [
    ("application/epub+zip", &["epub"]),
    ("application/epub+zip", &["epub3"]),
    ("application/x-mobipocket-ebook", &["mobi"]),
    ("application/pdf", &["pdf"]),
    ("application/xml", &["icml"]),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        &["docx"],
    ),
    ("application/docbook+xml", &["xml"]),
    ("application/javascript", &["jsx"]),
];

/// `(mime, extensions)` of every import format.
const IMPORT_FORMATS: [(&str, &[&str]); 4] = [
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        &["docx"],
    ),
    ("application/msword", &["doc"]),
    ("application/vnd.oasis.opendocument.text", &["odt"]),
    ("text/plain", &["txt"]),
];

/// `(short name, display name, description, price)`.
type StyleRow = (&'static str, &'static str, &'static str, f64);

const DEFAULT_STYLE: StyleRow = ("default", "Default", "Clean default layout", 0.0);
const MODERN_STYLE: StyleRow = ("modern", "Modern", "Sans-serif headings, airy spacing", 5.0);

/// Styles by conversion format name. Formats missing here have no styles.
pub(crate) fn styles_for(format: &str) -> &'static [StyleRow] {
    match format {
        "epub" | "epub3" | "mobi" | "pdf" | "docx" => &[DEFAULT_STYLE, MODERN_STYLE],
        "icml" | "docbook" => &[DEFAULT_STYLE],
        _ => &[],
    }
}

/// Whether `format` is a conversion name the server understands.
pub(crate) fn is_export_format(format: &str) -> bool {
    matches!(
        format,
        "epub" | "epub3" | "mobi" | "pdf" | "icml" | "docx" | "docbook" | "idjsx"
    )
}

fn formats_json(rows: &[(&str, &[&str])]) -> Vec<Value> {
    rows.iter()
        .map(|(mime, exts)| json!({"mime": mime, "exts": exts}))
        .collect()
}

pub async fn get_formats() -> Json<Value> {
    Json(json!({
        "formats": {
            "import": formats_json(&IMPORT_FORMATS),
            "export": formats_json(&EXPORT_FORMATS),
        }
    }))
}

#[derive(Deserialize)]
pub struct StylesQuery {
    format: String,
}

pub async fn get_styles(Query(query): Query<StylesQuery>) -> Json<Value> {
    let styles: Vec<Value> = styles_for(&query.format)
        .iter()
        .map(|(name, display, description, price)| {
            json!({
                "name": name,
                "info": {"name": display, "description": description, "price": price},
            })
        })
        .collect();
    Json(json!({"styles": styles}))
}

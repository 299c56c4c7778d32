//! Supported file formats and design styles.
//!
//! Export formats are exposed under the names the conversion endpoint expects,
//! which differ from the public file extensions for InDesign (`jsx` → `idjsx`)
//! and DocBook (`xml` → `docbook`).

use serde_json::{Map, Value};

use crate::BookalopeClient;
use crate::errors::{Error, Result};
use crate::util::{opt_str, take_field, take_list, take_list_or_empty};

/// A file type Bookalope can import or export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    /// MIME type.
    pub mime: String,
    /// File extensions; for export formats these are conversion names.
    pub file_exts: Vec<String>,
}

/// A design template for one export format.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// The format this style was listed for.
    pub format: String,
    /// Value sent as `styling` to the conversion endpoint.
    pub short_name: String,
    /// Human readable name.
    pub name: String,
    /// Human readable description.
    pub description: String,
    /// Price of a final conversion through the API, when the server lists one.
    pub api_price: Option<f64>,
}

/// Map a public export extension to the server's conversion name.
///
/// Anything containing `jsx` (any case) becomes `idjsx`, anything containing
/// `xml` becomes `docbook`, everything else is returned unchanged. The mapping
/// is idempotent.
///
/// ```
/// use bookalope::correct_export_name;
/// assert_eq!(correct_export_name("FILE.JSX"), "idjsx");
/// assert_eq!(correct_export_name("doc.xml"), "docbook");
/// assert_eq!(correct_export_name("docx"), "docx");
/// ```
pub fn correct_export_name(ext: &str) -> String {
    let lower = ext.to_ascii_lowercase();
    if lower.contains("jsx") {
        "idjsx".to_string()
    } else if lower.contains("xml") {
        "docbook".to_string()
    } else {
        ext.to_string()
    }
}

impl Format {
    fn from_value(value: Value) -> Result<Format> {
        let Value::Object(map) = value else {
            return Err(Error::malformed("format entry is not a JSON object"));
        };
        let file_exts = match map.get("exts") {
            Some(Value::Array(exts)) => exts
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            Some(Value::String(ext)) => vec![ext.clone()],
            _ => Vec::new(),
        };
        Ok(Format {
            mime: opt_str(&map, "mime").unwrap_or_default(),
            file_exts,
        })
    }

    fn corrected(mut self) -> Format {
        let mut exts: Vec<String> = Vec::with_capacity(self.file_exts.len());
        for ext in self.file_exts.iter().map(|ext| correct_export_name(ext)) {
            if !exts.contains(&ext) {
                exts.push(ext);
            }
        }
        self.file_exts = exts;
        self
    }
}

impl Style {
    fn from_value(format: &str, value: Value) -> Result<Style> {
        let Value::Object(map) = value else {
            return Err(Error::malformed("style entry is not a JSON object"));
        };
        let short_name =
            opt_str(&map, "name").ok_or_else(|| Error::malformed("style entry has no `name`"))?;
        let empty = Map::new();
        let info = map.get("info").and_then(Value::as_object).unwrap_or(&empty);
        Ok(Style {
            format: format.to_string(),
            name: opt_str(info, "name").unwrap_or_else(|| short_name.clone()),
            description: opt_str(info, "description").unwrap_or_default(),
            api_price: info.get("price").and_then(price),
            short_name,
        })
    }
}

fn price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl BookalopeClient {
    /// Formats the server can produce, with conversion names already corrected.
    pub async fn get_export_formats(&self) -> Result<Vec<Format>> {
        Ok(self
            .list_formats("export")
            .await?
            .into_iter()
            .map(Format::corrected)
            .collect())
    }

    /// Formats the server accepts as source documents.
    pub async fn get_import_formats(&self) -> Result<Vec<Format>> {
        self.list_formats("import").await
    }

    /// Styles available for `format`. A format without styles yields an empty list.
    pub async fn get_styles(&self, format: &str) -> Result<Vec<Style>> {
        let resp = self
            .get("/api/styles", &[("format", format)])
            .await?
            .into_json()?;
        take_list_or_empty(resp, "styles")?
            .into_iter()
            .map(|item| Style::from_value(format, item))
            .collect()
    }

    async fn list_formats(&self, direction: &str) -> Result<Vec<Format>> {
        let resp = self.get("/api/formats", &[]).await?.into_json()?;
        take_list(take_field(resp, "formats")?, direction)?
            .into_iter()
            .map(Format::from_value)
            .collect()
    }
}

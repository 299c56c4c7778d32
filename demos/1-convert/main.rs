//! Upload a manuscript and a cover, then download a test conversion for every
//! export format and style Bookalope offers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bookalope::prelude::*;
use bookalope_testnet::EphemeralServer;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SAMPLE_DOCUMENT: &[u8] = b"Call me Ishmael. Some years ago, never mind how long precisely.";
const SAMPLE_COVER: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

#[derive(Parser, Debug)]
#[command(version, about = "Convert a document with Bookalope.")]
struct Cli {
    /// Bookalope API token.
    #[arg(long, env = "BOOKALOPE_TOKEN")]
    token: Option<String>,

    /// Talk to the beta server.
    #[arg(long)]
    beta: bool,

    /// Talk to an explicit host instead.
    #[arg(long, conflicts_with = "beta")]
    host: Option<String>,

    /// Run against a local in-memory server. Ignores token and host.
    #[arg(long)]
    testnet: bool,

    /// Source document. A short sample text is used when omitted.
    #[arg(long)]
    document: Option<PathBuf>,

    /// Cover image. A tiny placeholder is used when omitted.
    #[arg(long)]
    cover: Option<PathBuf>,

    /// Where converted files go.
    #[arg(long, default_value = "converted")]
    out: PathBuf,

    /// Tracing filter, e.g. `info` or `bookalope=debug`. `RUST_LOG` takes precedence.
    #[arg(long, default_value = "info")]
    level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Keep the server alive for the whole run.
    let mut _server = None;
    let client = if cli.testnet {
        let server = EphemeralServer::start().await?;
        let client = server.client()?;
        _server = Some(server);
        client
    } else {
        let mut builder = BookalopeClient::builder();
        builder.beta(cli.beta);
        if let Some(host) = &cli.host {
            builder.host(host);
        }
        if let Some(token) = &cli.token {
            builder.token(token);
        }
        builder.build()?
    };

    let mut profile = client.get_profile().await?;
    profile.firstname = "Firstname".into();
    profile.lastname = "Lastname".into();
    profile.save().await?;

    let mut book = client.create_book().await?;
    book.name = "Great New Book".into();
    book.save().await?;

    let bookflow = &mut book.bookflows_mut()[0];
    bookflow.name = "Unnamed Bookflow".into();
    bookflow.metadata = BookflowMetadata {
        title: Some("Great New Book".into()),
        author: Some("JR".into()),
        isbn: Some("123-4-56-789000-0".into()),
        copyright: Some("Bookalope".into()),
        publisher: Some("Bookalope Client".into()),
        ..Default::default()
    };
    bookflow.save().await?;
    info!(metadata = ?bookflow.metadata, "Saved bookflow");

    let document = read_or(&cli.document, SAMPLE_DOCUMENT)?;
    let cover = read_or(&cli.cover, SAMPLE_COVER)?;
    bookflow.set_document(&file_name(&cli.document, "MyDoc.doc"), &document).await?;
    bookflow.set_cover_image(&file_name(&cli.cover, "MyImage.png"), &cover).await?;

    std::fs::create_dir_all(&cli.out)
        .with_context(|| format!("creating {}", cli.out.display()))?;

    let formats = client.get_export_formats().await?;
    for ext in formats.iter().flat_map(|format| &format.file_exts) {
        info!(format = %ext, "Converting and downloading");
        for style in client.get_styles(ext).await? {
            let bytes = bookflow.convert(ext, &style).await?;
            let path = cli.out.join(output_name(bookflow.id(), &style, ext));
            std::fs::write(&path, &bytes)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(style = %style.short_name, path = %path.display(), bytes = bytes.len(), "Saved");
        }
    }

    book.delete().await?;
    info!(book = %book.id(), "Book deleted");
    Ok(())
}

/// `bookflow-{id}-{style}.{ext}`, one file per style of a format.
fn output_name(id: &ResourceId, style: &Style, ext: &str) -> String {
    let style: String = style
        .short_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("bookflow-{id}-{style}.{ext}")
}

fn read_or(path: &Option<PathBuf>, fallback: &[u8]) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path).with_context(|| format!("reading {}", path.display())),
        None => Ok(fallback.to_vec()),
    }
}

fn file_name(path: &Option<PathBuf>, fallback: &str) -> String {
    path.as_ref()
        .and_then(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(short_name: &str) -> Style {
        Style {
            format: "epub".into(),
            short_name: short_name.into(),
            name: short_name.into(),
            description: String::new(),
            api_price: None,
        }
    }

    #[test]
    fn each_style_gets_its_own_file() {
        let id = ResourceId::parse("0123456789abcdef0123456789abcdef").unwrap();
        let default = output_name(&id, &style("default"), "epub");
        let modern = output_name(&id, &style("modern"), "epub");

        assert_eq!(default, "bookflow-0123456789abcdef0123456789abcdef-default.epub");
        assert_ne!(default, modern);
        assert_eq!(
            output_name(&id, &style("../x"), "pdf"),
            "bookflow-0123456789abcdef0123456789abcdef-___x.pdf"
        );
    }
}

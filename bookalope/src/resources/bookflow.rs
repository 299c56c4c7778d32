use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value, json};

use super::{Origin, Source, resource_object};
use crate::catalog::Style;
use crate::BookalopeClient;
use crate::errors::{Error, Result};
use crate::identifier::ResourceId;
use crate::util::{opt_str, take_field, take_list};

/// Image name Bookalope uses for the cover.
pub const COVER_IMAGE_NAME: &str = "cover-image";

const DEFAULT_BOOKFLOW_NAME: &str = "Bookflow";
const DEFAULT_BOOKFLOW_TITLE: &str = "<no-title>";
const DOCUMENT_FILETYPE: &str = "doc";

/// Which rendition [`Bookflow::convert_with_version`] asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConvertVersion {
    /// Word-shuffled preview output, only good for checking the pipeline.
    #[default]
    Test,
    /// The real conversion result.
    Final,
}

impl ConvertVersion {
    /// The value sent as the `version` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            ConvertVersion::Test => "test",
            ConvertVersion::Final => "final",
        }
    }
}

impl fmt::Display for ConvertVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Book metadata attached to a bookflow. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookflowMetadata {
    /// Book title.
    pub title: Option<String>,
    /// Author name(s).
    pub author: Option<String>,
    /// Copyright holder.
    pub copyright: Option<String>,
    /// ISBN, in whatever form the publisher uses.
    pub isbn: Option<String>,
    /// Language code.
    pub language: Option<String>,
    /// Publication date.
    pub pubdate: Option<String>,
    /// Publisher name.
    pub publisher: Option<String>,
}

impl BookflowMetadata {
    fn from_map(map: &Map<String, Value>) -> Self {
        BookflowMetadata {
            title: opt_str(map, "title"),
            author: opt_str(map, "author"),
            copyright: opt_str(map, "copyright"),
            isbn: opt_str(map, "isbn"),
            language: opt_str(map, "language"),
            pubdate: opt_str(map, "pubdate"),
            publisher: opt_str(map, "publisher"),
        }
    }
}

#[derive(Serialize)]
struct SaveBody<'a> {
    name: &'a str,
    #[serde(flatten)]
    metadata: &'a BookflowMetadata,
}

/// One conversion workflow of a [`crate::Book`]: its metadata, uploaded files
/// and conversion outputs.
///
/// A bookflow is a snapshot of server state as of its construction or last
/// [`Bookflow::refresh`]. After [`Bookflow::delete`] the value stays usable
/// locally, but any further call reaches the server and fails there.
#[derive(Debug, Clone)]
pub struct Bookflow {
    client: BookalopeClient,
    id: ResourceId,
    url: String,
    book_id: ResourceId,
    step: Option<String>,
    /// Display name.
    pub name: String,
    /// Metadata sent on [`Bookflow::save`].
    pub metadata: BookflowMetadata,
}

impl Bookflow {
    /// Construct a bookflow of the book `book_id` from `source`.
    ///
    /// # Examples
    /// ```no_run
    /// # use bookalope::{Bookflow, BookalopeClient, ResourceId, Source};
    /// # async fn ex(client: BookalopeClient, book: ResourceId) -> bookalope::Result<()> {
    /// let created = Bookflow::new(&client, &book, Source::Create).await?;
    /// let source = Source::FetchById(created.id().to_string());
    /// let fetched = Bookflow::new(&client, &book, source).await?;
    /// assert_eq!(created.id(), fetched.id());
    /// # Ok(()) }
    /// ```
    pub async fn new(
        client: &BookalopeClient,
        book_id: &ResourceId,
        source: Source,
    ) -> Result<Bookflow> {
        let (value, origin) = match source {
            Source::Create => {
                let url = format!("/api/books/{book_id}/bookflows");
                let body = json!({"name": DEFAULT_BOOKFLOW_NAME, "title": DEFAULT_BOOKFLOW_TITLE});
                let resp = client.post(&url, &body).await?.into_json()?;
                (take_field(resp, "bookflow")?, Origin::Server)
            }
            Source::FetchById(id) => {
                let id = ResourceId::parse(id)?;
                let resp = client.get(&bookflow_url(&id), &[]).await?.into_json()?;
                (take_field(resp, "bookflow")?, Origin::Server)
            }
            Source::FromPayload(value) => (value, Origin::Caller),
        };
        let bookflow = Self::from_value(client, book_id, value, origin)?;
        if matches!(origin, Origin::Server) {
            tracing::info!(id = %bookflow.id, book = %book_id, "Bookflow ready");
        }
        Ok(bookflow)
    }

    pub(crate) fn from_value(
        client: &BookalopeClient,
        book_id: &ResourceId,
        value: Value,
        origin: Origin,
    ) -> Result<Bookflow> {
        let (id, map) = resource_object(value, "bookflow", origin)?;
        Ok(Bookflow {
            client: client.clone(),
            url: bookflow_url(&id),
            id,
            book_id: book_id.clone(),
            step: opt_str(&map, "step"),
            name: opt_str(&map, "name").unwrap_or_default(),
            metadata: BookflowMetadata::from_map(&map),
        })
    }

    // === Getters ===

    /// Server-assigned id.
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// API path of this bookflow, `/api/bookflows/{id}`.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Id of the book this bookflow belongs to.
    pub fn book_id(&self) -> &ResourceId {
        &self.book_id
    }

    /// Workflow stage as last reported by the server. The values are the
    /// server's business; the client does not interpret them.
    pub fn step(&self) -> Option<&str> {
        self.step.as_deref()
    }

    // === Lifecycle ===

    /// Re-read name, step and metadata from the server.
    pub async fn refresh(&mut self) -> Result<()> {
        let resp = self.client.get(&self.url, &[]).await?.into_json()?;
        let (id, map) = resource_object(take_field(resp, "bookflow")?, "bookflow", Origin::Server)?;
        if id != self.id {
            return Err(Error::malformed(format!(
                "asked for bookflow {} but got {id}",
                self.id
            )));
        }
        self.name = opt_str(&map, "name").unwrap_or_default();
        self.step = opt_str(&map, "step");
        self.metadata = BookflowMetadata::from_map(&map);
        Ok(())
    }

    /// Push the name and the full metadata map. The server's answer is not
    /// merged; call [`Self::refresh`] to observe normalization.
    pub async fn save(&self) -> Result<()> {
        let body = SaveBody {
            name: &self.name,
            metadata: &self.metadata,
        };
        self.client.post(&self.url, &body).await?;
        Ok(())
    }

    /// Delete this bookflow on the server.
    pub async fn delete(&self) -> Result<()> {
        self.client.delete(&self.url).await?;
        tracing::info!(id = %self.id, "Bookflow deleted");
        Ok(())
    }

    // === Files ===

    /// Download the image stored under `name`.
    pub async fn get_image(&self, name: &str) -> Result<Bytes> {
        let url = format!("{}/files/image", self.url);
        self.client.get(&url, &[("name", name)]).await?.into_bytes()
    }

    /// Download the cover image.
    pub async fn get_cover_image(&self) -> Result<Bytes> {
        self.get_image(COVER_IMAGE_NAME).await
    }

    /// Upload an image under `name`.
    pub async fn add_image(&self, name: &str, filename: &str, file: &[u8]) -> Result<()> {
        let url = format!("{}/files/image", self.url);
        let body = json!({
            "name": name,
            "filename": filename,
            "file": STANDARD.encode(file),
        });
        self.client.post(&url, &body).await?;
        Ok(())
    }

    /// Upload the cover image.
    pub async fn set_cover_image(&self, filename: &str, file: &[u8]) -> Result<()> {
        self.add_image(COVER_IMAGE_NAME, filename, file).await
    }

    /// Download the source document.
    pub async fn get_document(&self) -> Result<Bytes> {
        let url = format!("{}/files/document", self.url);
        self.client.get(&url, &[]).await?.into_bytes()
    }

    /// Upload the source document. The server moves the bookflow to its
    /// document-ingested stage; [`Self::refresh`] shows the new [`Self::step`].
    pub async fn set_document(&self, filename: &str, file: &[u8]) -> Result<()> {
        let url = format!("{}/files/document", self.url);
        let body = json!({
            "filename": filename,
            "filetype": DOCUMENT_FILETYPE,
            "file": STANDARD.encode(file),
        });
        self.client.post(&url, &body).await?;
        Ok(())
    }

    // === Conversion ===

    /// Convert to `format` with `style`, using [`ConvertVersion::Test`].
    ///
    /// The test version is a word-shuffled preview; use
    /// [`Self::convert_with_version`] with [`ConvertVersion::Final`] for real output.
    pub async fn convert(&self, format: &str, style: &Style) -> Result<Bytes> {
        self.convert_with_version(format, style, ConvertVersion::default())
            .await
    }

    /// Convert to `format` with `style` and download the result.
    pub async fn convert_with_version(
        &self,
        format: &str,
        style: &Style,
        version: ConvertVersion,
    ) -> Result<Bytes> {
        let url = format!("{}/convert", self.url);
        let query = [
            ("format", format),
            ("styling", style.short_name.as_str()),
            ("version", version.as_str()),
        ];
        self.client.get(&url, &query).await?.into_bytes()
    }
}

impl BookalopeClient {
    /// List the bookflows of a book without constructing the book itself.
    pub async fn get_bookflows(&self, book_id: &str) -> Result<Vec<Bookflow>> {
        let book_id = ResourceId::parse(book_id)?;
        let resp = self
            .get(&format!("/api/books/{book_id}/bookflows"), &[])
            .await?
            .into_json()?;
        take_list(resp, "bookflows")?
            .into_iter()
            .map(|item| Bookflow::from_value(self, &book_id, item, Origin::Server))
            .collect()
    }
}

fn bookflow_url(id: &ResourceId) -> String {
    format!("/api/bookflows/{id}")
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    const BOOK: &str = "ca3e5bc6d1dd4695b706fd064d4f482d";
    const FLOW: &str = "0123456789abcdef0123456789abcdef";

    fn client(server: &MockServer) -> BookalopeClient {
        BookalopeClient::builder()
            .host(server.base_url())
            .token("79beff75edcb443b902043cc534476db")
            .build()
            .unwrap()
    }

    fn book_id() -> ResourceId {
        ResourceId::parse(BOOK).unwrap()
    }

    fn bookflow(server: &MockServer) -> Bookflow {
        Bookflow::from_value(&client(server), &book_id(), json!({"id": FLOW}), Origin::Caller)
            .unwrap()
    }

    fn style() -> Style {
        Style {
            format: "epub".into(),
            short_name: "default".into(),
            name: "Default".into(),
            description: String::new(),
            api_price: None,
        }
    }

    #[tokio::test]
    async fn create_posts_placeholder_and_never_gets() {
        let server = MockServer::start_async().await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(format!("/api/books/{BOOK}/bookflows"))
                    .json_body(json!({"name": "Bookflow", "title": "<no-title>"}));
                then.status(200).json_body(json!({
                    "bookflow": {
                        "id": FLOW,
                        "name": "Bookflow",
                        "step": "files",
                        "title": "<no-title>",
                    }
                }));
            })
            .await;
        let gets = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(500);
            })
            .await;

        let flow = Bookflow::new(&client(&server), &book_id(), Source::Create)
            .await
            .unwrap();

        create.assert_hits_async(1).await;
        assert_eq!(gets.hits_async().await, 0);
        assert_eq!(flow.id().as_str(), FLOW);
        assert_eq!(flow.url(), format!("/api/bookflows/{FLOW}"));
        assert_eq!(flow.step(), Some("files"));
        assert_eq!(flow.metadata.title.as_deref(), Some("<no-title>"));
        assert_eq!(flow.book_id(), &book_id());
    }

    #[tokio::test]
    async fn fetch_by_id_gets_once_and_never_posts() {
        let server = MockServer::start_async().await;
        let fetch = server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/api/bookflows/{FLOW}"));
                then.status(200).json_body(json!({
                    "bookflow": {"id": FLOW, "name": "Mine", "step": "convert"}
                }));
            })
            .await;
        let posts = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(500);
            })
            .await;

        let flow = Bookflow::new(&client(&server), &book_id(), Source::FetchById(FLOW.into()))
            .await
            .unwrap();

        fetch.assert_hits_async(1).await;
        assert_eq!(posts.hits_async().await, 0);
        assert_eq!(flow.name, "Mine");
        assert_eq!(flow.metadata, BookflowMetadata::default());
    }

    #[tokio::test]
    async fn fetch_by_malformed_id_fails_before_io() {
        let server = MockServer::start_async().await;
        let any = server
            .mock_async(|when, then| {
                when.any_request();
                then.status(200);
            })
            .await;

        let err = Bookflow::new(&client(&server), &book_id(), Source::FetchById("FLOW".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidToken { .. }));
        assert_eq!(any.hits_async().await, 0);
    }

    #[tokio::test]
    async fn from_payload_makes_no_calls() {
        let server = MockServer::start_async().await;
        let any = server
            .mock_async(|when, then| {
                when.any_request();
                then.status(200);
            })
            .await;

        let payload = json!({"id": FLOW, "name": "Listed", "step": "files", "isbn": "123"});
        let flow = Bookflow::new(&client(&server), &book_id(), Source::FromPayload(payload))
            .await
            .unwrap();

        assert_eq!(any.hits_async().await, 0);
        assert_eq!(flow.metadata.isbn.as_deref(), Some("123"));
    }

    #[tokio::test]
    async fn from_payload_rejects_bad_shapes() {
        let server = MockServer::start_async().await;
        let client = client(&server);
        for payload in [json!("just a string"), json!({"name": "no id"}), json!({"id": "XYZ"})] {
            let err = Bookflow::new(&client, &book_id(), Source::FromPayload(payload))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Construction { .. }), "{err:?}");
        }
    }

    #[tokio::test]
    async fn refresh_reads_server_state() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/api/bookflows/{FLOW}"));
                then.status(200).json_body(json!({"bookflow": {
                    "id": FLOW, "name": "Fresh", "step": "convert", "title": "T",
                }}));
            })
            .await;

        let mut flow = bookflow(&server);
        flow.refresh().await.unwrap();
        assert_eq!(flow.name, "Fresh");
        assert_eq!(flow.step(), Some("convert"));
        assert_eq!(flow.metadata.title.as_deref(), Some("T"));
    }

    #[tokio::test]
    async fn refresh_rejects_another_bookflow() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/api/bookflows/{FLOW}"));
                then.status(200).json_body(json!({"bookflow": {
                    "id": "fedcba9876543210fedcba9876543210",
                    "name": "someone else",
                    "step": "convert",
                }}));
            })
            .await;

        let mut flow = bookflow(&server);
        flow.name = "Mine".into();
        let err = flow.refresh().await.unwrap_err();

        assert!(matches!(err, Error::MalformedResponse { .. }));
        assert_eq!(flow.name, "Mine");
        assert_eq!(flow.step(), None);
    }

    #[tokio::test]
    async fn save_sends_name_and_full_metadata() {
        let server = MockServer::start_async().await;
        let save = server
            .mock_async(|when, then| {
                when.method(POST).path(format!("/api/bookflows/{FLOW}")).json_body(json!({
                    "name": "Great",
                    "title": "Great New Book",
                    "author": "JR",
                    "copyright": null,
                    "isbn": "123-4-56-789000-0",
                    "language": null,
                    "pubdate": null,
                    "publisher": null
                }));
                // Whatever comes back must not leak into local state.
                then.status(200)
                    .json_body(json!({"bookflow": {"id": FLOW, "name": "server-side"}}));
            })
            .await;

        let mut flow = Bookflow::from_value(
            &client(&server),
            &book_id(),
            json!({"id": FLOW}),
            Origin::Caller,
        )
        .unwrap();
        flow.name = "Great".into();
        flow.metadata.title = Some("Great New Book".into());
        flow.metadata.author = Some("JR".into());
        flow.metadata.isbn = Some("123-4-56-789000-0".into());
        flow.save().await.unwrap();

        save.assert_async().await;
        assert_eq!(flow.name, "Great");
    }

    #[tokio::test]
    async fn uploads_are_base64_encoded() {
        let server = MockServer::start_async().await;
        let document = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(format!("/api/bookflows/{FLOW}/files/document"))
                    .json_body(json!({
                        "filename": "MyDoc.doc",
                        "filetype": "doc",
                        "file": "aGVsbG8=",
                    }));
                then.status(200).json_body(json!({}));
            })
            .await;
        let cover = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(format!("/api/bookflows/{FLOW}/files/image"))
                    .json_body(json!({
                        "name": "cover-image",
                        "filename": "c.png",
                        "file": "AAH/",
                    }));
                then.status(200).json_body(json!({}));
            })
            .await;

        let flow = bookflow(&server);
        flow.set_document("MyDoc.doc", b"hello").await.unwrap();
        flow.set_cover_image("c.png", &[0x00, 0x01, 0xff]).await.unwrap();

        document.assert_async().await;
        cover.assert_async().await;
    }

    #[tokio::test]
    async fn convert_defaults_to_test_version_and_returns_bytes() {
        let server = MockServer::start_async().await;
        let convert = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(format!("/api/bookflows/{FLOW}/convert"))
                    .query_param("format", "epub")
                    .query_param("styling", "default")
                    .query_param("version", "test");
                then.status(200)
                    .header("content-disposition", "attachment; filename=\"out.epub\"")
                    .body("PK\u{3}\u{4}");
            })
            .await;

        let flow = bookflow(&server);
        let bytes = flow.convert("epub", &style()).await.unwrap();

        convert.assert_async().await;
        assert_eq!(&bytes[..], b"PK\x03\x04");
    }

    #[tokio::test]
    async fn convert_answered_with_json_is_malformed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/api/bookflows/{FLOW}/convert"));
                then.status(200).json_body(json!({"status": "queued"}));
            })
            .await;

        let flow = bookflow(&server);
        let err = flow
            .convert_with_version("epub", &style(), ConvertVersion::Final)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn get_cover_image_queries_by_name() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(format!("/api/bookflows/{FLOW}/files/image"))
                    .query_param("name", "cover-image");
                then.status(200)
                    .header("content-disposition", "attachment; filename=\"c.png\"")
                    .body([0x89u8, b'P', b'N', b'G']);
            })
            .await;

        let flow = bookflow(&server);
        assert_eq!(&flow.get_cover_image().await.unwrap()[..], b"\x89PNG");
    }
}

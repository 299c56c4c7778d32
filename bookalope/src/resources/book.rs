use serde_json::{Map, Value, json};
use web_time::SystemTime;

use super::bookflow::Bookflow;
use super::{Origin, Source, resource_object};
use crate::BookalopeClient;
use crate::errors::{Error, Result};
use crate::identifier::ResourceId;
use crate::util::{opt_str, take_field, take_list};

const DEFAULT_BOOK_NAME: &str = "<none>";

/// Top-level container holding one or more [`Bookflow`]s.
///
/// The book owns its bookflow list. [`Book::refresh`] rebuilds that list from
/// scratch: bookflows cloned out of the book before a refresh are independent
/// snapshots and no longer reflect what the book holds.
#[derive(Debug, Clone)]
pub struct Book {
    client: BookalopeClient,
    id: ResourceId,
    url: String,
    created: SystemTime,
    bookflows: Vec<Bookflow>,
    /// Display name, sent on [`Book::save`].
    pub name: String,
}

impl Book {
    /// Construct a book from `source`.
    ///
    /// Creating a book makes the server add one bookflow to it, which shows up
    /// in [`Self::bookflows`] right away.
    ///
    /// # Examples
    /// ```no_run
    /// # use bookalope::{Book, BookalopeClient, Source};
    /// # async fn ex(client: BookalopeClient) -> bookalope::Result<()> {
    /// let mut book = Book::new(&client, Source::Create).await?;
    /// book.name = "Great New Book".into();
    /// book.save().await?;
    /// # Ok(()) }
    /// ```
    pub async fn new(client: &BookalopeClient, source: Source) -> Result<Book> {
        let (value, origin) = match source {
            Source::Create => {
                let body = json!({"name": DEFAULT_BOOK_NAME});
                let resp = client.post("/api/books", &body).await?.into_json()?;
                (take_field(resp, "book")?, Origin::Server)
            }
            Source::FetchById(id) => {
                let id = ResourceId::parse(id)?;
                let resp = client.get(&book_url(&id), &[]).await?.into_json()?;
                (take_field(resp, "book")?, Origin::Server)
            }
            Source::FromPayload(value) => (value, Origin::Caller),
        };
        let book = Self::from_value(client, value, origin)?;
        if matches!(origin, Origin::Server) {
            tracing::info!(id = %book.id, bookflows = book.bookflows.len(), "Book ready");
        }
        Ok(book)
    }

    fn from_value(client: &BookalopeClient, value: Value, origin: Origin) -> Result<Book> {
        let (id, map) = resource_object(value, "book", origin)?;
        let bookflows = build_bookflows(client, &id, &map, origin)?;
        Ok(Book {
            client: client.clone(),
            url: book_url(&id),
            id,
            created: SystemTime::now(),
            name: opt_str(&map, "name").unwrap_or_default(),
            bookflows,
        })
    }

    // === Getters ===

    /// Server-assigned id.
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// API path of this book, `/api/books/{id}`.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// When this local object was built. Client-side only, not the server's creation time.
    pub fn created(&self) -> SystemTime {
        self.created
    }

    /// The bookflows as of construction or the last [`Self::refresh`].
    pub fn bookflows(&self) -> &[Bookflow] {
        &self.bookflows
    }

    /// Mutable access, e.g. to edit and save a bookflow in place.
    pub fn bookflows_mut(&mut self) -> &mut [Bookflow] {
        &mut self.bookflows
    }

    // === Lifecycle ===

    /// Re-read the name and rebuild the bookflow list from the server.
    ///
    /// Returns the fresh list. Previously cloned bookflows are left untouched
    /// and are stale from here on.
    pub async fn refresh(&mut self) -> Result<&[Bookflow]> {
        let resp = self.client.get(&self.url, &[]).await?.into_json()?;
        let (id, map) = resource_object(take_field(resp, "book")?, "book", Origin::Server)?;
        if id != self.id {
            return Err(Error::malformed(format!(
                "asked for book {} but got {id}",
                self.id
            )));
        }
        self.bookflows = build_bookflows(&self.client, &self.id, &map, Origin::Server)?;
        self.name = opt_str(&map, "name").unwrap_or_default();
        Ok(&self.bookflows)
    }

    /// Push the name. The server's answer is not merged.
    pub async fn save(&self) -> Result<()> {
        self.client
            .post(&self.url, &json!({"name": self.name}))
            .await?;
        Ok(())
    }

    /// Delete this book, and with it its bookflows, on the server.
    pub async fn delete(&self) -> Result<()> {
        self.client.delete(&self.url).await?;
        tracing::info!(id = %self.id, "Book deleted");
        Ok(())
    }

    /// Create another bookflow for this book and append it to the local list.
    pub async fn create_bookflow(&mut self) -> Result<&mut Bookflow> {
        let bookflow = Bookflow::new(&self.client, &self.id, Source::Create).await?;
        self.bookflows.push(bookflow);
        let last = self.bookflows.len() - 1;
        Ok(&mut self.bookflows[last])
    }
}

impl BookalopeClient {
    /// Create a new book with a placeholder name.
    pub async fn create_book(&self) -> Result<Book> {
        Book::new(self, Source::Create).await
    }

    /// Fetch one book by id.
    pub async fn get_book(&self, id: &str) -> Result<Book> {
        Book::new(self, Source::FetchById(id.to_owned())).await
    }

    /// List every book of the account.
    pub async fn get_books(&self) -> Result<Vec<Book>> {
        let resp = self.get("/api/books", &[]).await?.into_json()?;
        take_list(resp, "books")?
            .into_iter()
            .map(|item| Book::from_value(self, item, Origin::Server))
            .collect()
    }
}

fn book_url(id: &ResourceId) -> String {
    format!("/api/books/{id}")
}

fn build_bookflows(
    client: &BookalopeClient,
    book_id: &ResourceId,
    map: &Map<String, Value>,
    origin: Origin,
) -> Result<Vec<Bookflow>> {
    match map.get("bookflows") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| Bookflow::from_value(client, book_id, item.clone(), origin))
            .collect(),
        Some(_) => Err(origin.error("`bookflows` is not a list".into())),
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    const BOOK: &str = "ca3e5bc6d1dd4695b706fd064d4f482d";
    const FLOW_A: &str = "0123456789abcdef0123456789abcdef";
    const FLOW_B: &str = "fedcba9876543210fedcba9876543210";

    fn client(server: &MockServer) -> BookalopeClient {
        BookalopeClient::builder()
            .host(server.base_url())
            .token("79beff75edcb443b902043cc534476db")
            .build()
            .unwrap()
    }

    fn book_json(name: &str, flows: &[&str]) -> Value {
        let flows: Vec<Value> = flows
            .iter()
            .map(|id| json!({"id": id, "name": "Bookflow", "step": "files"}))
            .collect();
        json!({"book": {"id": BOOK, "name": name, "bookflows": flows}})
    }

    #[tokio::test]
    async fn create_issues_one_post_and_no_gets() {
        let server = MockServer::start_async().await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/books")
                    .json_body(json!({"name": "<none>"}));
                then.status(200).json_body(book_json("<none>", &[FLOW_A]));
            })
            .await;
        let gets = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(500);
            })
            .await;

        let book = client(&server).create_book().await.unwrap();

        create.assert_hits_async(1).await;
        assert_eq!(gets.hits_async().await, 0);
        assert_eq!(book.id().as_str(), BOOK);
        assert_eq!(book.url(), format!("/api/books/{BOOK}"));
        assert_eq!(book.name, "<none>");
        assert_eq!(book.bookflows().len(), 1);
        assert_eq!(book.bookflows()[0].book_id(), book.id());
    }

    #[tokio::test]
    async fn fetch_by_id_issues_one_get_and_no_posts() {
        let server = MockServer::start_async().await;
        let fetch = server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/api/books/{BOOK}"));
                then.status(200).json_body(book_json("Mine", &[FLOW_A, FLOW_B]));
            })
            .await;
        let posts = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(500);
            })
            .await;

        let book = client(&server).get_book(BOOK).await.unwrap();

        fetch.assert_hits_async(1).await;
        assert_eq!(posts.hits_async().await, 0);
        let ids: Vec<&str> = book.bookflows().iter().map(|f| f.id().as_str()).collect();
        assert_eq!(ids, [FLOW_A, FLOW_B]);
    }

    #[tokio::test]
    async fn malformed_id_fails_before_io() {
        let server = MockServer::start_async().await;
        let any = server
            .mock_async(|when, then| {
                when.any_request();
                then.status(200);
            })
            .await;

        let err = client(&server).get_book("../profile").await.unwrap_err();

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

        let payload = take_field(book_json("Listed", &[FLOW_A]), "book").unwrap();
        let book = Book::new(&client(&server), Source::FromPayload(payload))
            .await
            .unwrap();

        assert_eq!(any.hits_async().await, 0);
        assert_eq!(book.name, "Listed");
        assert_eq!(book.bookflows().len(), 1);
    }

    #[tokio::test]
    async fn refresh_rebuilds_bookflows_and_leaves_clones_stale() {
        let server = MockServer::start_async().await;
        let mut first = server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/api/books/{BOOK}"));
                then.status(200).json_body(book_json("Before", &[FLOW_A]));
            })
            .await;

        let mut book = client(&server).get_book(BOOK).await.unwrap();
        let mut stale = book.bookflows()[0].clone();
        stale.name = "edited locally".into();

        first.delete_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/api/books/{BOOK}"));
                then.status(200).json_body(book_json("After", &[FLOW_B, FLOW_A]));
            })
            .await;

        let fresh = book.refresh().await.unwrap();
        assert_eq!(fresh.len(), 2);
        assert_eq!(fresh[0].id().as_str(), FLOW_B);
        assert_eq!(fresh[1].name, "Bookflow");
        assert_eq!(book.name, "After");
        assert_eq!(stale.name, "edited locally");
    }

    #[tokio::test]
    async fn save_sends_only_the_name() {
        let server = MockServer::start_async().await;
        let save = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(format!("/api/books/{BOOK}"))
                    .json_body(json!({"name": "Great New Book"}));
                then.status(200).json_body(book_json("normalized", &[]));
            })
            .await;

        let payload = take_field(book_json("x", &[]), "book").unwrap();
        let mut book = Book::new(&client(&server), Source::FromPayload(payload))
            .await
            .unwrap();
        book.name = "Great New Book".into();
        book.save().await.unwrap();

        save.assert_async().await;
        assert_eq!(book.name, "Great New Book");
    }

    #[tokio::test]
    async fn get_books_wraps_every_item() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/books");
                then.status(200).json_body(json!({"books": [
                    {"id": BOOK, "name": "One", "bookflows": []},
                    {"id": FLOW_A, "name": "Two", "bookflows": [{"id": FLOW_B, "name": "f"}]},
                ]}));
            })
            .await;

        let books = client(&server).get_books().await.unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[1].bookflows()[0].book_id().as_str(), FLOW_A);
    }

    #[tokio::test]
    async fn get_books_without_books_key_is_malformed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/books");
                then.status(200).json_body(json!({"unexpected": 1}));
            })
            .await;

        let err = client(&server).get_books().await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }
}

//! In-memory store behind the test server.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Map, Value, json};

/// Workflow stage of a fresh bookflow.
pub const STEP_FILES: &str = "files";
/// Workflow stage once a document has been uploaded.
pub const STEP_CONVERT: &str = "convert";

/// The metadata keys a bookflow stores.
pub const METADATA_KEYS: [&str; 7] = [
    "title",
    "author",
    "copyright",
    "isbn",
    "language",
    "pubdate",
    "publisher",
];

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct BookRecord {
    pub id: String,
    pub name: String,
    pub bookflows: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BookflowRecord {
    pub id: String,
    pub book_id: String,
    pub name: String,
    pub step: String,
    pub metadata: Map<String, Value>,
    pub document: Option<StoredFile>,
    pub images: HashMap<String, StoredFile>,
}

#[derive(Debug)]
pub struct Store {
    pub firstname: String,
    pub lastname: String,
    pub books: BTreeMap<String, BookRecord>,
    pub bookflows: HashMap<String, BookflowRecord>,
}

impl Default for Store {
    fn default() -> Self {
        Store {
            firstname: "Test".into(),
            lastname: "User".into(),
            books: BTreeMap::new(),
            bookflows: HashMap::new(),
        }
    }
}

/// Random 32 character lowercase hex string, the shape of every id and token.
pub fn random_hex32() -> String {
    format!("{:032x}", rand::random::<u128>())
}

impl Store {
    /// Create a book together with its first bookflow.
    pub fn create_book(&mut self, name: String) -> String {
        let id = random_hex32();
        self.books.insert(
            id.clone(),
            BookRecord {
                id: id.clone(),
                name,
                bookflows: Vec::new(),
            },
        );
        self.create_bookflow(&id, "Bookflow".into(), None);
        id
    }

    /// Create a bookflow under an existing book. Returns `None` if the book is unknown.
    pub fn create_bookflow(
        &mut self,
        book_id: &str,
        name: String,
        title: Option<String>,
    ) -> Option<String> {
        let book = self.books.get_mut(book_id)?;
        let id = random_hex32();
        book.bookflows.push(id.clone());

        let mut metadata = Map::new();
        if let Some(title) = title {
            metadata.insert("title".into(), Value::String(title));
        }
        self.bookflows.insert(
            id.clone(),
            BookflowRecord {
                id: id.clone(),
                book_id: book_id.to_string(),
                name,
                step: STEP_FILES.into(),
                metadata,
                document: None,
                images: HashMap::new(),
            },
        );
        Some(id)
    }

    /// Remove a book and all of its bookflows.
    pub fn delete_book(&mut self, id: &str) -> bool {
        let Some(book) = self.books.remove(id) else {
            return false;
        };
        for flow in book.bookflows {
            self.bookflows.remove(&flow);
        }
        true
    }

    /// Remove one bookflow and unlink it from its book.
    pub fn delete_bookflow(&mut self, id: &str) -> bool {
        let Some(flow) = self.bookflows.remove(id) else {
            return false;
        };
        if let Some(book) = self.books.get_mut(&flow.book_id) {
            book.bookflows.retain(|f| f != id);
        }
        true
    }

    pub fn book_json(&self, book: &BookRecord) -> Value {
        let flows: Vec<Value> = book
            .bookflows
            .iter()
            .filter_map(|id| self.bookflows.get(id))
            .map(BookflowRecord::to_json)
            .collect();
        json!({
            "id": book.id,
            "name": book.name,
            "bookflows": flows,
        })
    }
}

impl BookflowRecord {
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("id".into(), Value::String(self.id.clone()));
        map.insert("name".into(), Value::String(self.name.clone()));
        map.insert("step".into(), Value::String(self.step.clone()));
        map.insert("book".into(), Value::String(self.book_id.clone()));
        for key in METADATA_KEYS {
            map.insert(
                key.into(),
                self.metadata.get(key).cloned().unwrap_or(Value::Null),
            );
        }
        Value::Object(map)
    }
}

/// Shared handle to the store. The lock is never held across an `.await`.
#[derive(Debug, Clone)]
pub struct AppState {
    store: Arc<Mutex<Store>>,
    pub token: Arc<str>,
}

impl AppState {
    pub fn new(token: String) -> Self {
        AppState {
            store: Arc::default(),
            token: token.into(),
        }
    }

    pub fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

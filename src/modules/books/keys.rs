use bookshelf_cache::CacheKey;

/// Cache keys for the books read handlers, shared by population and
/// invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookCacheKey {
    List,
    Book(i64),
    /// Search results; the keyword is folded to lowercase since search
    /// ignores case.
    Search(String),
}

impl CacheKey for BookCacheKey {
    fn cache_key(&self) -> String {
        match self {
            BookCacheKey::List => "books:list_books".to_string(),
            BookCacheKey::Book(id) => format!("books:get_book:{}", id),
            BookCacheKey::Search(keyword) => {
                format!("books:search_books:{}", keyword.to_lowercase())
            }
        }
    }
}

impl BookCacheKey {
    /// Keys made stale by writing book `id`.
    pub fn written(id: i64) -> [BookCacheKey; 2] {
        [BookCacheKey::Book(id), BookCacheKey::List]
    }

    /// Prefix shared by every search key. Any write can change which books
    /// match a keyword, so writes drop the whole family.
    pub fn search_namespace() -> String {
        BookCacheKey::Search(String::new()).cache_key()
    }
}

//! Sample catalog data for local development.

use rand::{seq::SliceRandom, Rng};
use time::{Duration, OffsetDateTime};

use super::models::NewBook;
use super::store::{CatalogStore, StoreResult};

const AUTHORS: &[&str] = &[
    "Mo Yan",
    "Yu Hua",
    "Eileen Chang",
    "Wang Xiaobo",
    "Liu Cixin",
    "Keigo Higashino",
    "Haruki Murakami",
    "George R. R. Martin",
    "J. K. Rowling",
    "Gabriel García Márquez",
];

const TITLE_TEMPLATES: &[&str] = &[
    "The World of {}",
    "Light of {}",
    "A Life of {}",
    "Tales of {}",
    "Notes on {}",
    "Memoirs of {}",
    "Sketches of {}",
    "Gate of {}",
    "Night of {}",
    "The {} Code",
];

const TITLE_WORDS: &[&str] = &[
    "Spring", "Summer", "Autumn", "Winter", "Sky", "Earth", "Mountain", "Sea", "Wind", "Rain",
];

const GENRES: &[&str] = &[
    "novel",
    "science fiction",
    "literary",
    "biography",
    "history",
    "mystery",
    "fantasy",
    "essay",
];

const MIN_PRICE: f64 = 29.9;
const MAX_PRICE: f64 = 199.9;
const MAX_AGE_DAYS: i64 = 365;

/// Generate `count` random books created within the past year
pub fn generate_books<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<NewBook> {
    let now = OffsetDateTime::now_utc();

    (0..count)
        .map(|_| {
            let template = TITLE_TEMPLATES.choose(rng).copied().unwrap_or("{}");
            let word = TITLE_WORDS.choose(rng).copied().unwrap_or("Sea");
            let author = AUTHORS.choose(rng).copied().unwrap_or("Anonymous");
            let genre = GENRES.choose(rng).copied().unwrap_or("novel");
            let price = (rng.gen_range(MIN_PRICE..=MAX_PRICE) * 100.0).round() / 100.0;
            let age = Duration::days(rng.gen_range(0..=MAX_AGE_DAYS));

            NewBook {
                title: template.replace("{}", word),
                author: author.to_string(),
                price,
                description: Some(format!("A {} book written by {}.", genre, author)),
                create_time: Some(now - age),
            }
        })
        .collect()
}

/// Insert `count` generated books, returning how many were written
pub async fn seed(store: &dyn CatalogStore, count: usize) -> StoreResult<usize> {
    let books = generate_books(&mut rand::thread_rng(), count);

    for book in books {
        store.create(book).await?;
    }

    tracing::info!(count, "seeded catalog");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::store::{tests::memory_database, SqliteCatalogStore};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn generated_books_are_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let books = generate_books(&mut rng, 200);
        let now = OffsetDateTime::now_utc();

        assert_eq!(books.len(), 200);
        for book in &books {
            assert!((MIN_PRICE..=MAX_PRICE).contains(&book.price), "{}", book.price);
            assert_eq!((book.price * 100.0).round() / 100.0, book.price);
            assert!(AUTHORS.contains(&book.author.as_str()));
            assert!(!book.title.contains("{}"));

            let created = book.create_time.unwrap();
            assert!(created <= now);
            assert!(now - created <= Duration::days(MAX_AGE_DAYS + 1));
        }
    }

    #[tokio::test]
    async fn seed_writes_requested_count() {
        let store = SqliteCatalogStore::new(memory_database().await.pool().clone());

        assert_eq!(seed(&store, 25).await.unwrap(), 25);
        assert_eq!(store.list().await.unwrap().len(), 25);
    }
}

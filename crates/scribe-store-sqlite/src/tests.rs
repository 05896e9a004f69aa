//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use scribe_core::{
  admin::Admin,
  post::{NewPost, PostId, PostPatch},
  store::{BlogStore, PostQuery},
  subscriber::SubscribeOutcome,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_post(title: &str, category: &str, tags: &[&str]) -> NewPost {
  NewPost {
    title:          title.into(),
    excerpt:        format!("About {title}"),
    content:        format!("{title} body text"),
    category:       category.into(),
    tags:           tags.iter().map(|t| (*t).to_owned()).collect(),
    featured_image: None,
    sources:        vec!["https://example.com/a".into()],
    is_featured:    false,
  }
}

fn query() -> PostQuery {
  PostQuery { limit: 20, ..Default::default() }
}

// ─── Admins ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_insert_is_idempotent() {
  let s = store().await;
  let admin = Admin {
    email:         "admin@example.com".into(),
    password_hash: "hash-1".into(),
    created_at:    Utc::now(),
  };

  assert!(s.insert_admin_if_absent(admin.clone()).await.unwrap());
  let again = Admin { password_hash: "hash-2".into(), ..admin };
  assert!(!s.insert_admin_if_absent(again).await.unwrap());

  let fetched = s.get_admin("admin@example.com").await.unwrap().unwrap();
  assert_eq!(fetched.password_hash, "hash-1");
  assert!(s.get_admin("other@example.com").await.unwrap().is_none());
}

// ─── Create / get ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_post() {
  let s = store().await;
  let created = s
    .create_post(new_post("Hello", "Tech", &["AI", "ML"]), "Editor")
    .await
    .unwrap();

  assert_eq!(created.author, "Editor");
  assert_eq!(created.reading_time, 1);

  let fetched = s.get_post(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_missing_post_returns_none() {
  let s = store().await;
  assert!(s.get_post(PostId::new()).await.unwrap().is_none());
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_applies_merge_patch() {
  let s = store().await;
  let mut input = new_post("Hello", "Tech", &["AI"]);
  input.is_featured = true;
  let created = s.create_post(input, "Editor").await.unwrap();

  let updated = s
    .update_post(created.id, PostPatch { is_featured: Some(false), ..Default::default() })
    .await
    .unwrap()
    .unwrap();

  assert!(!updated.is_featured);
  assert_eq!(updated.title, created.title);
  assert_eq!(updated.content, created.content);
  assert_eq!(updated.category, created.category);
  assert_eq!(updated.tags, created.tags);
  assert_eq!(updated.created_at, created.created_at);
  assert!(updated.updated_at >= created.updated_at);

  let fetched = s.get_post(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_content_recomputes_reading_time_and_index() {
  let s = store().await;
  let created = s.create_post(new_post("Hello", "Tech", &[]), "Editor").await.unwrap();

  let long = vec!["zebra"; 450].join(" ");
  let updated = s
    .update_post(created.id, PostPatch { content: Some(long), ..Default::default() })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.reading_time, 2);

  let found = s
    .list_posts(&PostQuery { search: Some("zebra".into()), ..query() })
    .await
    .unwrap();
  assert_eq!(found.total, 1);
  let stale = s
    .list_posts(&PostQuery { search: Some("body".into()), ..query() })
    .await
    .unwrap();
  assert_eq!(stale.total, 0);
}

#[tokio::test]
async fn update_missing_post_returns_none() {
  let s = store().await;
  let result = s.update_post(PostId::new(), PostPatch::default()).await.unwrap();
  assert!(result.is_none());
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_post_and_its_tags() {
  let s = store().await;
  let created = s.create_post(new_post("Gone", "Tech", &["Temp"]), "Editor").await.unwrap();

  assert!(s.delete_post(created.id).await.unwrap());
  assert!(s.get_post(created.id).await.unwrap().is_none());
  assert!(!s.delete_post(created.id).await.unwrap());
  assert!(s.distinct_tags().await.unwrap().is_empty());
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn category_and_tag_filters() {
  let s = store().await;
  let post = s.create_post(new_post("Neural", "Tech", &["AI", "ML"]), "Editor").await.unwrap();
  s.create_post(new_post("Garden", "Life", &["Plants"]), "Editor").await.unwrap();

  let by_category = s
    .list_posts(&PostQuery { category: Some("Tech".into()), ..query() })
    .await
    .unwrap();
  assert_eq!(by_category.total, 1);
  assert_eq!(by_category.posts[0].id, post.id);

  let by_tag = s
    .list_posts(&PostQuery { tag: Some("ML".into()), ..query() })
    .await
    .unwrap();
  assert_eq!(by_tag.posts.len(), 1);
  assert_eq!(by_tag.posts[0].id, post.id);

  let other = s
    .list_posts(&PostQuery { category: Some("Other".into()), ..query() })
    .await
    .unwrap();
  assert_eq!(other.total, 0);
  assert!(other.posts.is_empty());

  let categories = s.distinct_categories().await.unwrap();
  assert_eq!(categories, vec!["Life".to_string(), "Tech".to_string()]);
}

#[tokio::test]
async fn filters_are_intersected() {
  let s = store().await;
  let mut featured = new_post("Featured AI", "Tech", &["AI"]);
  featured.is_featured = true;
  let featured = s.create_post(featured, "Editor").await.unwrap();
  s.create_post(new_post("Plain AI", "Tech", &["AI"]), "Editor").await.unwrap();
  s.create_post(new_post("Featured Life", "Life", &["AI"]), "Editor").await.unwrap();

  let page = s
    .list_posts(&PostQuery {
      category: Some("Tech".into()),
      tag: Some("AI".into()),
      featured: Some(true),
      ..query()
    })
    .await
    .unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.posts[0].id, featured.id);
}

#[tokio::test]
async fn pagination_is_newest_first_with_full_total() {
  let s = store().await;
  s.create_post(new_post("First", "Tech", &[]), "Editor").await.unwrap();
  s.create_post(new_post("Second", "Tech", &[]), "Editor").await.unwrap();
  let third = s.create_post(new_post("Third", "Tech", &[]), "Editor").await.unwrap();

  let page = s
    .list_posts(&PostQuery { limit: 1, skip: 0, ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.total, 3);
  assert_eq!(page.posts.len(), 1);
  assert_eq!(page.posts[0].id, third.id);

  let rest = s
    .list_posts(&PostQuery { limit: 5, skip: 1, ..Default::default() })
    .await
    .unwrap();
  assert_eq!(rest.total, 3);
  let titles: Vec<_> = rest.posts.iter().map(|p| p.title.as_str()).collect();
  assert_eq!(titles, vec!["Second", "First"]);
}

#[tokio::test]
async fn zero_limit_returns_everything() {
  let s = store().await;
  for i in 0..3 {
    s.create_post(new_post(&format!("Post {i}"), "Tech", &[]), "Editor").await.unwrap();
  }
  let page = s.list_posts(&PostQuery::default()).await.unwrap();
  assert_eq!(page.posts.len(), 3);

  let all = s.list_all_posts(0, 0).await.unwrap();
  assert_eq!(all.posts.len(), 3);
  assert_eq!(all.total, 3);
}

#[tokio::test]
async fn search_matches_any_term_across_fields() {
  let s = store().await;
  let mut by_excerpt = new_post("Quiet", "Tech", &[]);
  by_excerpt.excerpt = "Notes on compilers".into();
  let by_excerpt = s.create_post(by_excerpt, "Editor").await.unwrap();
  let by_title = s.create_post(new_post("Gardening", "Life", &[]), "Editor").await.unwrap();
  s.create_post(new_post("Cooking", "Life", &[]), "Editor").await.unwrap();

  let page = s
    .list_posts(&PostQuery { search: Some("COMPILERS gardening".into()), ..query() })
    .await
    .unwrap();
  assert_eq!(page.total, 2);
  let ids: Vec<_> = page.posts.iter().map(|p| p.id).collect();
  assert!(ids.contains(&by_excerpt.id));
  assert!(ids.contains(&by_title.id));

  // Punctuation and FTS operators in user input must not break the query.
  let odd = s
    .list_posts(&PostQuery { search: Some("\"NEAR( OR*".into()), ..query() })
    .await
    .unwrap();
  assert_eq!(odd.total, 0);

  let punctuation = s
    .list_posts(&PostQuery { search: Some("?!".into()), ..query() })
    .await
    .unwrap();
  assert_eq!(punctuation.total, 0);

  let blank = s
    .list_posts(&PostQuery { search: Some("  ".into()), ..query() })
    .await
    .unwrap();
  assert_eq!(blank.total, 3);
}

#[tokio::test]
async fn search_matches_word_stems() {
  let s = store().await;
  let mut input = new_post("Quiet", "Tech", &[]);
  input.excerpt = "Notes on compilers".into();
  let post = s.create_post(input, "Editor").await.unwrap();

  for term in ["compiler", "compilers", "compiling"] {
    let page = s
      .list_posts(&PostQuery { search: Some(term.into()), ..query() })
      .await
      .unwrap();
    assert_eq!(page.total, 1, "search {term:?}");
    assert_eq!(page.posts[0].id, post.id);
  }
}

#[tokio::test]
async fn reopening_a_version_one_database_rebuilds_the_search_index() {
  let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
  let path  = std::env::temp_dir().join(format!("scribe-fts-{}-{nanos}.db", std::process::id()));

  let s = SqliteStore::open(&path).await.unwrap();
  let mut input = new_post("Quiet", "Tech", &[]);
  input.excerpt = "Notes on compilers".into();
  let post = s.create_post(input, "Editor").await.unwrap();

  // Recreate the index the way version 1 built it: no stemming.
  {
    let raw = rusqlite::Connection::open(&path).unwrap();
    raw
      .execute_batch(
        "DROP TABLE posts_fts;
         CREATE VIRTUAL TABLE posts_fts USING fts5(
           post_id UNINDEXED, title, excerpt, content, tokenize = 'unicode61'
         );
         INSERT INTO posts_fts (post_id, title, excerpt, content)
           SELECT post_id, title, excerpt, content FROM posts;
         PRAGMA user_version = 1;",
      )
      .unwrap();
  }
  drop(s);

  let reopened = SqliteStore::open(&path).await.unwrap();
  let page = reopened
    .list_posts(&PostQuery { search: Some("compiler".into()), ..query() })
    .await
    .unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.posts[0].id, post.id);
  drop(reopened);

  for suffix in ["", "-wal", "-shm"] {
    let mut file = path.clone().into_os_string();
    file.push(suffix);
    let _ = std::fs::remove_file(file);
  }
}

#[tokio::test]
async fn distinct_tags_are_flattened_and_deduplicated() {
  let s = store().await;
  s.create_post(new_post("A", "Tech", &["AI", "ML"]), "Editor").await.unwrap();
  s.create_post(new_post("B", "Tech", &["ML", "Rust", "Rust"]), "Editor").await.unwrap();

  let tags = s.distinct_tags().await.unwrap();
  assert_eq!(tags, vec!["AI".to_string(), "ML".to_string(), "Rust".to_string()]);
  assert_eq!(s.count_posts().await.unwrap(), 2);
}

// ─── Subscribers ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn subscribe_twice_is_a_noop() {
  let s = store().await;

  let first = s.subscribe("reader@example.com".into()).await.unwrap();
  assert_eq!(first, SubscribeOutcome::Subscribed);
  assert_eq!(s.count_subscribers().await.unwrap(), 1);

  let second = s.subscribe("reader@example.com".into()).await.unwrap();
  assert_eq!(second, SubscribeOutcome::AlreadySubscribed);
  assert_eq!(s.count_subscribers().await.unwrap(), 1);

  s.subscribe("other@example.com".into()).await.unwrap();
  let all = s.list_subscribers().await.unwrap();
  let emails: Vec<_> = all.iter().map(|sub| sub.email.as_str()).collect();
  assert_eq!(emails, vec!["reader@example.com", "other@example.com"]);
}

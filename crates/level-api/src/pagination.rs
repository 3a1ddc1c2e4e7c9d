// Cursor pagination over Level list endpoints.
//
// Level pages forward with `starting_after=<id of the last record seen>`.
// A page shorter than the requested size, an empty page, or a last record
// without a usable `id` ends the walk. Records are appended in fetch order
// with no de-duplication: upstream cursors are assumed to be strictly
// monotonic and never repeat a position.

use std::future::Future;

use serde_json::Value;
use tracing::debug;

use crate::Error;
use crate::query::Query;

/// Records per request when collecting every page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Forward cursor parameter.
pub const STARTING_AFTER: &str = "starting_after";

/// Reverse cursor parameter. Passed through, never driven.
pub const ENDING_BEFORE: &str = "ending_before";

/// Page size parameter.
pub const LIMIT: &str = "limit";

/// The cursor a record contributes: non-empty string ids as-is, numeric
/// ids stringified, anything else unusable.
pub fn record_cursor(record: &Value) -> Option<String> {
    match record.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    }
}

/// Walk every page of a cursor-paginated endpoint.
///
/// `seed` is a first page the caller already fetched. When it is shorter
/// than `page_size` no request is made at all. Without a seed, the first
/// request uses the `starting_after` from `base_query`, if any.
///
/// `fetch` receives the full query for each page (`base_query` minus its
/// cursor, then `starting_after`, then `limit`) and returns the unwrapped
/// records. The first error aborts the walk; partial results are dropped.
pub async fn fetch_all_pages<F, Fut>(
    base_query: &Query,
    page_size: usize,
    seed: Option<Vec<Value>>,
    mut fetch: F,
) -> Result<Vec<Value>, Error>
where
    F: FnMut(Query) -> Fut,
    Fut: Future<Output = Result<Vec<Value>, Error>>,
{
    let page_size = page_size.max(1);

    let mut cursor = match &seed {
        Some(items) if items.len() < page_size => {
            debug!(seeded = items.len(), page_size, "seed page is the last page");
            return Ok(items.clone());
        }
        Some(items) => match items.last().and_then(record_cursor) {
            Some(id) => Some(id),
            None => return Ok(items.clone()),
        },
        None => base_query
            .get(STARTING_AFTER)
            .map(|v| v.to_string().trim().to_owned())
            .filter(|c| !c.is_empty()),
    };

    let mut static_query = base_query.clone();
    static_query.remove(STARTING_AFTER);
    static_query.remove(LIMIT);

    let limit = i64::try_from(page_size).unwrap_or(i64::MAX);
    let mut all = seed.unwrap_or_default();
    let mut requests = 0_usize;

    loop {
        let mut query = static_query.clone();
        if let Some(ref c) = cursor {
            query.insert(STARTING_AFTER, c.as_str());
        }
        query.insert(LIMIT, limit);

        requests += 1;
        let items = fetch(query).await?;
        let received = items.len();
        debug!(page = requests, received, cursor = ?cursor, "fetched page");

        if received == 0 {
            break;
        }

        let next = items.last().and_then(record_cursor);
        all.extend(items);

        if received < page_size {
            break;
        }
        match next {
            Some(id) => cursor = Some(id),
            None => break,
        }
    }

    debug!(total = all.len(), requests, "pagination complete");
    Ok(all)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::query::QueryValue;

    fn page(start: usize, len: usize) -> Vec<Value> {
        (start..start + len).map(|i| json!({ "id": format!("r{i}") })).collect()
    }

    /// Serve canned pages, recording every query that was sent.
    struct FakeApi {
        pages: VecDeque<Result<Vec<Value>, Error>>,
        seen: Vec<Query>,
    }

    impl FakeApi {
        fn new(pages: Vec<Result<Vec<Value>, Error>>) -> Self {
            Self {
                pages: pages.into(),
                seen: Vec::new(),
            }
        }

        fn next(&mut self, query: Query) -> std::future::Ready<Result<Vec<Value>, Error>> {
            self.seen.push(query);
            std::future::ready(self.pages.pop_front().unwrap_or_else(|| Ok(Vec::new())))
        }
    }

    #[tokio::test]
    async fn three_pages_yield_all_records_in_three_requests() {
        let mut api = FakeApi::new(vec![Ok(page(0, 100)), Ok(page(100, 100)), Ok(page(200, 37))]);

        let all = fetch_all_pages(&Query::new(), 100, None, |q| api.next(q))
            .await
            .unwrap();

        assert_eq!(all.len(), 237);
        assert_eq!(api.seen.len(), 3);
        assert_eq!(all[0]["id"], "r0");
        assert_eq!(all[236]["id"], "r236");

        assert!(!api.seen[0].contains_key(STARTING_AFTER));
        assert_eq!(api.seen[1].get(STARTING_AFTER), Some(&QueryValue::from("r99")));
        assert_eq!(api.seen[2].get(STARTING_AFTER), Some(&QueryValue::from("r199")));
        assert!(api.seen.iter().all(|q| q.get(LIMIT) == Some(&QueryValue::Integer(100))));
    }

    #[tokio::test]
    async fn short_seed_page_makes_no_requests() {
        let mut api = FakeApi::new(vec![Ok(page(0, 100))]);

        let all = fetch_all_pages(&Query::new(), 100, Some(page(0, 42)), |q| api.next(q))
            .await
            .unwrap();

        assert_eq!(all.len(), 42);
        assert!(api.seen.is_empty());
    }

    #[tokio::test]
    async fn full_seed_page_continues_from_its_last_id() {
        let mut api = FakeApi::new(vec![Ok(page(100, 10))]);

        let all = fetch_all_pages(&Query::new(), 100, Some(page(0, 100)), |q| api.next(q))
            .await
            .unwrap();

        assert_eq!(all.len(), 110);
        assert_eq!(api.seen.len(), 1);
        assert_eq!(api.seen[0].get(STARTING_AFTER), Some(&QueryValue::from("r99")));
    }

    #[tokio::test]
    async fn empty_page_terminates() {
        let mut api = FakeApi::new(vec![Ok(page(0, 2)), Ok(Vec::new())]);

        let all = fetch_all_pages(&Query::new(), 2, None, |q| api.next(q))
            .await
            .unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(api.seen.len(), 2);
    }

    #[tokio::test]
    async fn missing_id_on_last_record_terminates() {
        let full_without_id = vec![json!({"id": "a"}), json!({"name": "no id"})];
        let mut api = FakeApi::new(vec![Ok(full_without_id), Ok(page(0, 2))]);

        let all = fetch_all_pages(&Query::new(), 2, None, |q| api.next(q))
            .await
            .unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(api.seen.len(), 1);
    }

    #[tokio::test]
    async fn numeric_ids_become_string_cursors() {
        let mut api = FakeApi::new(vec![
            Ok(vec![json!({"id": 1}), json!({"id": 2})]),
            Ok(vec![json!({"id": 3})]),
        ]);

        let all = fetch_all_pages(&Query::new(), 2, None, |q| api.next(q))
            .await
            .unwrap();

        assert_eq!(all.len(), 3);
        assert_eq!(api.seen[1].get(STARTING_AFTER), Some(&QueryValue::from("2")));
    }

    #[tokio::test]
    async fn base_filters_are_kept_and_explicit_cursor_starts_the_walk() {
        let mut base = Query::new();
        base.insert("status", "active");
        base.insert(STARTING_AFTER, "  c-0 ");
        base.insert(LIMIT, 7_i64);
        let mut api = FakeApi::new(vec![Ok(page(0, 1))]);

        fetch_all_pages(&base, 100, None, |q| api.next(q))
            .await
            .unwrap();

        assert_eq!(
            api.seen[0].to_pairs(),
            vec![
                ("status".to_owned(), "active".to_owned()),
                ("starting_after".to_owned(), "c-0".to_owned()),
                ("limit".to_owned(), "100".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn first_error_aborts_without_partial_results() {
        let mut api = FakeApi::new(vec![
            Ok(page(0, 2)),
            Err(Error::Api {
                status: 502,
                message: "bad gateway".into(),
            }),
            Ok(page(4, 2)),
        ]);

        let result = fetch_all_pages(&Query::new(), 2, None, |q| api.next(q)).await;

        assert!(matches!(result, Err(Error::Api { status: 502, .. })));
        assert_eq!(api.seen.len(), 2);
    }

    #[test]
    fn record_cursor_rules() {
        assert_eq!(record_cursor(&json!({"id": "x"})), Some("x".into()));
        assert_eq!(record_cursor(&json!({"id": 12})), Some("12".into()));
        assert_eq!(record_cursor(&json!({"id": ""})), None);
        assert_eq!(record_cursor(&json!({"id": null})), None);
        assert_eq!(record_cursor(&json!({"id": true})), None);
        assert_eq!(record_cursor(&json!("bare")), None);
    }
}

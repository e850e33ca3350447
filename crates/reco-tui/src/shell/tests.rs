//! Page shell behaviour: mode transitions, cache hits, stale responses.

use super::*;

fn shell() -> PageShell {
    PageShell::new(
        ShellSettings {
            per_page: 10,
            total_pages: 5,
        },
        RecommendationCache::new(8),
    )
}

fn recs(names: &[&str]) -> Vec<Recommendation> {
    names
        .iter()
        .map(|n| Recommendation::new(*n, "John Lennon"))
        .collect()
}

fn ok(items: Vec<Recommendation>) -> Result<Fetched, ApiError> {
    Ok(Fetched {
        items,
        total_pages: None,
    })
}

#[test]
fn test_start_lists_songs() {
    let mut s = shell();
    let t = s.start();
    assert_eq!(t.query, Query::Songs { page: 1, per_page: 10 });
    assert!(s.loading());
    assert!(!s.pager().prev_enabled());
    assert!(!s.pager().next_enabled());

    assert_eq!(s.on_response(&t, ok(recs(&["a", "b"]))), Outcome::Applied);
    assert_eq!(s.mode(), Mode::Default);
    assert_eq!(s.items().len(), 2);
    assert!(!s.loading());
    assert!(s.pager().next_enabled());
}

#[test]
fn test_selecting_a_song_shows_its_first_page() {
    // query "Imagine" → pick it → recommend {song, page 1, per_page 10}
    let mut s = shell();
    let t = s.select_song("Imagine").unwrap();
    assert_eq!(
        t.query,
        Query::Recommend {
            song: "Imagine".to_string(),
            page: 1,
            per_page: 10
        }
    );
    assert_eq!(s.mode(), Mode::Recommend);

    let returned = recs(&["Jealous Guy", "Mind Games", "Woman"]);
    assert_eq!(s.on_response(&t, ok(returned.clone())), Outcome::Applied);
    assert_eq!(s.items().to_vec(), returned);
    assert_eq!(s.page(), 1);
    assert_eq!(s.selected_song(), Some("Imagine"));
}

#[test]
fn test_revisiting_page_is_served_from_cache() {
    let mut s = shell();
    let t1 = s.select_song("X").unwrap();
    s.on_response(&t1, ok(recs(&["a1", "a2"])));
    let first = s.items().clone();

    let t2 = s.change_page(2).expect("page 2 not cached yet");
    assert_eq!(t2.query.page(), 2);
    s.on_response(&t2, ok(recs(&["b1", "b2"])));
    assert_eq!(s.items()[0].track_name, "b1");

    // Back to page 1: no ticket, same objects as the first fetch.
    assert_eq!(s.change_page(1), None);
    assert_eq!(s.page(), 1);
    assert!(!s.loading());
    assert!(Arc::ptr_eq(&first, s.items()));

    // And forward again to 2 without another request.
    assert_eq!(s.next_page(), None);
    assert_eq!(s.items()[0].track_name, "b1");
}

#[test]
fn test_reselecting_known_song_needs_no_request() {
    let mut s = shell();
    let t = s.select_song("X").unwrap();
    s.on_response(&t, ok(recs(&["a"])));
    let t = s.select_song("Y").unwrap();
    s.on_response(&t, ok(recs(&["y"])));

    assert_eq!(s.select_song("X"), None);
    assert_eq!(s.items()[0].track_name, "a");
    assert_eq!(s.mode(), Mode::Recommend);
}

#[test]
fn test_search_mode_pages_re_search_the_query() {
    let mut s = shell();
    let t = s.start();
    s.on_response(&t, ok(recs(&["a"])));

    let t = s.enter_search("imag").unwrap();
    assert_eq!(s.mode(), Mode::Search);
    assert_eq!(
        t.query,
        Query::Search {
            query: "imag".to_string(),
            page: 1,
            per_page: 10
        }
    );
    s.on_response(&t, ok(recs(&["Imagine"])));

    let t = s.change_page(2).unwrap();
    assert_eq!(
        t.query,
        Query::Search {
            query: "imag".to_string(),
            page: 2,
            per_page: 10
        }
    );
}

#[test]
fn test_default_mode_pages_relist_songs() {
    let mut s = shell();
    let t = s.start();
    s.on_response(&t, ok(recs(&["a"])));
    let t = s.change_page(3).unwrap();
    assert_eq!(t.query, Query::Songs { page: 3, per_page: 10 });
}

#[test]
fn test_same_search_is_not_repeated() {
    let mut s = shell();
    let t = s.enter_search("imagine").unwrap();
    assert_eq!(s.enter_search("imagine"), None);
    s.on_response(&t, ok(recs(&["Imagine"])));
    assert_eq!(s.enter_search(" imagine "), None);
    assert!(s.enter_search("imagine d").is_some());
    assert_eq!(s.enter_search("   "), None);
}

#[test]
fn test_typing_in_recommend_mode_keeps_recommendations() {
    let mut s = shell();
    let t = s.select_song("X").unwrap();
    s.on_response(&t, ok(recs(&["a"])));
    assert_eq!(s.enter_search("other"), None);
    assert_eq!(s.mode(), Mode::Recommend);
    assert_eq!(s.items()[0].track_name, "a");
}

#[test]
fn test_page_bounds_and_loading_guard() {
    let mut s = shell();
    let t = s.select_song("X").unwrap();

    // Still loading page 1.
    assert_eq!(s.change_page(2), None);
    s.on_response(&t, ok(recs(&["a"])));

    assert_eq!(s.change_page(0), None);
    assert_eq!(s.change_page(6), None);
    assert_eq!(s.prev_page(), None);
    assert_eq!(s.page(), 1);

    let t = s.change_page(5).unwrap();
    s.on_response(&t, ok(recs(&["e"])));
    assert!(!s.pager().next_enabled());
    assert_eq!(s.next_page(), None);
    assert_eq!(s.page(), 5);
}

#[test]
fn test_stale_response_is_not_displayed_but_is_cached() {
    let mut s = shell();
    let slow = s.select_song("X").unwrap();
    let fast = s.select_song("Y").unwrap();

    assert_eq!(s.on_response(&fast, ok(recs(&["y"]))), Outcome::Applied);
    assert_eq!(s.on_response(&slow, ok(recs(&["x"]))), Outcome::Stale);
    assert_eq!(s.items()[0].track_name, "y");
    assert_eq!(s.selected_song(), Some("Y"));

    // The late page for X is still usable later.
    assert!(s.cache().contains("X", 1));
    assert_eq!(s.select_song("X"), None);
    assert_eq!(s.items()[0].track_name, "x");
}

#[test]
fn test_stale_search_does_not_override_newer_one() {
    let mut s = shell();
    let old = s.enter_search("im").unwrap();
    let new = s.enter_search("imagine").unwrap();
    assert_eq!(s.on_response(&new, ok(recs(&["Imagine"]))), Outcome::Applied);
    assert_eq!(s.on_response(&old, ok(recs(&["Immigrant Song"]))), Outcome::Stale);
    assert_eq!(s.items()[0].track_name, "Imagine");
}

#[test]
fn test_cache_hit_invalidates_in_flight_request() {
    let mut s = shell();
    let t = s.select_song("X").unwrap();
    s.on_response(&t, ok(recs(&["x"])));
    let in_flight = s.select_song("Y").unwrap();
    assert_eq!(s.select_song("X"), None);

    assert_eq!(s.on_response(&in_flight, ok(recs(&["y"]))), Outcome::Stale);
    assert_eq!(s.items()[0].track_name, "x");
    assert!(s.cache().contains("Y", 1));
}

#[test]
fn test_failure_surfaces_error_and_clears_loading() {
    let mut s = shell();
    let t = s.select_song("Nope").unwrap();
    let outcome = s.on_response(
        &t,
        Err(ApiError::Status {
            status: 404,
            message: "Song 'Nope' not found".to_string(),
        }),
    );
    assert_eq!(outcome, Outcome::Failed("Song 'Nope' not found".to_string()));
    assert!(!s.loading());
    assert_eq!(s.error(), Some("Song 'Nope' not found"));
    assert!(s.items().is_empty());
    assert!(!s.cache().contains("Nope", 1));

    // A retry clears the error while it loads.
    let t = s.select_song("Nope").unwrap();
    assert_eq!(s.error(), None);
    s.on_response(&t, ok(recs(&["a"])));
    assert_eq!(s.error(), None);
}

#[test]
fn test_stale_failure_is_ignored() {
    let mut s = shell();
    let old = s.select_song("X").unwrap();
    let new = s.select_song("Y").unwrap();
    s.on_response(&new, ok(recs(&["y"])));
    let outcome = s.on_response(&old, Err(ApiError::Transport("refused".to_string())));
    assert_eq!(outcome, Outcome::Stale);
    assert_eq!(s.error(), None);
}

#[test]
fn test_reported_total_pages_wins() {
    let mut s = shell();
    let t = s.select_song("X").unwrap();
    s.on_response(
        &t,
        Ok(Fetched {
            items: recs(&["a"]),
            total_pages: Some(2),
        }),
    );
    assert_eq!(s.total_pages(), 2);
    assert_eq!(s.pager().label(), "Page 1 of 2");
    assert_eq!(s.change_page(3), None);

    // A new song starts from the configured guess again.
    let t = s.select_song("Y").unwrap();
    assert_eq!(s.total_pages(), 5);
    s.on_response(&t, ok(recs(&["b"])));
    assert_eq!(s.total_pages(), 5);
}

#[test]
fn test_reselected_song_keeps_reported_total() {
    let mut s = shell();
    let t = s.select_song("X").unwrap();
    s.on_response(
        &t,
        Ok(Fetched {
            items: recs(&["a"]),
            total_pages: Some(2),
        }),
    );
    let t = s.select_song("Y").unwrap();
    s.on_response(&t, ok(recs(&["b"])));
    assert_eq!(s.total_pages(), 5);

    // Page 1 of X comes from the cache, and so does its page count.
    assert_eq!(s.select_song("X"), None);
    assert_eq!(s.items()[0].track_name, "a");
    assert_eq!(s.total_pages(), 2);
    assert_eq!(s.change_page(3), None);
}

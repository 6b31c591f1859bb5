use super::*;

use PageItem::{Ellipsis, Page};

#[test]
fn single_page() {
    assert_eq!(pagination_range(1, 1), vec![Page(1)]);
}

#[test]
fn zero_total_is_shown_as_one_page() {
    assert_eq!(pagination_range(1, 0), vec![Page(1)]);
}

#[test]
fn two_pages() {
    assert_eq!(pagination_range(1, 2), vec![Page(1), Page(2)]);
    assert_eq!(pagination_range(2, 2), vec![Page(1), Page(2)]);
}

#[test]
fn short_ranges_have_no_ellipsis() {
    assert_eq!(
        pagination_range(3, 5),
        vec![Page(1), Page(2), Page(3), Page(4), Page(5)]
    );
}

#[test]
fn first_page_of_many() {
    assert_eq!(
        pagination_range(1, 20),
        vec![Page(1), Page(2), Page(3), Ellipsis, Page(20)]
    );
}

#[test]
fn last_page_of_many() {
    assert_eq!(
        pagination_range(20, 20),
        vec![Page(1), Ellipsis, Page(18), Page(19), Page(20)]
    );
}

#[test]
fn middle_page_has_two_ellipses() {
    assert_eq!(
        pagination_range(10, 20),
        vec![
            Page(1),
            Ellipsis,
            Page(8),
            Page(9),
            Page(10),
            Page(11),
            Page(12),
            Ellipsis,
            Page(20)
        ]
    );
}

#[test]
fn one_page_gap_is_filled_not_elided() {
    // Window for page 5 starts at 3, leaving only page 2 missing.
    assert_eq!(
        pagination_range(5, 20),
        vec![
            Page(1),
            Page(2),
            Page(3),
            Page(4),
            Page(5),
            Page(6),
            Page(7),
            Ellipsis,
            Page(20)
        ]
    );
}

#[test]
fn gap_of_two_pages_is_elided() {
    assert_eq!(
        pagination_range(6, 20),
        vec![
            Page(1),
            Ellipsis,
            Page(4),
            Page(5),
            Page(6),
            Page(7),
            Page(8),
            Ellipsis,
            Page(20)
        ]
    );
}

#[test]
fn display_renders_ellipsis() {
    let rendered: Vec<String> = pagination_range(1, 10)
        .iter()
        .map(|item| item.to_string())
        .collect();
    assert_eq!(rendered, vec!["1", "2", "3", "...", "10"]);
}

#[test]
fn page_accessor() {
    assert_eq!(Page(4).page(), Some(4));
    assert_eq!(Ellipsis.page(), None);
}

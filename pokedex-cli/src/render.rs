//! Plain-text rendering of catalog pages and favorites.
//!
//! These return strings without colour so they can be tested directly; the
//! commands add colour where the terminal supports it.

use pokedex_catalog::{Creature, PageItem, PageView, TagFilter};

pub(crate) const NO_FAVORITES: &str = "You have not added any favorite Pokémon yet.";
pub(crate) const NO_MATCHES: &str = "No Pokémon match the selected filters.";

/// One-line card: `#025 Pikachu  electric  (kanto)`.
pub(crate) fn card_line(creature: &Creature, favorite: bool) -> String {
    format!(
        "{} #{:03} {:<12} {:<18} ({})",
        if favorite { "\u{2605}" } else { " " },
        creature.number,
        creature.name,
        creature.type_list(),
        creature.region,
    )
}

/// `Page 3 of 7`, or `Page 1 of 1` when nothing matched.
pub(crate) fn page_label(view: &PageView<'_>) -> String {
    format!("Page {} of {}", view.page, view.total_pages.max(1))
}

/// Pagination bar with the current page in brackets: `1 ... 4 5 [6] 7 8 ... 20`.
pub(crate) fn pagination_bar(items: &[PageItem], current: u32) -> String {
    items
        .iter()
        .map(|item| match item.page() {
            Some(p) if p == current => format!("[{}]", p),
            _ => item.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Favorites table with number, name and image columns.
pub(crate) fn favorites_table(favorites: &[Creature]) -> Vec<String> {
    if favorites.is_empty() {
        return vec![NO_FAVORITES.to_string()];
    }
    let name_width = favorites
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());

    let mut lines = Vec::with_capacity(favorites.len() + 1);
    lines.push(format!("{:>4}  {:<name_width$}  Image", "#", "Name"));
    for creature in favorites {
        lines.push(format!(
            "{:>4}  {:<name_width$}  {}",
            creature.number,
            creature.name,
            creature.image_url(),
        ));
    }
    lines
}

/// Filter label for headers: `"All Types"` or the selected tag.
pub(crate) fn filter_label(filter: &TagFilter, all_label: &str) -> String {
    if filter.is_all() {
        all_label.to_string()
    } else {
        filter.to_string()
    }
}

/// Option list for a filter, with the "All" entry first.
pub(crate) fn option_list<'a>(all_label: &str, names: impl Iterator<Item = &'a str>) -> Vec<String> {
    std::iter::once(all_label.to_string())
        .chain(names.map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokedex_catalog::{PageSize, pagination_range, paginate};

    fn creature(number: u32, name: &str) -> Creature {
        Creature {
            name: name.to_string(),
            number,
            types: vec!["electric".to_string()],
            region: "kanto".to_string(),
            image: None,
        }
    }

    #[test]
    fn card_marks_favorites() {
        let pikachu = creature(25, "Pikachu");
        let line = card_line(&pikachu, true);
        assert!(line.starts_with('\u{2605}'));
        assert!(line.contains("#025 Pikachu"));
        assert!(line.ends_with("(kanto)"));
        assert!(card_line(&pikachu, false).starts_with(' '));
    }

    #[test]
    fn bar_brackets_current_page() {
        let bar = pagination_bar(&pagination_range(6, 20), 6);
        assert_eq!(bar, "1 ... 4 5 [6] 7 8 ... 20");
        assert_eq!(pagination_bar(&pagination_range(1, 1), 1), "[1]");
    }

    #[test]
    fn empty_result_reads_page_one_of_one() {
        let view = paginate(Vec::new(), 1, PageSize::Twenty);
        assert_eq!(page_label(&view), "Page 1 of 1");
    }

    #[test]
    fn favorites_table_layout() {
        assert_eq!(favorites_table(&[]), vec![NO_FAVORITES.to_string()]);

        let lines = favorites_table(&[creature(1, "Bulbasaur"), creature(25, "Pikachu")]);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Name"));
        assert!(lines[2].starts_with("  25  Pikachu"));
        assert!(lines[2].ends_with("/25.png"));
    }

    #[test]
    fn filter_labels() {
        assert_eq!(filter_label(&TagFilter::All, "All Types"), "All Types");
        assert_eq!(
            filter_label(&TagFilter::from_selection(Some("fire")), "All Types"),
            "fire"
        );
    }

    #[test]
    fn options_start_with_all() {
        let opts = option_list("All Types", ["fire", "water"].into_iter());
        assert_eq!(opts, vec!["All Types", "fire", "water"]);
    }
}

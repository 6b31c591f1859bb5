use std::collections::HashSet;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use pokedex_catalog::{Catalog, FilterSelection, TagFilter};
use pokedex_favorites::{AuthProvider, RelationStore};

use crate::CliError;
use crate::cli_types::BrowseArgs;
use crate::render;

/// Print one page of the filtered catalog.
pub(crate) fn run_browse(catalog: &Catalog, args: &BrowseArgs, quiet: bool) -> Result<(), CliError> {
    let mut selection = FilterSelection::new();
    selection.set_type(TagFilter::from_selection(
        args.type_filter.as_deref().map(str::to_lowercase).as_deref(),
    ));
    selection.set_region(TagFilter::from_selection(
        args.region.as_deref().map(str::to_lowercase).as_deref(),
    ));
    selection.set_page_size(args.per_page);

    let total_pages = selection.apply(&catalog.creatures).total_pages;
    selection.go_to(args.page, total_pages);
    if selection.page() != args.page {
        log::warn!(
            "Page {} does not exist, showing page {}",
            args.page,
            selection.page()
        );
    }
    let view = selection.apply(&catalog.creatures);

    let favorites = favorite_numbers(quiet);

    log::info!(
        "{} {}",
        "Pokédex".if_supports_color(Stdout, |t| t.bold()),
        format!(
            "({}, {}, {} per page)",
            render::filter_label(selection.type_filter(), "All Types"),
            render::filter_label(selection.region_filter(), "All Regions"),
            selection.page_size(),
        )
        .if_supports_color(Stdout, |t| t.dimmed()),
    );
    crate::log_blank();

    if view.items.is_empty() {
        log::info!("{}", render::NO_MATCHES);
    }
    for creature in &view.items {
        let line = render::card_line(creature, favorites.contains(&creature.number));
        if favorites.contains(&creature.number) {
            log::info!("{}", line.if_supports_color(Stdout, |t| t.yellow()));
        } else {
            log::info!("{}", line);
        }
    }

    crate::log_blank();
    log::info!(
        "{}  {}",
        render::page_label(&view).if_supports_color(Stdout, |t| t.bold()),
        format!("({} matching)", view.total_items).if_supports_color(Stdout, |t| t.dimmed()),
    );
    log::info!("{}", render::pagination_bar(&view.range(), view.page));

    Ok(())
}

/// Numbers favorited by the signed-in user; empty when signed out or when
/// the backend cannot be reached.
fn favorite_numbers(quiet: bool) -> HashSet<u32> {
    if pokedex_favorites::session_path().is_none_or(|p| !p.exists()) {
        return HashSet::new();
    }
    let client = match super::open_client() {
        Ok(client) => client,
        Err(e) => {
            log::debug!("Not showing favorite markers: {}", e);
            return HashSet::new();
        }
    };
    let Some(session) = client.current_session() else {
        return HashSet::new();
    };

    let rt = match super::runtime() {
        Ok(rt) => rt,
        Err(e) => {
            log::warn!("{}", e);
            return HashSet::new();
        }
    };
    let pb = super::spinner(quiet, "Loading favorites...");
    let result = rt.block_on(client.select_favorites(session.user_id()));
    pb.finish_and_clear();

    match result {
        Ok(numbers) => numbers.into_iter().collect(),
        Err(e) => {
            log::warn!("Error fetching favorites: {}", e);
            HashSet::new()
        }
    }
}

/// Print the type filter options.
pub(crate) fn run_types(catalog: &Catalog) {
    let options = render::option_list("All Types", catalog.types.iter().map(|t| t.name.as_str()));
    for option in options {
        log::info!("{}", option);
    }
}

/// Print the region filter options.
pub(crate) fn run_regions(catalog: &Catalog) {
    let options =
        render::option_list("All Regions", catalog.regions.iter().map(|r| r.name.as_str()));
    for option in options {
        log::info!("{}", option);
    }
}

/// Print a single record.
pub(crate) fn run_show(catalog: &Catalog, number: u32) -> Result<(), CliError> {
    let creature = catalog.find(number).ok_or(CliError::UnknownNumber(number))?;

    log::info!(
        "{} {}",
        format!("#{:03}", creature.number).if_supports_color(Stdout, |t| t.dimmed()),
        creature.name.if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!(
        "  {} {}",
        "Type:  ".if_supports_color(Stdout, |t| t.cyan()),
        creature.type_list()
    );
    log::info!(
        "  {} {}",
        "Region:".if_supports_color(Stdout, |t| t.cyan()),
        creature.region
    );
    log::info!(
        "  {} {}",
        "Image: ".if_supports_color(Stdout, |t| t.cyan()),
        creature.image_url()
    );
    Ok(())
}

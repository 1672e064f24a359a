//! In-memory search and pagination over an already-fetched list.

use crate::types::GymOwner;

/// Case-insensitive substring search over owner name, email, gym name and
/// unique id. The term is used as typed, surrounding whitespace included; an
/// empty term matches everything.
pub fn search_gym_owners<'a>(owners: &'a [GymOwner], term: &str) -> Vec<&'a GymOwner> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return owners.iter().collect();
    }
    let hit = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(&needle));
    owners
        .iter()
        .filter(|o| {
            hit(Some(o.owner_name.as_str()))
                || hit(Some(o.email.as_str()))
                || hit(o.gym_name.as_deref())
                || hit(o.unique_id.as_deref())
        })
        .collect()
}

/// One page of a list, with the figures a table footer shows
/// ("Showing 11 to 20 of 42 entries").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    /// 1-based index of the first item shown, 0 when the page is empty.
    pub from: usize,
    /// 1-based index of the last item shown, 0 when the page is empty.
    pub to: usize,
}

/// Slice out 1-based `page`. Zero `page` or `per_page` is treated as 1;
/// a page past the end is empty.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);

    let start = ((page - 1).saturating_mul(per_page)).min(total_items);
    let end = start.saturating_add(per_page).min(total_items);
    let slice = &items[start..end];
    let (from, to) = if slice.is_empty() { (0, 0) } else { (start + 1, end) };

    Page {
        items: slice,
        page,
        per_page,
        total_items,
        total_pages,
        from,
        to,
    }
}

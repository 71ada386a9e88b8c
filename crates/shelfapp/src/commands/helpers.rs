//! Tree walking shared by the taxonomy commands.
//!
//! All walks carry a visited set: imported data may contain cycles the catalog
//! has not repaired yet, and a walk must terminate regardless.

use crate::model::Category;
use std::collections::{BTreeMap, HashMap, HashSet};

type Categories = BTreeMap<String, Category>;

/// Ids reachable from `id` through `sub_categories`, depth-first, excluding `id`.
pub fn descendant_ids(categories: &Categories, id: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut seen: HashSet<&str> = HashSet::from([id]);
    let mut stack: Vec<&str> = match categories.get(id) {
        Some(cat) => cat.sub_categories.iter().rev().map(String::as_str).collect(),
        None => return result,
    };

    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        if let Some(cat) = categories.get(current) {
            result.push(cat.id.clone());
            stack.extend(cat.sub_categories.iter().rev().map(String::as_str));
        }
    }
    result
}

/// Ancestors of `id` following `parent_category`, ordered root first.
pub fn ancestor_ids(categories: &Categories, id: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut seen: HashSet<&str> = HashSet::from([id]);
    let mut current = categories.get(id).and_then(|c| c.parent_category.as_deref());

    while let Some(parent_id) = current {
        if !seen.insert(parent_id) {
            break;
        }
        let Some(parent) = categories.get(parent_id) else {
            break;
        };
        result.push(parent.id.clone());
        current = parent.parent_category.as_deref();
    }
    result.reverse();
    result
}

/// Whether `candidate` is `id` itself or sits below it.
///
/// Walks upward from `candidate` along `parent_category` pointers.
pub fn is_self_or_descendant(categories: &Categories, id: &str, candidate: &str) -> bool {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = Some(candidate);

    while let Some(cursor) = current {
        if cursor == id {
            return true;
        }
        if !seen.insert(cursor) {
            return false;
        }
        current = categories
            .get(cursor)
            .and_then(|c| c.parent_category.as_deref());
    }
    false
}

/// `parent.path ++ [parent.id]`, or `None` when the parent is missing.
fn child_path(categories: &Categories, parent_id: Option<&str>) -> Option<Vec<String>> {
    match parent_id {
        None => Some(Vec::new()),
        Some(pid) => categories.get(pid).map(|parent| {
            let mut path = parent.path.clone();
            path.push(parent.id.clone());
            path
        }),
    }
}

/// Recompute `path`/`level` for `id` and everything below it.
///
/// A category whose parent is missing keeps its path; only `level` is
/// re-derived. Returns the ids whose path changed.
pub fn refresh_paths(categories: &mut Categories, id: &str) -> Vec<String> {
    let mut changed = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut queue = vec![id.to_string()];

    while let Some(current) = queue.pop() {
        if !seen.insert(current.clone()) {
            continue;
        }
        let parent = categories
            .get(&current)
            .and_then(|c| c.parent_category.clone());
        let new_path = child_path(categories, parent.as_deref());

        let Some(cat) = categories.get_mut(&current) else {
            continue;
        };
        if let Some(path) = new_path {
            if cat.path != path {
                cat.path = path;
                changed.push(current.clone());
            }
        }
        cat.level = cat.path.len();
        queue.extend(cat.sub_categories.iter().rev().cloned());
    }
    changed
}

/// A category detached from its parent while repairing the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachedCycle {
    pub id: String,
    pub parent: String,
}

/// Re-derive every denormalized hierarchy field from `parent_category`.
///
/// Used after bulk replacement (import), where incoming records may carry stale
/// `sub_categories`/`path` values or even reference each other in a loop.
///
/// 1. Break cycles: the first category (by id) found on a loop is made a root.
/// 2. `sub_categories` keeps existing order for children that still point here
///    and appends newly found children by creation time.
/// 3. `path`/`level` are recomputed top-down.
///
/// A consistent tree comes out unchanged.
pub fn rebuild_hierarchy(categories: &mut Categories) -> Vec<DetachedCycle> {
    let mut detached = Vec::new();

    // 1. Cycles
    let ids: Vec<String> = categories.keys().cloned().collect();
    for id in &ids {
        let parent = categories.get(id).and_then(|c| c.parent_category.clone());
        if let Some(parent) = parent {
            if is_self_or_descendant(categories, id, &parent) {
                if let Some(cat) = categories.get_mut(id) {
                    cat.parent_category = None;
                }
                tracing::warn!(id = %id, parent = %parent, "detached category to break a cycle");
                detached.push(DetachedCycle {
                    id: id.clone(),
                    parent,
                });
            }
        }
    }

    // 2. Children lists
    let mut children: HashMap<String, Vec<(chrono::DateTime<chrono::Utc>, String)>> =
        HashMap::new();
    for cat in categories.values() {
        if let Some(parent) = &cat.parent_category {
            children
                .entry(parent.clone())
                .or_default()
                .push((cat.created_at, cat.id.clone()));
        }
    }
    for list in children.values_mut() {
        list.sort();
    }

    for id in &ids {
        let found = children.remove(id).unwrap_or_default();
        let Some(cat) = categories.get_mut(id) else {
            continue;
        };
        let found_ids: HashSet<&str> = found.iter().map(|(_, c)| c.as_str()).collect();

        let mut next: Vec<String> = Vec::with_capacity(found.len());
        for child in &cat.sub_categories {
            if found_ids.contains(child.as_str()) && !next.contains(child) {
                next.push(child.clone());
            }
        }
        for (_, child) in &found {
            if !next.contains(child) {
                next.push(child.clone());
            }
        }
        if cat.sub_categories != next {
            cat.sub_categories = next;
        }
    }

    // 3. Paths, starting from roots and from orphans whose parent is gone
    let tops: Vec<String> = categories
        .values()
        .filter(|c| match &c.parent_category {
            None => true,
            Some(p) => !categories.contains_key(p),
        })
        .map(|c| c.id.clone())
        .collect();
    for top in tops {
        refresh_paths(categories, &top);
    }

    detached
}

/// Tags behave like a set but keep first-seen order.
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

//! Frequency grouping engine
//!
//! Walks the Document container's folders in document order, buckets them by
//! rounded frequency key and merges later duplicates into the first folder
//! seen for each key. Removal is two-phase: duplicates are only marked during
//! the walk and swept afterwards, so the traversal never mutates the list it
//! is scanning.

use std::collections::{HashMap, HashSet};

use crate::dom::{XmlElement, XmlNode};
use crate::freq::{canonicalize, extract_frequency};
use crate::report::Event;

/// Name of the subgroup whose children are relocated on merge
pub const LOBS_FOLDER: &str = "LOBs";

/// Outcome of one grouping pass over a container
#[derive(Debug, Default)]
pub struct GroupingOutcome {
    /// Rounded key -> index of the canonical folder in the container's child list
    pub registry: HashMap<String, usize>,
    /// Child indices marked for the removal sweep
    pub removed: HashSet<usize>,
    /// Diagnostics in occurrence order
    pub events: Vec<Event>,
}

/// Run the grouping pass over the container's direct `Folder` children.
///
/// The first folder encountered for a rounded key becomes its canonical
/// holder and has every label mentioning the unrounded value rewritten to the
/// key. Later folders for the same key hand their LOB children over to the
/// canonical holder and are marked for removal. Folders whose display name
/// carries no frequency are skipped entirely.
pub fn group_folders(container: &mut XmlElement, decimals: u32) -> GroupingOutcome {
    let mut outcome = GroupingOutcome::default();

    for index in 0..container.children.len() {
        let Some((original, key)) = folder_key(&container.children[index], decimals) else {
            continue;
        };

        match outcome.registry.get(&key) {
            None => {
                if let XmlNode::Element(folder) = &mut container.children[index] {
                    rewrite_names(folder, &original, &key);
                }
                log::debug!("created folder for {key} MHz");
                outcome.registry.insert(key.clone(), index);
                outcome.events.push(Event::GroupCreated { key });
            }
            Some(&target) => {
                // target < index always holds (first seen wins), so the two
                // children are touched strictly one after the other
                let moved = take_lob_items(&mut container.children[index], &original, &key);
                let moved_lobs = moved.len();
                if moved_lobs > 0 {
                    if let XmlNode::Element(canonical) = &mut container.children[target] {
                        append_lob_items(canonical, moved);
                    }
                    log::debug!("moving {moved_lobs} LOBs from {original} to {key} MHz");
                }
                outcome.removed.insert(index);
                outcome.events.push(Event::GroupMerged { key, moved_lobs });
            }
        }
    }

    outcome
}

/// Detach every direct child whose index is in `marked`.
///
/// The grouping pass and the exclusion filter only record indices; physical
/// removal happens here, over a list that is no longer being traversed.
/// Returns old-index -> new-index for the surviving children so a registry
/// built before the sweep can be carried across it.
pub fn sweep(container: &mut XmlElement, marked: &HashSet<usize>) -> HashMap<usize, usize> {
    let mut remap = HashMap::new();
    let mut kept = 0usize;
    for index in 0..container.children.len() {
        if !marked.contains(&index) {
            remap.insert(index, kept);
            kept += 1;
        }
    }

    let mut index = 0usize;
    container.children.retain(|_| {
        let keep = !marked.contains(&index);
        index += 1;
        keep
    });
    remap
}

/// Replace `old` with `new` in the element's own display name and in the
/// display names of its direct children (one level only, not recursive).
pub fn rewrite_names(element: &mut XmlElement, old: &str, new: &str) {
    rewrite_name(element, old, new);
    for child in &mut element.children {
        if let XmlNode::Element(child) = child {
            rewrite_name(child, old, new);
        }
    }
}

fn rewrite_name(element: &mut XmlElement, old: &str, new: &str) {
    if let Some(name) = element.child_mut("name") {
        let text = name.text();
        if text.contains(old) {
            name.set_text(text.replace(old, new));
        }
    }
}

/// Extract (unrounded frequency, canonical key) from a container child, if it
/// is a folder with a frequency label
fn folder_key(node: &XmlNode, decimals: u32) -> Option<(String, String)> {
    let XmlNode::Element(element) = node else {
        return None;
    };
    if element.name != "Folder" {
        return None;
    }
    let label = element.display_name()?;
    let original = extract_frequency(&label)?.to_string();
    let key = canonicalize(&original, decimals);
    Some((original, key))
}

fn is_lobs_folder(el: &XmlElement) -> bool {
    el.name == "Folder" && el.child("name").is_some_and(|n| n.text() == LOBS_FOLDER)
}

fn find_lobs_mut(folder: &mut XmlElement) -> Option<&mut XmlElement> {
    folder.children.iter_mut().find_map(|child| match child {
        XmlNode::Element(el) if is_lobs_folder(el) => Some(el),
        _ => None,
    })
}

/// Take the LOB children out of a duplicate folder, names rewritten to the
/// canonical key. The subgroup's own `name` label stays behind; it is
/// discarded with the duplicate.
fn take_lob_items(node: &mut XmlNode, old: &str, new: &str) -> Vec<XmlNode> {
    let XmlNode::Element(folder) = node else {
        return Vec::new();
    };
    let Some(lobs) = find_lobs_mut(folder) else {
        return Vec::new();
    };

    let mut kept = Vec::new();
    let mut items = Vec::new();
    for child in std::mem::take(&mut lobs.children) {
        match child {
            XmlNode::Element(mut el) if el.name != "name" => {
                rewrite_names(&mut el, old, new);
                items.push(XmlNode::Element(el));
            }
            other => kept.push(other),
        }
    }
    lobs.children = kept;
    items
}

/// Append relocated LOB children to the canonical folder's LOB subgroup,
/// creating the subgroup if the canonical holder has none
fn append_lob_items(canonical: &mut XmlElement, items: Vec<XmlNode>) {
    if find_lobs_mut(canonical).is_none() {
        let mut lobs = XmlElement::new("Folder");
        let mut name = XmlElement::new("name");
        name.set_text(LOBS_FOLDER);
        lobs.children.push(XmlNode::Element(name));
        canonical.children.push(XmlNode::Element(lobs));
    }
    if let Some(lobs) = find_lobs_mut(canonical) {
        lobs.children.extend(items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;

    fn container(xml: &str) -> XmlElement {
        let root = dom::parse(xml.as_bytes()).unwrap();
        root.child("Document").unwrap().clone()
    }

    fn folder_names(container: &XmlElement) -> Vec<String> {
        container
            .children
            .iter()
            .filter_map(|n| match n {
                XmlNode::Element(e) if e.name == "Folder" => e.display_name(),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_first_seen_wins() {
        let mut doc = container(
            "<kml><Document>\
             <Folder><name>100.12MHz</name><Placemark><name>keep me</name></Placemark></Folder>\
             <Folder><name>100.14MHz</name></Folder>\
             <Folder><name>100.11MHz</name></Folder>\
             </Document></kml>",
        );
        let outcome = group_folders(&mut doc, 1);

        assert_eq!(outcome.registry.len(), 1);
        assert_eq!(outcome.registry.get("100.1"), Some(&0));
        assert_eq!(outcome.removed, HashSet::from([1, 2]));
        assert_eq!(
            outcome.events,
            vec![
                Event::GroupCreated { key: "100.1".to_string() },
                Event::GroupMerged { key: "100.1".to_string(), moved_lobs: 0 },
                Event::GroupMerged { key: "100.1".to_string(), moved_lobs: 0 },
            ]
        );

        sweep(&mut doc, &outcome.removed);
        assert_eq!(folder_names(&doc), vec!["100.1MHz"]);
        // the canonical holder keeps its non-LOB content
        let folder = doc.child("Folder").unwrap();
        assert!(folder.child("Placemark").is_some());
    }

    #[test]
    fn test_canonical_names_rewritten_one_level() {
        let mut doc = container(
            "<kml><Document>\
             <Folder><name>146.535MHz site</name>\
             <Placemark><name>bearing 146.535MHz</name></Placemark>\
             <Folder><name>LOBs</name><Placemark><name>LOB 146.535</name></Placemark></Folder>\
             </Folder>\
             </Document></kml>",
        );
        group_folders(&mut doc, 1);

        let folder = doc.child("Folder").unwrap();
        assert_eq!(folder.display_name().as_deref(), Some("146.5MHz site"));
        assert_eq!(
            folder.child("Placemark").unwrap().display_name().as_deref(),
            Some("bearing 146.5MHz")
        );
        // grandchildren are not rewritten (one level only)
        let lobs = folder.child("Folder").unwrap();
        assert_eq!(
            lobs.child("Placemark").unwrap().display_name().as_deref(),
            Some("LOB 146.535")
        );
    }

    #[test]
    fn test_lob_relocation_without_loss() {
        let mut doc = container(
            "<kml><Document>\
             <Folder><name>146.51MHz</name>\
             <Folder><name>LOBs</name><Placemark><name>a 146.51</name></Placemark></Folder>\
             </Folder>\
             <Folder><name>146.54MHz</name>\
             <Folder><name>LOBs</name>\
             <Placemark><name>b 146.54</name></Placemark>\
             <Placemark><name>c 146.54</name></Placemark>\
             </Folder>\
             </Folder>\
             <Folder><name>146.49MHz</name>\
             <Folder><name>LOBs</name><Placemark><name>d 146.49</name></Placemark></Folder>\
             </Folder>\
             </Document></kml>",
        );
        let outcome = group_folders(&mut doc, 1);
        sweep(&mut doc, &outcome.removed);

        assert_eq!(folder_names(&doc), vec!["146.5MHz"]);
        let canonical = doc.child("Folder").unwrap();
        let lobs = canonical.child("Folder").unwrap();
        assert_eq!(lobs.display_name().as_deref(), Some("LOBs"));

        // arrival order across merges is preserved; relocated items are
        // rewritten to the key, the canonical folder's own LOB item is a
        // grandchild of the one-level rewrite and keeps its label
        let names: Vec<String> = lobs
            .children
            .iter()
            .filter_map(|n| match n {
                XmlNode::Element(e) if e.name == "Placemark" => e.display_name(),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["a 146.51", "b 146.5", "c 146.5", "d 146.5"]);
    }

    #[test]
    fn test_lobs_subgroup_created_on_demand() {
        let mut doc = container(
            "<kml><Document>\
             <Folder><name>433.92MHz</name></Folder>\
             <Folder><name>433.94MHz</name>\
             <Folder><name>LOBs</name><Placemark><name>x</name></Placemark></Folder>\
             </Folder>\
             </Document></kml>",
        );
        let outcome = group_folders(&mut doc, 1);
        sweep(&mut doc, &outcome.removed);

        let canonical = doc.child("Folder").unwrap();
        let lobs = canonical.child("Folder").unwrap();
        assert_eq!(lobs.display_name().as_deref(), Some("LOBs"));
        assert!(lobs.child("Placemark").is_some());
    }

    #[test]
    fn test_non_frequency_folder_passes_through() {
        let mut doc = container(
            "<kml><Document>\
             <Folder><name>Landmarks</name></Folder>\
             <Folder><name>146.52MHz</name></Folder>\
             <Folder><name>146.52MHz</name></Folder>\
             </Document></kml>",
        );
        let outcome = group_folders(&mut doc, 1);

        assert!(!outcome.registry.contains_key("Landmarks"));
        sweep(&mut doc, &outcome.removed);
        assert_eq!(folder_names(&doc), vec!["Landmarks", "146.5MHz"]);
    }

    #[test]
    fn test_sweep_remap() {
        let mut doc = container(
            "<kml><Document>\
             <Folder><name>a</name></Folder>\
             <Folder><name>b</name></Folder>\
             <Folder><name>c</name></Folder>\
             </Document></kml>",
        );
        let remap = sweep(&mut doc, &HashSet::from([1]));
        assert_eq!(folder_names(&doc), vec!["a", "c"]);
        assert_eq!(remap.get(&0), Some(&0));
        assert_eq!(remap.get(&2), Some(&1));
        assert_eq!(remap.get(&1), None);
    }

    #[test]
    fn test_rewrite_names_absent_old_is_noop() {
        let mut el = XmlElement::new("Folder");
        let mut name = XmlElement::new("name");
        name.set_text("Landmarks");
        el.children.push(XmlNode::Element(name));
        rewrite_names(&mut el, "146.52", "146.5");
        assert_eq!(el.display_name().as_deref(), Some("Landmarks"));
    }
}

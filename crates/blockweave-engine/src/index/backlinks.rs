use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::{Block, Page};

/// One occurrence of a page reference inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockReference {
    /// Page containing the referencing block.
    pub page_name: String,
    pub block_id: String,
    /// Byte offset of the first `[[target]]` in the block content.
    pub position: usize,
}

/// Where reference targets are read from when a whole page is indexed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferenceSource {
    /// Every raw `[[...]]` in the block lines, including ones inside properties,
    /// embeds and `[text]([[page]])` links.
    #[default]
    PageRefs,
    /// Targets of `PageLink` segments, which also covers `[text](url)` links.
    Segments,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("forward link {source_page} -> {target_page} has no backward mirror")]
    MissingMirror {
        source_page: String,
        target_page: String,
    },
    #[error("references for {source_page} -> {target_page} differ between directions")]
    MismatchedMirror {
        source_page: String,
        target_page: String,
    },
    #[error("empty entry left behind for {0}")]
    EmptyEntry(String),
}

type RefMap = BTreeMap<String, Vec<BlockReference>>;

/// Forward and backward page links, kept as exact mirror images.
///
/// `forward[a][b]` and `backward[b][a]` always hold the same references. Lookups are
/// case-insensitive; results use the casing a name was first seen with.
#[derive(Debug, Clone, Default)]
pub struct BacklinkIndex {
    forward: BTreeMap<String, RefMap>,
    backward: BTreeMap<String, RefMap>,
    names: HashMap<String, String>,
    source: ReferenceSource,
}

fn key(name: &str) -> String {
    name.to_lowercase()
}

impl BacklinkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(source: ReferenceSource) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// Builds an index over `pages` from scratch.
    pub fn build<'a>(pages: impl IntoIterator<Item = &'a Page>) -> Self {
        let mut index = Self::new();
        index.rebuild(pages);
        index
    }

    /// Indexes every reference in every block of `page`. Self references are skipped.
    pub fn add_document(&mut self, page: &Page) {
        let source = page.page_name();
        for block in page.blocks() {
            for target in self.targets(block) {
                self.add_block_reference(source, &target, block);
            }
        }
    }

    /// Drops every reference made by the page `name`.
    pub fn remove_document(&mut self, name: &str) {
        let source_key = key(name);
        let Some(targets) = self.forward.remove(&source_key) else {
            return;
        };
        for target_key in targets.keys() {
            if let Some(sources) = self.backward.get_mut(target_key) {
                sources.remove(&source_key);
                if sources.is_empty() {
                    self.backward.remove(target_key);
                }
            }
        }
        log::trace!("removed document {name} from backlink index");
    }

    /// Clears the index and adds every page again.
    pub fn rebuild<'a>(&mut self, pages: impl IntoIterator<Item = &'a Page>) {
        self.forward.clear();
        self.backward.clear();
        self.names.clear();
        for page in pages {
            self.add_document(page);
        }
    }

    pub fn add_backlink(&mut self, source: &str, target: &str, reference: BlockReference) {
        let source_key = self.intern(source);
        let target_key = self.intern(target);
        log::trace!("link {source} -> {target} from {}", reference.block_id);

        self.backward
            .entry(target_key.clone())
            .or_default()
            .entry(source_key.clone())
            .or_default()
            .push(reference.clone());
        self.forward
            .entry(source_key)
            .or_default()
            .entry(target_key)
            .or_default()
            .push(reference);
    }

    /// Removes the references `block_id` makes from `source` to `target`. Returns how
    /// many were removed. Entries left empty are deleted.
    pub fn remove_backlink(&mut self, source: &str, target: &str, block_id: &str) -> usize {
        let source_key = key(source);
        let target_key = key(target);

        let removed = prune(&mut self.forward, &source_key, &target_key, block_id);
        let mirrored = prune(&mut self.backward, &target_key, &source_key, block_id);
        debug_assert_eq!(removed, mirrored, "backlink maps out of sync");

        if removed > 0 {
            log::trace!("unlink {source} -> {target} from {block_id}");
        }
        removed
    }

    /// Re-indexes one block after a content change. Every reference the block made to
    /// `old_targets` is dropped, then its current targets are linked again, so positions
    /// and occurrence counts match a fresh [`BacklinkIndex::build`].
    pub fn update_block(&mut self, source: &str, block: &Block, old_targets: &[String]) {
        let mut unlinked = BTreeSet::new();
        for target in old_targets {
            if unlinked.insert(key(target)) {
                self.remove_backlink(source, target, block.id());
            }
        }

        for target in self.targets(block) {
            self.add_block_reference(source, &target, block);
        }
    }

    /// Reference targets of `block`, as this index reads them.
    pub fn targets(&self, block: &Block) -> Vec<String> {
        match self.source {
            ReferenceSource::PageRefs => block.references().map(str::to_string).collect(),
            ReferenceSource::Segments => block
                .segments()
                .iter()
                .filter(|s| s.is_page_link())
                .filter_map(|s| s.target.clone())
                .collect(),
        }
    }

    /// Pages referencing `name`, each with the references it makes.
    pub fn backlinks(&self, name: &str) -> BTreeMap<String, Vec<BlockReference>> {
        self.resolve(self.backward.get(&key(name)))
    }

    /// Pages `name` references, each with the references made.
    pub fn forward_links(&self, name: &str) -> BTreeMap<String, Vec<BlockReference>> {
        self.resolve(self.forward.get(&key(name)))
    }

    /// No links in either direction.
    pub fn is_orphan(&self, name: &str) -> bool {
        let name_key = key(name);
        !self.forward.contains_key(&name_key) && !self.backward.contains_key(&name_key)
    }

    /// Every page that links or is linked, sorted.
    pub fn all_pages(&self) -> Vec<String> {
        let keys: BTreeSet<&String> = self.forward.keys().chain(self.backward.keys()).collect();
        let mut pages: Vec<String> = keys.into_iter().map(|k| self.display(k)).collect();
        pages.sort();
        pages
    }

    pub fn reference_count(&self) -> usize {
        self.forward.values().flat_map(|m| m.values()).map(Vec::len).sum()
    }

    /// Checks that both directions mirror each other and that nothing empty is left.
    pub fn verify_mirror(&self) -> Result<(), IndexError> {
        check_no_empty(&self.forward)?;
        check_no_empty(&self.backward)?;

        for (source_key, targets) in &self.forward {
            for (target_key, refs) in targets {
                let mirrored = self
                    .backward
                    .get(target_key)
                    .and_then(|sources| sources.get(source_key))
                    .ok_or_else(|| IndexError::MissingMirror {
                        source_page: self.display(source_key),
                        target_page: self.display(target_key),
                    })?;
                if mirrored != refs {
                    return Err(IndexError::MismatchedMirror {
                        source_page: self.display(source_key),
                        target_page: self.display(target_key),
                    });
                }
            }
        }

        for (target_key, sources) in &self.backward {
            for source_key in sources.keys() {
                let mirrored = self
                    .forward
                    .get(source_key)
                    .is_some_and(|targets| targets.contains_key(target_key));
                if !mirrored {
                    return Err(IndexError::MissingMirror {
                        source_page: self.display(source_key),
                        target_page: self.display(target_key),
                    });
                }
            }
        }

        Ok(())
    }

    fn add_block_reference(&mut self, source: &str, target: &str, block: &Block) {
        if target.trim().is_empty() || key(target) == key(source) {
            return;
        }
        let source_key = self.intern(source);
        let reference = BlockReference {
            page_name: self.display(&source_key),
            block_id: block.id().to_string(),
            position: position_of(block.content(), target),
        };
        self.add_backlink(source, target, reference);
    }

    fn intern(&mut self, name: &str) -> String {
        let name_key = key(name);
        self.names
            .entry(name_key.clone())
            .or_insert_with(|| name.to_string());
        name_key
    }

    fn display(&self, name_key: &str) -> String {
        self.names
            .get(name_key)
            .cloned()
            .unwrap_or_else(|| name_key.to_string())
    }

    fn resolve(&self, map: Option<&RefMap>) -> BTreeMap<String, Vec<BlockReference>> {
        map.map(|m| {
            m.iter()
                .map(|(k, refs)| (self.display(k), refs.clone()))
                .collect()
        })
        .unwrap_or_default()
    }
}

fn position_of(content: &str, target: &str) -> usize {
    content
        .find(&format!("[[{target}]]"))
        .or_else(|| content.find(target))
        .unwrap_or(0)
}

fn prune(
    map: &mut BTreeMap<String, RefMap>,
    outer: &str,
    inner: &str,
    block_id: &str,
) -> usize {
    let Some(inner_map) = map.get_mut(outer) else {
        return 0;
    };
    let Some(refs) = inner_map.get_mut(inner) else {
        return 0;
    };

    let before = refs.len();
    refs.retain(|r| r.block_id != block_id);
    let removed = before - refs.len();

    if refs.is_empty() {
        inner_map.remove(inner);
    }
    if inner_map.is_empty() {
        map.remove(outer);
    }
    removed
}

fn check_no_empty(map: &BTreeMap<String, RefMap>) -> Result<(), IndexError> {
    for (outer, inner) in map {
        if inner.is_empty() || inner.values().any(Vec::is_empty) {
            return Err(IndexError::EmptyEntry(outer.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{ParseOptions, parse_document};
    use pretty_assertions::assert_eq;

    fn page(name: &str, text: &str) -> Page {
        parse_document(name, text, &ParseOptions::default()).page
    }

    fn assert_same_links(actual: &BacklinkIndex, expected: &BacklinkIndex) {
        assert_eq!(actual.all_pages(), expected.all_pages());
        for name in expected.all_pages() {
            assert_eq!(actual.backlinks(&name), expected.backlinks(&name), "backlinks of {name}");
            assert_eq!(
                actual.forward_links(&name),
                expected.forward_links(&name),
                "forward links of {name}"
            );
        }
    }

    fn sample_index() -> BacklinkIndex {
        let a = page("a", "# Alpha\n- see [[Beta]] and [[Beta]]\n- and [[Gamma]]\n- self [[alpha]]");
        let b = page("b", "# Beta\n- back to [[Alpha]]");
        BacklinkIndex::build([&a, &b])
    }

    #[test]
    fn forward_and_backward_mirror() {
        let index = sample_index();

        assert_eq!(index.verify_mirror(), Ok(()));
        let back = index.backlinks("Beta");
        assert_eq!(back.keys().collect::<Vec<_>>(), vec!["Alpha"]);
        assert_eq!(back["Alpha"].len(), 2, "duplicates are kept");
        assert_eq!(
            back["Alpha"][0],
            BlockReference {
                page_name: "Alpha".to_string(),
                block_id: "block-1".to_string(),
                position: 4,
            }
        );
        assert_eq!(index.forward_links("Alpha").len(), 2);
    }

    #[test]
    fn self_references_are_skipped() {
        let index = sample_index();

        assert!(!index.forward_links("Alpha").contains_key("Alpha"));
        assert!(!index.backlinks("alpha").contains_key("Alpha"));
    }

    #[test]
    fn lookups_ignore_case_and_keep_first_casing() {
        let index = sample_index();

        assert_eq!(index.backlinks("BETA").len(), 1);
        assert_eq!(index.all_pages(), vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn unknown_page_is_orphan_with_empty_results() {
        let index = sample_index();

        assert!(index.is_orphan("Nowhere"));
        assert!(index.backlinks("Nowhere").is_empty());
        assert!(!index.is_orphan("Gamma"));
    }

    #[test]
    fn removing_last_reference_prunes_entries() {
        // Given Alpha's only link to Gamma
        let mut index = sample_index();

        // When that reference is removed
        let removed = index.remove_backlink("Alpha", "Gamma", "block-2");

        // Then Gamma disappears entirely
        assert_eq!(removed, 1);
        assert!(index.is_orphan("Gamma"));
        assert!(!index.forward_links("Alpha").contains_key("Gamma"));
        assert_eq!(index.verify_mirror(), Ok(()));
    }

    #[test]
    fn remove_document_drops_its_links() {
        let mut index = sample_index();

        index.remove_document("alpha");

        assert!(index.backlinks("Beta").is_empty());
        assert_eq!(index.backlinks("Alpha").len(), 1);
        assert_eq!(index.verify_mirror(), Ok(()));
    }

    #[test]
    fn update_block_applies_the_difference() {
        // Given a block linking to Beta and Gamma
        let mut a = page("a", "# Alpha\n- [[Beta]] [[Gamma]]");
        let mut index = BacklinkIndex::build([&a]);
        let handle = a.all_blocks()[0];
        let old: Vec<String> = index.targets(a.block(handle).unwrap());

        // When it is edited to link to Gamma and Delta
        let block = a.set_block_content(handle, "[[Gamma]] [[Delta]]").unwrap();
        index.update_block("Alpha", block, &old);

        // Then Beta is unlinked, Delta linked and Gamma untouched
        assert!(index.backlinks("Beta").is_empty());
        assert_eq!(index.backlinks("Delta")["Alpha"].len(), 1);
        assert_eq!(index.backlinks("Gamma")["Alpha"].len(), 1);
        assert_eq!(index.verify_mirror(), Ok(()));
    }

    #[test]
    fn update_block_matches_a_fresh_build() {
        // Given a block linking Gamma once, next to an untouched block
        let mut a = page("a", "# Alpha\n- [[Gamma]] x\n- also [[Beta]]");
        let mut index = BacklinkIndex::build([&a]);
        let handle = a.all_blocks()[0];
        let old = index.targets(a.block(handle).unwrap());

        // When the same target moves and appears twice
        let block = a
            .set_block_content(handle, "long prefix then [[Gamma]] and [[Gamma]]")
            .unwrap();
        index.update_block("Alpha", block, &old);

        // Then positions and occurrence counts follow the new content
        let gamma = index.backlinks("Gamma");
        assert_eq!(
            gamma["Alpha"].iter().map(|r| r.position).collect::<Vec<_>>(),
            vec![17, 17]
        );
        assert_same_links(&index, &BacklinkIndex::build([&a]));
        assert_eq!(index.verify_mirror(), Ok(()));
    }

    #[test]
    fn rebuild_is_idempotent() {
        let a = page("a", "# Alpha\n- see [[Beta]] and [[Beta]]\n- and [[Gamma]]");
        let b = page("b", "# Beta\n- back to [[Alpha]]");
        let mut index = BacklinkIndex::build([&a, &b]);
        let before = index.clone();

        index.rebuild([&a, &b]);
        index.rebuild([&a, &b]);

        assert_same_links(&index, &before);
        assert_eq!(index.reference_count(), before.reference_count());
    }

    #[test]
    fn segment_source_reads_named_links() {
        let a = page("a", "# Alpha\n- [shown]([[Beta]]) and {{embed [[Gamma]]}}");

        let raw = BacklinkIndex::build([&a]);
        let mut segments = BacklinkIndex::with_source(ReferenceSource::Segments);
        segments.add_document(&a);

        assert_eq!(raw.forward_links("Alpha").len(), 2);
        assert_eq!(
            segments.forward_links("Alpha").keys().collect::<Vec<_>>(),
            vec!["Beta"]
        );
    }

    #[test]
    fn empty_link_is_ignored() {
        let a = page("a", "# Alpha\n- broken [[]] link");

        let index = BacklinkIndex::build([&a]);

        assert!(index.is_orphan("Alpha"));
    }

    #[test]
    fn verify_mirror_catches_one_sided_links() {
        let mut index = sample_index();
        index
            .forward
            .entry("alpha".to_string())
            .or_default()
            .insert(
                "zeta".to_string(),
                vec![BlockReference {
                    page_name: "Alpha".to_string(),
                    block_id: "block-9".to_string(),
                    position: 0,
                }],
            );

        assert!(matches!(
            index.verify_mirror(),
            Err(IndexError::MissingMirror { .. })
        ));
    }
}

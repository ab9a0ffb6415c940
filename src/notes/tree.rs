use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::notes::file::FileId;

/// View state of a folder-tree node. Exactly one applies at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeState {
    Collapsed,
    Expanded,
    /// A folder shown expanded that has no children.
    ExpandedEmpty,
    File,
}

impl NodeState {
    pub fn is_folder(self) -> bool {
        !matches!(self, NodeState::File)
    }

    pub fn is_open(self) -> bool {
        matches!(self, NodeState::Expanded | NodeState::ExpandedEmpty)
    }

    /// Open state a folder takes on, given whether it has children.
    fn opened(has_children: bool) -> Self {
        if has_children {
            NodeState::Expanded
        } else {
            NodeState::ExpandedEmpty
        }
    }
}

/// Node shape as the backend sends it, before normalization.
#[derive(Debug, Deserialize)]
struct WireNode {
    name: String,
    state: NodeState,
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    contents: Option<Vec<WireNode>>,
}

/// A node in the folder tree mirrored from the backend listing.
///
/// Files carry an id and never have contents. Folders carry no id.
/// `contents` is non-empty only for `Collapsed` and `Expanded` folders.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "WireNode")]
pub struct FolderNode {
    pub name: String,
    pub state: NodeState,
    pub id: Option<FileId>,
    pub contents: Vec<FolderNode>,
}

impl TryFrom<WireNode> for FolderNode {
    type Error = String;

    /// The backend marks every node `collapsed` and encodes folders with
    /// the nil UUID, so a childless node with a real id is a file.
    fn try_from(wire: WireNode) -> std::result::Result<Self, Self::Error> {
        let contents = wire
            .contents
            .unwrap_or_default()
            .into_iter()
            .map(FolderNode::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let id = wire.id.filter(|id| !id.is_nil()).map(FileId);

        let state = match wire.state {
            NodeState::File => NodeState::File,
            _ if id.is_some() && contents.is_empty() => NodeState::File,
            NodeState::Expanded | NodeState::ExpandedEmpty => {
                NodeState::opened(!contents.is_empty())
            }
            NodeState::Collapsed => NodeState::Collapsed,
        };

        if state == NodeState::File {
            return match id {
                Some(id) => Ok(FolderNode::file(wire.name, id)),
                None => Err(format!("file node `{}` has no id", wire.name)),
            };
        }

        Ok(FolderNode::folder(wire.name, contents).with_state(state))
    }
}

impl FolderNode {
    pub fn file(name: impl Into<String>, id: FileId) -> Self {
        Self {
            name: name.into(),
            state: NodeState::File,
            id: Some(id),
            contents: Vec::new(),
        }
    }

    /// A collapsed folder.
    pub fn folder(name: impl Into<String>, contents: Vec<FolderNode>) -> Self {
        Self {
            name: name.into(),
            state: NodeState::Collapsed,
            id: None,
            contents,
        }
    }

    fn with_state(mut self, state: NodeState) -> Self {
        self.state = state;
        self
    }

    /// Apply a click: open a file, or flip a folder between collapsed and open.
    pub fn toggle(&mut self) -> Result<Toggled> {
        match self.state {
            NodeState::File => self
                .id
                .map(Toggled::Open)
                .ok_or_else(|| AppError::InvalidInput(format!("{} has no file id", self.name))),
            NodeState::Expanded | NodeState::ExpandedEmpty => {
                self.state = NodeState::Collapsed;
                Ok(Toggled::Collapsed)
            }
            NodeState::Collapsed => {
                self.state = NodeState::opened(!self.contents.is_empty());
                Ok(Toggled::Expanded)
            }
        }
    }
}

/// Outcome of toggling a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    /// A file was clicked; the caller should open it.
    Open(FileId),
    Expanded,
    Collapsed,
}

/// Which list a row belongs to. Paths resolve only within their own section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Tree,
    SearchResults,
}

/// Render a name path the way the backend lays out files: `/a/b/c`.
pub fn display_path(path: &[String]) -> String {
    format!("/{}", path.join("/"))
}

/// Walk down from `nodes` by name, taking the first sibling that matches at
/// each level.
pub fn find_node_mut<'a>(nodes: &'a mut [FolderNode], path: &[String]) -> Result<&'a mut FolderNode> {
    let missing = || AppError::TreePath(display_path(path));
    let (first, rest) = path.split_first().ok_or_else(missing)?;

    let mut cur = nodes
        .iter_mut()
        .find(|n| &n.name == first)
        .ok_or_else(missing)?;
    for segment in rest {
        cur = cur
            .contents
            .iter_mut()
            .find(|n| &n.name == segment)
            .ok_or_else(missing)?;
    }
    Ok(cur)
}

/// Copy open/closed folder states from a previous listing onto a fresh one,
/// matching folders by name path.
fn carry_states(old: &[FolderNode], new: &mut [FolderNode]) {
    for node in new.iter_mut().filter(|n| n.state.is_folder()) {
        let Some(prev) = old
            .iter()
            .find(|o| o.name == node.name && o.state.is_folder())
        else {
            continue;
        };
        if prev.state.is_open() {
            node.state = NodeState::opened(!node.contents.is_empty());
        }
        carry_states(&prev.contents, &mut node.contents);
    }
}

/// A visible tree row, flattened for rendering and navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRow {
    pub section: Section,
    /// Names from the section root down to this node.
    pub path: Vec<String>,
    pub name: String,
    pub depth: usize,
    pub state: NodeState,
    pub id: Option<FileId>,
    pub is_last_sibling: bool,
}

/// Browser-side tree state: the listing, the search results, and the
/// flattened visible rows with a selection cursor.
#[derive(Debug, Default)]
pub struct FolderTree {
    pub roots: Vec<FolderNode>,
    pub search_results: Vec<FolderNode>,
    pub rows: Vec<FlatRow>,
    pub selected_index: usize,
    pub scroll_offset: usize,
}

impl FolderTree {
    pub fn new(roots: Vec<FolderNode>) -> Self {
        let mut tree = Self {
            roots,
            ..Default::default()
        };
        tree.flatten();
        tree
    }

    /// Replace the listing, keeping folders open that were open before.
    pub fn replace_roots(&mut self, mut roots: Vec<FolderNode>) {
        carry_states(&self.roots, &mut roots);
        self.roots = roots;
        self.flatten();
    }

    pub fn set_search_results(&mut self, results: Vec<FolderNode>) {
        self.search_results = results;
        self.flatten();
    }

    pub fn clear_search_results(&mut self) {
        if !self.search_results.is_empty() {
            self.search_results.clear();
            self.flatten();
        }
    }

    /// Rebuild the visible rows. The selection follows its node when the
    /// node is still visible, otherwise it is clamped.
    pub fn flatten(&mut self) {
        let previous = self
            .selected_row()
            .map(|row| (row.section, row.path.clone()));

        self.rows.clear();
        Self::flatten_nodes(&self.roots, Section::Tree, &[], &mut self.rows);
        Self::flatten_nodes(
            &self.search_results,
            Section::SearchResults,
            &[],
            &mut self.rows,
        );

        if let Some((section, path)) = previous {
            if let Some(idx) = self
                .rows
                .iter()
                .position(|r| r.section == section && r.path == path)
            {
                self.selected_index = idx;
                return;
            }
        }
        if !self.rows.is_empty() && self.selected_index >= self.rows.len() {
            self.selected_index = self.rows.len() - 1;
        }
    }

    fn flatten_nodes(
        nodes: &[FolderNode],
        section: Section,
        parent: &[String],
        rows: &mut Vec<FlatRow>,
    ) {
        for (i, node) in nodes.iter().enumerate() {
            let mut path = parent.to_vec();
            path.push(node.name.clone());

            rows.push(FlatRow {
                section,
                path: path.clone(),
                name: node.name.clone(),
                depth: parent.len(),
                state: node.state,
                id: node.id,
                is_last_sibling: i == nodes.len() - 1,
            });

            if node.state == NodeState::Expanded {
                Self::flatten_nodes(&node.contents, section, &path, rows);
            }
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut Vec<FolderNode> {
        match section {
            Section::Tree => &mut self.roots,
            Section::SearchResults => &mut self.search_results,
        }
    }

    /// Toggle the node at `path` within `section`.
    pub fn toggle_path(&mut self, section: Section, path: &[String]) -> Result<Toggled> {
        let node = find_node_mut(self.section_mut(section), path)?;
        let outcome = node.toggle()?;
        debug!(path = %display_path(path), ?outcome, "toggled node");
        if !matches!(outcome, Toggled::Open(_)) {
            self.flatten();
        }
        Ok(outcome)
    }

    /// Toggle the selected row. `None` when there are no rows.
    pub fn toggle_selected(&mut self) -> Result<Option<Toggled>> {
        let Some(row) = self.selected_row() else {
            return Ok(None);
        };
        let (section, path) = (row.section, row.path.clone());
        self.toggle_path(section, &path).map(Some)
    }

    /// Select the row at `index` and toggle it, as a mouse click does.
    pub fn click_row(&mut self, index: usize) -> Result<Option<Toggled>> {
        if index >= self.rows.len() {
            return Ok(None);
        }
        self.selected_index = index;
        self.toggle_selected()
    }

    /// Open the selected folder if it is collapsed.
    pub fn expand_selected(&mut self) -> Result<()> {
        if let Some(row) = self.selected_row() {
            if row.state == NodeState::Collapsed {
                self.toggle_selected()?;
            }
        }
        Ok(())
    }

    /// Collapse the selected folder, or jump to the parent row.
    pub fn collapse_selected(&mut self) -> Result<()> {
        let Some(row) = self.selected_row() else {
            return Ok(());
        };
        if row.state.is_open() {
            self.toggle_selected()?;
            return Ok(());
        }
        if row.path.len() > 1 {
            let section = row.section;
            let parent = row.path[..row.path.len() - 1].to_vec();
            if let Some(idx) = self
                .rows
                .iter()
                .position(|r| r.section == section && r.path == parent)
            {
                self.selected_index = idx;
            }
        }
        Ok(())
    }

    pub fn selected_row(&self) -> Option<&FlatRow> {
        self.rows.get(self.selected_index)
    }

    pub fn select_next(&mut self) {
        if !self.rows.is_empty() && self.selected_index < self.rows.len() - 1 {
            self.selected_index += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.rows.len().saturating_sub(1);
    }

    /// Update the scroll offset to ensure the selected row is visible.
    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected_index - visible_height + 1;
        }
    }

    /// Map a row offset within the visible viewport to a row index.
    pub fn row_at_offset(&self, offset: usize) -> Option<usize> {
        let idx = self.scroll_offset + offset;
        (idx < self.rows.len()).then_some(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> FileId {
        FileId(Uuid::from_u128(n))
    }

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    /// folder 1/{file1.txt}, folder 2/{folder 3/{file2.txt, file3.txt}}, empty/
    fn sample_roots() -> Vec<FolderNode> {
        vec![
            FolderNode::folder("folder 1", vec![FolderNode::file("file1.txt", id(1))]),
            FolderNode::folder(
                "folder 2",
                vec![FolderNode::folder(
                    "folder 3",
                    vec![
                        FolderNode::file("file2.txt", id(2)),
                        FolderNode::file("file3.txt", id(3)),
                    ],
                )],
            ),
            FolderNode::folder("empty", vec![]),
        ]
    }

    #[test]
    fn decodes_backend_listing() {
        let json = r#"[
            {"name":"journal","state":"collapsed","id":"00000000-0000-0000-0000-000000000000","contents":[
                {"name":"monday.md","state":"collapsed","id":"430bf597-74ac-40ad-9453-edcc353bc026","contents":null}
            ]}
        ]"#;
        let nodes: Vec<FolderNode> = serde_json::from_str(json).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].state, NodeState::Collapsed);
        assert_eq!(nodes[0].id, None);
        let file = &nodes[0].contents[0];
        assert_eq!(file.state, NodeState::File);
        assert!(file.id.is_some());
        assert!(file.contents.is_empty());
    }

    #[test]
    fn decodes_search_results_with_missing_contents() {
        let json = r#"[{"name":"todo.md","state":"file","id":"430bf597-74ac-40ad-9453-edcc353bc026"}]"#;
        let nodes: Vec<FolderNode> = serde_json::from_str(json).unwrap();
        assert_eq!(nodes[0].state, NodeState::File);
    }

    #[test]
    fn expanded_without_children_becomes_expanded_empty() {
        let json = r#"[{"name":"empty","state":"expanded","contents":[]}]"#;
        let nodes: Vec<FolderNode> = serde_json::from_str(json).unwrap();
        assert_eq!(nodes[0].state, NodeState::ExpandedEmpty);
    }

    #[test]
    fn file_without_id_is_rejected() {
        let json = r#"[{"name":"orphan.md","state":"file"}]"#;
        assert!(serde_json::from_str::<Vec<FolderNode>>(json).is_err());
    }

    #[test]
    fn unknown_state_is_rejected() {
        let json = r#"[{"name":"x","state":"open"}]"#;
        assert!(serde_json::from_str::<Vec<FolderNode>>(json).is_err());
    }

    #[test]
    fn flatten_shows_only_top_level_when_collapsed() {
        let tree = FolderTree::new(sample_roots());
        let names: Vec<_> = tree.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["folder 1", "folder 2", "empty"]);
        assert!(tree.rows[2].is_last_sibling);
        assert!(!tree.rows[0].is_last_sibling);
    }

    #[test]
    fn toggle_collapsed_with_children_expands() {
        let mut tree = FolderTree::new(sample_roots());
        let outcome = tree.toggle_path(Section::Tree, &path(&["folder 1"])).unwrap();
        assert_eq!(outcome, Toggled::Expanded);
        assert_eq!(tree.roots[0].state, NodeState::Expanded);
        assert_eq!(tree.rows[1].name, "file1.txt");
        assert_eq!(tree.rows[1].depth, 1);
        assert_eq!(tree.rows[1].path, path(&["folder 1", "file1.txt"]));
    }

    #[test]
    fn toggle_collapsed_without_children_is_expanded_empty() {
        let mut tree = FolderTree::new(sample_roots());
        tree.toggle_path(Section::Tree, &path(&["empty"])).unwrap();
        assert_eq!(tree.roots[2].state, NodeState::ExpandedEmpty);
        assert_eq!(tree.rows.len(), 3);
    }

    #[test]
    fn toggle_open_folder_collapses() {
        let mut tree = FolderTree::new(sample_roots());
        tree.toggle_path(Section::Tree, &path(&["folder 1"])).unwrap();
        let outcome = tree.toggle_path(Section::Tree, &path(&["folder 1"])).unwrap();
        assert_eq!(outcome, Toggled::Collapsed);
        assert_eq!(tree.roots[0].state, NodeState::Collapsed);

        tree.toggle_path(Section::Tree, &path(&["empty"])).unwrap();
        tree.toggle_path(Section::Tree, &path(&["empty"])).unwrap();
        assert_eq!(tree.roots[2].state, NodeState::Collapsed);
    }

    #[test]
    fn toggle_nested_file_opens_it() {
        let mut tree = FolderTree::new(sample_roots());
        tree.toggle_path(Section::Tree, &path(&["folder 2"])).unwrap();
        tree.toggle_path(Section::Tree, &path(&["folder 2", "folder 3"]))
            .unwrap();
        let outcome = tree
            .toggle_path(Section::Tree, &path(&["folder 2", "folder 3", "file3.txt"]))
            .unwrap();
        assert_eq!(outcome, Toggled::Open(id(3)));
        assert_eq!(tree.rows.len(), 6);
    }

    #[test]
    fn toggle_missing_path_errors() {
        let mut tree = FolderTree::new(sample_roots());
        let err = tree
            .toggle_path(Section::Tree, &path(&["folder 1", "nope"]))
            .unwrap_err();
        assert!(matches!(err, AppError::TreePath(ref p) if p == "/folder 1/nope"));
    }

    #[test]
    fn toggle_empty_path_errors() {
        let mut tree = FolderTree::new(sample_roots());
        assert!(tree.toggle_path(Section::Tree, &[]).is_err());
    }

    #[test]
    fn duplicate_sibling_names_resolve_to_first() {
        let mut tree = FolderTree::new(vec![
            FolderNode::file("dup.md", id(7)),
            FolderNode::file("dup.md", id(8)),
        ]);
        let outcome = tree.toggle_path(Section::Tree, &path(&["dup.md"])).unwrap();
        assert_eq!(outcome, Toggled::Open(id(7)));
    }

    #[test]
    fn search_results_resolve_in_their_own_section() {
        let mut tree = FolderTree::new(sample_roots());
        tree.set_search_results(vec![FolderNode::file("folder 1", id(9))]);
        assert_eq!(tree.rows.len(), 4);
        assert_eq!(tree.rows[3].section, Section::SearchResults);

        let outcome = tree
            .toggle_path(Section::SearchResults, &path(&["folder 1"]))
            .unwrap();
        assert_eq!(outcome, Toggled::Open(id(9)));
        assert_eq!(tree.roots[0].state, NodeState::Collapsed);
    }

    #[test]
    fn clear_search_results_removes_rows() {
        let mut tree = FolderTree::new(sample_roots());
        tree.set_search_results(vec![FolderNode::file("hit.md", id(4))]);
        tree.clear_search_results();
        assert_eq!(tree.rows.len(), 3);
    }

    #[test]
    fn replace_roots_keeps_open_folders() {
        let mut tree = FolderTree::new(sample_roots());
        tree.toggle_path(Section::Tree, &path(&["folder 2"])).unwrap();
        tree.toggle_path(Section::Tree, &path(&["folder 2", "folder 3"]))
            .unwrap();

        tree.replace_roots(sample_roots());
        assert_eq!(tree.roots[1].state, NodeState::Expanded);
        assert_eq!(tree.roots[1].contents[0].state, NodeState::Expanded);
        assert_eq!(tree.roots[0].state, NodeState::Collapsed);
    }

    #[test]
    fn replace_roots_open_folder_that_lost_children_is_expanded_empty() {
        let mut tree = FolderTree::new(sample_roots());
        tree.toggle_path(Section::Tree, &path(&["folder 1"])).unwrap();
        tree.replace_roots(vec![FolderNode::folder("folder 1", vec![])]);
        assert_eq!(tree.roots[0].state, NodeState::ExpandedEmpty);
    }

    #[test]
    fn selection_follows_node_across_flatten() {
        let mut tree = FolderTree::new(sample_roots());
        tree.selected_index = 2; // "empty"
        tree.toggle_path(Section::Tree, &path(&["folder 1"])).unwrap();
        assert_eq!(tree.selected_row().unwrap().name, "empty");
    }

    #[test]
    fn click_row_selects_and_toggles() {
        let mut tree = FolderTree::new(sample_roots());
        let outcome = tree.click_row(1).unwrap();
        assert_eq!(outcome, Some(Toggled::Expanded));
        assert_eq!(tree.selected_index, 1);
        assert_eq!(tree.click_row(99).unwrap(), None);
    }

    #[test]
    fn collapse_selected_on_file_jumps_to_parent() {
        let mut tree = FolderTree::new(sample_roots());
        tree.toggle_path(Section::Tree, &path(&["folder 1"])).unwrap();
        tree.selected_index = 1;
        tree.collapse_selected().unwrap();
        assert_eq!(tree.selected_index, 0);
        tree.collapse_selected().unwrap();
        assert_eq!(tree.roots[0].state, NodeState::Collapsed);
    }

    #[test]
    fn expand_selected_ignores_files() {
        let mut tree = FolderTree::new(vec![FolderNode::file("a.md", id(1))]);
        tree.expand_selected().unwrap();
        assert_eq!(tree.roots[0].state, NodeState::File);
    }

    #[test]
    fn navigation_clamps() {
        let mut tree = FolderTree::new(sample_roots());
        tree.select_previous();
        assert_eq!(tree.selected_index, 0);
        tree.select_last();
        assert_eq!(tree.selected_index, 2);
        tree.select_next();
        assert_eq!(tree.selected_index, 2);
        tree.select_first();
        assert_eq!(tree.selected_index, 0);
    }

    #[test]
    fn update_scroll_keeps_selection_visible() {
        let mut tree = FolderTree::new(sample_roots());
        tree.selected_index = 2;
        tree.update_scroll(2);
        assert_eq!(tree.scroll_offset, 1);
        assert_eq!(tree.row_at_offset(0), Some(1));
        assert_eq!(tree.row_at_offset(5), None);
    }

    #[test]
    fn display_path_joins_names() {
        assert_eq!(display_path(&path(&["a", "b.md"])), "/a/b.md");
    }
}

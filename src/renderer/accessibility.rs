//! Screen-reader rendering: the scene as plain, announced text.
//!
//! Boxes join their children with a space (row directions) or a newline,
//! text elements contribute their flattened text. Each node is prefixed with
//! its active states and, when it differs from the parent's, its role:
//!
//! ```text
//! list: listitem: (selected) Apples
//! Pears
//! ```

use crate::dom::{ElementName, NodeId, Role, Scene};
use crate::layout::tree::LayoutTree;

/// Screen-reader text for `id` and its subtree.
pub fn screen_reader_text<L: LayoutTree>(
    scene: &Scene<L>,
    id: NodeId,
    parent_role: Option<Role>,
    skip_static: bool,
) -> String {
    let Some(node) = scene.get(id) else {
        return String::new();
    };
    let Some(name) = node.name() else {
        return String::new();
    };
    if skip_static && scene.static_node() == Some(id) {
        return String::new();
    }
    if node.style().is_hidden() {
        return String::new();
    }

    let accessibility = node.accessibility();
    let mut output = match name {
        ElementName::Text => scene.squash_plain_text(id),
        ElementName::Box | ElementName::Root => {
            let direction = node.style().flex_direction();
            let separator = if direction.is_row() { " " } else { "\n" };

            let mut children: Vec<NodeId> = scene.children(id).to_vec();
            if direction.is_reverse() {
                children.reverse();
            }

            children
                .into_iter()
                .map(|child| screen_reader_text(scene, child, accessibility.role, skip_static))
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join(separator)
        }
        ElementName::VirtualText => String::new(),
    };

    let states = accessibility.state.names();
    if !states.is_empty() {
        output = format!("({}) {output}", states.join(", "));
    }
    if let Some(role) = accessibility.role {
        if Some(role) != parent_role {
            output = format!("{role}: {output}");
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dom::{Accessibility, AccessibilityState};
    use crate::style::Styles;
    use crate::trace::TraceLog;
    use crate::layout::taffy_tree::TaffyLayoutTree;
    use crate::types::FlexDirection;

    fn scene() -> Scene<TaffyLayoutTree> {
        Scene::unbound(TraceLog::disabled())
    }

    fn text(scene: &mut Scene<TaffyLayoutTree>, parent: NodeId, value: &str) -> NodeId {
        let node = scene.create_node(ElementName::Text).unwrap();
        let leaf = scene.create_text_node(value);
        scene.append_child(node, leaf).unwrap();
        scene.append_child(parent, node).unwrap();
        node
    }

    #[test]
    fn column_children_join_with_newlines() {
        let mut scene = scene();
        let root = scene.root();
        scene
            .set_style(root, Styles::default().with_flex_direction(FlexDirection::Column))
            .unwrap();
        text(&mut scene, root, "one");
        text(&mut scene, root, "");
        text(&mut scene, root, "two");
        assert_eq!(screen_reader_text(&scene, root, None, false), "one\ntwo");
    }

    #[test]
    fn row_reverse_joins_backwards_with_spaces() {
        let mut scene = scene();
        let root = scene.root();
        scene
            .set_style(root, Styles::default().with_flex_direction(FlexDirection::RowReverse))
            .unwrap();
        text(&mut scene, root, "a");
        text(&mut scene, root, "b");
        assert_eq!(screen_reader_text(&scene, root, None, false), "b a");
    }

    #[test]
    fn roles_and_states_prefix_the_text() {
        let mut scene = scene();
        let root = scene.root();
        let list = scene.create_node(ElementName::Box).unwrap();
        scene.append_child(root, list).unwrap();
        scene
            .set_accessibility(
                list,
                Accessibility {
                    role: Some(Role::List),
                    ..Default::default()
                },
            )
            .unwrap();
        let item = text(&mut scene, list, "Apples");
        scene
            .set_accessibility(
                item,
                Accessibility {
                    role: Some(Role::Listitem),
                    state: AccessibilityState::SELECTED | AccessibilityState::CHECKED,
                },
            )
            .unwrap();
        let same = text(&mut scene, list, "Pears");
        scene
            .set_accessibility(
                same,
                Accessibility {
                    role: Some(Role::List),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(
            screen_reader_text(&scene, root, None, false),
            "list: listitem: (checked, selected) Apples Pears"
        );
    }

    #[test]
    fn static_and_hidden_subtrees_are_skipped() {
        let mut scene = scene();
        let root = scene.root();
        let history = scene.create_node(ElementName::Box).unwrap();
        scene.append_child(root, history).unwrap();
        scene.set_attribute(history, crate::dom::STATIC_ATTRIBUTE, true).unwrap();
        text(&mut scene, history, "old");
        let hidden = text(&mut scene, root, "secret");
        scene.set_display_none(hidden).unwrap();
        text(&mut scene, root, "live");

        assert_eq!(screen_reader_text(&scene, root, None, true), "live");
        assert_eq!(screen_reader_text(&scene, history, None, false), "old");
    }
}

//! Flattening of a Text node's descendants into one string.

use crate::layout::tree::LayoutTree;
use crate::renderer::ansi::sgr_transition;
use crate::style::Styles;
use crate::types::CellStyle;

use super::node::{NodeId, NodeKind};
use super::scene::Scene;

/// `base` with the text styling of `style` layered on top.
fn overlay(base: CellStyle, style: &Styles) -> CellStyle {
    CellStyle {
        fg: style.color.or(base.fg),
        bg: style.background_color.or(base.bg),
        attrs: base.attrs | style.text_attrs(),
    }
}

impl<L: LayoutTree> Scene<L> {
    /// Concatenated text under `id`.
    ///
    /// Nested Text and VirtualText children contribute their transformer
    /// output and their own styling as SGR sequences, expressed relative to
    /// the enclosing text so that closing one restores its parent.
    pub fn squash_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.squash_into(id, Some(CellStyle::default()), &mut out);
        out
    }

    /// Like [`Scene::squash_text`] without any escape sequences.
    pub fn squash_plain_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.squash_into(id, None, &mut out);
        out
    }

    fn squash_into(&self, id: NodeId, styled: Option<CellStyle>, out: &mut String) {
        for (index, &child) in self.children(id).iter().enumerate() {
            let Some(node) = self.get(child) else {
                continue;
            };

            match node.kind() {
                NodeKind::Text(value) => out.push_str(value),
                NodeKind::Element(el) if el.name.is_text() => {
                    let inner_style = styled.map(|base| overlay(base, node.style()));
                    let mut text = String::new();
                    self.squash_into(child, inner_style, &mut text);

                    if !text.is_empty() {
                        if let Some(transform) = node.transform() {
                            text = transform(&text, index);
                        }
                    }

                    match (styled, inner_style) {
                        (Some(base), Some(inner)) if !text.is_empty() && base != inner => {
                            out.push_str(&sgr_transition(&base, &inner));
                            out.push_str(&text);
                            out.push_str(&sgr_transition(&inner, &base));
                        }
                        _ => out.push_str(&text),
                    }
                }
                NodeKind::Element(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::dom::{ElementName, Scene};
    use crate::layout::taffy_tree::TaffyLayoutTree;
    use crate::style::Styles;
    use crate::trace::TraceLog;
    use crate::types::Color;

    fn scene() -> Scene<TaffyLayoutTree> {
        Scene::unbound(TraceLog::disabled())
    }

    #[test]
    fn concatenates_leaves_and_virtual_text() {
        let mut scene = scene();
        let text = scene.create_node(ElementName::Text).unwrap();
        let hello = scene.create_text_node("Hello ");
        let virt = scene.create_node(ElementName::VirtualText).unwrap();
        let world = scene.create_text_node("World");
        scene.append_child(text, hello).unwrap();
        scene.append_child(text, virt).unwrap();
        scene.append_child(virt, world).unwrap();

        assert_eq!(scene.squash_text(text), "Hello World");
    }

    #[test]
    fn transformers_receive_the_child_index() {
        let mut scene = scene();
        let text = scene.create_node(ElementName::Text).unwrap();
        let first = scene.create_text_node("a");
        let virt = scene.create_node(ElementName::VirtualText).unwrap();
        let leaf = scene.create_text_node("b");
        scene.append_child(text, first).unwrap();
        scene.append_child(text, virt).unwrap();
        scene.append_child(virt, leaf).unwrap();
        scene
            .set_transform(virt, Some(Rc::new(|s: &str, i: usize| format!("[{s}:{i}]"))))
            .unwrap();

        assert_eq!(scene.squash_text(text), "a[b:1]");
    }

    #[test]
    fn virtual_text_style_becomes_balanced_sgr() {
        let mut scene = scene();
        let text = scene.create_node(ElementName::Text).unwrap();
        let virt = scene.create_node(ElementName::VirtualText).unwrap();
        let leaf = scene.create_text_node("red");
        scene.append_child(text, virt).unwrap();
        scene.append_child(virt, leaf).unwrap();
        scene
            .set_style(
                virt,
                Styles {
                    color: Some(Color::RED),
                    bold: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(scene.squash_text(text), "\x1b[31;1mred\x1b[39;22m");
        assert_eq!(scene.squash_plain_text(text), "red");
    }
}

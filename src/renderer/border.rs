//! Box decorations: background fill and border glyphs.

use crate::layout::types::ComputedLayout;
use crate::style::{BorderSideStyle, Styles};
use crate::types::{Attr, CellStyle};

use super::output::Output;

/// Style of a border side's glyphs.
fn side_style(side: &BorderSideStyle) -> CellStyle {
    CellStyle {
        fg: side.color,
        bg: None,
        attrs: if side.dim { Attr::DIM } else { Attr::NONE },
    }
}

/// Cell sizes of the box, rounded to the grid.
fn box_size(layout: &ComputedLayout) -> (i32, i32) {
    (layout.width.round() as i32, layout.height.round() as i32)
}

/// Fill the area inside the border with the box's background colour.
pub fn render_background(output: &mut Output, x: i32, y: i32, style: &Styles, layout: &ComputedLayout) {
    let Some(color) = style.background_color else {
        return;
    };
    let (width, height) = box_size(layout);
    let edges = style.border_edges().unwrap_or_default();
    let (left, right) = (edges.left as i32, edges.right as i32);
    let (top, bottom) = (edges.top as i32, edges.bottom as i32);

    let content_width = width - left - right;
    let content_height = height - top - bottom;
    if content_width <= 0 || content_height <= 0 {
        return;
    }
    output.fill(
        x + left,
        y + top,
        content_width,
        content_height,
        CellStyle::background(color),
    );
}

/// Draw the box's border. Hidden sides take their corners with them.
pub fn render_border(output: &mut Output, x: i32, y: i32, style: &Styles, layout: &ComputedLayout) {
    let Some(border) = style.border_style else {
        return;
    };
    let chars = border.chars();
    let (width, height) = box_size(layout);
    let [top, right, bottom, left] = style.border_sides();

    let inner_width = (width - left.visible as i32 - right.visible as i32).max(0) as usize;
    let inner_height = (height - top.visible as i32 - bottom.visible as i32).max(0) as usize;

    let horizontal = |l: char, fill: char, r: char| {
        let mut line = String::with_capacity(inner_width + 2);
        if left.visible {
            line.push(l);
        }
        line.extend(std::iter::repeat_n(fill, inner_width));
        if right.visible {
            line.push(r);
        }
        line
    };

    if top.visible {
        let line = horizontal(chars.top_left, chars.top, chars.top_right);
        write_styled(output, x, y, &line, &top);
    }

    let vertical_y = y + top.visible as i32;
    if left.visible {
        let column = vertical_line(chars.left, inner_height);
        write_styled(output, x, vertical_y, &column, &left);
    }
    if right.visible {
        let column = vertical_line(chars.right, inner_height);
        write_styled(output, x + width - 1, vertical_y, &column, &right);
    }

    if bottom.visible {
        let line = horizontal(chars.bottom_left, chars.bottom, chars.bottom_right);
        write_styled(output, x, y + height - 1, &line, &bottom);
    }
}

fn vertical_line(glyph: char, height: usize) -> String {
    let mut column = String::with_capacity(height * 4);
    for row in 0..height {
        if row > 0 {
            column.push('\n');
        }
        column.push(glyph);
    }
    column
}

fn write_styled(output: &mut Output, x: i32, y: i32, text: &str, side: &BorderSideStyle) {
    if text.is_empty() {
        return;
    }
    output.write(
        x,
        y,
        text,
        &super::output::WriteOptions {
            transformers: &[],
            style: side_style(side),
        },
    );
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::{BorderStyle, Color};

    fn layout(width: f32, height: f32) -> ComputedLayout {
        ComputedLayout {
            width,
            height,
            ..Default::default()
        }
    }

    #[test]
    fn full_round_border() {
        let mut output = Output::new(5, 3);
        let style = Styles {
            border_style: Some(BorderStyle::Round),
            ..Default::default()
        };
        render_border(&mut output, 0, 0, &style, &layout(5.0, 3.0));
        assert_eq!(output.get().output, "╭───╮\n│   │\n╰───╯");
    }

    #[test]
    fn hidden_sides_drop_their_corners() {
        let mut output = Output::new(4, 3);
        let style = Styles {
            border_style: Some(BorderStyle::Single),
            border_left: Some(false),
            border_bottom: Some(false),
            ..Default::default()
        };
        render_border(&mut output, 0, 0, &style, &layout(4.0, 3.0));
        assert_eq!(output.get().output, "───┐\n   │\n   │");
    }

    #[test]
    fn side_colours_and_dim() {
        let mut output = Output::new(3, 3);
        let style = Styles {
            border_style: Some(BorderStyle::Classic),
            border_color: Some(Color::GREEN),
            border_top_color: Some(Color::RED),
            border_left_dim_color: Some(true),
            ..Default::default()
        };
        render_border(&mut output, 0, 0, &style, &layout(3.0, 3.0));
        assert_eq!(output.cell(1, 0).unwrap().style.fg, Some(Color::RED));
        assert_eq!(output.cell(2, 1).unwrap().style.fg, Some(Color::GREEN));
        let left = output.cell(0, 1).unwrap().style;
        assert_eq!(left.fg, Some(Color::GREEN));
        assert!(left.attrs.contains(Attr::DIM));
    }

    #[test]
    fn background_stays_inside_the_border() {
        let mut output = Output::new(4, 3);
        let style = Styles {
            border_style: Some(BorderStyle::Single),
            background_color: Some(Color::BLUE),
            ..Default::default()
        };
        render_background(&mut output, 0, 0, &style, &layout(4.0, 3.0));
        assert!(output.cell(0, 0).unwrap().is_blank());
        assert!(output.cell(3, 1).unwrap().is_blank());
        assert_eq!(output.cell(1, 1).unwrap().style.bg, Some(Color::BLUE));
        assert_eq!(output.cell(2, 1).unwrap().style.bg, Some(Color::BLUE));
    }

    #[test]
    fn no_background_no_fill() {
        let mut output = Output::new(2, 1);
        render_background(&mut output, 0, 0, &Styles::default(), &layout(2.0, 1.0));
        assert_eq!(output.get().output, "");
    }
}

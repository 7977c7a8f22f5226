use crate::buffer::{Buffer, Cell};
use crate::dom::{Dom, ElementId, ElementKind};
use crate::layout::{Layout, Rect};
use crate::text::{char_width, display_width, truncate_to_width};
use crate::types::Style;

/// Cells between the children of a row.
const ROW_GAP: u16 = 1;

/// Render the subtree under `root` into `buf`, flowing inside `area`.
///
/// The flow model is deliberately small — the widget only ever emits rows
/// of text runs and columns of rows: a `Row` lays its visible children out
/// left to right on one line, a `Col` stacks them, and a column's `indent`
/// shifts its children right. Returns where every visible element landed,
/// for hit testing. Pure function of the arena; no terminal required.
pub fn render_to_buffer(dom: &Dom, root: ElementId, area: Rect, buf: &mut Buffer) -> Layout {
    let mut layout = Layout::new();
    render_element(dom, root, area.x, area.y, &area, buf, &mut layout);
    layout
}

/// Renders one element at `(x, y)`, returning its consumed `(width,
/// height)` in cells.
fn render_element(
    dom: &Dom,
    id: ElementId,
    x: u16,
    y: u16,
    area: &Rect,
    buf: &mut Buffer,
    layout: &mut Layout,
) -> (u16, u16) {
    let Some(node) = dom.get(id) else {
        return (0, 0);
    };
    if !node.visible || y >= area.bottom() || x >= area.right() {
        return (0, 0);
    }

    let size = match node.kind {
        ElementKind::Text | ElementKind::Button => {
            let width = draw_text(&node.text, &node.style, x, y, area, buf);
            (width, 1)
        }
        ElementKind::Row => {
            let mut cursor = x;
            let mut height = 0;
            for child in dom.children_of(id) {
                let (w, h) = render_element(dom, child, cursor, y, area, buf, layout);
                if w > 0 {
                    cursor = cursor.saturating_add(w + ROW_GAP);
                }
                height = height.max(h);
            }
            let width = cursor.saturating_sub(x).saturating_sub(ROW_GAP);
            (width, height)
        }
        ElementKind::Col => {
            let child_x = x.saturating_add(node.indent);
            let mut cursor = y;
            let mut width = 0;
            for child in dom.children_of(id) {
                let (w, h) = render_element(dom, child, child_x, cursor, area, buf, layout);
                cursor = cursor.saturating_add(h);
                width = width.max(w.saturating_add(node.indent));
            }
            (width, cursor - y)
        }
    };

    layout.insert(id, Rect::new(x, y, size.0, size.1));
    size
}

/// Write one text run, clipped to the area. Returns the cells consumed.
fn draw_text(text: &str, style: &Style, x: u16, y: u16, area: &Rect, buf: &mut Buffer) -> u16 {
    let available = (area.right() - x) as usize;
    let clipped = if display_width(text) > available {
        truncate_to_width(text, available)
    } else {
        text.to_string()
    };

    let mut cursor = x;
    for ch in clipped.chars() {
        let w = char_width(ch).max(1) as u16;
        if cursor + w > area.right() {
            break;
        }
        let mut cell = Cell::new(ch).with_style(style.text_style);
        if let Some(fg) = style.foreground {
            cell = cell.with_fg(fg);
        }
        if let Some(bg) = style.background {
            cell = cell.with_bg(bg);
        }
        buf.set(cursor, y, cell);
        // The column covered by a wide glyph stays a blank in the same
        // colors; the flush pass skips it.
        if w > 1 && cursor + 1 < area.right() {
            buf.set(cursor + 1, y, Cell { char: ' ', ..cell });
        }
        cursor += w;
    }
    cursor - x
}

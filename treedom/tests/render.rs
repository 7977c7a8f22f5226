use treedom::{
    hit_test, render_to_buffer, Buffer, Dom, ElementId, ElementKind, Layout, Rect, Rgb, Style,
};

fn render(dom: &Dom, root: ElementId, width: u16, height: u16) -> (Buffer, Layout) {
    let mut buf = Buffer::new(width, height);
    let layout = render_to_buffer(dom, root, Rect::from_size(width, height), &mut buf);
    (buf, layout)
}

fn text_el(dom: &mut Dom, parent: ElementId, text: &str) -> ElementId {
    let id = dom.create(ElementKind::Text, "text");
    dom.set_text(id, text);
    dom.append(parent, id);
    id
}

// ============================================================================
// Flow layout
// ============================================================================

#[test]
fn test_col_stacks_children() {
    let mut dom = Dom::new();
    let root = dom.create(ElementKind::Col, "root");
    text_el(&mut dom, root, "one");
    text_el(&mut dom, root, "two");

    let (buf, layout) = render(&dom, root, 20, 5);

    assert_eq!(buf.row_text(0), "one");
    assert_eq!(buf.row_text(1), "two");
    assert_eq!(layout.get(root), Some(Rect::new(0, 0, 3, 2)));
}

#[test]
fn test_row_lays_out_left_to_right_with_gap() {
    let mut dom = Dom::new();
    let root = dom.create(ElementKind::Row, "root");
    let left = text_el(&mut dom, root, "ab");
    let right = text_el(&mut dom, root, "cd");

    let (buf, layout) = render(&dom, root, 20, 5);

    assert_eq!(buf.row_text(0), "ab cd");
    assert_eq!(layout.get(left), Some(Rect::new(0, 0, 2, 1)));
    assert_eq!(layout.get(right), Some(Rect::new(3, 0, 2, 1)));
}

#[test]
fn test_indent_shifts_column_children() {
    let mut dom = Dom::new();
    let root = dom.create(ElementKind::Col, "root");
    dom.set_indent(root, 4);
    text_el(&mut dom, root, "deep");

    let (buf, _) = render(&dom, root, 20, 5);

    assert_eq!(buf.row_text(0), "    deep");
}

#[test]
fn test_hidden_elements_render_nothing_and_get_no_rect() {
    let mut dom = Dom::new();
    let root = dom.create(ElementKind::Col, "root");
    let visible = text_el(&mut dom, root, "shown");
    let hidden = text_el(&mut dom, root, "gone");
    dom.hide(hidden);

    let (buf, layout) = render(&dom, root, 20, 5);

    assert_eq!(buf.row_text(0), "shown");
    assert_eq!(buf.row_text(1), "");
    assert!(layout.get(visible).is_some());
    assert!(layout.get(hidden).is_none());
}

#[test]
fn test_long_text_is_truncated_with_ellipsis() {
    let mut dom = Dom::new();
    let root = dom.create(ElementKind::Col, "root");
    text_el(&mut dom, root, "abcdefghij");

    let (buf, _) = render(&dom, root, 6, 2);

    assert_eq!(buf.row_text(0), "abcde…");
}

#[test]
fn test_styled_text_lands_in_cells() {
    let mut dom = Dom::new();
    let root = dom.create(ElementKind::Col, "root");
    let id = text_el(&mut dom, root, "hi");
    dom.set_style(id, Style::new().bold().foreground(Rgb::new(10, 20, 30)));

    let (buf, _) = render(&dom, root, 10, 2);

    let cell = buf.get(0, 0).unwrap();
    assert_eq!(cell.char, 'h');
    assert!(cell.style.bold);
    assert_eq!(cell.fg, Rgb::new(10, 20, 30));
}

#[test]
fn test_wide_chars_take_two_cells() {
    let mut dom = Dom::new();
    let root = dom.create(ElementKind::Col, "root");
    text_el(&mut dom, root, "樹x");

    let (buf, layout) = render(&dom, root, 10, 2);

    assert_eq!(buf.get(0, 0).unwrap().char, '樹');
    assert_eq!(buf.get(1, 0).unwrap().char, ' ', "covered column stays blank");
    assert_eq!(buf.get(2, 0).unwrap().char, 'x');
    let rect = layout.get(root).unwrap();
    assert_eq!(rect.width, 3);
}

// ============================================================================
// Hit testing
// ============================================================================

#[test]
fn test_hit_test_finds_deepest_button() {
    let mut dom = Dom::new();
    let root = dom.create(ElementKind::Col, "root");
    let header = dom.create(ElementKind::Row, "header");
    dom.append(root, header);
    let button = dom.create(ElementKind::Button, "btn");
    dom.set_text(button, "press");
    dom.append(header, button);
    text_el(&mut dom, header, "plain");

    let (_, layout) = render(&dom, root, 30, 5);

    // Inside the button
    assert_eq!(hit_test(&dom, &layout, root, 2, 0), Some(button));
    // Inside the plain text: nothing clickable there
    assert_eq!(hit_test(&dom, &layout, root, 7, 0), None);
    // Outside everything
    assert_eq!(hit_test(&dom, &layout, root, 25, 3), None);
}

#[test]
fn test_hit_test_skips_hidden_subtrees() {
    let mut dom = Dom::new();
    let root = dom.create(ElementKind::Col, "root");
    let button = dom.create(ElementKind::Button, "btn");
    dom.set_text(button, "press");
    dom.append(root, button);

    let (_, layout) = render(&dom, root, 30, 5);
    assert_eq!(hit_test(&dom, &layout, root, 0, 0), Some(button));

    dom.hide(button);
    let (_, layout) = render(&dom, root, 30, 5);
    assert_eq!(hit_test(&dom, &layout, root, 0, 0), None);
}

// ============================================================================
// Arena bookkeeping
// ============================================================================

#[test]
fn test_remove_drops_subtree_and_click_bindings() {
    let mut dom = Dom::new();
    let root = dom.create(ElementKind::Col, "root");
    let branch = dom.create(ElementKind::Col, "branch");
    let button = dom.create(ElementKind::Button, "btn");
    dom.append(root, branch);
    dom.append(branch, button);
    dom.on_click(button, std::rc::Rc::new(|_| {}));

    dom.remove(branch);

    assert!(!dom.contains(branch));
    assert!(!dom.contains(button));
    assert!(dom.click_handlers(button).is_empty());
    assert!(dom.children_of(root).is_empty());
}

#[test]
fn test_empty_keeps_container_removes_children() {
    let mut dom = Dom::new();
    let root = dom.create(ElementKind::Col, "root");
    let a = dom.create(ElementKind::Text, "a");
    let b = dom.create(ElementKind::Text, "b");
    dom.append(root, a);
    dom.append(root, b);

    dom.empty(root);

    assert!(dom.contains(root));
    assert!(!dom.contains(a));
    assert!(!dom.contains(b));
}

#[test]
fn test_append_reparents() {
    let mut dom = Dom::new();
    let first = dom.create(ElementKind::Col, "first");
    let second = dom.create(ElementKind::Col, "second");
    let child = dom.create(ElementKind::Text, "child");

    dom.append(first, child);
    dom.append(second, child);

    assert!(dom.children_of(first).is_empty());
    assert_eq!(dom.children_of(second), vec![child]);
    assert_eq!(dom.parent_of(child), Some(second));
}

// ============================================================================
// Buffer diff
// ============================================================================

#[test]
fn test_diff_reports_only_changed_cells() {
    let mut before = Buffer::new(10, 2);
    let mut after = Buffer::new(10, 2);
    before.set(1, 0, treedom::buffer::Cell::new('a'));
    after.set(1, 0, treedom::buffer::Cell::new('b'));
    after.set(3, 1, treedom::buffer::Cell::new('c'));

    let changes: Vec<_> = after.diff(&before).collect();

    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].0, 1);
    assert_eq!(changes[0].1, 0);
    assert_eq!(changes[0].2.char, 'b');
    assert_eq!(changes[1], (3, 1, after.get(3, 1).unwrap()));
}

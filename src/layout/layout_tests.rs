use crate::layout::layout_cursor::{CursorPosition, Direction, LayoutCursor};
use crate::layout::layout_editing::BackspaceEffect;
use crate::layout::layout_engine::{LayoutId, LayoutTree};
use crate::layout::layout_geometry::{GLYPH_HEIGHT, GLYPH_WIDTH, KDSize};
use crate::layout::layout_shapes::{
    FractionLayout, LayoutKind, LayoutShape, MatrixLayout, NthRootLayout, VerticalOffsetLayout,
    VerticalPosition,
};
//___________________________________TESTS____________________________________

mod tests {
    use super::*;
    use proptest::prelude::*;

    fn type_chars(tree: &mut LayoutTree, cursor: &mut LayoutCursor, text: &str) {
        for c in text.chars() {
            let leaf = tree.add_leaf(LayoutKind::char(c));
            cursor.add_layout_and_move_cursor(tree, leaf);
        }
    }

    fn slot_of(tree: &mut LayoutTree, text: &str) -> LayoutId {
        let leaves = text.chars().map(|c| tree.add_leaf(LayoutKind::char(c))).collect();
        tree.slot(leaves)
    }

    /// `((12)/(3))` typed the way a user would, cursor right of the `3`.
    fn fraction_tree() -> (LayoutTree, LayoutCursor) {
        let mut tree = LayoutTree::new();
        let mut cursor = LayoutCursor::left_of_root(&tree);
        type_chars(&mut tree, &mut cursor, "12");
        cursor.add_fraction_layout_and_collapse_siblings(&mut tree);
        type_chars(&mut tree, &mut cursor, "3");
        (tree, cursor)
    }

    fn fraction_of(tree: &LayoutTree) -> LayoutId {
        tree.child(tree.root(), 0)
    }

    fn matrix_tree() -> (LayoutTree, LayoutId) {
        let mut tree = LayoutTree::new();
        let cells: Vec<LayoutId> = ["1", "2", "3", "4"].iter().map(|c| slot_of(&mut tree, c)).collect();
        let matrix = tree.add_node(LayoutKind::Matrix(MatrixLayout { rows: 2, columns: 2 }), cells);
        let root = tree.root();
        tree.insert_in_horizontal(root, 0, matrix);
        (tree, matrix)
    }

    fn assert_geometry_consistent(tree: &LayoutTree, id: LayoutId) {
        let outer = tree.rect(id);
        if tree.is_horizontal(id) {
            let widths: i32 = tree.children(id).iter().map(|c| tree.size(*c).width).sum();
            assert_eq!(widths, outer.width, "run {} is not as wide as its children", id);
        }
        for child in tree.children(id) {
            let inner = tree.rect(*child);
            assert_eq!(outer.union(&inner), outer, "{} sticks out of {}", child, id);
            assert_geometry_consistent(tree, *child);
        }
    }

    fn assert_structure(tree: &LayoutTree) {
        assert!(tree.is_horizontal(tree.root()));
        for id in tree.descendants(tree.root()) {
            let kind = tree.kind(id);
            for child in tree.children(id) {
                assert_eq!(tree.parent(*child), Some(id));
                if kind.is_horizontal() {
                    assert!(!tree.is_horizontal(*child), "run {} nested in run {}", child, id);
                } else {
                    assert!(tree.is_horizontal(*child), "slot {} of {} is not a run", child, id);
                }
            }
            if kind.is_horizontal() && id != tree.root() {
                assert!(tree.number_of_children(id) > 0, "slot {} is empty", id);
            }
        }
    }

    #[test]
    fn test_new_tree() {
        let tree = LayoutTree::new();
        assert_eq!(tree.to_text(), "");
        assert_eq!(tree.number_of_layouts(), 2);
        assert_eq!(tree.minimal_size(), KDSize::new(0, GLYPH_HEIGHT));
        assert!(tree.is_empty_slot(tree.root()));
    }

    #[test]
    fn test_typing_and_fraction_shortcut() {
        let (tree, cursor) = fraction_tree();
        assert_eq!(tree.to_text(), "((12)/(3))");
        let fraction = fraction_of(&tree);
        assert_eq!(*tree.kind(fraction), LayoutKind::Fraction(FractionLayout));
        let denominator = tree.child(fraction, 1);
        assert_eq!(cursor.slot(&tree), (denominator, 1));
        assert_structure(&tree);
        assert_geometry_consistent(&tree, tree.root());
    }

    #[test]
    fn test_fraction_shortcut_stops_at_operator() {
        let mut tree = LayoutTree::new();
        let mut cursor = LayoutCursor::left_of_root(&tree);
        type_chars(&mut tree, &mut cursor, "1+23");
        cursor.add_fraction_layout_and_collapse_siblings(&mut tree);
        assert_eq!(tree.to_text(), "1+((23)/())");
        let fraction = tree.child(tree.root(), 2);
        assert_eq!(cursor.slot(&tree), (tree.child(fraction, 1), 0));
    }

    #[test]
    fn test_sizes_follow_edits() {
        let mut tree = LayoutTree::new();
        let mut cursor = LayoutCursor::left_of_root(&tree);
        type_chars(&mut tree, &mut cursor, "12");
        assert_eq!(tree.minimal_size(), KDSize::new(2 * GLYPH_WIDTH, GLYPH_HEIGHT));
        type_chars(&mut tree, &mut cursor, "3");
        assert_eq!(tree.minimal_size().width, 3 * GLYPH_WIDTH);
        cursor.add_empty_power_layout(&mut tree);
        // superscript placeholder: 8 wide, raised by half a glyph
        assert_eq!(tree.minimal_size(), KDSize::new(3 * GLYPH_WIDTH + 8, GLYPH_HEIGHT + GLYPH_HEIGHT / 2));
        assert_geometry_consistent(&tree, tree.root());
    }

    #[test]
    fn test_parentheses_grow_with_enclosed_content() {
        let mut tree = LayoutTree::new();
        let mut cursor = LayoutCursor::left_of_root(&tree);
        type_chars(&mut tree, &mut cursor, "(");
        cursor.add_fraction_layout_and_collapse_siblings(&mut tree);
        type_chars(&mut tree, &mut cursor, "1");
        let mut outside = LayoutCursor::right_of_root(&tree);
        type_chars(&mut tree, &mut outside, ")");
        assert_eq!(tree.to_text(), "(((1)/()))");

        let root = tree.root();
        let (left, fraction, right) = (tree.child(root, 0), tree.child(root, 1), tree.child(root, 2));
        assert_eq!(tree.size(left).height, tree.size(fraction).height + 4);
        assert_eq!(tree.size(left), tree.size(right));

        // a nested fraction in the denominator makes the outer one taller
        let mut inside = LayoutCursor::start_of(&tree, tree.child(fraction, 1));
        inside.add_fraction_layout_and_collapse_siblings(&mut tree);
        assert_eq!(tree.size(left).height, tree.size(fraction).height + 4);
        assert_eq!(tree.baseline(left), tree.baseline(fraction) + 2);
        assert_geometry_consistent(&tree, root);
    }

    #[test]
    fn test_inserting_a_run_merges_it() {
        let (mut tree, mut cursor) = fraction_tree();
        let run = slot_of(&mut tree, "+4");
        cursor.insert_layout(&mut tree, run, None, false);
        assert_eq!(tree.to_text(), "((12)/(3+4))");
        assert_structure(&tree);
        let denominator = tree.child(fraction_of(&tree), 1);
        assert_eq!(cursor.slot(&tree), (denominator, 3));
    }

    #[test]
    fn test_inserting_a_compound_points_into_it() {
        let mut tree = LayoutTree::new();
        let mut cursor = LayoutCursor::left_of_root(&tree);
        let numerator = tree.empty_slot();
        let denominator = tree.empty_slot();
        let fraction = tree.add_node(LayoutKind::Fraction(FractionLayout), vec![numerator, denominator]);
        cursor.insert_layout(&mut tree, fraction, None, false);
        assert_eq!(cursor, LayoutCursor::start_of(&tree, numerator));

        let mut forced = LayoutCursor::right_of_root(&tree);
        let copy = tree.copy_subtree(fraction);
        forced.insert_layout(&mut tree, copy, None, true);
        assert_eq!(forced, LayoutCursor::right_of(&tree, copy));
        assert_eq!(tree.to_text(), "(()/())(()/())");
    }

    #[test]
    fn test_insert_text_points_inside_parentheses() {
        let mut tree = LayoutTree::new();
        let mut cursor = LayoutCursor::left_of_root(&tree);
        cursor.insert_text(&mut tree, "cos()");
        assert_eq!(tree.to_text(), "cos()");
        let (run, index) = cursor.slot(&tree);
        assert_eq!(run, tree.root());
        assert_eq!(index, 4);
    }

    #[test]
    fn test_moving_through_a_fraction() {
        let (tree, _) = fraction_tree();
        let fraction = fraction_of(&tree);
        let (numerator, denominator) = (tree.child(fraction, 0), tree.child(fraction, 1));

        let end = LayoutCursor::right_of_root(&tree);
        let in_denominator = end.cursor_moved(&tree, Direction::Left);
        assert_eq!(in_denominator.slot(&tree), (denominator, 1));
        let start_of_denominator = in_denominator.cursor_moved(&tree, Direction::Left);
        assert_eq!(start_of_denominator.slot(&tree), (denominator, 0));
        let before = start_of_denominator.cursor_moved(&tree, Direction::Left);
        assert_eq!(before, LayoutCursor::left_of_root(&tree));
        assert!(!before.cursor_moved(&tree, Direction::Left).is_defined());

        let start_of_numerator = before.cursor_moved(&tree, Direction::Right);
        assert_eq!(start_of_numerator.slot(&tree), (numerator, 0));
        assert!(!start_of_numerator.cursor_moved(&tree, Direction::Up).is_defined());
        let down = start_of_numerator.cursor_moved(&tree, Direction::Down);
        assert_eq!(down.slot(&tree), (denominator, 0));

        let end_of_numerator = LayoutCursor::end_of(&tree, numerator);
        let down = end_of_numerator.cursor_moved(&tree, Direction::Down);
        assert_eq!(down.slot(&tree), (denominator, 1));
        // 17 is as far from 12 as from 22: the leftmost gap wins
        let up = down.cursor_moved(&tree, Direction::Up);
        assert_eq!(up.slot(&tree), (numerator, 1));
        assert!(!end.cursor_moved(&tree, Direction::Right).is_defined());
    }

    #[test]
    fn test_moving_through_a_root_with_index() {
        let mut tree = LayoutTree::new();
        let radicand = slot_of(&mut tree, "x");
        let index = slot_of(&mut tree, "3");
        let root_layout = tree.add_node(LayoutKind::NthRoot(NthRootLayout { has_index: true }), vec![radicand, index]);
        let root = tree.root();
        tree.insert_in_horizontal(root, 0, root_layout);
        assert_eq!(tree.to_text(), "root(x,3)");

        let mut cursor = LayoutCursor::left_of_root(&tree);
        let mut visited = Vec::new();
        for _ in 0..5 {
            cursor = cursor.cursor_moved(&tree, Direction::Right);
            visited.push(cursor.slot(&tree));
        }
        assert_eq!(
            visited,
            vec![(index, 0), (index, 1), (radicand, 0), (radicand, 1), (root, 1)]
        );
        for expected in [(radicand, 1), (radicand, 0), (index, 1)] {
            cursor = cursor.cursor_moved(&tree, Direction::Left);
            assert_eq!(cursor.slot(&tree), expected);
        }
        let in_radicand = LayoutCursor::start_of(&tree, radicand);
        assert_eq!(in_radicand.cursor_moved(&tree, Direction::Up).slot(&tree), (index, 1));
    }

    #[test]
    fn test_moving_through_a_matrix() {
        let (tree, matrix) = matrix_tree();
        let cell = |i, j| tree.matrix_cell(matrix, i, j);

        let right_of_one = LayoutCursor::end_of(&tree, cell(0, 0));
        let next_cell = right_of_one.cursor_moved(&tree, Direction::Right);
        assert_eq!(next_cell.slot(&tree), (cell(0, 1), 0));
        let out = LayoutCursor::end_of(&tree, cell(0, 1)).cursor_moved(&tree, Direction::Right);
        assert_eq!(out, LayoutCursor::right_of(&tree, matrix));
        let back = LayoutCursor::start_of(&tree, cell(1, 1)).cursor_moved(&tree, Direction::Left);
        assert_eq!(back.slot(&tree), (cell(1, 0), 1));

        let down = right_of_one.cursor_moved(&tree, Direction::Down);
        assert_eq!(down.slot(&tree), (cell(1, 0), 1));
        assert!(!down.cursor_moved(&tree, Direction::Down).is_defined());
        assert_eq!(down.cursor_moved(&tree, Direction::Up).slot(&tree), (cell(0, 0), 1));

        let entered = out.cursor_moved(&tree, Direction::Left);
        assert_eq!(entered.slot(&tree), (cell(1, 1), 1));
    }

    #[test]
    fn test_moving_into_and_out_of_superscript() {
        let mut tree = LayoutTree::new();
        let mut cursor = LayoutCursor::left_of_root(&tree);
        type_chars(&mut tree, &mut cursor, "2");
        let before_power = cursor;
        cursor.add_empty_power_layout(&mut tree);
        type_chars(&mut tree, &mut cursor, "3");
        assert_eq!(tree.to_text(), "2^(3)");

        let power = tree.child(tree.root(), 1);
        let exponent = tree.child(power, 0);
        let up = before_power.cursor_moved(&tree, Direction::Up);
        assert_eq!(up.slot(&tree), (exponent, 0));
        let down = cursor.cursor_moved(&tree, Direction::Down);
        assert_eq!(down, LayoutCursor::right_of(&tree, power));
    }

    #[test]
    fn test_backspace_on_leaves() {
        let mut tree = LayoutTree::new();
        let mut cursor = LayoutCursor::left_of_root(&tree);
        assert_eq!(cursor.perform_backspace(&mut tree), BackspaceEffect::Nothing);
        type_chars(&mut tree, &mut cursor, "12");
        assert_eq!(cursor.perform_backspace(&mut tree), BackspaceEffect::Deleted);
        assert_eq!(tree.to_text(), "1");
        assert_eq!(cursor.perform_backspace(&mut tree), BackspaceEffect::Deleted);
        assert_eq!(tree.to_text(), "");
        assert!(tree.is_empty_slot(tree.root()));
        assert_eq!(cursor, LayoutCursor::left_of_root(&tree));
    }

    #[test]
    fn test_backspace_on_fraction() {
        let (mut tree, _) = fraction_tree();
        let allocated = tree.allocated();

        // right of the fraction: the cursor enters the denominator
        let mut cursor = LayoutCursor::right_of_root(&tree);
        assert_eq!(cursor.perform_backspace(&mut tree), BackspaceEffect::Moved);
        let denominator = tree.child(fraction_of(&tree), 1);
        assert_eq!(cursor.slot(&tree), (denominator, 1));
        assert_eq!(tree.allocated(), allocated);

        // start of a non-empty numerator: the cursor leaves the fraction
        let mut cursor = LayoutCursor::start_of(&tree, tree.child(fraction_of(&tree), 0));
        assert_eq!(cursor.perform_backspace(&mut tree), BackspaceEffect::Moved);
        assert_eq!(cursor, LayoutCursor::left_of_root(&tree));

        // start of the denominator: numerator and denominator are spliced in place
        let mut cursor = LayoutCursor::start_of(&tree, denominator);
        assert_eq!(cursor.perform_backspace(&mut tree), BackspaceEffect::Deleted);
        assert_eq!(tree.to_text(), "123");
        assert_eq!(cursor.slot(&tree), (tree.root(), 2));
        assert_structure(&tree);
    }

    #[test]
    fn test_backspace_dissolves_empty_skeletons() {
        let mut tree = LayoutTree::new();
        let mut cursor = LayoutCursor::left_of_root(&tree);
        type_chars(&mut tree, &mut cursor, "2");
        cursor.add_empty_power_layout(&mut tree);
        assert_eq!(cursor.perform_backspace(&mut tree), BackspaceEffect::Deleted);
        assert_eq!(tree.to_text(), "2");
        assert_eq!(cursor, LayoutCursor::right_of_root(&tree));

        cursor.add_empty_square_root_layout(&mut tree);
        type_chars(&mut tree, &mut cursor, "4");
        assert_eq!(tree.to_text(), "2√(4)");
        let radicand = cursor.slot(&tree).0;
        let mut at_start = LayoutCursor::start_of(&tree, radicand);
        assert_eq!(at_start.perform_backspace(&mut tree), BackspaceEffect::Deleted);
        assert_eq!(tree.to_text(), "24");
        assert_eq!(at_start.slot(&tree), (tree.root(), 1));
        assert_structure(&tree);
    }

    #[test]
    fn test_backspace_in_matrix() {
        let (mut tree, matrix) = matrix_tree();
        let mut cursor = LayoutCursor::start_of(&tree, tree.matrix_cell(matrix, 1, 0));
        assert_eq!(cursor.perform_backspace(&mut tree), BackspaceEffect::Moved);
        assert_eq!(cursor.slot(&tree), (tree.matrix_cell(matrix, 0, 1), 1));
        let mut first = LayoutCursor::start_of(&tree, tree.matrix_cell(matrix, 0, 0));
        assert_eq!(first.perform_backspace(&mut tree), BackspaceEffect::Moved);
        assert_eq!(first, LayoutCursor::left_of_root(&tree));
    }

    #[test]
    fn test_backspace_deletes_empty_matrix() {
        let mut tree = LayoutTree::new();
        let mut cursor = LayoutCursor::left_of_root(&tree);
        cursor.add_empty_matrix_layout(&mut tree);
        let matrix = tree.child(tree.root(), 0);
        assert!(tree.has_grey_squares(matrix));
        assert_eq!(tree.real_dimensions(matrix), (1, 1));
        assert_eq!(tree.to_text(), "[[]]");
        assert_eq!(cursor.perform_backspace(&mut tree), BackspaceEffect::Deleted);
        assert_eq!(tree.to_text(), "");
        assert_eq!(tree.number_of_layouts(), 2);
    }

    #[test]
    fn test_typing_in_grey_cell_grows_matrix() {
        let mut tree = LayoutTree::new();
        let mut cursor = LayoutCursor::left_of_root(&tree);
        cursor.add_empty_matrix_layout(&mut tree);
        type_chars(&mut tree, &mut cursor, "1");
        let matrix = tree.child(tree.root(), 0);
        let mut grey = LayoutCursor::start_of(&tree, tree.matrix_cell(matrix, 0, 1));
        type_chars(&mut tree, &mut grey, "2");
        assert_eq!(tree.matrix_dimensions(matrix), (2, 3));
        assert_eq!(tree.real_dimensions(matrix), (1, 2));
        assert_eq!(tree.to_text(), "[[1,2]]");
        assert_eq!(grey.slot(&tree), (tree.matrix_cell(matrix, 0, 1), 1));
    }

    #[test]
    fn test_clear_layout() {
        let (mut tree, mut cursor) = fraction_tree();
        cursor.clear_layout(&mut tree);
        assert_eq!(tree, LayoutTree::new());
        assert_eq!(cursor, LayoutCursor::left_of_root(&tree));
    }

    #[test]
    fn test_logarithm_base_serialization() {
        let mut tree = LayoutTree::new();
        let mut cursor = LayoutCursor::left_of_root(&tree);
        type_chars(&mut tree, &mut cursor, "log");
        let base = slot_of(&mut tree, "2");
        let subscript = tree.add_node(
            LayoutKind::VerticalOffset(VerticalOffsetLayout {
                position: VerticalPosition::Subscript,
            }),
            vec![base],
        );
        cursor.add_layout_and_move_cursor(&mut tree, subscript);
        type_chars(&mut tree, &mut cursor, "(x)");
        assert_eq!(tree.to_text(), "log(x,2)");
    }

    #[test]
    fn test_structural_equality_and_copies() {
        let (tree, _) = fraction_tree();
        let mut copy = tree.clone();
        assert_eq!(tree, copy);
        let mut cursor = LayoutCursor::right_of_root(&copy);
        type_chars(&mut copy, &mut cursor, "5");
        assert_ne!(tree, copy);
        assert_eq!(tree.to_text(), "((12)/(3))");

        let mut other = LayoutTree::new();
        let imported = other.import_subtree(&tree, fraction_of(&tree));
        assert!(other.subtree_eq(imported, &tree, fraction_of(&tree)));
        assert_eq!(other.number_of_descendants(imported, true), tree.number_of_descendants(fraction_of(&tree), true));
    }

    #[test]
    fn test_cursor_rect_and_baseline() {
        let (tree, cursor) = fraction_tree();
        let fraction = fraction_of(&tree);
        let three = tree.child(tree.child(fraction, 1), 0);
        let rect = cursor.cursor_rect(&tree);
        assert_eq!(rect.x, tree.rect(three).right());
        assert_eq!(rect.y, tree.rect(three).y);
        assert_eq!(rect.height, GLYPH_HEIGHT);
        assert_eq!(cursor.baseline(&tree), tree.baseline(three));
        assert_eq!(LayoutCursor::left_of_root(&tree).cursor_rect(&tree).x, 0);
    }

    #[test]
    fn test_dump_table_lists_every_node() {
        let (tree, _) = fraction_tree();
        let table = tree.dump_table();
        assert!(table.contains("Fraction"));
        assert!(table.contains("baseline"));
        assert!(table.starts_with('╭'));
        let rows = table.lines().filter(|l| l.contains("Horizontal")).count();
        assert_eq!(rows, 3);
        tree.log_dump();
    }

    #[test]
    fn test_write_text_in_buffer() {
        let (tree, _) = fraction_tree();
        let mut buffer = [0u8; 6];
        assert_eq!(tree.write_text_in_buffer(&mut buffer), 5);
        assert_eq!(&buffer, b"((12)\0");
        let mut large = [0u8; 32];
        assert_eq!(tree.write_text_in_buffer(&mut large), 10);
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut tree = LayoutTree::new();
        let mut cursor = LayoutCursor::left_of_root(&tree);
        type_chars(&mut tree, &mut cursor, "123");
        let allocated = tree.allocated();
        cursor.perform_backspace(&mut tree);
        assert_eq!(tree.allocated(), allocated - 1);
        type_chars(&mut tree, &mut cursor, "4");
        assert_eq!(tree.allocated(), allocated);
        assert!(tree.children(tree.root()).iter().all(|id| tree.contains(*id)));
    }

    #[test]
    fn test_right_of_leaf_and_left_of_next_share_a_slot() {
        let mut tree = LayoutTree::new();
        let mut cursor = LayoutCursor::left_of_root(&tree);
        type_chars(&mut tree, &mut cursor, "ab");
        let b = tree.child(tree.root(), 1);
        let left_of_b = LayoutCursor::new(b, CursorPosition::Left);
        assert_eq!(left_of_b.slot(&tree), (tree.root(), 1));
        assert_eq!(left_of_b.canonical(&tree), LayoutCursor::right_of(&tree, tree.child(tree.root(), 0)));
    }

    #[test]
    fn test_shape_names() {
        let (tree, _) = fraction_tree();
        let names: Vec<&str> = tree
            .descendants(tree.root())
            .into_iter()
            .map(|id| tree.kind(id).name())
            .collect();
        assert_eq!(names, ["Horizontal", "Fraction", "Horizontal", "Char", "Char", "Horizontal", "Char"]);
    }

    #[derive(Clone, Debug)]
    enum Edit {
        Type(char),
        Fraction,
        Power,
        SquareRoot,
        Move(Direction),
        Backspace,
    }

    fn edit() -> impl Strategy<Value = Edit> {
        prop_oneof![
            4 => prop::sample::select(vec!['1', '7', 'x', '+', '-', '(', ')']).prop_map(Edit::Type),
            1 => Just(Edit::Fraction),
            1 => Just(Edit::Power),
            1 => Just(Edit::SquareRoot),
            2 => prop::sample::select(vec![Direction::Left, Direction::Right]).prop_map(Edit::Move),
            2 => Just(Edit::Backspace),
        ]
    }

    proptest! {
        #[test]
        fn test_edits_keep_tree_and_geometry_valid(edits in prop::collection::vec(edit(), 1..40)) {
            let mut tree = LayoutTree::new();
            let mut cursor = LayoutCursor::left_of_root(&tree);
            for edit in edits {
                match edit {
                    Edit::Type(c) => type_chars(&mut tree, &mut cursor, &c.to_string()),
                    Edit::Fraction => cursor.add_fraction_layout_and_collapse_siblings(&mut tree),
                    Edit::Power => cursor.add_empty_power_layout(&mut tree),
                    Edit::SquareRoot => cursor.add_empty_square_root_layout(&mut tree),
                    Edit::Move(direction) => {
                        let moved = cursor.cursor_moved(&tree, direction);
                        if moved.is_defined() {
                            cursor = moved;
                        }
                    }
                    Edit::Backspace => {
                        cursor.perform_backspace(&mut tree);
                    }
                }
                assert_structure(&tree);
                let (run, index) = cursor.slot(&tree);
                prop_assert!(tree.is_ancestor_of(tree.root(), run));
                prop_assert!(index <= tree.number_of_children(run));
            }
            assert_geometry_consistent(&tree, tree.root());
        }
    }
}

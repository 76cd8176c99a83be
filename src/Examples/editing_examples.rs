#![allow(non_snake_case)]

use crate::Utils::preferences::Preferences;
use crate::editor::clipboard::SimpleClipboard;
use crate::editor::events::{Event, FieldResponse};
use crate::editor::expression_layout_field::ExpressionLayoutField;
use crate::layout::layout_geometry::KDSize;
use crate::symbolic::print_float::DisplayMode;
use crate::symbolic::symbolic_engine::Expr;
use log::info;

fn press(field: &mut ExpressionLayoutField, clipboard: &SimpleClipboard, event: Event) -> FieldResponse {
    let response = field.handle_event(&event, clipboard);
    println!(
        "{:<14} -> {:<24} text '{}', cursor at {:?}",
        format!("{:?}", event),
        format!("{:?}", response.outcome),
        field.text(),
        field.cursor().slot(field.tree())
    );
    response
}

#[allow(dead_code)]
pub fn editing_examples(example: usize) {
    match example {
        0 => {
            // LAYOUT OF AN EXPRESSION
            let expression = match Expr::parse_expression("1/(2+x)+√(3)^2") {
                Ok(expression) => expression,
                Err(err) => {
                    println!("{}", err);
                    return;
                }
            };
            let tree = expression.create_layout(DisplayMode::Decimal, 7);
            println!("size {:?}, baseline {}", tree.minimal_size(), tree.baseline(tree.root()));
            println!("{}", tree.dump_table());
            println!("serialized back: {}", tree.to_text());
        }
        1 => {
            // TYPING A FRACTION key by key
            let mut field = ExpressionLayoutField::new(KDSize::new(120, 60));
            let clipboard = SimpleClipboard::default();
            for key in ["1", "2", "/", "3", "Up", "Right", "+", "4"] {
                let event = match key {
                    "Up" => Event::Up,
                    "Right" => Event::Right,
                    text => Event::text(text),
                };
                press(&mut field, &clipboard, event);
            }
            press(&mut field, &clipboard, Event::Backspace);
            press(&mut field, &clipboard, Event::Exe);
        }
        2 => {
            // MATRIX WITH GREY SQUARES: typing in the grey column grows the matrix
            let mut field = ExpressionLayoutField::new(KDSize::new(120, 80));
            let clipboard = SimpleClipboard::default();
            for event in [
                Event::text("["),
                Event::text("1"),
                Event::Right,
                Event::text("2"),
                Event::Down,
                Event::text("4"),
                Event::Right,
                Event::Right,
            ] {
                press(&mut field, &clipboard, event);
            }
            field.tree().log_dump();
            println!("{}", field.tree().dump_table());
        }
        3 => {
            // PASTE AND THE LAYOUT CEILING
            let mut field = ExpressionLayoutField::new(KDSize::new(80, 40)).with_max_layouts(24);
            let clipboard = SimpleClipboard::new("cos(x)+2*sin(y)");
            let response = press(&mut field, &clipboard, Event::Paste);
            info!("size changed: {}", response.size_changed);
            let response = press(&mut field, &clipboard, Event::Paste);
            println!("second paste: {:?}", response.status());
            println!("scroll offset {:?}, visible {:?}", field.scroll_offset(), field.visible_rect());
        }
        4 => {
            // FIELD CONFIGURED FROM PREFERENCES
            let preferences = match Preferences::from_toml_str("[editor]\nmax_layouts = 40\n[triggers]\nmatrix = \"mat\"") {
                Ok(preferences) => preferences,
                Err(err) => {
                    println!("{}", err);
                    return;
                }
            };
            let mut field = ExpressionLayoutField::from_preferences(&preferences, KDSize::new(100, 40));
            let clipboard = SimpleClipboard::default();
            press(&mut field, &clipboard, Event::text("mat"));
            press(&mut field, &clipboard, Event::text("log(x,2)"));
            press(&mut field, &clipboard, Event::Toolbox);
            press(&mut field, &clipboard, Event::Back);
        }
        _ => {
            println!("no such example");
        }
    }
}

#![allow(non_snake_case)]
use RustedCalcLayout::Examples::editing_examples::editing_examples;
use RustedCalcLayout::Examples::symbolic_examples::sym_examples;
use RustedCalcLayout::Utils::logger::init_logger;
use RustedCalcLayout::Utils::preferences::Preferences;

fn main() {
    let preferences = match std::env::args().nth(1) {
        Some(path) => match Preferences::from_toml_file(&path) {
            Ok(preferences) => preferences,
            Err(err) => {
                eprintln!("{}", err);
                return;
            }
        },
        None => Preferences::default(),
    };
    if let Err(err) = init_logger(preferences.log_level, preferences.log_file.as_deref()) {
        eprintln!("{}", err);
    }

    let example = 1;
    match example {
        0 => {
            // parse, reduce, print
            sym_examples(0);
        }
        1 => {
            // symbols bound in a context
            sym_examples(1);
        }
        2 => {
            // matrices
            sym_examples(2);
        }
        3 => {
            // numeric evaluation
            sym_examples(3);
        }
        4 => {
            // forced signs
            sym_examples(4);
        }
        5 => {
            sym_examples(5);
        }
        6 => {
            // layout of an expression and its geometry table
            editing_examples(0);
        }
        7 => {
            // typing a fraction
            editing_examples(1);
        }
        8 => {
            // matrix with grey squares
            editing_examples(2);
        }
        9 => {
            // paste and the layout ceiling
            editing_examples(3);
        }
        10 => {
            editing_examples(4);
        }
        _ => {
            println!("example not found");
        }
    }
}

use RustedCalcLayout::editor::clipboard::SimpleClipboard;
use RustedCalcLayout::editor::events::Event;
use RustedCalcLayout::editor::expression_layout_field::ExpressionLayoutField;
use RustedCalcLayout::layout::layout_geometry::KDSize;
use RustedCalcLayout::symbolic::print_float::DisplayMode;
use RustedCalcLayout::symbolic::symbolic_engine::Expr;
use RustedCalcLayout::symbolic::symbolic_reduce::{EmptyContext, Reducer};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const INPUT: &str = "(1/2+1/3)*abs(-7)+2^10-√(9/4)+floor(π)*[[1,2][3,4]]";

fn bench_deep_reduce(c: &mut Criterion) {
    let expression = Expr::parse_expression(INPUT).unwrap();
    let context = EmptyContext;
    let reducer = Reducer::new(&context);
    c.bench_function("deep_reduce", |b| {
        b.iter(|| black_box(expression.clone()).deep_reduce(&reducer))
    });
}

fn bench_create_layout(c: &mut Criterion) {
    let expression = Expr::parse_expression(INPUT).unwrap();
    c.bench_function("create_layout and size", |b| {
        b.iter(|| {
            let tree = black_box(&expression).create_layout(DisplayMode::Decimal, 7);
            tree.minimal_size()
        })
    });
}

fn bench_typing(c: &mut Criterion) {
    let keys: Vec<Event> = "12/3+45/6*7-8"
        .chars()
        .map(|ch| Event::text(&ch.to_string()))
        .collect();
    let clipboard = SimpleClipboard::default();
    c.bench_function("typing events", |b| {
        b.iter(|| {
            let mut field = ExpressionLayoutField::new(KDSize::new(200, 60));
            for key in &keys {
                field.handle_event(black_box(key), &clipboard);
            }
            field.text()
        })
    });
}

criterion_group!(benches, bench_deep_reduce, bench_create_layout, bench_typing);
criterion_main!(benches);

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qbe::{ColumnEdit, QbeGrid, SortOrder, SqlCompiler};

/// Build a grid with `n` rows spread over a few tables, with a mix of
/// aliases, criteria and sorts.
fn build_grid(n: usize) -> QbeGrid {
    let mut grid = QbeGrid::new();
    for i in 0..n {
        let table = format!("db.table{}", i % 4);
        let id = grid.add_column(table, format!("col{i}"));
        if i % 3 == 0 {
            grid.edit(id, ColumnEdit::Alias(format!("alias{i}")));
        }
        if i % 2 == 0 {
            grid.edit(id, ColumnEdit::Criteria(format!("> {i}")));
        }
        if i % 5 == 0 {
            grid.edit(id, ColumnEdit::OrCriteria("IS NULL".to_string()));
        }
        if i % 7 == 0 {
            grid.edit(id, ColumnEdit::Sort(Some(SortOrder::Desc)));
        }
    }
    grid
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compiler/compile");
    let compiler = SqlCompiler::default();

    for n in [1, 5, 10, 50, 100] {
        let grid = build_grid(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &grid, |b, grid| {
            b.iter(|| black_box(compiler.compile(grid)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile);
criterion_main!(benches);

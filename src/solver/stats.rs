use prettytable::{Cell, Row, Table};

use crate::solver::engine::SearchStats;

pub fn render_stats_table(task_stats: &[SearchStats]) -> String {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Task"),
        Cell::new("Nodes Visited"),
        Cell::new("Backtracks"),
        Cell::new("Deepest Clause"),
    ]));

    let mut total = SearchStats::default();
    for (task, stats) in task_stats.iter().enumerate() {
        table.add_row(Row::new(vec![
            Cell::new(&task.to_string()),
            Cell::new(&stats.nodes_visited.to_string()),
            Cell::new(&stats.backtracks.to_string()),
            Cell::new(&stats.deepest_clause.to_string()),
        ]));
        total.nodes_visited += stats.nodes_visited;
        total.backtracks += stats.backtracks;
        total.deepest_clause = total.deepest_clause.max(stats.deepest_clause);
    }

    table.add_row(Row::new(vec![
        Cell::new("total"),
        Cell::new(&total.nodes_visited.to_string()),
        Cell::new(&total.backtracks.to_string()),
        Cell::new(&total.deepest_clause.to_string()),
    ]));

    table.to_string()
}

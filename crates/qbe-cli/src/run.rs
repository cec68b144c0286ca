use crate::cli::RunArgs;
use crate::config::ProjectConfig;
use crate::db::connect_db;
use crate::grid_file::GridFile;
use comfy_table::Table;
use qbe::{InstrumentedExecutor, PgExecutor, QueryOutput, QuoteStyle, SessionConfig};

pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let project = ProjectConfig::load_or_default(&args.config)?;
    crate::init_logging(&project);

    let database_url = project.database_url(args.database.as_deref())?;
    let grid = GridFile::load(&args.grid)?;

    let mut config = SessionConfig::new().quote_style(QuoteStyle::DoubleQuote);
    if let Some(schema) = args
        .schema
        .as_deref()
        .or(project.file.database.default_schema.as_deref())
    {
        config = config.default_database(schema);
    }
    let session = grid.build_session(config);

    let client = connect_db(&database_url).await?;
    let executor = InstrumentedExecutor::new(PgExecutor::new(&client));
    let output = session.run(&executor).await?;

    println!("{}", render_table(&output));
    println!(
        "({} row{})",
        output.row_count(),
        if output.row_count() == 1 { "" } else { "s" }
    );
    Ok(())
}

fn render_table(output: &QueryOutput) -> Table {
    let mut table = Table::new();
    table.set_header(output.columns.iter());
    for row in &output.rows {
        table.add_row(row.iter().map(|v| match v {
            serde_json::Value::Null => "NULL".to_string(),
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }));
    }
    table
}

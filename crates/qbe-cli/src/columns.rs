use crate::cli::ColumnsArgs;
use crate::config::ProjectConfig;
use crate::db::connect_db;
use comfy_table::Table;
use qbe::{ColumnMeta, ColumnState, InstrumentedSource, PgCatalog, QbeSession};

pub async fn run(args: ColumnsArgs) -> anyhow::Result<()> {
    let project = ProjectConfig::load_or_default(&args.config)?;
    crate::init_logging(&project);

    let database_url = project.database_url(args.database.as_deref())?;
    let schema = args
        .schema
        .clone()
        .or_else(|| project.file.database.default_schema.clone())
        .unwrap_or_else(|| "public".to_string());

    let client = connect_db(&database_url).await?;
    let catalog = InstrumentedSource::new(PgCatalog::new(&client).default_schema(&schema));

    let mut session = QbeSession::new();
    for table in &args.tables {
        if !session.selection().is_selected(&table.as_str().into()) {
            session.toggle_table(table.as_str());
        }
    }
    session.load_columns(&catalog).await;

    let mut failed = 0usize;
    for table in session.selection().tables() {
        println!("{table}");
        match session.selection().state(table) {
            Some(ColumnState::Loaded(columns)) => println!("{}", render_columns(columns)),
            Some(ColumnState::Failed(message)) => {
                failed += 1;
                println!("  error: {message}");
            }
            Some(ColumnState::Loading) | None => println!("  (no response)"),
        }
        println!();
    }

    if failed > 0 {
        anyhow::bail!("failed to load columns for {failed} table(s)");
    }
    Ok(())
}

fn render_columns(columns: &[ColumnMeta]) -> Table {
    let mut table = Table::new();
    table.set_header(["Field", "Type", "Null", "Key", "Default", "Extra"]);
    for col in columns {
        table.add_row([
            col.field.as_str(),
            col.data_type.as_str(),
            if col.nullable { "YES" } else { "NO" },
            col.key.as_str(),
            col.default.as_deref().unwrap_or("NULL"),
            col.extra.as_str(),
        ]);
    }
    table
}

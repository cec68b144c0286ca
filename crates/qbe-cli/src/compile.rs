use crate::cli::CompileArgs;
use crate::config::ProjectConfig;
use crate::grid_file::GridFile;
use qbe::SessionConfig;

pub fn run(args: CompileArgs) -> anyhow::Result<()> {
    let project = ProjectConfig::load_or_default(&args.config)?;
    crate::init_logging(&project);

    let quote_style = project.quote_style(args.quote.as_deref())?;
    let grid = GridFile::load(&args.grid)?;
    let session = grid.build_session(SessionConfig::new().quote_style(quote_style));

    if session.sql().is_empty() {
        eprintln!("grid is empty; nothing to compile");
        return Ok(());
    }
    println!("{}", session.sql());
    Ok(())
}

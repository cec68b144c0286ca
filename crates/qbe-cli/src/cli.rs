use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Compile,
    Run,
    Columns,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help(HelpTopic),
    Compile(CompileArgs),
    Run(RunArgs),
    Columns(ColumnsArgs),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileArgs {
    pub config: PathBuf,
    pub grid: PathBuf,
    pub quote: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    pub config: PathBuf,
    pub grid: PathBuf,
    pub database: Option<String>,
    pub schema: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnsArgs {
    pub config: PathBuf,
    pub database: Option<String>,
    pub schema: Option<String>,
    pub tables: Vec<String>,
}

const DEFAULT_CONFIG: &str = "qbe.toml";
const DEFAULT_GRID: &str = "grid.toml";

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "compile" => parse_compile(it.map(|s| s.as_str())),
        "run" => parse_run(it.map(|s| s.as_str())),
        "columns" => parse_columns(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

struct CommonFlags {
    config: PathBuf,
    grid: PathBuf,
    database: Option<String>,
    schema: Option<String>,
    quote: Option<String>,
}

impl Default for CommonFlags {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG),
            grid: PathBuf::from(DEFAULT_GRID),
            database: None,
            schema: None,
            quote: None,
        }
    }
}

impl CommonFlags {
    /// Consume a value flag listed in `allowed`. Returns `Ok(false)` if `token` is not one.
    fn accept<'a>(
        &mut self,
        token: &'a str,
        it: &mut impl Iterator<Item = &'a str>,
        allowed: &[&str],
    ) -> anyhow::Result<bool> {
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        if !allowed.iter().any(|a| *a == name) {
            return Ok(false);
        }

        let value = match inline {
            Some(v) => v.to_string(),
            None => {
                let Some(v) = it.next() else {
                    anyhow::bail!("{name} requires a value");
                };
                v.to_string()
            }
        };

        match name {
            "--config" => self.config = PathBuf::from(value),
            "--grid" => self.grid = PathBuf::from(value),
            "--database" => self.database = Some(value),
            "--schema" => self.schema = Some(value),
            "--quote" => self.quote = Some(value),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn parse_compile<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut flags = CommonFlags::default();
    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Compile)),
            _ if flags.accept(token, &mut it, &["--config", "--grid", "--quote"])? => {}
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Compile(CompileArgs {
        config: flags.config,
        grid: flags.grid,
        quote: flags.quote,
    }))
}

fn parse_run<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut flags = CommonFlags::default();
    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Run)),
            _ if flags.accept(
                token,
                &mut it,
                &["--config", "--grid", "--database", "--schema"],
            )? => {}
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Run(RunArgs {
        config: flags.config,
        grid: flags.grid,
        database: flags.database,
        schema: flags.schema,
    }))
}

fn parse_columns<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut flags = CommonFlags::default();
    let mut tables = Vec::new();
    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Columns)),
            _ if flags.accept(token, &mut it, &["--config", "--database", "--schema"])? => {}
            other if other.starts_with('-') => anyhow::bail!("unknown argument: {other}"),
            other => tables.push(other.to_string()),
        }
    }

    if tables.is_empty() {
        anyhow::bail!("missing table name: expected `qbe columns TABLE...`");
    }

    Ok(Command::Columns(ColumnsArgs {
        config: flags.config,
        database: flags.database,
        schema: flags.schema,
        tables,
    }))
}

pub fn print_help(topic: HelpTopic) {
    let text = match topic {
        HelpTopic::Root => {
            "qbe - build SQL from a Query-By-Example grid\n\
             \n\
             USAGE:\n\
             \x20 qbe compile [--grid FILE] [--config FILE] [--quote backtick|double]\n\
             \x20 qbe run     [--grid FILE] [--config FILE] [--database URL] [--schema NAME]\n\
             \x20 qbe columns TABLE... [--config FILE] [--database URL] [--schema NAME]\n\
             \n\
             Defaults: --config qbe.toml, --grid grid.toml\n"
        }
        HelpTopic::Compile => {
            "qbe compile - print the SQL generated from a grid file\n\
             \n\
             OPTIONS:\n\
             \x20 --grid FILE     grid file (default: grid.toml)\n\
             \x20 --config FILE   config file (default: qbe.toml, optional)\n\
             \x20 --quote STYLE   identifier quoting: backtick | double\n"
        }
        HelpTopic::Run => {
            "qbe run - compile a grid file and execute it against PostgreSQL\n\
             \n\
             OPTIONS:\n\
             \x20 --grid FILE      grid file (default: grid.toml)\n\
             \x20 --config FILE    config file (default: qbe.toml)\n\
             \x20 --database URL   connection string (overrides config / DATABASE_URL)\n\
             \x20 --schema NAME    search_path for the query\n"
        }
        HelpTopic::Columns => {
            "qbe columns - list the columns of one or more tables\n\
             \n\
             Tables may be qualified as schema.table; one metadata query is issued per table.\n\
             \n\
             OPTIONS:\n\
             \x20 --config FILE    config file (default: qbe.toml)\n\
             \x20 --database URL   connection string (overrides config / DATABASE_URL)\n\
             \x20 --schema NAME    schema for unqualified tables (default: public)\n"
        }
    };
    print!("{text}");
}

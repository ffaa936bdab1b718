// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod data;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use gridline_app::{FlatGrid, Grid, GridCommand, GridEvent, GridOptions, TreeFields, TreeGrid};
use gridline_catalog::{catalog_columns, catalog_rows, sample_catalog};
use log::info;
use runtime::FileRuntime;
use std::env;
use std::path::PathBuf;

const CATALOG_TITLE: &str = "API Endpoints";

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `gridline --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;
    logging::init(config.log_level()?, &config.log_file()?)?;

    let source = options.source.clone().ok_or_else(|| {
        anyhow!("nothing to show; pass --data <file>, --catalog <file> or --demo")
    })?;
    info!("starting with {source:?}");

    match source {
        Source::Rows { path, tree: false } => {
            let rows = data::load_rows(&path)?;
            let columns = config
                .columns()
                .unwrap_or_else(|| data::infer_columns(&rows, &[]));
            let grid = FlatGrid::new(rows, columns, config.grid_options(GridOptions::flat()))
                .with_context(|| format!("invalid columns for {}", path.display()))?;
            drive(grid, &options, &config)
        }
        Source::Rows { path, tree: true } => {
            let rows = data::load_rows(&path)?;
            let fields = config.tree_fields();
            let columns = config.columns().unwrap_or_else(|| {
                let mut columns = data::infer_columns(
                    &rows,
                    &[fields.id_field.as_str(), fields.parent_id_field.as_str()],
                );
                if let Some(first) = columns.first_mut() {
                    first.tree_column = true;
                }
                columns
            });
            let grid = TreeGrid::new(rows, columns, config.grid_options(GridOptions::tree()), fields)
                .with_context(|| format!("build tree from {}", path.display()))?;
            drive(grid, &options, &config)
        }
        Source::Catalog(path) => {
            let catalog = data::load_catalog(&path)?;
            drive(catalog_grid(&catalog, &config)?, &options, &config)
        }
        Source::Demo => drive(catalog_grid(&sample_catalog(), &config)?, &options, &config),
    }
}

fn catalog_grid(catalog: &gridline_catalog::Catalog, config: &Config) -> Result<TreeGrid> {
    let options = config.grid_options(GridOptions::tree().title(CATALOG_TITLE));
    TreeGrid::new(
        catalog_rows(catalog),
        catalog_columns(),
        options,
        TreeFields {
            default_expanded_levels: config.tree_fields().default_expanded_levels,
            ..TreeFields::default()
        },
    )
    .context("build catalog tree")
}

/// Applies startup commands, then either exports headlessly or opens the
/// terminal grid.
fn drive<G: Grid>(mut grid: G, options: &CliOptions, config: &Config) -> Result<()> {
    if let Some(term) = &options.search {
        expect_accepted(grid.dispatch(GridCommand::SetSearch(term.clone())))
            .context("apply --search")?;
    }
    if options.expand_all {
        expect_accepted(grid.dispatch(GridCommand::ExpandAll)).context("apply --expand-all")?;
    }
    if options.check_only {
        return Ok(());
    }

    if let Some(path) = &options.export {
        let export = grid
            .export()
            .ok_or_else(|| anyhow!("export is disabled; set [grid].exportable = true"))?;
        return runtime::write_export(path, &export);
    }

    let mut runtime = FileRuntime::new(config.export_dir()?);
    gridline_tui::run_app(&mut grid, &mut runtime)
}

fn expect_accepted<K>(events: Vec<GridEvent<K>>) -> Result<()> {
    match events.into_iter().find_map(|event| match event {
        GridEvent::Rejected(reason) => Some(reason),
        _ => None,
    }) {
        Some(reason) => Err(anyhow!(reason)),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Rows { path: PathBuf, tree: bool },
    Catalog(PathBuf),
    Demo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    source: Option<Source>,
    search: Option<String>,
    export: Option<PathBuf>,
    expand_all: bool,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        source: None,
        search: None,
        export: None,
        expand_all: false,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };
    let mut tree = false;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--data" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--data requires a JSON file path"))?;
                set_source(
                    &mut options,
                    Source::Rows {
                        path: PathBuf::from(value.as_ref()),
                        tree: false,
                    },
                )?;
            }
            "--catalog" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--catalog requires a file path"))?;
                set_source(&mut options, Source::Catalog(PathBuf::from(value.as_ref())))?;
            }
            "--demo" => {
                set_source(&mut options, Source::Demo)?;
            }
            "--tree" => {
                tree = true;
            }
            "--search" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--search requires a term"))?;
                options.search = Some(value.as_ref().to_owned());
            }
            "--export" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--export requires an output file path"))?;
                options.export = Some(PathBuf::from(value.as_ref()));
            }
            "--expand-all" => {
                options.expand_all = true;
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if tree {
        match &mut options.source {
            Some(Source::Rows { tree, .. }) => *tree = true,
            _ => return Err(anyhow!("--tree only applies to --data")),
        }
    }

    Ok(options)
}

fn set_source(options: &mut CliOptions, source: Source) -> Result<()> {
    if options.source.is_some() {
        return Err(anyhow!(
            "choose one of --data, --catalog or --demo"
        ));
    }
    options.source = Some(source);
    Ok(())
}

fn print_help() {
    println!("gridline");
    println!("  --data <file.json>       Show a JSON array of objects as a grid");
    println!("  --tree                   Treat --data rows as id/parent-id tree rows");
    println!("  --catalog <file>         Show an API catalog (.json or comma lines) as a tree");
    println!("  --demo                   Show the built-in sample API catalog");
    println!("  --search <term>          Start with a search applied");
    println!("  --expand-all             Start with every tree row expanded");
    println!("  --export <file.csv>      Write the CSV export and exit instead of opening the UI");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and data, then exit");
    println!("  --help                   Show this help");
}

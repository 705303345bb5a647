use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use wrapfold_config::LayoutConfig;
use wrapfold_core::history::{Point, Range};
use wrapfold_core::{Fold, LayoutSession};

/// Lays a text file out with word wrap and folds, then prints the screen rows.
#[derive(Parser, Debug)]
#[command(name = "wrapfold", version, about)]
struct Cli {
    /// File to lay out.
    file: PathBuf,

    /// Wrap lines at this many columns.
    #[arg(long)]
    wrap: Option<usize>,

    /// Columns per tab stop.
    #[arg(long = "tab-size")]
    tab_size: Option<usize>,

    /// Wrap as code: prefer breaks before punctuation.
    #[arg(long)]
    code: bool,

    /// Fold a region, written `row:col-row:col`. May be repeated.
    #[arg(long = "fold", value_parser = parse_range)]
    folds: Vec<Range>,

    /// Layout config file (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the screen position of a document position `row:col`.
    #[arg(long, value_parser = parse_point, conflicts_with = "screen")]
    locate: Option<Point>,

    /// Print the document position of a screen position `row:col`.
    #[arg(long, value_parser = parse_point)]
    screen: Option<Point>,
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (row, col) = s
        .split_once(':')
        .ok_or_else(|| format!("expected row:col, got '{s}'"))?;
    let row = row.trim().parse().map_err(|e| format!("bad row '{row}': {e}"))?;
    let col = col.trim().parse().map_err(|e| format!("bad column '{col}': {e}"))?;
    Ok(Point::new(row, col))
}

fn parse_range(s: &str) -> Result<Range, String> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| format!("expected row:col-row:col, got '{s}'"))?;
    Ok(Range::from_points(parse_point(start)?, parse_point(end)?))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => LayoutConfig::load_or_create(path),
        None => LayoutConfig::default(),
    };
    if let Some(limit) = cli.wrap {
        config.use_wrap_mode = true;
        config.wrap_limit = limit;
    }
    if let Some(tab_size) = cli.tab_size {
        config.tab_size = tab_size;
    }
    config.wrap_as_code |= cli.code;
    config.sanitize();

    let text = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let mut session = LayoutSession::with_config(&text, &config);
    tracing::debug!(
        "Loaded {} ({} rows, wrap {})",
        cli.file.display(),
        session.len_lines(),
        if session.use_wrap_mode() { session.wrap_limit() } else { 0 }
    );

    for range in cli.folds {
        session
            .add_fold(Fold::new(range, "..."))
            .with_context(|| format!("cannot fold {range:?}"))?;
    }

    if let Some(p) = cli.locate {
        let screen = session.document_to_screen_position(p.row, p.column);
        println!("{}:{} -> {}:{}", p.row, p.column, screen.row, screen.column);
        return Ok(());
    }
    if let Some(p) = cli.screen {
        let row = isize::try_from(p.row).context("screen row out of range")?;
        let doc = session.screen_to_document_position(row, p.column);
        println!("{}:{} -> {}:{}", p.row, p.column, doc.row, doc.column);
        return Ok(());
    }

    print_screen(&mut session);
    Ok(())
}

/// Prints every screen row prefixed with the document position it starts at.
fn print_screen(session: &mut LayoutSession) {
    let mut screen_row = 0usize;
    let mut row = 0;
    while row < session.len_lines() {
        let Some(line) = session.display_line(row) else {
            row += 1;
            continue;
        };
        let chars: Vec<char> = line.chars().collect();
        let splits = session.row_split_data(row).map(<[usize]>::to_vec).unwrap_or_default();
        let mut from = 0;
        for to in splits.into_iter().chain([chars.len()]) {
            let to = to.clamp(from, chars.len());
            let start = session.screen_to_document_position(screen_row as isize, 0);
            let text: String = chars[from..to].iter().collect();
            println!("{:>5}:{:<4}| {text}", start.row, start.column);
            from = to;
            screen_row += 1;
        }
        screen_row += session.line_widget(row).unwrap_or(0);
        row = session.row_fold_end(row) + 1;
    }
}

mod logging;

use std::io::Write as _;
use std::num::NonZero;

use anyhow::Context as _;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use luma_errors::Renderer;
use luma_ide::{FoldRegion, ReparseConfig, Server};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(version, about = "Function folding for Lua sources")]
struct Options {
    /// Log filter, e.g. `debug` or `luma_ide=trace`. Overrides `RUST_LOG`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Reports syntax errors in a file.
    Check { path: Utf8PathBuf },
    /// Prints the foldable function regions of a file.
    Fold {
        path: Utf8PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Runs the language server over stdio.
    Server {
        /// Worker threads, defaults to the available parallelism.
        #[arg(long)]
        threads: Option<NonZero<usize>>,
        /// Reparse every submitted text, even when a newer one is queued.
        #[arg(long)]
        no_coalesce: bool,
    },
}

#[derive(serde::Serialize)]
struct JsonRegion<'a> {
    name: &'a str,
    start: u32,
    end: u32,
}

fn main() -> anyhow::Result<()> {
    let options = Options::parse();
    logging::init(options.log_level.as_deref())?;

    match options.command {
        Command::Check { path } => check(&path),
        Command::Fold { path, json } => {
            let regions = luma_ide::fold_regions(&read(&path)?);
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(render_regions(&regions, json)?.as_bytes())?;
            Ok(())
        }
        Command::Server { threads, no_coalesce } => {
            let defaults = ReparseConfig::default();
            let config = ReparseConfig {
                threads: threads.map_or(defaults.threads, NonZero::get),
                coalesce: !no_coalesce,
            };
            tracing::info!(?config, "starting language server");
            Server::stdio(config)
        }
    }
}

fn read(path: &Utf8Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read `{path}`"))
}

fn check(path: &Utf8Path) -> anyhow::Result<()> {
    let text = read(path)?;
    let parse = luma_parse::parse(&text);

    let diagnostics = parse.diagnostics();
    if !diagnostics.is_empty() {
        let renderer = Renderer::styled();
        eprintln!("{}", luma_errors::render_all(diagnostics, &renderer, path.as_str(), &text));
    }

    match diagnostics.len() {
        0 => Ok(()),
        count => anyhow::bail!("`{path}` has {count} syntax error(s)"),
    }
}

/// One `name start..end` line per region, or a JSON array.
fn render_regions(regions: &[FoldRegion], json: bool) -> anyhow::Result<String> {
    if json {
        let regions: Vec<_> = regions
            .iter()
            .map(|region| JsonRegion {
                name: &region.name,
                start: region.start().into(),
                end: region.end().into(),
            })
            .collect();
        let mut out = serde_json::to_string_pretty(&regions)?;
        out.push('\n');
        return Ok(out);
    }

    Ok(regions
        .iter()
        .map(|region| {
            let name = if region.is_anonymous() { "<anonymous>" } else { &region.name };
            format!("{name} {:?}\n", region.range)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "local function f()\n  return function() end\nend\n";

    #[test]
    fn plain_regions() {
        let regions = luma_ide::fold_regions(TEXT);
        assert_eq!(render_regions(&regions, false).unwrap(), "f 0..46\n<anonymous> 28..42\n");
    }

    #[test]
    fn json_regions() {
        let regions = luma_ide::fold_regions(TEXT);
        let out = render_regions(&regions, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                { "name": "f", "start": 0, "end": 46 },
                { "name": "", "start": 28, "end": 42 },
            ])
        );
    }

    #[test]
    fn cli_parses() {
        use clap::CommandFactory as _;
        Options::command().debug_assert();

        let options =
            Options::try_parse_from(["luma", "server", "--threads", "2", "--no-coalesce"]).unwrap();
        assert!(matches!(
            options.command,
            Command::Server { threads: Some(threads), no_coalesce: true } if threads.get() == 2
        ));
    }
}

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use dom::{DispatchOutcome, Document, Page, node_label, outline, to_html};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};
use toggle::{ToggleConfig, install, state_of};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(
    name = "toggler",
    version,
    about = "Wire toggle behavior into an HTML document and replay clicks against it"
)]
struct Args {
    /// HTML document to load, `-` for stdin. No `<html>` or `<body>` is implied:
    /// in a fragment, top-level elements are children of the document node, so
    /// clicking a top-level toggle directly has no element to flip.
    file: PathBuf,
    /// Selector to click once the document is ready. Repeat to click several times.
    #[arg(long = "click", value_name = "SELECTOR")]
    clicks: Vec<String>,
    /// TOML file with `marker_class`, `open_class` and `closed_class`.
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,
    #[arg(long, value_name = "CLASS")]
    marker: Option<String>,
    #[arg(long, value_name = "CLASS")]
    open_class: Option<String>,
    #[arg(long, value_name = "CLASS")]
    closed_class: Option<String>,
    #[arg(long, value_enum, default_value_t = Format::Html)]
    format: Format,
    /// Maximum number of lines printed by `--format outline`.
    #[arg(long, default_value_t = 200)]
    outline_cap: usize,
    /// -v info, -vv debug, -vvv trace.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Write the log here instead of stderr.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Html,
    Outline,
    States,
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            WriteLogger::init(level, Config::default(), file)?;
        }
        None => TermLogger::init(
            level,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        )?,
    }
    Ok(())
}

fn read_document(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("failed to read document from stdin")?;
        return Ok(input);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Defaults, then the config file, then flags.
fn resolve_config(args: &Args) -> Result<ToggleConfig> {
    let mut config = match &args.config {
        Some(path) => ToggleConfig::load(path)?,
        None => ToggleConfig::default(),
    };
    if let Some(marker) = &args.marker {
        config.marker_class = marker.clone();
    }
    if let Some(open) = &args.open_class {
        config.open_class = open.clone();
    }
    if let Some(closed) = &args.closed_class {
        config.closed_class = closed.clone();
    }
    config.validate()?;
    Ok(config)
}

fn render(doc: &Document, config: &ToggleConfig, args: &Args) -> String {
    match args.format {
        Format::Html => {
            let mut out = to_html(doc);
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out
        }
        Format::Outline => outline(doc, args.outline_cap)
            .into_iter()
            .map(|line| line + "\n")
            .collect(),
        Format::States => doc
            .elements_by_class_name(&config.marker_class)
            .into_iter()
            .map(|node| {
                let state = state_of(doc, node, config).map_or("none", |s| s.as_str());
                format!("{} {state}\n", node_label(doc, node))
            })
            .collect(),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.log_file.as_deref())?;

    let config = resolve_config(&args)?;
    let input = read_document(&args.file)?;
    let mut page = Page::parse(&input);
    log::info!("loaded {} ({} nodes)", args.file.display(), page.document().len());

    install(&mut page, config.clone())?;
    let mut total = DispatchOutcome::default();
    if let Some(outcome) = page.fire_ready()? {
        total.merge(outcome);
    }
    for selector in &args.clicks {
        let outcome = page
            .click_selector(selector)
            .with_context(|| format!("failed to click {selector:?}"))?;
        log::info!("click {selector}: {} listeners ran", outcome.invoked);
        total.merge(outcome);
    }

    let doc = page.into_document();
    print!("{}", render(&doc, &config, &args));
    if !total.is_ok() {
        bail!(
            "{} of {} listener invocations failed",
            total.failures.len(),
            total.invoked
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        Args::try_parse_from(["toggler", "page.html"].iter().chain(extra)).unwrap()
    }

    #[test]
    fn flags_override_defaults() {
        let args = args(&["--marker", "faq", "--closed-class", "shut", "-vv"]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.marker_class, "faq");
        assert_eq!(config.open_class, "toggle-open");
        assert_eq!(config.closed_class, "shut");
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn conflicting_labels_are_rejected() {
        let args = args(&["--open-class", "x", "--closed-class", "x"]);
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    fn states_format_lists_every_toggle() {
        let args = args(&["--format", "states", "--click", "#s"]);
        let config = resolve_config(&args).unwrap();
        let mut page = Page::parse(
            r#"<div id="a" class="toggle"><span id="s"></span></div><div id="b" class="toggle"></div>"#,
        );
        install(&mut page, config.clone()).unwrap();
        page.fire_ready().unwrap();
        page.click_selector(&args.clicks[0]).unwrap();
        assert_eq!(
            render(&page.into_document(), &config, &args),
            "div#a.toggle.toggle-open open\ndiv#b.toggle.toggle-closed closed\n"
        );
    }

    #[test]
    fn help_warns_that_fragments_have_no_body() {
        use clap::CommandFactory;
        let help = Args::command().render_long_help().to_string();
        assert!(help.contains("No `<html>` or `<body>` is implied"), "{help}");
    }

    #[test]
    fn full_documents_flip_body_for_top_level_toggles() {
        let config = ToggleConfig::default();
        let mut page = Page::parse(
            r#"<html><body id="b"><div id="t" class="toggle"></div></body></html>"#,
        );
        install(&mut page, config.clone()).unwrap();
        page.fire_ready().unwrap();
        let outcome = page.click_selector("#t").unwrap();
        assert!(outcome.is_ok());
        let doc = page.into_document();
        let body = doc.find_by_id("b").unwrap();
        assert_eq!(doc.classes(body), vec!["toggle-closed"]);
    }
}

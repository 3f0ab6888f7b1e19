use crate::age::today;
use crate::config::{Config, load_config};
use crate::genogram::build_genogram;
use crate::grouping::{Family, family_of, group_families};
use crate::ir::{Member, load_documents, load_members};
use crate::layout::compute_family_overview;
use crate::layout_dump::write_genogram_dump;
use crate::linking::link_documents;
use crate::render::{render_overview_svg, render_svg, write_output_png, write_output_svg};
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "genogram", version, about = "Family grouping and genogram layout for member records")]
pub struct Args {
    /// Config JSON/JSON5 file (layout spacing, theme)
    #[arg(short = 'c', long = "configFile", global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Group members into families
    Families(InputArgs),
    /// Lay out the genogram of one family
    Layout(LayoutArgs),
    /// Place every family on an overview grid
    Overview(OverviewArgs),
    /// Record a relationship in both directions
    Link(LinkArgs),
}

#[derive(ClapArgs, Debug)]
pub struct InputArgs {
    /// Member documents (JSON array or collection export)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct LayoutArgs {
    #[command(flatten)]
    pub io: InputArgs,

    /// Family index as listed by `families`
    #[arg(short = 'f', long = "family", conflicts_with = "member")]
    pub family: Option<usize>,

    /// Lay out the family containing this member
    #[arg(short = 'm', long = "member")]
    pub member: Option<String>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "json")]
    pub output_format: OutputFormat,
}

#[derive(ClapArgs, Debug)]
pub struct OverviewArgs {
    #[command(flatten)]
    pub io: InputArgs,

    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "json")]
    pub output_format: OutputFormat,
}

#[derive(ClapArgs, Debug)]
pub struct LinkArgs {
    #[command(flatten)]
    pub io: InputArgs,

    #[arg(long)]
    pub from: String,

    #[arg(long)]
    pub to: String,

    /// Relationship label as seen from `--from` (e.g. Padre, Esposa)
    #[arg(long)]
    pub label: String,

    /// The two members live together
    #[arg(long)]
    pub cohabits: bool,

    /// Write the updated snapshot back over the input file
    #[arg(long = "in-place", conflicts_with = "output")]
    pub in_place: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;
    let config = load_config(args.config.as_deref())
        .with_context(|| format!("failed to load config {:?}", args.config))?;

    match args.command {
        Command::Families(io) => {
            let members = read_members(&io.input)?;
            let families = group_families(&members);
            write_json(io.output.as_deref(), &families)
        }
        Command::Layout(layout) => run_layout(layout, &config),
        Command::Overview(overview) => {
            let members = read_members(&overview.io.input)?;
            let cards = compute_family_overview(&group_families(&members), &config.layout);
            match overview.output_format {
                OutputFormat::Json => write_json(overview.io.output.as_deref(), &cards),
                OutputFormat::Svg => {
                    write_output_svg(&render_overview_svg(&cards, &config.theme), overview.io.output.as_deref())
                }
                OutputFormat::Png => {
                    let output = ensure_output(&overview.io.output, "png")?;
                    let svg = render_overview_svg(&cards, &config.theme);
                    write_output_png(&svg, &output, &config.render)
                }
            }
        }
        Command::Link(link) => {
            let input = &link.io.input;
            let mut documents = load_documents(input)
                .with_context(|| format!("failed to load members from {}", input.display()))?;
            link_documents(&mut documents, &link.from, &link.to, &link.label, link.cohabits, today())?;
            write_json(link_output(&link), &documents)
        }
    }
}

fn run_layout(args: LayoutArgs, config: &Config) -> Result<()> {
    let members = read_members(&args.io.input)?;
    let family = select_family(&members, args.family, args.member.as_deref())?;
    let genogram = build_genogram(&family.members, &members, &config.layout);

    match args.output_format {
        OutputFormat::Json => match args.io.output.as_deref() {
            Some(path) => {
                let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
                write_genogram_dump(BufWriter::new(file), &genogram)
            }
            None => {
                write_genogram_dump(io::stdout().lock(), &genogram)?;
                println!();
                Ok(())
            }
        },
        OutputFormat::Svg => write_output_svg(&render_svg(&genogram, &config.theme), args.io.output.as_deref()),
        OutputFormat::Png => {
            let output = ensure_output(&args.io.output, "png")?;
            write_output_png(&render_svg(&genogram, &config.theme), &output, &config.render)
        }
    }
}

fn select_family(members: &[Member], index: Option<usize>, member: Option<&str>) -> Result<Family> {
    if let Some(member) = member {
        return family_of(members, member)
            .ok_or_else(|| anyhow::anyhow!("no member with id `{member}`"));
    }
    let index = index.unwrap_or(0);
    let families = group_families(members);
    let count = families.len();
    families
        .into_iter()
        .nth(index)
        .ok_or_else(|| anyhow::anyhow!("family index {index} out of range ({count} families)"))
}

fn read_members(path: &Path) -> Result<Vec<Member>> {
    load_members(path).with_context(|| format!("failed to load members from {}", path.display()))
}

fn write_json<T: serde::Serialize>(output: Option<&Path>, value: &T) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, value)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

/// `-o`, else the input itself under `--in-place`, else stdout.
fn link_output(link: &LinkArgs) -> Option<&Path> {
    match link.io.output.as_deref() {
        Some(path) => Some(path),
        None if link.in_place => Some(link.io.input.as_path()),
        None => None,
    }
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("GENOGRAM_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Relationship;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_layout_flags() {
        let args = Args::try_parse_from([
            "genogram", "layout", "-i", "members.json", "--member", "abc", "-e", "svg", "-v",
        ])
        .unwrap();
        assert!(args.verbose);
        let Command::Layout(layout) = args.command else {
            panic!("expected layout command");
        };
        assert_eq!(layout.member.as_deref(), Some("abc"));
        assert_eq!(layout.output_format, OutputFormat::Svg);
        assert!(
            Args::try_parse_from(["genogram", "layout", "-i", "m.json", "-f", "1", "-m", "x"]).is_err()
        );
    }

    #[test]
    fn selects_family_by_index_or_member() {
        let members = vec![
            Member::new("a"),
            Member::new("b").with_relationship(Relationship::new("c", "Esposa")),
            Member::new("c"),
        ];
        assert_eq!(select_family(&members, None, None).unwrap().members, vec!["a"]);
        assert_eq!(select_family(&members, Some(1), None).unwrap().size, 2);
        assert_eq!(select_family(&members, None, Some("c")).unwrap().id, "family-1");
        assert!(select_family(&members, Some(5), None).is_err());
        assert!(select_family(&members, None, Some("zz")).is_err());
    }

    #[test]
    fn link_writes_to_stdout_unless_asked() {
        let parse = |extra: &[&str]| {
            let mut argv = vec!["genogram", "link", "-i", "m.json", "--from", "a", "--to", "b", "--label", "Padre"];
            argv.extend_from_slice(extra);
            match Args::try_parse_from(argv).map(|args| args.command) {
                Ok(Command::Link(link)) => Ok(link),
                Ok(other) => panic!("expected link command, got {other:?}"),
                Err(err) => Err(err),
            }
        };
        let plain = parse(&[]).unwrap();
        assert_eq!(link_output(&plain), None);
        let in_place = parse(&["--in-place"]).unwrap();
        assert_eq!(link_output(&in_place), Some(Path::new("m.json")));
        let copy = parse(&["-o", "out.json"]).unwrap();
        assert_eq!(link_output(&copy), Some(Path::new("out.json")));
        assert!(parse(&["-o", "out.json", "--in-place"]).is_err());
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use hue_atlas_core::{AtlasConfig, InputImage, ManualGroup, PackOutput, pack_images};
use image::{DynamicImage, ImageReader};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "hue-atlas",
    about = "Pack images into fixed-size atlas pages grouped by dominant color",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify, group and pack images into atlas pages
    Pack(PackArgs),
    /// Classify images only and dump their color profiles
    Classify(ClassifyArgs),
}

/// Input selection shared by every subcommand.
#[derive(Parser, Debug, Clone)]
struct InputArgs {
    /// Input file or directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    /// YAML config file path (values override the matching flags)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
}

/// Classifier flags shared by every subcommand.
#[derive(Parser, Debug, Clone)]
struct ClassifierArgs {
    /// Number of hue bins on the color circle
    #[arg(long, default_value_t = 36, help_heading = "Classification")]
    hue_bins: u32,
    /// Pixels with alpha <= this value are ignored (0..=255)
    #[arg(long, default_value_t = 0, help_heading = "Classification")]
    alpha_threshold: u8,
    /// Saturation at or below this counts as achromatic
    #[arg(long, default_value_t = 0.15, help_heading = "Classification")]
    low_saturation: f32,
    /// Achromatic value at or below this is black
    #[arg(long, default_value_t = 0.05, help_heading = "Classification")]
    dark_value: f32,
    /// Achromatic value at or above this is white
    #[arg(long, default_value_t = 0.95, help_heading = "Classification")]
    bright_value: f32,
    /// Share of pixels an achromatic class needs to win outright
    #[arg(long, default_value_t = 0.5, help_heading = "Classification")]
    achromatic_majority: f32,
    /// Classify in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Classification")]
    parallel: bool,
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    classifier: ClassifierArgs,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Atlas base name (files will be name.png/.json or name_<page>.png)
    #[arg(short, long, default_value = "atlas", help_heading = "Input/Output")]
    name: String,

    // Layout
    /// Page width
    #[arg(long, default_value_t = 2048, help_heading = "Layout")]
    page_width: u32,
    /// Page height
    #[arg(long, default_value_t = 2048, help_heading = "Layout")]
    page_height: u32,
    /// Rotation start as a fraction of hue bins when no hue bin is empty
    #[arg(long, default_value_t = 0.95, help_heading = "Layout")]
    fallback_rotation: f64,

    // Grouping
    /// YAML/JSON file with manual groups
    #[arg(long, help_heading = "Grouping")]
    groups: Option<PathBuf>,
    /// Manual group as a comma separated id list (repeatable)
    #[arg(long = "group", help_heading = "Grouping")]
    group: Vec<String>,

    // Export
    /// Metadata format: json-array | json (alias) | json-hash
    #[arg(long, default_value = "json-array", value_parser = ["json-array", "json", "json-hash"], help_heading = "Export")]
    metadata: String,
    /// Draw red outlines (debug)
    #[arg(long, default_value_t = false, help_heading = "Export")]
    outlines: bool,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Export the color quality report (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_report: Option<PathBuf>,
    /// Export per-asset color profiles (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_profiles: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct ClassifyArgs {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    classifier: ClassifierArgs,
    /// Write the profiles (JSON) to this file instead of stdout
    #[arg(short, long, help_heading = "Input/Output")]
    output: Option<PathBuf>,
    /// Include normalized histograms in the output
    #[arg(long, default_value_t = false, help_heading = "Input/Output")]
    histograms: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let progress = cli.progress && !cli.quiet;
    match &cli.command {
        Commands::Pack(args) => run_pack(args, progress),
        Commands::Classify(args) => run_classify(args, progress),
    }
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let base = AtlasConfig {
        page_width: cli.page_width,
        page_height: cli.page_height,
        fallback_rotation_fraction: cli.fallback_rotation,
        outlines: cli.outlines,
        keep_histograms: cli.export_profiles.is_some(),
        ..cli.classifier.apply(AtlasConfig::default())
    };
    let cfg = load_config(cli.input.config.as_deref(), base)?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }
    cfg.validate()?;

    let mut groups = match &cli.groups {
        Some(path) => load_groups(path)?,
        None => Vec::new(),
    };
    groups.extend(cli.group.iter().map(|s| ManualGroup::parse_list(s)));
    debug!(groups = groups.len(), "manual groups");

    let inputs = load_inputs(&cli.input, show_progress)?;
    info!(count = inputs.len(), "loaded input images");

    let started = Instant::now();
    let out = pack_images(inputs, &groups, cfg)?;
    info!(
        pages = out.pages.len(),
        warnings = out.diagnostics.warning_count(),
        elapsed = fmt_dur(started.elapsed()),
        "packed"
    );

    if !cli.dry_run {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
        write_pages(&out, &cli.out_dir, &cli.name)?;
        let json_value = match cli.metadata.as_str() {
            "json-hash" => hue_atlas_core::to_json_hash(&out.atlas),
            _ => hue_atlas_core::to_json_array(&out.atlas),
        };
        let json_path = cli.out_dir.join(format!("{}.json", cli.name));
        write_json(&json_path, &json_value)?;
        info!(?json_path, pages = out.pages.len(), "atlas written");
    }

    let stats = out.stats();
    info!("{}", stats.summary());
    for line in out.report.summary().lines() {
        info!("{line}");
    }

    if let Some(path) = &cli.export_stats {
        if cli.dry_run {
            println!("{}", stats.summary());
        } else {
            write_json(path, &stats)?;
            info!(?path, "stats exported");
        }
    }
    if let Some(path) = &cli.export_report {
        if cli.dry_run {
            print!("{}", out.report.summary());
        } else {
            write_json(path, &out.report)?;
            info!(?path, "report exported");
        }
    }
    if let Some(path) = &cli.export_profiles {
        if !cli.dry_run {
            let value = hue_atlas_core::profiles_to_json(
                out.profiles
                    .iter()
                    .map(|p| (p.key.as_str(), (p.width, p.height), &p.profile)),
            );
            write_json(path, &value)?;
            info!(?path, "profiles exported");
        }
    }
    Ok(())
}

fn run_classify(cli: &ClassifyArgs, show_progress: bool) -> anyhow::Result<()> {
    let base = cli.classifier.apply(AtlasConfig::default());
    let cfg = load_config(cli.input.config.as_deref(), base)?;
    cfg.validate()?;
    let params = cfg.classifier();

    let inputs = load_inputs(&cli.input, show_progress)?;
    let started = Instant::now();
    let mut rows = Vec::with_capacity(inputs.len());
    for inp in &inputs {
        let rgba = inp.image.to_rgba8();
        let mut prof = hue_atlas_core::profile(&rgba, &params);
        debug!(key = %inp.key, class = %prof.class, counted = prof.counted, "classified");
        if !cli.histograms {
            prof.histogram.clear();
        }
        rows.push((inp.key.as_str(), rgba.dimensions(), prof));
    }
    info!(
        count = rows.len(),
        elapsed = fmt_dur(started.elapsed()),
        "classified"
    );

    let value =
        hue_atlas_core::profiles_to_json(rows.iter().map(|(k, size, prof)| (*k, *size, prof)));
    match &cli.output {
        Some(path) => {
            write_json(path, &value)?;
            info!(?path, "profiles written");
        }
        None => println!("{}", serde_json::to_string_pretty(&value)?),
    }
    Ok(())
}

impl ClassifierArgs {
    fn apply(&self, cfg: AtlasConfig) -> AtlasConfig {
        AtlasConfig {
            hue_bins: self.hue_bins,
            alpha_threshold: self.alpha_threshold,
            low_saturation: self.low_saturation,
            dark_value: self.dark_value,
            bright_value: self.bright_value,
            achromatic_majority: self.achromatic_majority,
            parallel: self.parallel,
            ..cfg
        }
    }
}

fn write_pages(out: &PackOutput, dir: &Path, name: &str) -> anyhow::Result<()> {
    if let [only] = out.pages.as_slice() {
        let png_path = dir.join(format!("{name}.png"));
        only.rgba
            .save(&png_path)
            .with_context(|| format!("write {}", png_path.display()))?;
        info!(?png_path, "wrote page 0");
        return Ok(());
    }
    for p in &out.pages {
        let png_path = dir.join(format!("{name}_{}.png", p.page.id));
        p.rgba
            .save(&png_path)
            .with_context(|| format!("write {}", png_path.display()))?;
        info!(?png_path, id = p.page.id, "wrote page");
    }
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}µs", d.as_micros())
    }
}

fn load_inputs(args: &InputArgs, progress: bool) -> anyhow::Result<Vec<InputImage>> {
    let paths = gather_paths(&args.input, &args.include, &args.exclude)?;
    if paths.is_empty() {
        warn!(input = %args.input.display(), "no images found");
    }
    load_images_with_progress(&args.input, &paths, progress)
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<globset::GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("bad glob '{pat}'"))?);
    }
    Ok(Some(b.build()?))
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if exclude.is_some_and(|ex| ex.is_match(&s)) {
        return true;
    }
    include.is_some_and(|inc| !inc.is_match(&s))
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tga" | "gif")
    )
}

/// Asset id: path relative to the input root, `/`-separated, without extension.
fn asset_key(root: &Path, p: &Path) -> String {
    let rel = if root.is_file() {
        Path::new(p.file_name().unwrap_or(p.as_os_str()))
    } else {
        p.strip_prefix(root).unwrap_or(p)
    };
    rel.with_extension("").to_string_lossy().replace('\\', "/")
}

fn load_images_with_progress(
    root: &Path,
    paths: &[PathBuf],
    progress: bool,
) -> anyhow::Result<Vec<InputImage>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match load_image(p) {
            Ok(img) => list.push(InputImage {
                key: asset_key(root, p),
                image: img,
            }),
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

/// Optional YAML overrides; every present key replaces the flag value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct YamlConfig {
    page_width: Option<u32>,
    page_height: Option<u32>,
    hue_bins: Option<u32>,
    alpha_threshold: Option<u8>,
    low_saturation: Option<f32>,
    dark_value: Option<f32>,
    bright_value: Option<f32>,
    achromatic_majority: Option<f32>,
    fallback_rotation_fraction: Option<f64>,
    keep_histograms: Option<bool>,
    parallel: Option<bool>,
    outlines: Option<bool>,
}

impl YamlConfig {
    fn into_atlas_config(self, mut cfg: AtlasConfig) -> AtlasConfig {
        if let Some(v) = self.page_width {
            cfg.page_width = v;
        }
        if let Some(v) = self.page_height {
            cfg.page_height = v;
        }
        if let Some(v) = self.hue_bins {
            cfg.hue_bins = v;
        }
        if let Some(v) = self.alpha_threshold {
            cfg.alpha_threshold = v;
        }
        if let Some(v) = self.low_saturation {
            cfg.low_saturation = v;
        }
        if let Some(v) = self.dark_value {
            cfg.dark_value = v;
        }
        if let Some(v) = self.bright_value {
            cfg.bright_value = v;
        }
        if let Some(v) = self.achromatic_majority {
            cfg.achromatic_majority = v;
        }
        if let Some(v) = self.fallback_rotation_fraction {
            cfg.fallback_rotation_fraction = v;
        }
        if let Some(v) = self.keep_histograms {
            cfg.keep_histograms = v;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        if let Some(v) = self.outlines {
            cfg.outlines = v;
        }
        cfg
    }
}

fn load_config(path: Option<&Path>, base: AtlasConfig) -> anyhow::Result<AtlasConfig> {
    let Some(path) = path else {
        return Ok(base);
    };
    let file =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let y: YamlConfig =
        serde_yaml::from_str(&file).with_context(|| format!("parse config {}", path.display()))?;
    Ok(y.into_atlas_config(base))
}

/// Accepted shapes for `--groups`: a list, or `{ groups: [...] }`; each entry is
/// either a `{ name?, members }` map or a plain list of ids.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GroupsFile {
    Wrapped { groups: Vec<GroupEntry> },
    List(Vec<GroupEntry>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GroupEntry {
    Ids(Vec<String>),
    Group(ManualGroup),
}

impl From<GroupEntry> for ManualGroup {
    fn from(e: GroupEntry) -> Self {
        match e {
            GroupEntry::Ids(ids) => ManualGroup::new(ids),
            GroupEntry::Group(g) => g,
        }
    }
}

fn load_groups(path: &Path) -> anyhow::Result<Vec<ManualGroup>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read groups {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let parsed: GroupsFile = if is_json {
        serde_json::from_str(&text).with_context(|| format!("parse groups {}", path.display()))?
    } else {
        serde_yaml::from_str(&text).with_context(|| format!("parse groups {}", path.display()))?
    };
    let entries = match parsed {
        GroupsFile::Wrapped { groups } => groups,
        GroupsFile::List(groups) => groups,
    };
    Ok(entries.into_iter().map(ManualGroup::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_relative_without_extension() {
        let root = Path::new("assets");
        assert_eq!(asset_key(root, Path::new("assets/ui/button.png")), "ui/button");
        assert_eq!(asset_key(root, Path::new("assets/hero.v2.png")), "hero.v2");
    }

    #[test]
    fn groups_file_shapes() {
        let yaml = "groups:\n  - name: heroes\n    members: [a, b]\n  - [c, d, e]\n";
        let parsed: GroupsFile = serde_yaml::from_str(yaml).expect("yaml");
        let GroupsFile::Wrapped { groups } = parsed else {
            panic!("expected wrapped form");
        };
        let groups: Vec<ManualGroup> = groups.into_iter().map(ManualGroup::from).collect();
        assert_eq!(groups[0], ManualGroup::named("heroes", ["a", "b"]));
        assert_eq!(groups[1], ManualGroup::new(["c", "d", "e"]));

        let parsed: GroupsFile = serde_json::from_str(r#"[["x","y"]]"#).expect("json");
        assert!(matches!(parsed, GroupsFile::List(ref g) if g.len() == 1));
    }

    #[test]
    fn yaml_overrides_flags() {
        let y: YamlConfig = serde_yaml::from_str("hue_bins: 12\npage_width: 512\n").expect("yaml");
        let cfg = y.into_atlas_config(AtlasConfig::default());
        assert_eq!(cfg.hue_bins, 12);
        assert_eq!(cfg.page_width, 512);
        assert_eq!(cfg.page_height, 2048);
    }

    #[test]
    fn group_flag_keeps_spaced_ids() {
        let cli = Cli::try_parse_from([
            "hue-atlas",
            "pack",
            "assets",
            "--group",
            "hero idle, hero run",
            "--group",
            "sword,shield",
            "--fallback-rotation",
            "0.95",
        ])
        .expect("args");
        let Commands::Pack(args) = cli.command else {
            panic!("expected pack");
        };
        let groups: Vec<ManualGroup> = args.group.iter().map(|s| ManualGroup::parse_list(s)).collect();
        assert_eq!(groups[0].members, vec!["hero idle", "hero run"]);
        assert_eq!(groups[1].members, vec!["sword", "shield"]);
        assert_eq!(args.fallback_rotation, 0.95_f64);

        let y: YamlConfig = serde_yaml::from_str("fallback_rotation_fraction: 0.95\n").expect("yaml");
        let cfg = y.into_atlas_config(AtlasConfig::default());
        assert_eq!(cfg.fallback_rotation_fraction * 20.0, 19.0);
    }
}

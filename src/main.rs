//! cmkit CLI - Command-line tool for inspecting CM3D2 content containers.
//!
//! This is the main entry point for the cmkit command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use cmkit::menu::{MENU_EXTENSION, MOD_EXTENSION};
use cmkit::preset::{decode_preset, OpaquePropertyList};
use cmkit::prelude::*;
use cmkit::tex::decode_texture;

/// cmkit - CM3D2 menu, mod, texture and preset inspector
#[derive(Parser)]
#[command(name = "cmkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Game data directory searched for menus and textures
    #[arg(short, long, global = true, env = "CMKIT_GAME_DIR")]
    root: Option<PathBuf>,

    /// Log decode diagnostics down to debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a single menu or mod overlay
    MenuInfo {
        /// Menu name, with or without extension (mod_ names and .mod files are mods)
        name: String,

        /// On-disk path of a mod overlay
        #[arg(short, long, default_value = "")]
        path: String,

        /// Print the descriptor as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Decode every menu and mod overlay under the game directory
    MenuScan {
        /// Filter pattern for file names (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Descriptor cache file, loaded if present and saved afterwards
        #[arg(short, long, env = "CMKIT_CACHE_FILE")]
        cache: Option<PathBuf>,

        /// List each decoded menu
        #[arg(short, long)]
        detailed: bool,
    },

    /// Show a texture container's header
    TexInfo {
        /// Texture file name
        name: String,

        /// Print the descriptor as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show a preset container's header
    PresetInfo {
        /// Path to the preset file
        #[arg(short, long)]
        input: PathBuf,

        /// Print the descriptor as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .init()
        .context("Failed to initialize logging")?;

    match cli.command {
        Commands::MenuInfo { name, path, json } => {
            cmd_menu_info(&game_dir(cli.root.as_deref())?, &name, &path, json)?;
        }
        Commands::MenuScan {
            filter,
            cache,
            detailed,
        } => {
            let root = game_dir(cli.root.as_deref())?;
            cmd_menu_scan(&root, filter.as_deref(), cache.as_deref(), detailed)?;
        }
        Commands::TexInfo { name, json } => {
            cmd_tex_info(&game_dir(cli.root.as_deref())?, &name, json)?;
        }
        Commands::PresetInfo { input, json } => {
            cmd_preset_info(&input, json)?;
        }
    }

    Ok(())
}

fn game_dir(root: Option<&Path>) -> Result<DirectoryFileSystem> {
    let Some(root) = root else {
        bail!("No game directory given (use --root or CMKIT_GAME_DIR)");
    };

    let start = Instant::now();
    let fs = DirectoryFileSystem::open(root)
        .with_context(|| format!("Failed to index {}", root.display()))?;
    log::info!("Indexed {} files in {:?}", fs.len(), start.elapsed());
    Ok(fs)
}

fn cmd_menu_info(fs: &DirectoryFileSystem, name: &str, path: &str, json: bool) -> Result<()> {
    let decoder = MenuDecoder::new(fs);
    let menu = decoder
        .decode(name, path, &mut Vec::new())
        .with_context(|| format!("Failed to decode menu {name}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&menu)?);
        return Ok(());
    }

    println!("File:        {}", menu.file_name);
    println!("Path:        {}", menu.path);
    println!("Content ID:  {}", menu.content_id);
    println!("Name:        {}", menu.name);
    println!("Part type:   {}", menu.part_type);
    println!("Priority:    {}", menu.priority);
    if let Some(description) = &menu.description {
        println!("Description: {}", description.replace('\n', " / "));
    }
    if let Some(icon) = &menu.icon_name {
        println!("Icon:        {icon} ({} embedded bytes)", menu.icon_data.len());
    }
    if let Some(model) = &menu.model_file_name {
        println!("Model:       {model}");
    }
    if let Some(palette) = &menu.color_set_menu_name {
        println!("Color set:   {palette} ({})", menu.color_set_part_type);
    }
    if let Some(base) = &menu.variation_base_file_name {
        println!("Variation of {base}");
    }
    if let Some(base) = &menu.mod_base_file_name {
        println!("Mod of       {base}");
    }
    println!(
        "Flags:       hidden={} official={} man={}",
        menu.is_hidden, menu.is_official, menu.is_man
    );

    Ok(())
}

fn cmd_menu_scan(
    game: &DirectoryFileSystem,
    filter: Option<&str>,
    cache_path: Option<&Path>,
    detailed: bool,
) -> Result<()> {
    let pattern = filter
        .map(|f| glob::Pattern::new(&f.to_lowercase()))
        .transpose()
        .context("Invalid filter pattern")?;

    let names: Vec<&str> = game
        .iter()
        .map(|(name, _)| name)
        .filter(|name| name.ends_with(MENU_EXTENSION) || name.ends_with(MOD_EXTENSION))
        .filter(|name| pattern.as_ref().map_or(true, |p| p.matches(name)))
        .collect();
    println!("Found {} menu containers", names.len());

    let cache = match cache_path {
        Some(path) if path.exists() => {
            let data = fs::read(path)
                .with_context(|| format!("Failed to read cache {}", path.display()))?;
            let cache = DescriptorCache::read_from(&data).context("Failed to parse cache")?;
            println!("Loaded {} cached descriptors", cache.len());
            cache
        }
        _ => DescriptorCache::new(),
    };
    let cache = SharedDescriptorCache::from(cache);
    let decoder = MenuDecoder::new(game);

    let pb = ProgressBar::new(names.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let menus: Vec<_> = names
        .par_iter()
        .map(|name| {
            let menu = cache.get(name, &decoder);
            pb.inc(1);
            menu
        })
        .collect();
    pb.finish_with_message("Done");

    let decoded = menus.iter().flatten().count();
    let hidden = menus.iter().flatten().filter(|m| m.is_hidden).count();
    println!(
        "Decoded {} menus ({} hidden, {} failed) in {:?}",
        decoded,
        hidden,
        menus.len() - decoded,
        start.elapsed()
    );

    if detailed {
        let mut sorted: Vec<_> = menus.iter().flatten().collect();
        sorted.sort_by(|a, b| {
            a.part_type
                .to_i32()
                .cmp(&b.part_type.to_i32())
                .then(a.priority.total_cmp(&b.priority))
        });
        for menu in sorted {
            println!(
                "{:<16} {:>8} {:<40} {}",
                menu.part_type.name(),
                menu.priority,
                menu.file_name,
                menu.name
            );
        }
    }

    if let Some(path) = cache_path {
        let mut data = Vec::new();
        cache.snapshot().write_to(&mut data)?;
        fs::write(path, data).with_context(|| format!("Failed to write cache {}", path.display()))?;
        println!("Saved cache to {}", path.display());
    }

    Ok(())
}

fn cmd_tex_info(fs: &DirectoryFileSystem, name: &str, json: bool) -> Result<()> {
    let texture = decode_texture(fs, name, &mut Vec::new())
        .with_context(|| format!("Failed to decode texture {name}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&texture)?);
        return Ok(());
    }

    println!("Version:  {}", texture.version);
    println!("Size:     {}x{}", texture.width, texture.height);
    println!("Format:   {:?}", texture.format);
    println!("Payload:  {} bytes", texture.data.len());
    if texture.is_atlas() {
        println!("Atlas:    {} rects", texture.atlas_rects.len());
    }

    Ok(())
}

fn cmd_preset_info(input: &Path, json: bool) -> Result<()> {
    let preset = decode_preset(input, &mut Vec::new(), &OpaquePropertyList)
        .with_context(|| format!("Failed to decode preset {}", input.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&preset)?);
        return Ok(());
    }

    println!("File:       {}", preset.file_name);
    println!("Version:    {}", preset.version);
    println!("Kind:       {:?}", preset.kind);
    println!(
        "Thumbnail:  {}",
        preset
            .thumbnail
            .as_ref()
            .map_or_else(|| "none".to_string(), |t| format!("{} bytes", t.len()))
    );
    println!("Properties: {} bytes", preset.properties.len());

    Ok(())
}

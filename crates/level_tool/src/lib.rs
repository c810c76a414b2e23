use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use ninja_engine::{TileKind, Tilemap};

const PLAYER_SPAWN_VARIANT: u32 = 0;
const ENEMY_SPAWN_VARIANT: u32 = 1;
const LEAF_SPAWNER_VARIANT: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Info { path: PathBuf },
    Check { path: PathBuf },
    Autotile { path: PathBuf, out: Option<PathBuf> },
}

/// Per-level tallies shared by `info` and `check`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct LevelSummary {
    grid_tiles: usize,
    offgrid_tiles: usize,
    kinds: BTreeMap<String, usize>,
    unknown_kinds: BTreeMap<String, usize>,
    player_spawns: usize,
    enemy_spawns: usize,
    leaf_spawners: usize,
}

impl LevelSummary {
    fn of(tilemap: &Tilemap) -> Self {
        let mut summary = Self {
            grid_tiles: tilemap.grid_len(),
            offgrid_tiles: tilemap.offgrid_tiles().len(),
            ..Self::default()
        };
        let grid = tilemap.tiles().map(|tile| (&tile.kind, tile.variant));
        let offgrid = tilemap
            .offgrid_tiles()
            .iter()
            .map(|tile| (&tile.kind, tile.variant));
        for (kind, variant) in grid.chain(offgrid) {
            *summary.kinds.entry(kind.to_string()).or_default() += 1;
            match (kind, variant) {
                (TileKind::Spawners, PLAYER_SPAWN_VARIANT) => summary.player_spawns += 1,
                (TileKind::Spawners, ENEMY_SPAWN_VARIANT) => summary.enemy_spawns += 1,
                (TileKind::LargeDecor, LEAF_SPAWNER_VARIANT) => summary.leaf_spawners += 1,
                (TileKind::Other(name), _) => {
                    *summary.unknown_kinds.entry(name.clone()).or_default() += 1;
                }
                _ => {}
            }
        }
        summary
    }
}

/// `Ok(None)` means help was requested.
pub fn parse_args(args: &[String]) -> Result<Option<CommandKind>, String> {
    let Some(command) = args.first() else {
        return Err(usage_text());
    };
    let command_args = &args[1..];

    match command.as_str() {
        "-h" | "--help" => Ok(None),
        "info" => Ok(Some(CommandKind::Info {
            path: single_path("info", command_args)?,
        })),
        "check" => Ok(Some(CommandKind::Check {
            path: single_path("check", command_args)?,
        })),
        "autotile" => {
            let path = command_args
                .first()
                .ok_or_else(|| "autotile requires a level file".to_string())?;
            let mut out = None;
            let mut index = 1usize;
            while index < command_args.len() {
                match command_args[index].as_str() {
                    "--out" => {
                        let value = command_args
                            .get(index + 1)
                            .ok_or_else(|| "missing value for --out".to_string())?;
                        out = Some(PathBuf::from(value));
                        index += 2;
                    }
                    other => {
                        return Err(format!(
                            "unknown autotile argument '{other}' (expected --out <file>)"
                        ))
                    }
                }
            }
            Ok(Some(CommandKind::Autotile {
                path: PathBuf::from(path),
                out,
            }))
        }
        other => Err(format!("unknown subcommand '{other}'")),
    }
}

fn single_path(command: &str, args: &[String]) -> Result<PathBuf, String> {
    match args {
        [path] => Ok(PathBuf::from(path)),
        [] => Err(format!("{command} requires a level file")),
        _ => Err(format!("{command} takes exactly one level file")),
    }
}

pub fn run<W: Write>(kind: CommandKind, stdout: &mut W) -> Result<(), String> {
    match kind {
        CommandKind::Info { path } => info(&path, stdout),
        CommandKind::Check { path } => check(&path, stdout),
        CommandKind::Autotile { path, out } => {
            autotile(&path, out.as_deref().unwrap_or(&path), stdout)
        }
    }
}

fn load(path: &Path) -> Result<Tilemap, String> {
    Tilemap::load(path).map_err(|error| error.to_string())
}

fn info<W: Write>(path: &Path, stdout: &mut W) -> Result<(), String> {
    let tilemap = load(path)?;
    let summary = LevelSummary::of(&tilemap);

    let mut lines = vec![
        format!("file: {}", path.display()),
        format!("tile_size: {}", tilemap.tile_size()),
        format!("grid_tiles: {}", summary.grid_tiles),
        format!("offgrid_tiles: {}", summary.offgrid_tiles),
    ];
    lines.extend(
        summary
            .kinds
            .iter()
            .map(|(kind, count)| format!("kind {kind}: {count}")),
    );
    lines.push(format!("player_spawns: {}", summary.player_spawns));
    lines.push(format!("enemy_spawns: {}", summary.enemy_spawns));
    lines.push(format!("leaf_spawners: {}", summary.leaf_spawners));

    emit_lines(stdout, &lines)
}

fn check<W: Write>(path: &Path, stdout: &mut W) -> Result<(), String> {
    let tilemap = load(path)?;
    let summary = LevelSummary::of(&tilemap);

    let mut problems = Vec::new();
    match summary.player_spawns {
        1 => {}
        0 => problems.push("no player spawn marker (spawners variant 0)".to_string()),
        count => problems.push(format!(
            "{count} player spawn markers; the last one loaded wins"
        )),
    }
    for (name, count) in &summary.unknown_kinds {
        problems.push(format!("unknown tile kind '{name}' ({count} tiles)"));
    }

    let mut autotiled = tilemap.clone();
    let stale = autotiled.autotile();
    if stale > 0 {
        emit_lines(
            stdout,
            &[format!("note: {stale} tiles would change variant under autotile")],
        )?;
    }

    if problems.is_empty() {
        return emit_lines(stdout, &[format!("ok: {}", path.display())]);
    }
    let lines = problems
        .iter()
        .map(|problem| format!("problem: {problem}"))
        .collect::<Vec<_>>();
    emit_lines(stdout, &lines)?;
    Err(format!(
        "{} problem(s) found in {}",
        problems.len(),
        path.display()
    ))
}

fn autotile<W: Write>(path: &Path, out: &Path, stdout: &mut W) -> Result<(), String> {
    let mut tilemap = load(path)?;
    let changed = tilemap.autotile();
    tilemap.save(out).map_err(|error| error.to_string())?;
    emit_lines(
        stdout,
        &[format!("autotiled {changed} tiles -> {}", out.display())],
    )
}

fn emit_lines<W: Write>(stdout: &mut W, lines: &[String]) -> Result<(), String> {
    for line in lines {
        writeln!(stdout, "{line}").map_err(|error| format!("failed to write output: {error}"))?;
    }
    stdout
        .flush()
        .map_err(|error| format!("failed to flush output: {error}"))
}

pub fn usage_text() -> String {
    [
        "level_tool - inspect and fix level files",
        "",
        "Usage:",
        "  level_tool info <file>",
        "  level_tool check <file>",
        "  level_tool autotile <file> [--out <file>]",
        "",
        "autotile rewrites <file> in place unless --out is given.",
    ]
    .join("\n")
}

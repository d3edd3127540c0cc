use std::fs;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::Shell;

// cli.rs only depends on clap + clap_complete (both build-dependencies).
#[path = "src/cli.rs"]
mod cli;

/// Shells whose completion scripts ship alongside the man pages.
const PACKAGED_SHELLS: [Shell; 3] = [Shell::Bash, Shell::Zsh, Shell::Fish];

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");
    println!("cargo::rerun-if-env-changed=FHSYNC_ASSETS_DIR");

    // Packagers can collect the generated assets from a fixed location.
    let assets: PathBuf = match std::env::var_os("FHSYNC_ASSETS_DIR") {
        Some(dir) => dir.into(),
        None => std::env::var_os("OUT_DIR")
            .expect("OUT_DIR not set by Cargo")
            .into(),
    };

    let mut cmd = cli::Cli::command();
    let bin = cmd.get_name().to_owned();

    let man_dir = assets.join("man");
    fs::create_dir_all(&man_dir).expect("failed to create man output directory");
    write_man_pages(&cmd, &bin, &man_dir);

    let completions_dir = assets.join("completions");
    fs::create_dir_all(&completions_dir).expect("failed to create completions directory");
    for shell in PACKAGED_SHELLS {
        clap_complete::generate_to(shell, &mut cmd, &bin, &completions_dir)
            .unwrap_or_else(|e| panic!("failed to write {shell} completions: {e}"));
    }
}

/// One page per visible command: `fhsync.1`, `fhsync-auth.1`,
/// `fhsync-config-show.1`, ...
fn write_man_pages(cmd: &clap::Command, page: &str, dir: &Path) {
    let mut buf = Vec::new();
    clap_mangen::Man::new(cmd.clone().name(page.to_owned()))
        .render(&mut buf)
        .unwrap_or_else(|e| panic!("failed to render man page `{page}`: {e}"));

    let path = dir.join(format!("{page}.1"));
    fs::write(&path, buf).unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));

    cmd.get_subcommands()
        .filter(|sub| !sub.is_hide_set())
        .for_each(|sub| write_man_pages(sub, &format!("{page}-{}", sub.get_name()), dir));
}

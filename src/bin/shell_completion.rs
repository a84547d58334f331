mod opt;

use crate::opt::Opt;

use std::{
    env::var_os,
    ffi::OsStr,
    fs::{create_dir_all, File},
    io::{stdout, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{generate, shells};
use dirs::home_dir;
use strum::{Display, EnumString};

const BIN_NAME: &str = "corrjet";

#[derive(Copy, Clone, Debug, Display, Eq, PartialEq, EnumString, ValueEnum)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
enum Shell {
    Bash,
    Elvish,
    Fish,
    #[allow(clippy::enum_variant_names)]
    PowerShell,
    Zsh,
}

impl Shell {
    /// Completion file picked up automatically by the shell
    ///
    /// Shells without a per-user completion directory get `None`.
    fn user_file(self) -> Result<Option<PathBuf>> {
        let parts = match self {
            Shell::Bash => {
                if let Some(dir) = var_os("BASH_COMPLETION_USER_DIR") {
                    let mut path = PathBuf::from(dir);
                    path.extend(["completions", BIN_NAME]);
                    return Ok(Some(path));
                }
                ["bash-completion", "completions", BIN_NAME]
            }
            Shell::Fish => ["fish", "vendor_completions.d", "corrjet.fish"],
            Shell::Elvish | Shell::PowerShell | Shell::Zsh => return Ok(None),
        };
        let mut path = data_dir()?;
        path.extend(parts);
        Ok(Some(path))
    }

    fn write_completions(self, out: &mut dyn Write) {
        let mut cmd = Opt::command();
        match self {
            Shell::Bash => generate(shells::Bash, &mut cmd, BIN_NAME, out),
            Shell::Elvish => generate(shells::Elvish, &mut cmd, BIN_NAME, out),
            Shell::Fish => generate(shells::Fish, &mut cmd, BIN_NAME, out),
            Shell::PowerShell => {
                generate(shells::PowerShell, &mut cmd, BIN_NAME, out)
            }
            Shell::Zsh => generate(shells::Zsh, &mut cmd, BIN_NAME, out),
        }
    }
}

/// Generate command-line completions for corrjet
#[derive(Debug, Parser)]
struct CompletionOpt {
    /// Shell for which to generate completions
    ///
    /// If omitted, use the shell given by the `SHELL` environment variable
    #[clap(value_enum)]
    shell: Option<Shell>,

    /// Output file
    ///
    /// Defaults to the user completion directory for bash and fish
    /// and to standard output for all other shells.
    #[clap(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let opt = CompletionOpt::parse();
    let shell = opt
        .shell
        .map_or_else(login_shell, Ok)
        .context("Failed to determine shell")?;
    let target = match opt.output {
        Some(path) => Some(path),
        None => shell.user_file()?,
    };
    match target {
        Some(path) => {
            let mut file = create_file(&path)?;
            shell.write_completions(&mut file);
            eprintln!("Wrote {shell} completions to {path:?}");
        }
        None => shell.write_completions(&mut stdout()),
    }
    Ok(())
}

fn login_shell() -> Result<Shell> {
    let path = var_os("SHELL")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("SHELL environment variable not set"))?;
    let name = path
        .file_name()
        .and_then(OsStr::to_str)
        .ok_or_else(|| anyhow!("Cannot extract shell name from {path:?}"))?;
    name.parse()
        .with_context(|| format!("{name} is not a supported shell"))
}

fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = var_os("XDG_DATA_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let mut dir = home_dir().ok_or_else(|| anyhow!("No home directory found"))?;
    dir.extend([".local", "share"]);
    Ok(dir)
}

fn create_file(name: &Path) -> Result<File> {
    if let Some(dir) = name.parent() {
        create_dir_all(dir).with_context(|| format!("Failed to create {dir:?}"))?;
    }
    File::create(name).with_context(|| format!("Failed to create {name:?}"))
}

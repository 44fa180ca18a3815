//! Shell completions generation.
//!
//! Generates shell completion scripts for bash, zsh, fish, PowerShell, and elvish.

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::args::Cli;
use crate::error::LabelerError;

const BIN_NAME: &str = "ocr-labeler";

/// Execute completions command
///
/// # Errors
///
/// Returns an error if the script is not valid UTF-8.
pub fn completions(shell: Shell, install: bool) -> Result<String, LabelerError> {
    if install {
        Ok(completion_install_instructions(shell))
    } else {
        generate_completions(shell)
    }
}

/// Generate the completion script for `shell`.
///
/// # Errors
///
/// Returns an error if the script is not valid UTF-8.
pub fn generate_completions(shell: Shell) -> Result<String, LabelerError> {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, BIN_NAME, &mut buf);
    String::from_utf8(buf).map_err(|e| LabelerError::Config(format!("UTF-8 error: {e}")))
}

/// Get installation instructions for shell completions.
#[must_use]
pub fn completion_install_instructions(shell: Shell) -> String {
    match shell {
        Shell::Bash => r"# Add to ~/.bashrc or ~/.bash_profile:
source <(ocr-labeler completions bash)
"
        .to_string(),

        Shell::Zsh => r"# Save to your fpath:
ocr-labeler completions zsh > ~/.zsh/completions/_ocr-labeler
# Then add to ~/.zshrc:
fpath=(~/.zsh/completions $fpath)
autoload -Uz compinit && compinit
"
        .to_string(),

        Shell::Fish => r"# Save to fish completions directory:
ocr-labeler completions fish > ~/.config/fish/completions/ocr-labeler.fish
"
        .to_string(),

        Shell::PowerShell => r"# Add to your PowerShell profile ($PROFILE):
ocr-labeler completions powershell | Out-String | Invoke-Expression
"
        .to_string(),

        Shell::Elvish => r"# Save to elvish completions directory:
ocr-labeler completions elvish > ~/.elvish/lib/ocr-labeler.elv
"
        .to_string(),

        _ => "Unknown shell".to_string(),
    }
}

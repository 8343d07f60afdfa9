//! System clipboard access for the JSON previews

use crate::error::ClipboardError;

/// What was copied, for the status line
pub fn copied_message(label: &str, entries: usize, text: &str) -> String {
    format!("Copied {} to clipboard ({} entries, {} bytes)", label, entries, text.len())
}

/// Copy text to the system clipboard using the platform-appropriate method
pub fn copy_to_system_clipboard(text: &str) -> Result<(), ClipboardError> {
    // Command-line tools first on Linux (more reliable from a terminal app)
    #[cfg(target_os = "linux")]
    {
        if copy_with_command(text) {
            return Ok(());
        }
    }

    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text.to_string())?;
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_with_command(text: &str) -> bool {
    use std::io::Write;
    use std::process::{Command, Stdio};

    // wl-copy (Wayland) first, then xclip / xsel (X11)
    let commands: [(&str, &[&str]); 3] = [
        ("wl-copy", &[]),
        ("xclip", &["-selection", "clipboard"]),
        ("xsel", &["--clipboard", "--input"]),
    ];

    for (cmd, args) in commands {
        let Ok(mut child) = Command::new(cmd)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        else {
            continue;
        };

        if let Some(mut stdin) = child.stdin.take() {
            if stdin.write_all(text.as_bytes()).is_ok() {
                drop(stdin);
                if child.wait().map(|s| s.success()).unwrap_or(false) {
                    return true;
                }
            }
        }
    }
    false
}

//! Interactive collection of hosts and credentials.
//!
//! Host addresses are read one per line until the `done` token; each entry
//! is validated on the spot and the loop aborts after too many consecutive
//! invalid entries rather than prompting forever.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};

use ranktab_types::config::{AuthMethod, Credentials};
use ranktab_types::host::HostAddress;

/// Token that ends host collection.
const DONE_TOKEN: &str = "done";

/// Consecutive invalid entries tolerated before giving up.
const MAX_INVALID_ATTEMPTS: u32 = 5;

#[derive(Debug)]
pub struct PromptedSetup {
    pub hosts: Vec<HostAddress>,
    pub credentials: Credentials,
}

/// Run the interactive session against stdin/stdout.
pub fn collect_setup() -> Result<PromptedSetup> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    collect_setup_from(&mut stdin.lock(), &mut stdout.lock())
}

/// The prompt loop itself, decoupled from the real terminal for tests.
pub fn collect_setup_from<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<PromptedSetup> {
    writeln!(output, "Enter host addresses in rank order, one per line ('{DONE_TOKEN}' to finish):")?;

    let mut hosts = Vec::new();
    let mut invalid_attempts = 0;
    loop {
        write!(output, "host ({DONE_TOKEN} to finish): ")?;
        output.flush()?;
        let line = read_line(input)?;
        let entry = line.trim();

        if entry.eq_ignore_ascii_case(DONE_TOKEN) {
            break;
        }
        match entry.parse::<HostAddress>() {
            Ok(host) => {
                invalid_attempts = 0;
                hosts.push(host);
            }
            Err(e) => {
                invalid_attempts += 1;
                if invalid_attempts >= MAX_INVALID_ATTEMPTS {
                    bail!("aborting after {MAX_INVALID_ATTEMPTS} invalid host entries");
                }
                writeln!(output, "{e} — try again")?;
            }
        }
    }

    write!(output, "SSH username [{}]: ", default_username())?;
    output.flush()?;
    let entered = read_line(input)?;
    let username = match entered.trim() {
        "" => default_username(),
        name => name.to_string(),
    };

    write!(output, "Use key-based authentication? [y/N]: ")?;
    output.flush()?;
    let use_key = read_line(input)?.trim().eq_ignore_ascii_case("y");

    let auth = if use_key {
        AuthMethod::Key { path: None }
    } else {
        write!(output, "SSH password: ")?;
        output.flush()?;
        AuthMethod::Password { password: read_line(input)?.trim().to_string() }
    };

    Ok(PromptedSetup {
        hosts,
        credentials: Credentials { username, auth },
    })
}

fn read_line<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    let n = input.read_line(&mut line).context("failed to read input")?;
    if n == 0 {
        bail!("input ended before '{DONE_TOKEN}'");
    }
    Ok(line)
}

fn default_username() -> String {
    std::env::var("USER").unwrap_or_else(|_| "root".to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(input: &str) -> Result<PromptedSetup> {
        let mut output = Vec::new();
        collect_setup_from(&mut Cursor::new(input), &mut output)
    }

    #[test]
    fn collects_hosts_until_done() {
        let setup = run("10.0.0.1\n10.0.0.2\ndone\nadmin\nn\nsecret\n").unwrap();
        assert_eq!(setup.hosts.len(), 2);
        assert_eq!(setup.hosts[0].as_str(), "10.0.0.1");
        assert_eq!(setup.credentials.username, "admin");
        assert_eq!(
            setup.credentials.auth,
            AuthMethod::Password { password: "secret".into() }
        );
    }

    #[test]
    fn invalid_entries_are_retried() {
        let setup = run("not-an-ip\n10.0.0.1\ndone\nadmin\ny\n").unwrap();
        assert_eq!(setup.hosts.len(), 1);
        assert_eq!(setup.credentials.auth, AuthMethod::Key { path: None });
    }

    #[test]
    fn too_many_invalid_entries_abort() {
        let err = run("a\nb\nc\nd\ne\nf\n").unwrap_err();
        assert!(err.to_string().contains("invalid host entries"));
    }

    #[test]
    fn empty_username_falls_back_to_default() {
        let setup = run("10.0.0.1\ndone\n\nn\npw\n").unwrap();
        assert_eq!(setup.credentials.username, default_username());
    }

    #[test]
    fn eof_before_done_is_an_error() {
        let err = run("10.0.0.1\n").unwrap_err();
        assert!(err.to_string().contains("input ended"));
    }

    #[test]
    fn done_token_is_case_insensitive() {
        let setup = run("10.0.0.1\nDONE\nadmin\nn\npw\n").unwrap();
        assert_eq!(setup.hosts.len(), 1);
    }
}

use std::io::{IsTerminal, Read, Write};
use std::path::Path;
use std::sync::LazyLock;

use regex::bytes::Regex;

use pgpkit::{PgpError, Result, write_atomically};

static ARMOR_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^-----BEGIN PGP ([A-Z ]+?)(?:, PART \d+(?:/\d+)?)?-----\r?$")
        .expect("armor header pattern is valid")
});

/// Read a command input: a file, or stdin for `None` / `-`.
pub fn read_input(input: Option<&Path>) -> Result<Vec<u8>> {
    match input {
        Some(path) if path != Path::new("-") => {
            if !path.exists() {
                return Err(PgpError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            Ok(std::fs::read(path)?)
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin().lock().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Write command output to a file (atomically) or to stdout.
///
/// Binary data is never written to an interactive terminal.
pub fn write_output(output: Option<&Path>, data: &[u8]) -> Result<()> {
    match output {
        Some(path) if path != Path::new("-") => write_atomically(path, data),
        _ => {
            let mut stdout = std::io::stdout().lock();
            if stdout.is_terminal() && std::str::from_utf8(data).is_err() {
                return Err(PgpError::InvalidConfig {
                    detail: "refusing to write binary output to a terminal; use --output".into(),
                });
            }
            stdout.write_all(data)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

/// Pretty-print a record (or list of records) as JSON on stdout.
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| PgpError::Io(e.into()))?;
    println!("{text}");
    Ok(())
}

/// Labels of every armor block in `data`, in order (`"MESSAGE"`,
/// `"SIGNED MESSAGE"`, `"PUBLIC KEY BLOCK"`, ...).
pub fn armor_kinds(data: &[u8]) -> Vec<String> {
    ARMOR_HEADER
        .captures_iter(data)
        .filter_map(|c| c.get(1))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
        .collect()
}

/// Label of the first armor block, if `data` is armored at all.
pub fn armor_kind(data: &[u8]) -> Option<String> {
    armor_kinds(data).into_iter().next()
}

// src/cli.rs

//! Command-line handling
//!
//! autowix takes exactly one argument, the template to transform. The
//! manifest and the GUID persistence file are written beside it:
//!
//! ```text
//! autowix setup/product.wxt
//!   -> setup/product.wxs    generated manifest
//!   -> setup/product.awxg   persisted GUIDs
//! ```

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser};

/// Exit status after printing usage
pub const USAGE_EXIT_CODE: u8 = 255;

/// Extension of the generated manifest
pub const OUTPUT_EXTENSION: &str = "wxs";

/// Extension of the GUID persistence file
pub const PERSISTENCE_EXTENSION: &str = "awxg";

/// Help spellings accepted in place of the input path
const HELP_FLAGS: [&str; 4] = ["--help", "-help", "-?", "/?"];

#[derive(Debug, Parser)]
#[command(name = "autowix")]
#[command(about = "Expand an annotated XML template into an installer manifest with stable GUIDs", long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Template to transform; <stem>.wxs and <stem>.awxg are written beside it
    #[arg(value_name = "INFILE", allow_hyphen_values = true)]
    pub input: PathBuf,
}

impl Cli {
    /// Parse the full argument list, program name included
    ///
    /// Returns `None` when usage should be printed instead: any help flag,
    /// or any number of arguments other than one.
    pub fn from_args<I, T>(args: I) -> Option<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        if args.len() != 2 || is_help_flag(&args[1]) {
            return None;
        }
        Self::try_parse_from(args).ok()
    }

    /// Usage text printed for help requests and bad invocations
    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }
}

fn is_help_flag(arg: &OsStr) -> bool {
    HELP_FLAGS.iter().any(|flag| arg == OsStr::new(flag))
}

/// Files touched by one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Template to read
    pub input: PathBuf,
    /// Manifest to write
    pub output: PathBuf,
    /// GUID persistence file to load and save
    pub persistence: PathBuf,
}

impl Paths {
    /// Derive the sibling files from the input path
    ///
    /// The input is made absolute first, so relative `from` paths in the
    /// template resolve against its directory no matter where autowix runs.
    pub fn derive(input: &Path) -> io::Result<Self> {
        let input = std::path::absolute(input)?;
        let stem = input.file_stem().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", input.display()),
            )
        })?;
        let dir = input.parent().unwrap_or_else(|| Path::new(""));

        let sibling = |extension: &str| {
            let mut name = stem.to_os_string();
            name.push(".");
            name.push(extension);
            dir.join(name)
        };

        Ok(Self {
            output: sibling(OUTPUT_EXTENSION),
            persistence: sibling(PERSISTENCE_EXTENSION),
            input,
        })
    }
}
